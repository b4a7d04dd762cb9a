//! Implementation of the `cascade init` command.
//!
//! Plans a rollout from the package in the current directory and writes its
//! state file. The file is never overwritten: an existing rollout has to be
//! finished or deleted first.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use cascade_lib::plan::plan_rollout;
use cascade_lib::platform::paths::STATE_ENV;
use cascade_lib::state::{STATE_FILENAME, StateFile};

use crate::output::print_info;

use super::{current_dir, package_store};

/// Execute the init command.
///
/// Prints an `export` line for the operator to evaluate, so later commands
/// find the state file.
pub fn cmd_init(state: Option<&Path>, targets: &[String]) -> Result<()> {
  let store = package_store()?;
  let root = current_dir()?;
  let rollout = plan_rollout(&store, &root, targets)?;

  let path = match state {
    Some(path) => path.to_path_buf(),
    None => root.join(STATE_FILENAME),
  };
  let file = StateFile::new(&path);
  file
    .create_new(&rollout.todo)
    .context("failed to start rollout")?;

  info!(path = %path.display(), entries = rollout.todo.len(), "rollout started");
  print_info(&format!("{} packages to update", rollout.todo.len()));
  println!("export {}={}", STATE_ENV, path.display());
  Ok(())
}
