//! Implementation of the `cascade published` command.

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing::info;

use crate::output::print_success;

use super::{current_dir, current_package, load, package_store};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PublishedMode {
  /// Record the last publish of the package in the current directory
  #[default]
  Mark,
  /// Forget the publish of the package in the current directory
  Reset,
  /// Forget in-progress state on every unpublished entry
  Clean,
}

pub fn cmd_published(state: Option<&Path>, mode: PublishedMode) -> Result<()> {
  let (file, mut list) = load(state)?;

  match mode {
    PublishedMode::Mark => {
      let store = package_store()?;
      let name = list
        .mark_published_at(&store, &current_dir()?)
        .context("failed to record publish")?;
      let todo = list.get(&name)?;
      print_success(&format!("{} published as {} ({})", name, todo.new_hash, todo.new_version));
    }
    PublishedMode::Reset => {
      let name = current_package()?;
      list.get_mut(&name)?.reset_publish();
      print_success(&format!("{name} reset"));
    }
    PublishedMode::Clean => {
      list.clean_unpublished();
      info!("cleared unpublished entries");
    }
  }

  list.propagate_dependency_hashes();
  file.save(&list)?;
  Ok(())
}
