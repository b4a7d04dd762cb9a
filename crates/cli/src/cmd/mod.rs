mod deps;
mod init;
mod list;
mod meta;
mod preview;
mod published;
mod state;
mod to_pin;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use cascade_lib::format::{EntryView, Template};
use cascade_lib::package::{PackageStore, read_manifest};
use cascade_lib::platform::paths::store_dir;
use cascade_lib::state::StateFile;
use cascade_lib::todo::{Todo, TodoList};

use crate::output::print_error;

pub use deps::{DepSet, cmd_deps};
pub use init::cmd_init;
pub use list::cmd_list;
pub use meta::{MetaAction, cmd_meta};
pub use preview::cmd_preview;
pub use published::{PublishedMode, cmd_published};
pub use state::cmd_state;
pub use to_pin::cmd_to_pin;

/// The state file named by `--state`, or by the environment.
fn state_file(state: Option<&Path>) -> Result<StateFile> {
  match state {
    Some(path) => Ok(StateFile::new(path)),
    None => StateFile::from_env().context("no rollout in progress (use --state or run init)"),
  }
}

fn load(state: Option<&Path>) -> Result<(StateFile, TodoList)> {
  let file = state_file(state)?;
  let list = file
    .load()
    .with_context(|| format!("failed to load rollout from {}", file.path().display()))?;
  Ok((file, list))
}

fn package_store() -> Result<PackageStore> {
  Ok(PackageStore::new(store_dir()?))
}

fn current_dir() -> Result<PathBuf> {
  dunce::canonicalize(".").context("failed to resolve the current directory")
}

/// Name of the package checked out in the current directory.
fn current_package() -> Result<String> {
  let manifest = read_manifest(Path::new(".")).context("failed to read the package in the current directory")?;
  Ok(manifest.name)
}

fn parse_template(format: &str) -> Result<Template> {
  Ok(Template::parse(format)?)
}

/// Render `entries`, passing each line to `emit`.
///
/// An entry that fails to render is reported and skipped. Returns the number
/// of failures so the caller can fail once everything else is out.
fn render_each<'a>(
  list: &'a TodoList,
  entries: impl IntoIterator<Item = &'a Todo>,
  template: &Template,
  mut emit: impl FnMut(&Todo, String),
) -> usize {
  let mut failures = 0;
  for todo in entries {
    match template.render(&EntryView::new(list, todo)) {
      Ok(line) => emit(todo, line),
      Err(e) => {
        print_error(&format!("{}: {e}", todo.name));
        failures += 1;
      }
    }
  }
  failures
}
