use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Result, bail};
use clap::ValueEnum;

use crate::output::print_error;

use super::{current_package, load, parse_template, render_each};

/// A class of dependencies recorded on an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DepSet {
  /// Direct dependencies in the rollout
  Direct,
  /// Other roots this entry has to be moved onto
  Also,
  /// Everything the entry's manifest has to be updated for: direct and also
  #[value(alias = "specified")]
  ToUpdate,
  /// Dependencies reached only through other entries
  Indirect,
  /// All of the above
  All,
}

impl DepSet {
  fn includes_direct(self) -> bool {
    matches!(self, DepSet::Direct | DepSet::ToUpdate | DepSet::All)
  }

  fn includes_also(self) -> bool {
    matches!(self, DepSet::Also | DepSet::ToUpdate | DepSet::All)
  }

  fn includes_indirect(self) -> bool {
    matches!(self, DepSet::Indirect | DepSet::All)
  }
}

/// Render the requested dependencies of one entry, sorted by name.
///
/// Nothing is printed unless every dependency renders.
pub fn cmd_deps(state: Option<&Path>, format: &str, package: Option<String>, sets: &[DepSet]) -> Result<()> {
  let template = parse_template(format)?;
  let (_, list) = load(state)?;
  let name = match package {
    Some(name) => name,
    None => current_package()?,
  };
  let todo = list.get(&name)?;

  let sets = if sets.is_empty() { &[DepSet::Direct][..] } else { sets };
  let mut names = BTreeSet::new();
  for set in sets {
    if set.includes_direct() {
      names.extend(todo.deps.iter());
    }
    if set.includes_also() {
      names.extend(todo.also_update.iter());
    }
    if set.includes_indirect() {
      names.extend(todo.indirect.iter());
    }
  }

  let mut failures = 0;
  let mut entries = Vec::with_capacity(names.len());
  for dep in names {
    match list.get(dep) {
      Ok(entry) => entries.push(entry),
      Err(e) => {
        print_error(&e.to_string());
        failures += 1;
      }
    }
  }

  let mut out = String::new();
  failures += render_each(&list, entries, &template, |_, line| {
    out.push_str(&line);
    out.push('\n');
  });

  if failures > 0 {
    bail!("aborting due to previous errors");
  }
  print!("{out}");
  Ok(())
}
