use std::path::Path;

use anyhow::Result;
use clap::Subcommand;

use cascade_lib::meta::{self, MetaScope};

use super::{current_package, load};

#[derive(Debug, Clone, Subcommand)]
pub enum MetaAction {
  /// Print a value, falling back to the defaults
  Get { key: String },
  /// Set a value
  Set { key: String, value: String },
  /// Remove a value
  Unset { key: String },
  /// Print every value set directly
  Vals,
}

pub fn cmd_meta(state: Option<&Path>, package: Option<String>, default: bool, action: MetaAction) -> Result<()> {
  let (file, mut list) = load(state)?;

  let scope = if default {
    MetaScope::Defaults
  } else {
    match package {
      Some(name) => MetaScope::Entry(name),
      None => MetaScope::Entry(current_package()?),
    }
  };

  let modified = match action {
    MetaAction::Get { key } => {
      println!("{}", meta::get(&list, &scope, &key)?);
      false
    }
    MetaAction::Set { key, value } => {
      meta::set(&mut list, &scope, &key, &value)?;
      true
    }
    MetaAction::Unset { key } => {
      meta::unset(&mut list, &scope, &key)?;
      true
    }
    MetaAction::Vals => {
      for (key, value) in meta::vals(&list, &scope)? {
        println!("{key} {value}");
      }
      false
    }
  };

  if modified {
    file.save(&list)?;
  }
  Ok(())
}
