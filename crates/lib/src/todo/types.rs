use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::bubble::AffectedEntry;
use crate::package::PkgHash;

use super::TodoError;

/// The rollout record of one affected package.
///
/// `name`, `path`, `level`, `orig_hash` and the dependency lists are fixed at
/// creation. `new_hash`/`new_version` are set once the package has been
/// republished, and `new_deps` fills in as its prerequisites complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
  pub name: String,
  pub path: PathBuf,
  #[serde(default)]
  pub level: usize,
  #[serde(default, skip_serializing_if = "PkgHash::is_empty")]
  pub orig_hash: PkgHash,
  #[serde(default, skip_serializing_if = "PkgHash::is_empty")]
  pub new_hash: PkgHash,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub new_version: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub deps: Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub also_update: Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub indirect: Vec<String>,
  /// Hash each prerequisite was republished as, by name.
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub new_deps: BTreeMap<String, PkgHash>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub meta: BTreeMap<String, String>,
}

impl From<&AffectedEntry> for Todo {
  fn from(entry: &AffectedEntry) -> Self {
    Self {
      name: entry.name.clone(),
      path: entry.path.clone(),
      level: entry.level,
      orig_hash: entry.hash.clone(),
      deps: entry.direct_deps.clone(),
      also_update: entry.also_update.clone(),
      indirect: entry.indirect_deps.clone(),
      ..Self::default()
    }
  }
}

impl Todo {
  /// Names that must be republished before this package: `deps` then `also_update`.
  pub fn prerequisites(&self) -> impl Iterator<Item = &str> {
    self.deps.iter().chain(&self.also_update).map(String::as_str)
  }

  /// Prerequisites that have not recorded a new hash yet.
  pub fn unmet(&self) -> Vec<&str> {
    self
      .prerequisites()
      .filter(|name| self.new_deps.get(*name).is_none_or(PkgHash::is_empty))
      .collect()
  }

  pub fn is_published(&self) -> bool {
    !self.new_hash.is_empty()
  }

  /// Every prerequisite has been republished and this package has not been yet.
  pub fn is_ready(&self) -> bool {
    !self.is_published() && self.unmet().is_empty()
  }

  /// The hash this package currently goes by.
  pub fn current_hash(&self) -> &PkgHash {
    if self.is_published() { &self.new_hash } else { &self.orig_hash }
  }

  /// Record the result of republishing this package.
  pub fn record_publish(&mut self, hash: PkgHash, version: &str) -> Result<(), TodoError> {
    if self.is_published() {
      return Err(TodoError::AlreadyPublished {
        name: self.name.clone(),
        hash: self.new_hash.to_string(),
      });
    }
    self.new_hash = hash;
    self.new_version = version.to_string();
    Ok(())
  }

  /// Forget the publish and everything learned about prerequisites.
  pub fn reset_publish(&mut self) {
    self.new_hash = PkgHash::default();
    self.new_version.clear();
    self.new_deps.clear();
  }
}
