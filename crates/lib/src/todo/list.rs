use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::bubble::AffectedEntry;
use crate::package::{ManifestReader, PackageManifest, PkgHash, PublishInfo};
use crate::state::STATE_VERSION;

use super::{Todo, TodoError};

/// Every entry of a rollout plus the metadata defaults shared by all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
  /// State file format version.
  pub version: u32,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub defaults: BTreeMap<String, String>,
  #[serde(default)]
  pub todo: Vec<Todo>,
}

impl Default for TodoList {
  fn default() -> Self {
    Self::new(Vec::new())
  }
}

impl TodoList {
  pub fn new(todo: Vec<Todo>) -> Self {
    Self {
      version: STATE_VERSION,
      defaults: BTreeMap::new(),
      todo,
    }
  }

  /// One fresh entry per scheduled package, in schedule order.
  pub fn from_schedule(entries: &[AffectedEntry]) -> Self {
    Self::new(entries.iter().map(Todo::from).collect())
  }

  pub fn len(&self) -> usize {
    self.todo.len()
  }

  pub fn is_empty(&self) -> bool {
    self.todo.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Todo> {
    self.todo.iter()
  }

  /// Fail if two entries share a name.
  pub fn check_unique(&self) -> Result<(), TodoError> {
    let mut seen = HashSet::with_capacity(self.todo.len());
    for todo in &self.todo {
      if !seen.insert(todo.name.as_str()) {
        return Err(TodoError::DuplicateEntry(todo.name.clone()));
      }
    }
    Ok(())
  }

  pub fn find(&self, name: &str) -> Option<&Todo> {
    self.todo.iter().find(|t| t.name == name)
  }

  pub fn get(&self, name: &str) -> Result<&Todo, TodoError> {
    self.find(name).ok_or_else(|| TodoError::NotFound(name.to_string()))
  }

  pub fn get_mut(&mut self, name: &str) -> Result<&mut Todo, TodoError> {
    self
      .todo
      .iter_mut()
      .find(|t| t.name == name)
      .ok_or_else(|| TodoError::NotFound(name.to_string()))
  }

  /// The final entry, which is the package the rollout was gathered from.
  pub fn last(&self) -> Option<&Todo> {
    self.todo.last()
  }

  /// Teach every entry the new hashes of its published prerequisites.
  ///
  /// Recorded hashes are never overwritten, so running this again is a no-op.
  /// Returns how many hashes were recorded.
  pub fn propagate_dependency_hashes(&mut self) -> usize {
    let published: BTreeMap<String, PkgHash> = self
      .todo
      .iter()
      .filter(|t| t.is_published())
      .map(|t| (t.name.clone(), t.new_hash.clone()))
      .collect();

    let mut recorded = 0;
    for todo in &mut self.todo {
      let learned: Vec<(String, PkgHash)> = todo
        .prerequisites()
        .filter(|name| !todo.new_deps.contains_key(*name))
        .filter_map(|name| published.get(name).map(|hash| (name.to_string(), hash.clone())))
        .collect();

      for (name, hash) in learned {
        trace!(entry = %todo.name, dep = %name, hash = %hash, "recorded new dependency hash");
        todo.new_deps.insert(name, hash);
        recorded += 1;
      }
    }

    debug!(recorded, "propagated dependency hashes");
    recorded
  }

  /// Discard in-progress state on every entry that has not been published.
  pub fn clean_unpublished(&mut self) {
    for todo in self.todo.iter_mut().filter(|t| !t.is_published()) {
      todo.reset_publish();
    }
  }

  /// Record that the package described by `manifest` was republished.
  ///
  /// The entry's `new_deps` is taken from what the manifest now pins, limited
  /// to packages that are part of this rollout.
  pub fn mark_published(&mut self, manifest: &PackageManifest, hash: PkgHash, version: &str) -> Result<(), TodoError> {
    let names: HashSet<String> = self.todo.iter().map(|t| t.name.clone()).collect();
    let todo = self.get_mut(&manifest.name)?;
    todo.record_publish(hash, version)?;
    todo.new_deps = manifest
      .deps
      .iter()
      .filter(|dep| names.contains(&dep.name))
      .map(|dep| (dep.name.clone(), dep.hash.clone()))
      .collect();
    debug!(entry = %todo.name, hash = %todo.new_hash, "marked published");
    Ok(())
  }

  /// Mark the package checked out in `dir` with what its last publish produced,
  /// then let its dependents learn the new hash. Returns the entry name.
  pub fn mark_published_at<S>(&mut self, source: &S, dir: &Path) -> Result<String, TodoError>
  where
    S: ManifestReader + PublishInfo + ?Sized,
  {
    let manifest = source.read_package(dir)?;
    let published = source.last_published(dir)?;
    self.mark_published(&manifest, published.hash, &published.version)?;
    self.propagate_dependency_hashes();
    Ok(manifest.name)
  }

  /// Ready, not published, and some direct dependency moved off its original hash.
  pub fn is_invalidated(&self, todo: &Todo) -> bool {
    todo.is_ready()
      && todo.deps.iter().any(|dep| match (todo.new_deps.get(dep), self.find(dep)) {
        (Some(new), Some(entry)) => new != &entry.orig_hash,
        (Some(_), None) => true,
        (None, _) => false,
      })
  }

  /// Published, but a prerequisite has since been republished under another hash.
  pub fn is_stale(&self, todo: &Todo) -> bool {
    todo.is_published()
      && todo.new_deps.iter().any(|(dep, recorded)| {
        self
          .find(dep)
          .is_some_and(|entry| entry.is_published() && &entry.new_hash != recorded)
      })
  }
}

impl<'a> IntoIterator for &'a TodoList {
  type Item = &'a Todo;
  type IntoIter = std::slice::Iter<'a, Todo>;

  fn into_iter(self) -> Self::IntoIter {
    self.todo.iter()
  }
}
