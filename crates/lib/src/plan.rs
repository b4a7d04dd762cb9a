//! Turning a root package and the names of changed packages into a rollout.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::bubble::{AffectedEntry, bubble_list_with_roots};
use crate::package::{GraphError, ManifestReader, Packages, PkgHash, gather};
use crate::todo::{TodoError, TodoList};

#[derive(Debug, Error)]
pub enum PlanError {
  #[error("no target package given")]
  NoTargets,

  #[error("no package named {0} in the dependency tree")]
  UnknownTarget(String),

  #[error("package name {name} is ambiguous: {hashes}")]
  Ambiguous { name: String, hashes: String },

  #[error(transparent)]
  Graph(#[from] GraphError),

  #[error(transparent)]
  Todo(#[from] TodoError),
}

/// A planned rollout, before it is persisted.
#[derive(Debug, Clone)]
pub struct Rollout {
  /// Every package reachable from the root.
  pub packages: Packages,
  /// The affected closure in processing order.
  pub entries: Vec<AffectedEntry>,
  pub todo: TodoList,
}

/// Plan the rollout of `targets` through the tree rooted at `root_dir`.
///
/// The first target drives the rollout; any further targets join it as
/// additional roots.
pub fn plan_rollout<R: ManifestReader + ?Sized>(
  reader: &R,
  root_dir: &Path,
  targets: &[String],
) -> Result<Rollout, PlanError> {
  let (first, rest) = targets.split_first().ok_or(PlanError::NoTargets)?;

  let packages = gather(reader, root_dir)?;
  debug!(packages = packages.len(), root = %root_dir.display(), "gathered dependency tree");

  let target = resolve_name(&packages, first)?;
  let extra_roots = rest
    .iter()
    .map(|name| resolve_name(&packages, name))
    .collect::<Result<Vec<_>, _>>()?;

  let entries = bubble_list_with_roots(&packages, &target, &extra_roots)?;
  let todo = TodoList::from_schedule(&entries);
  todo.check_unique()?;

  info!(target = %first, entries = todo.len(), "planned rollout");
  Ok(Rollout {
    packages,
    entries,
    todo,
  })
}

/// Find the hash a package name refers to.
///
/// When several versions of the package are in the tree, the one the root
/// package depends on is the one being rolled out.
pub fn resolve_name(packages: &Packages, name: &str) -> Result<PkgHash, PlanError> {
  let candidates: Vec<&PkgHash> = packages
    .values()
    .filter(|pkg| pkg.name == name && !pkg.hash.is_empty())
    .map(|pkg| &pkg.hash)
    .collect();

  match candidates.as_slice() {
    [] => Err(PlanError::UnknownTarget(name.to_string())),
    [hash] => Ok((*hash).clone()),
    _ => packages
      .get(&PkgHash::root())
      .and_then(|root| root.deps.iter().find(|dep| dep.name == name))
      .map(|dep| dep.hash.clone())
      .filter(|hash| candidates.contains(&hash))
      .ok_or_else(|| PlanError::Ambiguous {
        name: name.to_string(),
        hashes: candidates.iter().map(|h| h.as_str()).collect::<Vec<_>>().join(", "),
      }),
  }
}
