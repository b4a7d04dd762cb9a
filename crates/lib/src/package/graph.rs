//! Package graph gathering.
//!
//! Starting from a root package directory, every declared dependency is
//! resolved to its store location and read, recursively. The graph is a DAG
//! with shared substructure, so each hash is read once and later references
//! reuse the cached [`Package`]. Re-entering a hash that is still being
//! resolved means the manifests form a cycle, which is fatal.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, trace, warn};

use super::manifest::{ManifestError, ManifestReader};
use super::types::{Package, Packages, PkgHash};

/// Errors that can occur while building or walking the package graph.
#[derive(Debug, Error)]
pub enum GraphError {
  #[error(transparent)]
  Manifest(#[from] ManifestError),

  /// A package depends, transitively, on itself.
  #[error("cyclic dependency: {chain}")]
  CyclicDependency { chain: String },

  /// A hash that should be part of the graph is not.
  #[error("package {0} not found in dependency graph")]
  NotFound(PkgHash),
}

/// Gather the whole graph reachable from the root package in `root_dir`.
///
/// The root is stored under [`PkgHash::root`].
pub fn gather<R: ManifestReader + ?Sized>(reader: &R, root_dir: &Path) -> Result<Packages, GraphError> {
  let mut pkgs = Packages::new();
  gather_deps(&mut pkgs, reader, &PkgHash::root(), root_dir)?;
  debug!(packages = pkgs.len(), "gathered package graph");
  Ok(pkgs)
}

/// Read the package `hash` at `path` and everything it depends on into `into`.
///
/// Packages already in `into` are not read again. Returns the package itself.
pub fn gather_deps<R: ManifestReader + ?Sized>(
  into: &mut Packages,
  reader: &R,
  hash: &PkgHash,
  path: &Path,
) -> Result<Package, GraphError> {
  let mut resolving = Vec::new();
  gather_inner(into, reader, hash, path, &mut resolving)
}

fn gather_inner<R: ManifestReader + ?Sized>(
  into: &mut Packages,
  reader: &R,
  hash: &PkgHash,
  path: &Path,
  resolving: &mut Vec<PkgHash>,
) -> Result<Package, GraphError> {
  if let Some(pkg) = into.get(hash) {
    trace!(hash = %hash, "package already gathered");
    return Ok(pkg.clone());
  }

  if let Some(start) = resolving.iter().position(|h| h == hash) {
    let chain = resolving[start..]
      .iter()
      .chain(std::iter::once(hash))
      .map(|h| h.as_str())
      .collect::<Vec<_>>()
      .join(" -> ");
    return Err(GraphError::CyclicDependency { chain });
  }

  debug!(hash = %hash, path = %path.display(), "gathering package");
  let manifest = reader.read_package(path)?;

  resolving.push(hash.clone());
  for dep in &manifest.deps {
    if into.contains_key(&dep.hash) {
      continue;
    }
    let dep_path = reader.resolve(&dep.hash, &dep.name);
    let dep_pkg = gather_inner(into, reader, &dep.hash, &dep_path, resolving)?;
    if dep_pkg.name != dep.name {
      warn!(
        declared = %dep.name,
        actual = %dep_pkg.name,
        hash = %dep.hash,
        "dependency declared under a different name"
      );
    }
  }
  resolving.pop();

  let pkg = Package {
    hash: hash.clone(),
    name: manifest.name,
    version: manifest.version,
    path: path.to_path_buf(),
    deps: manifest.deps,
  };
  into.insert(hash.clone(), pkg.clone());
  Ok(pkg)
}
