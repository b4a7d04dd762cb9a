//! Packages, their manifests, and the transitive package graph.
//!
//! A package is identified by the content hash it was published under. The
//! graph builder walks declared dependencies from a root package, reading each
//! dependency's manifest from the package store exactly once.

pub mod graph;
pub mod manifest;
pub mod types;

pub use graph::{GraphError, gather, gather_deps};
pub use manifest::{
  LastPublished, ManifestError, ManifestReader, PackageManifest, PackageStore, PublishInfo, read_last_published,
  read_manifest,
};
pub use types::{DeclaredDep, Package, Packages, PkgHash};
