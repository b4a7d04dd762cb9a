use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Content hash a package was published under.
///
/// Opaque to cascade: compared for exact equality, never parsed. The empty
/// hash identifies the unpublished root package a graph is gathered from.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PkgHash(pub String);

impl PkgHash {
  pub fn new(hash: impl Into<String>) -> Self {
    Self(hash.into())
  }

  /// The key of the root package in a gathered graph.
  pub fn root() -> Self {
    Self(String::new())
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for PkgHash {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<&str> for PkgHash {
  fn from(hash: &str) -> Self {
    Self(hash.to_string())
  }
}

/// A dependency as declared in a manifest: a name pinned to a hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredDep {
  pub name: String,
  pub hash: PkgHash,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
}

impl DeclaredDep {
  pub fn new(name: &str, hash: &str) -> Self {
    Self {
      name: name.to_string(),
      hash: PkgHash::new(hash),
      version: None,
    }
  }
}

/// A node of the package graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
  pub hash: PkgHash,
  pub name: String,
  pub version: Option<String>,
  /// Directory the manifest was read from.
  pub path: PathBuf,
  /// Declared dependencies, in manifest order.
  pub deps: Vec<DeclaredDep>,
}

impl Package {
  /// Whether this package declares a direct dependency on `hash`.
  pub fn depends_on(&self, hash: &PkgHash) -> bool {
    self.deps.iter().any(|d| &d.hash == hash)
  }

  /// Whether this package declares a dependency called `name`, whatever its hash.
  pub fn declares(&self, name: &str) -> bool {
    self.deps.iter().any(|d| d.name == name)
  }
}

/// The gathered graph, keyed by hash.
pub type Packages = BTreeMap<PkgHash, Package>;
