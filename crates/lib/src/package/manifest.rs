//! Package manifests and the on-disk package store.
//!
//! # Manifest Format
//!
//! ```json
//! {
//!   "name": "go-log",
//!   "version": "1.5.2",
//!   "gxDependencies": [
//!     { "name": "go-colorable", "hash": "QmVdDy...", "version": "0.2.0" }
//!   ]
//! }
//! ```
//!
//! # Store Layout
//!
//! ```text
//! {store}/
//! └── <hash>/
//!     └── <name>/
//!         ├── package.json
//!         └── .gx/lastpubver   # "<version>: <hash>"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use super::types::{DeclaredDep, PkgHash};

/// Manifest file found at the top of every package directory.
pub const MANIFEST_FILENAME: &str = "package.json";

/// Record of the last publish of a package, relative to its directory.
pub const LAST_PUBLISHED_PATH: &str = ".gx/lastpubver";

/// The parsed contents of a package's manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
  pub name: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,

  #[serde(default, rename = "gxDependencies", alias = "dependencies")]
  pub deps: Vec<DeclaredDep>,
}

impl PackageManifest {
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      version: None,
      deps: Vec::new(),
    }
  }

  pub fn with_dep(mut self, name: &str, hash: &str) -> Self {
    self.deps.push(DeclaredDep::new(name, hash));
    self
  }
}

/// What an external publish step produced for a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastPublished {
  pub version: String,
  pub hash: PkgHash,
}

impl LastPublished {
  /// Parse a `<version>: <hash>` record.
  pub fn parse(content: &str) -> Option<Self> {
    let line = content.lines().next()?.trim();
    let (version, hash) = line.split_once(':')?;
    let (version, hash) = (version.trim(), hash.trim());
    if version.is_empty() || hash.is_empty() {
      return None;
    }
    Some(Self {
      version: version.to_string(),
      hash: PkgHash::new(hash),
    })
  }
}

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("no package found at {0}")]
  NotFound(PathBuf),

  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("no publish record at {0}; publish the package first")]
  NoPublishRecord(PathBuf),

  #[error("malformed publish record {0}: expected '<version>: <hash>'")]
  MalformedLastPublished(PathBuf),
}

/// Reads manifests and locates packages by hash.
pub trait ManifestReader {
  /// Read the manifest of the package in directory `path`.
  fn read_package(&self, path: &Path) -> Result<PackageManifest, ManifestError>;

  /// Directory holding the package published as `hash` under `name`.
  fn resolve(&self, hash: &PkgHash, name: &str) -> PathBuf;
}

/// Reports what the last external publish of a package produced.
pub trait PublishInfo {
  fn last_published(&self, path: &Path) -> Result<LastPublished, ManifestError>;
}

/// A package store rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct PackageStore {
  root: PathBuf,
}

impl PackageStore {
  pub fn new(root: PathBuf) -> Self {
    Self { root }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }
}

fn read_file(path: &Path) -> Result<String, ManifestError> {
  fs::read_to_string(path).map_err(|e| {
    if e.kind() == io::ErrorKind::NotFound {
      ManifestError::NotFound(path.to_path_buf())
    } else {
      ManifestError::Read {
        path: path.to_path_buf(),
        source: e,
      }
    }
  })
}

/// Read the manifest of the package in directory `dir`.
pub fn read_manifest(dir: &Path) -> Result<PackageManifest, ManifestError> {
  let manifest_path = dir.join(MANIFEST_FILENAME);
  trace!(path = %manifest_path.display(), "reading manifest");

  let content = read_file(&manifest_path)?;
  serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
    path: manifest_path,
    source,
  })
}

/// Read the last-published record of the package in directory `dir`.
pub fn read_last_published(dir: &Path) -> Result<LastPublished, ManifestError> {
  let record_path = dir.join(LAST_PUBLISHED_PATH);
  let content = match read_file(&record_path) {
    Err(ManifestError::NotFound(path)) => return Err(ManifestError::NoPublishRecord(path)),
    other => other?,
  };
  LastPublished::parse(&content).ok_or(ManifestError::MalformedLastPublished(record_path))
}

impl ManifestReader for PackageStore {
  fn read_package(&self, path: &Path) -> Result<PackageManifest, ManifestError> {
    read_manifest(path)
  }

  fn resolve(&self, hash: &PkgHash, name: &str) -> PathBuf {
    self.root.join(hash.as_str()).join(name)
  }
}

impl PublishInfo for PackageStore {
  fn last_published(&self, path: &Path) -> Result<LastPublished, ManifestError> {
    read_last_published(path)
  }
}
