//! Environment-driven locations: the package store and the rollout state file.

use std::path::PathBuf;

use thiserror::Error;

pub const STATE_ENV: &str = "CASCADE_STATE";
pub const STORE_ENV: &str = "CASCADE_STORE";

/// Store location relative to `GOPATH` when `CASCADE_STORE` is unset.
pub const GOPATH_STORE_SUBDIR: &str = "src/gx/ipfs";

#[derive(Debug, Error)]
pub enum PathsError {
  #[error("package store not configured: set {STORE_ENV} or GOPATH")]
  StoreNotConfigured,

  #[error("{STATE_ENV} not set")]
  StateNotConfigured,
}

fn non_empty_var(key: &str) -> Option<String> {
  std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Returns the root of the package store.
///
/// `CASCADE_STORE` wins; otherwise the store lives under `$GOPATH/src/gx/ipfs`.
pub fn store_dir() -> Result<PathBuf, PathsError> {
  if let Some(store) = non_empty_var(STORE_ENV) {
    return Ok(PathBuf::from(store));
  }
  non_empty_var("GOPATH")
    .map(|gopath| PathBuf::from(gopath).join(GOPATH_STORE_SUBDIR))
    .ok_or(PathsError::StoreNotConfigured)
}

/// Returns the state file of the current rollout, from `CASCADE_STATE`.
pub fn state_path() -> Result<PathBuf, PathsError> {
  non_empty_var(STATE_ENV)
    .map(PathBuf::from)
    .ok_or(PathsError::StateNotConfigured)
}
