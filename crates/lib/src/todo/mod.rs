//! The per-package update state machine of a rollout.
//!
//! A rollout is a [`TodoList`]: one [`Todo`] per affected package, created once
//! from the bubble list and then mutated as packages get republished. Status
//! (ready, published, invalidated, stale) is always derived, never stored.

mod list;
mod types;

use thiserror::Error;

use crate::package::ManifestError;

pub use list::TodoList;
pub use types::Todo;

#[derive(Debug, Error)]
pub enum TodoError {
  #[error("could not find entry for {0}")]
  NotFound(String),

  #[error("duplicate entry for {0}")]
  DuplicateEntry(String),

  #[error("{name} already published as {hash}; reset it first")]
  AlreadyPublished { name: String, hash: String },

  #[error(transparent)]
  Manifest(#[from] ManifestError),
}
