//! Durable snapshots of an in-flight rollout.
//!
//! The whole [`TodoList`] is the unit of persistence: every command loads it
//! once, mutates it in memory and saves it once at the end.
//!
//! # State File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "defaults": { "skip": "false" },
//!   "todo": [
//!     {
//!       "name": "go-log",
//!       "path": "/home/me/go/src/gx/ipfs/QmLog/go-log",
//!       "level": 0,
//!       "origHash": "QmLog",
//!       "newHash": "QmLog2",
//!       "newVersion": "1.2.1"
//!     }
//!   ]
//! }
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::platform::paths::{PathsError, state_path};
use crate::todo::TodoList;

/// Default name of the state file written by `init`.
pub const STATE_FILENAME: &str = ".cascade-state.json";

/// Current state file format version.
pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StateError {
  #[error("state file not found: {0}")]
  NotFound(PathBuf),

  #[error("failed to read state file {path}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write state file {path}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse state file {path}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to serialize state: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("unsupported state file version {0}, expected {STATE_VERSION}")]
  UnsupportedVersion(u32),

  #[error("state file already exists: {0}")]
  AlreadyExists(PathBuf),

  #[error(transparent)]
  Paths(#[from] PathsError),
}

/// Handle on the persisted state of one rollout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateFile {
  path: PathBuf,
}

impl StateFile {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// The state file named by the environment.
  pub fn from_env() -> Result<Self, StateError> {
    Ok(Self::new(state_path()?))
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// The file exactly as stored on disk.
  pub fn read_raw(&self) -> Result<String, StateError> {
    fs::read_to_string(&self.path).map_err(|source| {
      if source.kind() == io::ErrorKind::NotFound {
        StateError::NotFound(self.path.clone())
      } else {
        StateError::Read {
          path: self.path.clone(),
          source,
        }
      }
    })
  }

  /// Load and validate the rollout.
  pub fn load(&self) -> Result<TodoList, StateError> {
    let content = self.read_raw()?;
    let list: TodoList = serde_json::from_str(&content).map_err(|source| StateError::Parse {
      path: self.path.clone(),
      source,
    })?;

    if list.version != STATE_VERSION {
      return Err(StateError::UnsupportedVersion(list.version));
    }

    debug!(path = %self.path.display(), entries = list.len(), "loaded state");
    Ok(list)
  }

  /// Replace the stored rollout.
  ///
  /// The content goes to a temporary file next to the target which is then
  /// renamed over it, so readers never see a partial snapshot.
  pub fn save(&self, list: &TodoList) -> Result<(), StateError> {
    let temp = self.write_temp(list)?;
    temp.persist(&self.path).map_err(|e| self.write_err(e.error))?;

    debug!(path = %self.path.display(), entries = list.len(), "saved state");
    Ok(())
  }

  /// Write the rollout to a file that must not exist yet.
  ///
  /// Like [`save`](Self::save) the content is staged in a temporary file, then
  /// moved into place only if nothing is there.
  pub fn create_new(&self, list: &TodoList) -> Result<(), StateError> {
    let temp = self.write_temp(list)?;
    temp.persist_noclobber(&self.path).map_err(|e| {
      if e.error.kind() == io::ErrorKind::AlreadyExists {
        StateError::AlreadyExists(self.path.clone())
      } else {
        self.write_err(e.error)
      }
    })?;

    debug!(path = %self.path.display(), entries = list.len(), "created state");
    Ok(())
  }

  /// Encode `list` into a synced temporary file in the target's directory.
  fn write_temp(&self, list: &TodoList) -> Result<NamedTempFile, StateError> {
    let content = encode(list)?;
    let dir = match self.path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent,
      _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| self.write_err(e))?;
    temp.write_all(content.as_bytes()).map_err(|e| self.write_err(e))?;
    temp.as_file().sync_all().map_err(|e| self.write_err(e))?;
    Ok(temp)
  }

  fn write_err(&self, source: io::Error) -> StateError {
    StateError::Write {
      path: self.path.clone(),
      source,
    }
  }
}

fn encode(list: &TodoList) -> Result<String, StateError> {
  let mut content = serde_json::to_string_pretty(list).map_err(StateError::Serialize)?;
  content.push('\n');
  Ok(content)
}
