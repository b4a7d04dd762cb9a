//! Free-form key/value metadata on rollout entries.
//!
//! Each entry has its own map; lookups fall back to the list-wide defaults.
//! Keys that collide with template variables are reserved, since a
//! condition with that name would never reach the metadata.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::format::Var;
use crate::todo::{TodoError, TodoList};

#[derive(Debug, Error)]
pub enum MetaError {
  #[error("'{0}' is a reserved key")]
  Reserved(String),

  #[error("{0} not defined")]
  Undefined(String),

  #[error(transparent)]
  Todo(#[from] TodoError),
}

/// Which map an operation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaScope {
  /// The named entry, with defaults as fallback on reads.
  Entry(String),
  /// The list-wide defaults.
  Defaults,
}

pub fn is_reserved(key: &str) -> bool {
  Var::from_name(key).is_some()
}

fn check_reserved(key: &str) -> Result<(), MetaError> {
  if is_reserved(key) {
    return Err(MetaError::Reserved(key.to_string()));
  }
  Ok(())
}

fn scope_mut<'a>(list: &'a mut TodoList, scope: &MetaScope) -> Result<&'a mut BTreeMap<String, String>, MetaError> {
  match scope {
    MetaScope::Entry(name) => Ok(&mut list.get_mut(name)?.meta),
    MetaScope::Defaults => Ok(&mut list.defaults),
  }
}

/// Value of `key`, falling back to the defaults for an entry scope.
pub fn get(list: &TodoList, scope: &MetaScope, key: &str) -> Result<String, MetaError> {
  let value = match scope {
    MetaScope::Entry(name) => list.get(name)?.meta.get(key).or_else(|| list.defaults.get(key)),
    MetaScope::Defaults => list.defaults.get(key),
  };
  value.cloned().ok_or_else(|| MetaError::Undefined(key.to_string()))
}

pub fn set(list: &mut TodoList, scope: &MetaScope, key: &str, value: &str) -> Result<(), MetaError> {
  check_reserved(key)?;
  scope_mut(list, scope)?.insert(key.to_string(), value.to_string());
  Ok(())
}

/// Remove `key`. Removing an absent key is not an error.
pub fn unset(list: &mut TodoList, scope: &MetaScope, key: &str) -> Result<(), MetaError> {
  check_reserved(key)?;
  scope_mut(list, scope)?.remove(key);
  Ok(())
}

/// The keys set directly in `scope`, without defaults.
pub fn vals<'a>(list: &'a TodoList, scope: &MetaScope) -> Result<&'a BTreeMap<String, String>, MetaError> {
  match scope {
    MetaScope::Entry(name) => Ok(&list.get(name)?.meta),
    MetaScope::Defaults => Ok(&list.defaults),
  }
}
