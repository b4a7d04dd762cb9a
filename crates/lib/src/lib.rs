//! cascade-lib: Core types and logic for cascade
//!
//! This crate drives a bottom-up republish of a tree of content-addressed
//! packages after one of them changes:
//! - `package`: manifests, the package store and the transitive package graph
//! - `bubble`: the affected closure of a changed package and its processing levels
//! - `todo`: the per-package update state machine of an in-flight rollout
//! - `format`: the template and condition language used to report on entries
//! - `state`: durable JSON snapshots of a rollout
//! - `meta`: free-form key/value metadata attached to entries
//! - `plan`: the glue that turns a root package and target names into a rollout
//! - `platform`: environment-driven locations of the package store and state file

pub mod bubble;
pub mod format;
pub mod meta;
pub mod package;
pub mod plan;
pub mod platform;
pub mod state;
pub mod todo;
pub mod util;
