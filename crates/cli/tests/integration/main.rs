//! CLI integration tests for cascade.
//!
//! Each test builds its own package store and root package in a temporary
//! directory and drives the `cascade` binary against it.

mod meta_tests;
mod rollout_tests;
