//! Entry metadata and metadata-driven conditions.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn set_and_get_entry_value() {
  let env = TestEnv::started();

  env.cmd().args(["meta", "-p", "core", "set", "owner", "alice"]).assert().success();

  assert_eq!(env.stdout(&["meta", "-p", "core", "get", "owner"]), "alice\n");
  assert_eq!(env.stdout(&["meta", "-p", "core", "vals"]), "owner alice\n");
}

#[test]
fn get_falls_back_to_defaults() {
  let env = TestEnv::started();

  env.cmd().args(["meta", "--default", "set", "branch", "main"]).assert().success();

  assert_eq!(env.stdout(&["meta", "-p", "log", "get", "branch"]), "main\n");
  assert_eq!(env.stdout(&["meta", "-p", "log", "vals"]), "");
  assert_eq!(env.stdout(&["meta", "--default", "vals"]), "branch main\n");
}

#[test]
fn meta_defaults_to_current_package() {
  let env = TestEnv::started();

  env.cmd().args(["meta", "set", "note", "root"]).assert().success();

  assert_eq!(env.stdout(&["meta", "-p", "app", "get", "note"]), "root\n");
}

#[test]
fn undefined_key_fails() {
  let env = TestEnv::started();

  env
    .cmd()
    .args(["meta", "-p", "log", "get", "owner"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("owner not defined"));
}

#[test]
fn reserved_keys_are_rejected() {
  let env = TestEnv::started();
  let before = std::fs::read_to_string(env.state_path()).unwrap();

  env
    .cmd()
    .args(["meta", "-p", "log", "set", "ready", "yes"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("reserved key"));

  assert_eq!(std::fs::read_to_string(env.state_path()).unwrap(), before);
}

#[test]
fn unset_restores_default() {
  let env = TestEnv::started();
  env.cmd().args(["meta", "--default", "set", "skip", "false"]).assert().success();
  env.cmd().args(["meta", "-p", "core", "set", "skip", "true"]).assert().success();
  env.cmd().args(["meta", "-p", "core", "unset", "skip"]).assert().success();

  assert_eq!(env.stdout(&["meta", "-p", "core", "get", "skip"]), "false\n");
}

#[test]
fn metadata_drives_conditions() {
  let env = TestEnv::started();
  env.cmd().args(["meta", "--default", "set", "skip", "false"]).assert().success();
  env.cmd().args(["meta", "-p", "core", "set", "skip", "true"]).assert().success();

  assert_eq!(env.stdout(&["list", "-f", "$name", "skip"]), "core\n");
  assert_eq!(env.stdout(&["list", "-f", "$name", "not", "skip"]), "log\ncmds\napp\n");
}

#[test]
fn default_and_package_conflict() {
  let env = TestEnv::started();

  env
    .cmd()
    .args(["meta", "--default", "-p", "core", "vals"])
    .assert()
    .failure();
}
