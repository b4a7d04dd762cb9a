//! Planning, starting and advancing a rollout.

use predicates::prelude::*;

use super::common::TestEnv;

// =============================================================================
// preview
// =============================================================================

#[test]
fn preview_groups_levels_with_blank_lines() {
  let env = TestEnv::sample();

  assert_eq!(
    env.stdout(&["preview", "-f", "$name[ :: $deps]", "log"]),
    "log\n\ncore :: log\n\ncmds :: core\n\napp :: cmds log\n"
  );
}

#[test]
fn preview_default_format_uses_paths() {
  let env = TestEnv::sample();
  let log = env.package_dir("QmLog", "log");

  env
    .cmd()
    .args(["preview", "log"])
    .assert()
    .success()
    .stdout(predicate::str::starts_with(format!("{}\n\n", log.display())))
    .stdout(predicate::str::ends_with(format!("{} :: cmds log\n", env.root_dir().display())));
}

#[test]
fn preview_list_is_flat() {
  let env = TestEnv::sample();
  assert_eq!(
    env.stdout(&["preview", "--list", "-f", "$level $name", "log"]),
    "0 log\n1 core\n2 cmds\n3 app\n"
  );
}

#[test]
fn preview_json_is_the_planned_state() {
  let env = TestEnv::sample();

  let json: serde_json::Value = serde_json::from_str(&env.stdout(&["preview", "--json", "log"])).unwrap();

  assert_eq!(json["version"], 1);
  let todo = json["todo"].as_array().unwrap();
  assert_eq!(todo.len(), 4);
  assert_eq!(todo[1]["name"], "core");
  assert_eq!(todo[1]["origHash"], "QmCore");
  assert_eq!(todo[1]["deps"], serde_json::json!(["log"]));
}

#[test]
fn preview_does_not_write_state() {
  let env = TestEnv::sample();
  env.cmd().args(["preview", "log"]).assert().success();
  assert!(!env.state_path().exists());
}

#[test]
fn preview_unknown_target_fails() {
  let env = TestEnv::sample();

  env
    .cmd()
    .args(["preview", "left-pad"])
    .assert()
    .failure()
    .code(1)
    .stderr(predicate::str::contains("no package named left-pad"));
}

#[test]
fn preview_missing_store_package_fails() {
  let env = TestEnv::empty();
  env.root("app", &[("log", "QmLog")]);

  env
    .cmd()
    .args(["preview", "log"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("no package found"));
}

#[cfg(unix)]
#[test]
fn store_falls_back_to_gopath() {
  let env = TestEnv::sample();
  let gopath = env.temp.path().join("gopath");
  std::fs::create_dir_all(gopath.join("src/gx")).unwrap();
  std::os::unix::fs::symlink(env.store_path(), gopath.join("src/gx/ipfs")).unwrap();

  env
    .cmd()
    .env_remove("CASCADE_STORE")
    .env("GOPATH", &gopath)
    .args(["preview", "--list", "-f", "$name", "log"])
    .assert()
    .success()
    .stdout("log\ncore\ncmds\napp\n");
}

#[test]
fn missing_store_configuration_fails() {
  let env = TestEnv::sample();

  env
    .cmd()
    .env_remove("CASCADE_STORE")
    .env_remove("GOPATH")
    .args(["preview", "log"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("package store not configured"));
}

// =============================================================================
// init
// =============================================================================

#[test]
fn init_writes_state_and_prints_export() {
  let env = TestEnv::sample();

  env
    .cmd()
    .args(["init", "log"])
    .assert()
    .success()
    .stdout(format!("export CASCADE_STATE={}\n", env.state_path().display()));

  let state: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(env.state_path()).unwrap()).unwrap();
  assert_eq!(state["todo"].as_array().unwrap().len(), 4);
}

#[test]
fn init_refuses_to_overwrite() {
  let env = TestEnv::started();
  let before = std::fs::read_to_string(env.state_path()).unwrap();

  env
    .cmd()
    .args(["init", "core"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("already exists"));

  assert_eq!(std::fs::read_to_string(env.state_path()).unwrap(), before);
}

#[test]
fn init_honors_state_flag() {
  let env = TestEnv::sample();
  let path = env.temp.path().join("elsewhere.json");

  env
    .cmd()
    .arg("--state")
    .arg(&path)
    .args(["init", "log"])
    .assert()
    .success();

  assert!(path.exists());
  assert!(!env.state_path().exists());
}

// =============================================================================
// status
// =============================================================================

#[test]
fn status_of_fresh_rollout() {
  let env = TestEnv::started();
  let out = env.stdout(&["status"]);
  let lines: Vec<&str> = out.lines().collect();

  assert_eq!(lines.len(), 4);
  assert!(lines[0].ends_with("/QmLog/log = QmLog ready"), "{}", lines[0]);
  assert!(lines[1].ends_with("/QmCore/core = QmCore :: log"), "{}", lines[1]);
  assert!(lines[2].ends_with("/QmCmds/cmds = QmCmds :: core"), "{}", lines[2]);
  assert_eq!(lines[3], format!("{} :: cmds log", env.root_dir().display()));
}

#[test]
fn status_separates_levels_on_stderr() {
  let env = TestEnv::started();

  env
    .cmd()
    .arg("status")
    .assert()
    .success()
    .stderr("\n\n\n");
}

#[test]
fn status_without_rollout_fails() {
  let env = TestEnv::sample();

  env
    .cmd()
    .env_remove("CASCADE_STATE")
    .arg("status")
    .assert()
    .failure()
    .stderr(predicate::str::contains("no rollout in progress"));
}

// =============================================================================
// published
// =============================================================================

#[test]
fn published_marks_checkout_and_unblocks_dependents() {
  let env = TestEnv::started();
  let dir = env.checkout("log", &[], "1.0.1", "QmLog2");

  env
    .cmd_in(&dir)
    .arg("published")
    .assert()
    .success()
    .stdout(predicate::str::contains("log published as QmLog2 (1.0.1)"));

  assert_eq!(env.stdout(&["list", "-f", "$name $hash", "published"]), "log QmLog2\n");
  assert_eq!(env.stdout(&["list", "-f", "$name[ ($invalidated)]", "ready"]), "core (invalidated)\n");
}

#[test]
fn published_twice_requires_reset() {
  let env = TestEnv::started();
  env.publish("log", &[], "1.0.1", "QmLog2");
  let dir = env.checkout("log", &[], "1.0.2", "QmLog3");

  env
    .cmd_in(&dir)
    .arg("published")
    .assert()
    .failure()
    .stderr(predicate::str::contains("already published as QmLog2"));

  env.cmd_in(&dir).args(["published", "reset"]).assert().success();
  env.cmd_in(&dir).arg("published").assert().success();
  assert_eq!(env.stdout(&["list", "-f", "$hash", "published"]), "QmLog3\n");
}

#[test]
fn published_without_record_fails() {
  let env = TestEnv::started();

  env
    .cmd_in(&env.package_dir("QmLog", "log"))
    .arg("published")
    .assert()
    .failure()
    .stderr(predicate::str::contains("no publish record"));
}

#[test]
fn republished_prerequisite_makes_dependent_stale() {
  let env = TestEnv::started();
  env.publish("log", &[], "1.0.1", "QmLog2");
  env.publish("core", &[("log", "QmLog2"), ("util", "QmUtil")], "0.3.1", "QmCore2");
  assert_eq!(env.stdout(&["list", "-f", "$name", "stale"]), "");

  let log = env.checkout("log", &[], "1.0.2", "QmLog3");
  env.cmd_in(&log).args(["published", "reset"]).assert().success();
  env.cmd_in(&log).arg("published").assert().success();

  assert_eq!(env.stdout(&["list", "-f", "$name", "stale"]), "core\n");
}

#[test]
fn published_clean_keeps_published_entries() {
  let env = TestEnv::started();
  env.publish("log", &[], "1.0.1", "QmLog2");

  env.cmd().args(["published", "clean"]).assert().success();

  assert_eq!(env.stdout(&["list", "-f", "$name", "published"]), "log\n");
  assert_eq!(env.stdout(&["list", "-f", "$name", "ready"]), "core\n");
}

// =============================================================================
// to-pin
// =============================================================================

#[test]
fn to_pin_lists_unpublished_except_root() {
  let env = TestEnv::started();

  env
    .cmd()
    .arg("to-pin")
    .assert()
    .failure()
    .stdout("")
    .stderr(predicate::str::contains("unpublished dependencies: log core cmds"));
}

#[test]
fn to_pin_prints_published_pins() {
  let env = TestEnv::started();
  env.publish("log", &[], "1.0.1", "QmLog2");
  env.publish("core", &[("log", "QmLog2")], "0.3.1", "QmCore2");
  env.publish("cmds", &[("core", "QmCore2")], "2.0.0", "QmCmds2");

  let log = env.package_dir("QmLog", "log");
  env
    .cmd()
    .arg("to-pin")
    .assert()
    .success()
    .stdout(predicate::str::starts_with(format!("QmLog2 {} 1.0.1\n", log.display())));

  assert_eq!(
    env.stdout(&["to-pin", "-f", "$name@$version"]),
    "log@1.0.1\ncore@0.3.1\ncmds@2.0.0\n"
  );
}
