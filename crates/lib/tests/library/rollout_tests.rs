//! A full rollout driven through the public API: plan from disk, persist,
//! publish bottom-up, and render the result.

use std::fs;
use std::path::{Path, PathBuf};

use cascade_lib::format::{Condition, EntryView, format};
use cascade_lib::package::{PackageStore, PkgHash};
use cascade_lib::plan::plan_rollout;
use cascade_lib::state::StateFile;
use cascade_lib::todo::TodoList;
use tempfile::TempDir;

struct Tree {
  temp: TempDir,
}

impl Tree {
  /// `app -> {cmds -> core -> log, log}`
  fn new() -> Self {
    let tree = Self {
      temp: TempDir::new().unwrap(),
    };
    tree.manifest(&tree.root(), "app", &[("cmds", "QmCmds"), ("log", "QmLog")]);
    tree.manifest(&tree.store().join("QmCmds/cmds"), "cmds", &[("core", "QmCore")]);
    tree.manifest(&tree.store().join("QmCore/core"), "core", &[("log", "QmLog")]);
    tree.manifest(&tree.store().join("QmLog/log"), "log", &[]);
    tree
  }

  fn store(&self) -> PathBuf {
    self.temp.path().join("store")
  }

  fn root(&self) -> PathBuf {
    self.temp.path().join("app")
  }

  fn manifest(&self, dir: &Path, name: &str, deps: &[(&str, &str)]) {
    let deps: Vec<String> = deps
      .iter()
      .map(|(n, h)| format!(r#"{{ "name": "{n}", "hash": "{h}" }}"#))
      .collect();
    fs::create_dir_all(dir).unwrap();
    fs::write(
      dir.join("package.json"),
      format!(r#"{{ "name": "{name}", "gxDependencies": [{}] }}"#, deps.join(", ")),
    )
    .unwrap();
  }

  /// A checkout of `name` that was just published.
  fn checkout(&self, name: &str, deps: &[(&str, &str)], record: &str) -> PathBuf {
    let dir = self.temp.path().join("checkouts").join(name);
    self.manifest(&dir, name, deps);
    fs::create_dir_all(dir.join(".gx")).unwrap();
    fs::write(dir.join(".gx/lastpubver"), record).unwrap();
    dir
  }
}

fn names_where(list: &TodoList, cond: &str) -> Vec<String> {
  let cond = Condition::parse(&[cond]).unwrap();
  list
    .iter()
    .filter(|t| cond.matches(&EntryView::new(list, t)).unwrap())
    .map(|t| t.name.clone())
    .collect()
}

#[test]
fn bottom_up_rollout() {
  let tree = Tree::new();
  let store = PackageStore::new(tree.store());
  let state = StateFile::new(tree.root().join(".cascade-state.json"));

  let rollout = plan_rollout(&store, &tree.root(), &["log".to_string()]).unwrap();
  state.create_new(&rollout.todo).unwrap();

  let steps = [
    ("log", vec![], "1.0.1: QmLog2"),
    ("core", vec![("log", "QmLog2")], "0.2.0: QmCore2"),
    ("cmds", vec![("core", "QmCore2")], "3.1.0: QmCmds2"),
  ];

  for (name, deps, record) in steps {
    let mut list = state.load().unwrap();
    assert_eq!(names_where(&list, "ready"), vec![name.to_string()]);

    let dir = tree.checkout(name, &deps, record);
    assert_eq!(list.mark_published_at(&store, &dir).unwrap(), name);
    state.save(&list).unwrap();
  }

  let list = state.load().unwrap();
  assert_eq!(names_where(&list, "ready"), vec!["app".to_string()]);
  assert!(names_where(&list, "stale").is_empty());

  let app = list.get("app").unwrap();
  assert_eq!(app.new_deps["cmds"], PkgHash::new("QmCmds2"));
  assert_eq!(app.new_deps["log"], PkgHash::new("QmLog2"));

  let pins: Vec<String> = list
    .iter()
    .filter(|t| t.is_published())
    .map(|t| format(&EntryView::new(&list, t), "$name $hash $version").unwrap())
    .collect();
  assert_eq!(pins, vec!["log QmLog2 1.0.1", "core QmCore2 0.2.0", "cmds QmCmds2 3.1.0"]);
}

#[test]
fn planning_reads_each_store_package_once() {
  let tree = Tree::new();
  let store = PackageStore::new(tree.store());

  let rollout = plan_rollout(&store, &tree.root(), &["log".to_string()]).unwrap();

  assert_eq!(rollout.packages.len(), 4);
  assert_eq!(rollout.packages[&PkgHash::root()].path, tree.root());
  assert_eq!(
    rollout.packages[&PkgHash::new("QmLog")].path,
    tree.store().join("QmLog").join("log")
  );
}
