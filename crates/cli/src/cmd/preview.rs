use anyhow::{Result, bail};

use cascade_lib::plan::plan_rollout;

use crate::output::print_json;

use super::{current_dir, package_store, parse_template, render_each};

const GROUPED_FORMAT: &str = "$path[ :: $deps]";
const LIST_FORMAT: &str = "$path";

/// Plan a rollout without writing any state.
pub fn cmd_preview(targets: &[String], format: Option<&str>, list: bool, json: bool) -> Result<()> {
  let store = package_store()?;
  let rollout = plan_rollout(&store, &current_dir()?, targets)?;

  if json {
    return print_json(&rollout.todo);
  }

  let default_format = if list { LIST_FORMAT } else { GROUPED_FORMAT };
  let template = parse_template(format.unwrap_or(default_format))?;

  let mut level = None;
  let failures = render_each(&rollout.todo, &rollout.todo, &template, |todo, line| {
    if !list && level.is_some_and(|l| l != todo.level) {
      println!();
    }
    level = Some(todo.level);
    println!("{line}");
  });

  if failures > 0 {
    bail!("{failures} entries could not be displayed");
  }
  Ok(())
}
