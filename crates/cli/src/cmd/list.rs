//! Implementation of `cascade list` and `cascade status`.

use std::path::Path;

use anyhow::{Result, bail};

use cascade_lib::format::{Condition, EntryView};

use crate::output::print_error;

use super::{load, parse_template, render_each};

/// Print every entry matching `condition`, in processing order.
///
/// With `by_level`, a blank line goes to stderr between levels so piped
/// output stays one entry per line.
pub fn cmd_list(state: Option<&Path>, format: &str, by_level: bool, condition: &[String]) -> Result<()> {
  let condition = Condition::parse(condition)?;
  let template = parse_template(format)?;
  let (_, list) = load(state)?;

  let mut failures = 0;
  let mut selected = Vec::new();
  for todo in &list {
    match condition.matches(&EntryView::new(&list, todo)) {
      Ok(true) => selected.push(todo),
      Ok(false) => {}
      Err(e) => {
        print_error(&format!("{}: {e}", todo.name));
        failures += 1;
      }
    }
  }

  let mut level = None;
  failures += render_each(&list, selected, &template, |todo, line| {
    if by_level && level.is_some_and(|l| l != todo.level) {
      eprintln!();
    }
    level = Some(todo.level);
    println!("{line}");
  });

  if failures > 0 {
    bail!("some entries could not be displayed");
  }
  Ok(())
}
