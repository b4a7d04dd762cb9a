use std::path::Path;

use anyhow::{Result, bail};

use super::{load, parse_template, render_each};

/// Render every published entry, then fail if anything but the final entry
/// is still unpublished.
///
/// The final entry is the root of the rollout, which is pinned by hand rather
/// than published.
pub fn cmd_to_pin(state: Option<&Path>, format: &str) -> Result<()> {
  let template = parse_template(format)?;
  let (_, list) = load(state)?;

  let published = list.iter().filter(|t| t.is_published());
  let failures = render_each(&list, published, &template, |_, line| println!("{line}"));

  let unpublished: Vec<&str> = list
    .iter()
    .take(list.len().saturating_sub(1))
    .filter(|t| !t.is_published())
    .map(|t| t.name.as_str())
    .collect();

  if !unpublished.is_empty() {
    bail!("unpublished dependencies: {}", unpublished.join(" "));
  }
  if failures > 0 {
    bail!("some entries could not be displayed");
  }
  Ok(())
}
