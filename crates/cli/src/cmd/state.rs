use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

use super::state_file;

pub fn cmd_state(state: Option<&Path>) -> Result<()> {
  let file = state_file(state)?;
  let raw = file.read_raw()?;
  io::stdout()
    .write_all(raw.as_bytes())
    .context("failed to write to stdout")?;
  Ok(())
}
