use crate::todo::{Todo, TodoList};

use super::{FormatError, Lookup, Var};

/// One entry of a rollout, seen through the list it belongs to.
///
/// Derived flags such as `invalidated` and `stale` depend on other entries,
/// so the view carries the whole list.
#[derive(Debug, Clone, Copy)]
pub struct EntryView<'a> {
  pub list: &'a TodoList,
  pub todo: &'a Todo,
}

impl<'a> EntryView<'a> {
  pub fn new(list: &'a TodoList, todo: &'a Todo) -> Self {
    Self { list, todo }
  }
}

fn flag(var: Var, set: bool) -> String {
  if set { var.name().to_string() } else { String::new() }
}

impl Lookup for EntryView<'_> {
  fn entry(&self) -> &str {
    &self.todo.name
  }

  fn var(&self, var: Var) -> Result<String, FormatError> {
    let todo = self.todo;
    let value = match var {
      Var::Path => todo.path.display().to_string(),
      Var::Name => todo.name.clone(),
      Var::Level => todo.level.to_string(),
      Var::Hash => todo.current_hash().to_string(),
      Var::OrigHash => todo.orig_hash.to_string(),
      Var::NewHash => todo.new_hash.to_string(),
      Var::Version => todo.new_version.clone(),
      Var::Deps => todo.deps.join(" "),
      Var::Also => todo.also_update.join(" "),
      Var::Indirect => todo.indirect.join(" "),
      Var::Ready => flag(var, todo.is_ready()),
      Var::Published => flag(var, todo.is_published()),
      Var::Invalidated => flag(var, self.list.is_invalidated(todo)),
      Var::Stale => flag(var, self.list.is_stale(todo)),
      Var::Unmet => todo.unmet().join(" "),
    };
    Ok(value)
  }

  fn meta(&self, key: &str) -> Option<String> {
    self
      .todo
      .meta
      .get(key)
      .or_else(|| self.list.defaults.get(key))
      .cloned()
  }
}
