//! Template and condition language for reporting on rollout entries.
//!
//! # Template Syntax
//!
//! - `$name` - substitute a variable (see [`Var`])
//! - `$meta.key` - substitute an entry's metadata value, falling back to the
//!   shared defaults. An undefined key is absent inside a group and an error
//!   outside one.
//! - `[...]` - conditional group: rendered only if every variable directly
//!   inside it is non-empty, otherwise dropped along with its literal text
//! - `$$`, `$[`, `$]` - literal `$`, `[`, `]`
//!
//! Groups nest; an elided inner group does not elide the group around it.
//!
//! # Example
//!
//! ```
//! use cascade_lib::format::{Lookup, Template, Var, FormatError};
//!
//! struct Fixed;
//!
//! impl Lookup for Fixed {
//!   fn entry(&self) -> &str {
//!     "go-log"
//!   }
//!
//!   fn var(&self, var: Var) -> Result<String, FormatError> {
//!     Ok(match var {
//!       Var::Path => "go-log".to_string(),
//!       _ => String::new(),
//!     })
//!   }
//! }
//!
//! let template = Template::parse("$path[ ($invalidated)]").unwrap();
//! assert_eq!(template.render(&Fixed).unwrap(), "go-log");
//! ```

mod entry;

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

pub use entry::EntryView;

/// Variables a template can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Var {
  Path,
  Name,
  Level,
  /// New hash once published, original hash before.
  Hash,
  OrigHash,
  NewHash,
  Version,
  Deps,
  Also,
  Indirect,
  Ready,
  Published,
  Invalidated,
  Stale,
  Unmet,
}

impl Var {
  pub const ALL: [Var; 15] = [
    Var::Path,
    Var::Name,
    Var::Level,
    Var::Hash,
    Var::OrigHash,
    Var::NewHash,
    Var::Version,
    Var::Deps,
    Var::Also,
    Var::Indirect,
    Var::Ready,
    Var::Published,
    Var::Invalidated,
    Var::Stale,
    Var::Unmet,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Var::Path => "path",
      Var::Name => "name",
      Var::Level => "level",
      Var::Hash => "hash",
      Var::OrigHash => "orighash",
      Var::NewHash => "newhash",
      Var::Version => "version",
      Var::Deps => "deps",
      Var::Also => "also",
      Var::Indirect => "indirect",
      Var::Ready => "ready",
      Var::Published => "published",
      Var::Invalidated => "invalidated",
      Var::Stale => "stale",
      Var::Unmet => "unmet",
    }
  }

  pub fn from_name(name: &str) -> Option<Var> {
    Var::ALL.into_iter().find(|v| v.name() == name)
  }
}

impl fmt::Display for Var {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
  /// The template itself is malformed. Fatal for a whole batch.
  #[error("bad format string '{template}': {reason}")]
  BadFormatStr { template: String, reason: String },

  /// A variable could not be resolved for one entry.
  #[error("cannot resolve ${var} for {entry}: {reason}")]
  Undefined { var: String, entry: String, reason: String },

  #[error("bad condition: {0}")]
  BadCondition(String),
}

impl FormatError {
  /// Whether this error is about the template rather than about one entry.
  pub fn is_bad_format(&self) -> bool {
    matches!(self, FormatError::BadFormatStr { .. } | FormatError::BadCondition(_))
  }
}

/// Resolves template variables and metadata for one entry.
pub trait Lookup {
  /// Name of the entry, for error messages.
  fn entry(&self) -> &str;

  /// Value of a built-in variable. An empty string means "absent".
  fn var(&self, var: Var) -> Result<String, FormatError>;

  /// Value of a user metadata key, if defined.
  fn meta(&self, _key: &str) -> Option<String> {
    None
  }
}

/// A parsed template node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
  Literal(String),
  Var(Var),
  /// A `$meta.key` reference.
  Meta(String),
  Group(Vec<Node>),
}

/// A parsed template, reusable across entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
  nodes: Vec<Node>,
}

impl Template {
  /// Parse a template string.
  ///
  /// # Errors
  ///
  /// Returns [`FormatError::BadFormatStr`] for unmatched brackets, a dangling
  /// `$`, or an unknown variable name.
  pub fn parse(input: &str) -> Result<Self, FormatError> {
    let mut parser = Parser {
      input,
      chars: input.char_indices().peekable(),
    };
    let nodes = parser.sequence(None)?;
    Ok(Self { nodes })
  }

  pub fn nodes(&self) -> &[Node] {
    &self.nodes
  }

  /// Render the template for the entry behind `lookup`.
  pub fn render(&self, lookup: &impl Lookup) -> Result<String, FormatError> {
    let mut out = String::new();
    render_nodes(&self.nodes, lookup, false, &mut out)?;
    Ok(out)
  }
}

const META_PREFIX: &str = "meta";

struct Parser<'a> {
  input: &'a str,
  chars: Peekable<CharIndices<'a>>,
}

impl Parser<'_> {
  fn bad(&self, reason: String) -> FormatError {
    FormatError::BadFormatStr {
      template: self.input.to_string(),
      reason,
    }
  }

  /// Parse nodes until end of input, or until the `]` closing the group opened at `open`.
  fn sequence(&mut self, open: Option<usize>) -> Result<Vec<Node>, FormatError> {
    let mut nodes = Vec::new();
    let mut literal = String::new();

    while let Some((pos, ch)) = self.chars.next() {
      match ch {
        '$' => match self.chars.peek() {
          Some(&(_, escaped @ ('$' | '[' | ']'))) => {
            literal.push(escaped);
            self.chars.next();
          }
          Some(&(_, c)) if c.is_ascii_alphabetic() || c == '_' => {
            if !literal.is_empty() {
              nodes.push(Node::Literal(std::mem::take(&mut literal)));
            }
            let name = self.identifier();
            if name == META_PREFIX && self.chars.peek().is_some_and(|&(_, c)| c == '.') {
              self.chars.next();
              let key = self.identifier();
              if key.is_empty() {
                return Err(self.bad(format!("missing metadata key after ${META_PREFIX}. at position {pos}")));
              }
              nodes.push(Node::Meta(key));
              continue;
            }
            let var = Var::from_name(&name).ok_or_else(|| self.bad(format!("unknown variable ${name}")))?;
            nodes.push(Node::Var(var));
          }
          _ => return Err(self.bad(format!("dangling '$' at position {pos}"))),
        },
        '[' => {
          if !literal.is_empty() {
            nodes.push(Node::Literal(std::mem::take(&mut literal)));
          }
          let group = self.sequence(Some(pos))?;
          nodes.push(Node::Group(group));
        }
        ']' => {
          if open.is_none() {
            return Err(self.bad(format!("unmatched ']' at position {pos}")));
          }
          if !literal.is_empty() {
            nodes.push(Node::Literal(literal));
          }
          return Ok(nodes);
        }
        _ => literal.push(ch),
      }
    }

    if let Some(pos) = open {
      return Err(self.bad(format!("unclosed '[' at position {pos}")));
    }
    if !literal.is_empty() {
      nodes.push(Node::Literal(literal));
    }
    Ok(nodes)
  }

  fn identifier(&mut self) -> String {
    let mut name = String::new();
    while let Some(&(_, c)) = self.chars.peek() {
      if !(c.is_ascii_alphanumeric() || c == '_') {
        break;
      }
      name.push(c);
      self.chars.next();
    }
    name
  }
}

/// Render `nodes` into `out`. Returns false if any variable rendered empty.
fn render_nodes(nodes: &[Node], lookup: &impl Lookup, in_group: bool, out: &mut String) -> Result<bool, FormatError> {
  let mut complete = true;

  for node in nodes {
    match node {
      Node::Literal(s) => out.push_str(s),
      Node::Var(var) => {
        let value = lookup.var(*var)?;
        complete &= !value.is_empty();
        out.push_str(&value);
      }
      Node::Meta(key) => match lookup.meta(key) {
        Some(value) => {
          complete &= !value.is_empty();
          out.push_str(&value);
        }
        None if in_group => complete = false,
        None => {
          return Err(FormatError::Undefined {
            var: format!("{META_PREFIX}.{key}"),
            entry: lookup.entry().to_string(),
            reason: "not defined".to_string(),
          });
        }
      },
      Node::Group(children) => {
        let mut group = String::new();
        if render_nodes(children, lookup, true, &mut group)? {
          out.push_str(&group);
        }
      }
    }
  }

  Ok(complete)
}

/// Parse and render `template` in one step.
pub fn format(lookup: &impl Lookup, template: &str) -> Result<String, FormatError> {
  Template::parse(template)?.render(lookup)
}

/// Whether `condition` holds for the entry behind `lookup`.
///
/// A built-in variable holds when it renders non-empty. Any other name is a
/// metadata key and holds when defined and not empty, `false` or `0`.
pub fn evaluate(lookup: &impl Lookup, condition: &str) -> Result<bool, FormatError> {
  if let Some(var) = Var::from_name(condition) {
    return Ok(!lookup.var(var)?.is_empty());
  }
  Ok(
    lookup
      .meta(condition)
      .is_some_and(|v| !v.is_empty() && v != "false" && v != "0"),
  )
}

/// A named condition, optionally inverted with a leading `not`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Condition {
  pub name: Option<String>,
  pub invert: bool,
}

impl Condition {
  /// Parse `[]`, `[cond]` or `["not", cond]`.
  pub fn parse<S: AsRef<str>>(words: &[S]) -> Result<Self, FormatError> {
    let words: Vec<&str> = words.iter().map(AsRef::as_ref).collect();
    match words.as_slice() {
      [] => Ok(Self::default()),
      ["not"] => Err(FormatError::BadCondition("'not' needs a condition".to_string())),
      ["not", name] => Ok(Self {
        name: Some(name.to_string()),
        invert: true,
      }),
      [name] => Ok(Self {
        name: Some(name.to_string()),
        invert: false,
      }),
      _ => Err(FormatError::BadCondition(format!("expected '[not] <cond>', got '{}'", words.join(" ")))),
    }
  }

  /// An empty condition matches everything.
  pub fn matches(&self, lookup: &impl Lookup) -> Result<bool, FormatError> {
    let holds = match &self.name {
      Some(name) => evaluate(lookup, name)?,
      None => true,
    };
    Ok(holds != self.invert)
  }
}
