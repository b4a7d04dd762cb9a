mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{DepSet, MetaAction, PublishedMode};
use output::print_error;

const STATUS_FORMAT: &str = "$path[ ($invalidated)][ = $hash][ $ready][ :: $unmet]";

/// cascade - republish a tree of content-addressed packages after a dependency changes
#[derive(Parser)]
#[command(name = "cascade")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Rollout state file (defaults to $CASCADE_STATE)
  #[arg(long, global = true, value_name = "PATH")]
  state: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show what a rollout would touch, without starting it
  Preview {
    /// Packages that changed; the first one drives the rollout
    #[arg(required = true)]
    targets: Vec<String>,

    /// Template for each entry
    #[arg(short, long)]
    format: Option<String>,

    /// One entry per line, without level grouping
    #[arg(long, conflicts_with = "json")]
    list: bool,

    /// Print the planned state as JSON
    #[arg(long)]
    json: bool,
  },

  /// Start a rollout in the current directory
  Init {
    /// Packages that changed; the first one drives the rollout
    #[arg(required = true)]
    targets: Vec<String>,
  },

  /// Show every entry with its progress, grouped by level
  Status,

  /// Print the raw state file
  State,

  /// List entries matching a condition
  List {
    /// Template for each entry
    #[arg(short, long, default_value = "$path")]
    format: String,

    /// Separate levels with a blank line on stderr
    #[arg(long)]
    by_level: bool,

    /// `[not] <condition>`: a status flag such as `ready` or a metadata key
    condition: Vec<String>,
  },

  /// List the dependencies of an entry that are part of the rollout
  Deps {
    /// Template for each dependency
    #[arg(short, long, default_value = "$path")]
    format: String,

    /// Entry to inspect (defaults to the package in the current directory)
    #[arg(short, long)]
    package: Option<String>,

    /// Which dependencies to include
    #[arg(value_enum)]
    sets: Vec<DepSet>,
  },

  /// Record the publish of the package in the current directory
  Published {
    #[arg(value_enum, default_value_t)]
    mode: PublishedMode,
  },

  /// Print the new pins of every published entry
  ToPin {
    /// Template for each published entry
    #[arg(short, long, default_value = "$hash $path $version")]
    format: String,
  },

  /// Read or change entry metadata
  Meta {
    /// Entry to operate on (defaults to the package in the current directory)
    #[arg(short, long, conflicts_with = "default")]
    package: Option<String>,

    /// Operate on the defaults shared by every entry
    #[arg(long)]
    default: bool,

    #[command(subcommand)]
    action: MetaAction,
  },
}

fn init_logging(verbose: bool) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn run(cli: Cli) -> Result<()> {
  let state = cli.state.as_deref();

  match cli.command {
    Commands::Preview {
      targets,
      format,
      list,
      json,
    } => cmd::cmd_preview(&targets, format.as_deref(), list, json),
    Commands::Init { targets } => cmd::cmd_init(state, &targets),
    Commands::Status => cmd::cmd_list(state, STATUS_FORMAT, true, &[]),
    Commands::State => cmd::cmd_state(state),
    Commands::List {
      format,
      by_level,
      condition,
    } => cmd::cmd_list(state, &format, by_level, &condition),
    Commands::Deps { format, package, sets } => cmd::cmd_deps(state, &format, package, &sets),
    Commands::Published { mode } => cmd::cmd_published(state, mode),
    Commands::ToPin { format } => cmd::cmd_to_pin(state, &format),
    Commands::Meta {
      package,
      default,
      action,
    } => cmd::cmd_meta(state, package, default, action),
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{e:#}"));
      ExitCode::FAILURE
    }
  }
}
