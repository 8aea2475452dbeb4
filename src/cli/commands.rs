use clap::{Args, Parser, Subcommand};

use crate::model::Filter;

#[derive(Parser)]
#[command(name = "td", about = concat!("[ ] todo v", env!("CARGO_PKG_VERSION"), " - a to-do list for the terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'C', long = "dir", global = true)]
    pub dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tasks
    List(ListArgs),
    /// Add a task
    Add(AddArgs),
    /// Mark a task completed
    Done(IdArgs),
    /// Mark a task active again
    Undo(IdArgs),
    /// Change a task's name
    Rename(RenameArgs),
    /// Delete a task
    Rm(IdArgs),
    /// Delete all completed tasks
    Clear,
    /// View or manage the recovery log
    Recovery(RecoveryCmd),
}

// ---------------------------------------------------------------------------
// Task args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Which tasks to show: all, active, completed (default: all)
    #[arg(long, value_parser = parse_filter_arg)]
    pub filter: Option<Filter>,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task name
    pub name: String,
}

#[derive(Args)]
pub struct IdArgs {
    /// Task ID
    pub id: i64,
}

#[derive(Args)]
pub struct RenameArgs {
    /// Task ID
    pub id: i64,
    /// New name
    pub name: String,
}

fn parse_filter_arg(s: &str) -> Result<Filter, String> {
    Filter::parse_filter(s).ok_or_else(|| format!("unknown filter '{}' (all, active, completed)", s))
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RecoveryCmd {
    #[command(subcommand)]
    pub action: Option<RecoveryAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum RecoveryAction {
    /// Remove old entries
    Prune(RecoveryPruneArgs),
    /// Print the absolute path to the recovery log
    Path,
}

#[derive(Args)]
pub struct RecoveryPruneArgs {
    /// Remove entries older than this timestamp (default: 30 days ago)
    #[arg(long)]
    pub before: Option<String>,
    /// Remove all entries
    #[arg(long)]
    pub all: bool,
}
