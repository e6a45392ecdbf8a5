//! Command-line interface for daybook.
//!
//! Two-level commands address the three levels of the board: task groups by
//! date, lists by id, and tasks by list and task id.

mod group;
mod list;
mod run;
mod task;


pub use group::GroupCommand;
pub use list::ListCommand;
pub use run::{execute, run, CliOutput};
pub use task::TaskCommand;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Daybook - dated task groups of categorized task lists.
///
/// Start a group for today, add lists to it, and fill the lists with tasks:
///
///   daybook group add
///   daybook list add
///   daybook task add <list-id>
///   daybook show
#[derive(Parser, Debug)]
#[command(name = "daybook")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the board database and config (default: ~/.daybook)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Task group management - one group per day.
    #[command(subcommand)]
    Group(GroupCommand),

    /// List management - categorized lists under a group's date.
    #[command(subcommand)]
    List(ListCommand),

    /// Task management - the items inside a list.
    #[command(subcommand)]
    Task(TaskCommand),

    /// Show the board, newest group first.
    Show,

    /// Delete every group, list and task.
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Show version information.
    Version,
}
