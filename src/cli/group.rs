//! Task group CLI subcommands.

use clap::Subcommand;

/// Task group commands.
///
/// A group is stamped with the day it was created and is addressed by that
/// date (`D/M/YYYY`, or `today`). Several groups created on the same day
/// show as one.
#[derive(Subcommand, Debug, Clone)]
pub enum GroupCommand {
    /// Create a task group for today.
    Add,

    /// Delete a date's groups together with all their lists and tasks.
    Delete {
        /// Group date (D/M/YYYY or "today")
        date: String,
    },

    /// Expand or collapse a group.
    Toggle {
        /// Group date (D/M/YYYY or "today")
        date: String,
    },

    /// Collapse every list in a group, or expand them all if any is
    /// collapsed.
    #[command(name = "toggle-lists")]
    ToggleLists {
        /// Group date (D/M/YYYY or "today")
        date: String,
    },
}
