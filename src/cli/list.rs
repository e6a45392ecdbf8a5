//! List CLI subcommands.

use crate::tasks::ListId;
use clap::Subcommand;

/// List commands.
///
/// Categories: groceries, shopping, personal, general, ideas, project,
/// important, or uncategorized.
#[derive(Subcommand, Debug, Clone)]
pub enum ListCommand {
    /// Create an empty list under a group's date.
    Add {
        /// Group date (D/M/YYYY or "today"; default: today)
        date: Option<String>,
    },

    /// Set a list's category.
    Category {
        /// List ID
        list: ListId,

        /// Category name or label
        category: String,
    },

    /// Expand or collapse a list.
    Toggle {
        /// List ID
        list: ListId,
    },

    /// Show or hide a list's tasks.
    #[command(name = "toggle-tasks")]
    ToggleTasks {
        /// List ID
        list: ListId,
    },
}
