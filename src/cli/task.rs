//! Task CLI subcommands.

use crate::tasks::{ListId, TaskId};
use clap::Subcommand;

/// Task commands.
///
/// New tasks start with placeholder text; use `edit` to write them.
#[derive(Subcommand, Debug, Clone)]
pub enum TaskCommand {
    /// Add a task to a list.
    Add {
        /// List ID
        list: ListId,
    },

    /// Replace a task's text. Blank text restores the placeholder.
    Edit {
        /// List ID
        list: ListId,

        /// Task ID
        task: TaskId,

        /// New text
        text: String,
    },

    /// Mark a task done.
    Check {
        /// List ID
        list: ListId,

        /// Task ID
        task: TaskId,
    },

    /// Mark a task not done.
    Uncheck {
        /// List ID
        list: ListId,

        /// Task ID
        task: TaskId,
    },

    /// Set a task's due date, or clear it when no date is given.
    Due {
        /// List ID
        list: ListId,

        /// Task ID
        task: TaskId,

        /// Due date (D/M/YYYY or YYYY-MM-DD)
        date: Option<String>,
    },

    /// Delete a task.
    Delete {
        /// List ID
        list: ListId,

        /// Task ID
        task: TaskId,
    },
}
