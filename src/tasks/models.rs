//! Entity types for the board: task groups, lists, tasks and categories.
//!
//! Field names on the wire follow the persisted slot format (`dueDate`,
//! `createdDate`, ...), so snapshots written by older versions still load.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text shown for a task whose content has not been written yet.
pub const PLACEHOLDER_CONTENT: &str = "Add task...";

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

entity_id!(
    /// Identifier of a task group record.
    GroupId
);
entity_id!(
    /// Identifier of a list, unique across the whole board.
    ListId
);
entity_id!(
    /// Identifier of a task.
    TaskId
);

/// A task group record: "a group was created on this day".
///
/// Several records may share a date; they render as one date bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskGroup {
    /// Creation-time identifier.
    pub id: GroupId,
    /// Calendar day in `D/M/YYYY` form; the key of the group's lists.
    pub date: String,
}

/// A reference to a list stored under a date bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRef {
    /// The list's identifier.
    pub id: ListId,
}

/// A single task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identifier, unique within the owning list.
    pub id: TaskId,
    /// Clock time of creation, display only (`hh:mm AM`).
    #[serde(default)]
    pub time: String,
    /// Task text, or [`PLACEHOLDER_CONTENT`].
    #[serde(default = "placeholder_content")]
    pub content: String,
    /// Whether the task is done.
    #[serde(default)]
    pub checked: bool,
    /// Due day in `D/M/YYYY` form, or empty for none.
    #[serde(default)]
    pub due_date: String,
    /// Day the task was created.
    #[serde(default)]
    pub created_date: String,
    /// Day the task was last edited.
    #[serde(default)]
    pub last_edited_date: String,
}

fn placeholder_content() -> String {
    PLACEHOLDER_CONTENT.to_string()
}

impl Task {
    /// Whether the content is still the placeholder text.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.content == PLACEHOLDER_CONTENT
    }

    /// Whether a due date is set.
    #[must_use]
    pub fn has_due_date(&self) -> bool {
        !self.due_date.is_empty()
    }
}

/// List category.
///
/// Persisted as its display label. Any label that is not recognised loads as
/// [`Category::Uncategorized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// 🍉 Groceries
    Groceries,
    /// 🛒 Shopping
    Shopping,
    /// ✨ Personal
    Personal,
    /// 📝 General
    General,
    /// 💡 Ideas
    Ideas,
    /// 📁 Project
    Project,
    /// ‼️ Important
    Important,
    /// No category picked yet.
    #[default]
    Uncategorized,
}

impl Category {
    /// The seven pickable categories, in menu order.
    pub const PICKABLE: [Self; 7] = [
        Self::Groceries,
        Self::Shopping,
        Self::Personal,
        Self::General,
        Self::Ideas,
        Self::Project,
        Self::Important,
    ];

    /// The persisted and displayed label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Groceries => "🍉 Groceries",
            Self::Shopping => "🛒 Shopping",
            Self::Personal => "✨ Personal",
            Self::General => "📝 General",
            Self::Ideas => "💡 Ideas",
            Self::Project => "📁 Project",
            Self::Important => "‼️ Important",
            Self::Uncategorized => "categories",
        }
    }

    /// Short lowercase name, as accepted on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Groceries => "groceries",
            Self::Shopping => "shopping",
            Self::Personal => "personal",
            Self::General => "general",
            Self::Ideas => "ideas",
            Self::Project => "project",
            Self::Important => "important",
            Self::Uncategorized => "uncategorized",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        Self::PICKABLE
            .into_iter()
            .chain(std::iter::once(Self::Uncategorized))
            .find(|c| c.label() == label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        Self::from_label(&label).unwrap_or_default()
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.label().to_string()
    }
}

impl FromStr for Category {
    type Err = Error;

    /// Parse a label or a case-insensitive name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(category) = Self::from_label(trimmed) {
            return Ok(category);
        }
        let lower = trimmed.to_lowercase();
        Self::PICKABLE
            .into_iter()
            .chain(std::iter::once(Self::Uncategorized))
            .find(|c| c.name() == lower)
            .ok_or_else(|| Error::InvalidCategory(s.to_string()))
    }
}
