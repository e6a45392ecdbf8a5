//! State derived from the entity collections.
//!
//! Nothing here mutates a snapshot. Counts are recomputed from scratch
//! whenever tasks change, and the date grouping is rebuilt on every read.

use crate::tasks::dates;
use crate::tasks::expansion::is_expanded;
use crate::tasks::models::{Category, ListId, Task, TaskGroup};
use crate::tasks::snapshot::Snapshot;
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of unchecked tasks in every list that has a task array.
#[must_use]
pub fn incomplete_counts(tasks: &BTreeMap<ListId, Vec<Task>>) -> BTreeMap<ListId, u32> {
    tasks
        .iter()
        .map(|(list, tasks)| {
            let unchecked = tasks.iter().filter(|t| !t.checked).count();
            (*list, u32::try_from(unchecked).unwrap_or(u32::MAX))
        })
        .collect()
}

/// Group records sharing one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateBucket<'a> {
    /// The shared date.
    pub date: &'a str,
    /// The records, in sequence order.
    pub groups: Vec<&'a TaskGroup>,
}

/// Fold group records into date buckets.
///
/// Buckets are ordered by where their date first appears in `groups`; since
/// new groups are inserted at the front, that is newest first.
#[must_use]
pub fn group_by_date(groups: &[TaskGroup]) -> Vec<DateBucket<'_>> {
    let mut buckets: Vec<DateBucket<'_>> = Vec::new();
    for group in groups {
        match buckets.iter_mut().find(|b| b.date == group.date) {
            Some(bucket) => bucket.groups.push(group),
            None => buckets.push(DateBucket { date: &group.date, groups: vec![group] }),
        }
    }
    buckets
}

/// Status line shown above a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "count", rename_all = "snake_case")]
pub enum ListStatus {
    /// Some tasks are unchecked.
    Incomplete(u32),
    /// Every task is checked.
    AllComplete,
    /// The list has no tasks.
    Empty,
}

impl ListStatus {
    /// Status for a list with `incomplete` unchecked tasks out of `total`.
    #[must_use]
    pub const fn from_counts(incomplete: u32, total: usize) -> Self {
        if incomplete > 0 {
            Self::Incomplete(incomplete)
        } else if total > 0 {
            Self::AllComplete
        } else {
            Self::Empty
        }
    }

    /// Human-readable status message, if any.
    #[must_use]
    pub fn message(self) -> Option<String> {
        match self {
            Self::Incomplete(1) => Some("You have 1 incomplete task".to_string()),
            Self::Incomplete(n) => Some(format!("You have {n} incomplete tasks")),
            Self::AllComplete => Some("All tasks completed!".to_string()),
            Self::Empty => None,
        }
    }
}

/// A task as rendered under a date bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView<'a> {
    /// The task.
    pub task: &'a Task,
    /// Whether the task was last edited after the bucket's date.
    pub edited_after_group: bool,
}

/// A list as rendered under a date bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListView<'a> {
    /// The list id.
    pub id: ListId,
    /// Its category.
    pub category: Category,
    /// Unchecked task count.
    pub incomplete: u32,
    /// Status line.
    pub status: ListStatus,
    /// Whether the list is expanded.
    pub expanded: bool,
    /// Whether the list's task panel is expanded.
    pub tasks_expanded: bool,
    /// The tasks, in creation order.
    pub tasks: Vec<TaskView<'a>>,
}

/// A date bucket as rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketView<'a> {
    /// The bucket's date.
    pub date: &'a str,
    /// Whether the bucket is expanded.
    pub expanded: bool,
    /// Lists stored under the date, in creation order.
    pub lists: Vec<ListView<'a>>,
}

/// True iff the task was last edited on a day after `group_date`.
#[must_use]
pub fn edited_after_group(task: &Task, group_date: &str) -> bool {
    !task.last_edited_date.is_empty() && dates::is_after(&task.last_edited_date, group_date)
}

/// The full rendering projection: buckets newest first, with their lists
/// and tasks.
#[must_use]
pub fn board_view(snapshot: &Snapshot) -> Vec<BucketView<'_>> {
    group_by_date(&snapshot.groups)
        .into_iter()
        .map(|bucket| BucketView {
            date: bucket.date,
            expanded: is_expanded(&snapshot.group_expanded, bucket.date),
            lists: snapshot
                .lists
                .get(bucket.date)
                .map(|lists| lists.iter().map(|l| list_view(snapshot, l.id, bucket.date)).collect())
                .unwrap_or_default(),
        })
        .collect()
}

fn list_view<'a>(snapshot: &'a Snapshot, list: ListId, date: &str) -> ListView<'a> {
    let tasks: &[Task] = snapshot.tasks.get(&list).map(Vec::as_slice).unwrap_or_default();
    let incomplete = snapshot.incomplete_counts.get(&list).copied().unwrap_or(0);
    ListView {
        id: list,
        category: snapshot.categories.get(&list).copied().unwrap_or_default(),
        incomplete,
        status: ListStatus::from_counts(incomplete, tasks.len()),
        expanded: is_expanded(&snapshot.list_expanded, &list),
        tasks_expanded: is_expanded(&snapshot.tasks_expanded, &list),
        tasks: tasks
            .iter()
            .map(|task| TaskView { task, edited_after_group: edited_after_group(task, date) })
            .collect(),
    }
}
