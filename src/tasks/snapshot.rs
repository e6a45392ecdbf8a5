//! The complete logical state of a board.
//!
//! A [`Snapshot`] is exactly what gets persisted: one field per storage slot.
//! Several of its maps are keyed by list id and must stay in step with the
//! list references stored under each date; [`Snapshot::check_consistency`]
//! reports where they do not, and [`Snapshot::reconcile`] repairs a loaded
//! snapshot so the engine never starts from a broken one.

use crate::tasks::models::{Category, GroupId, ListId, ListRef, Task, TaskGroup, TaskId};
use crate::tasks::{dates, expansion, projections};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// All persisted board state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Task group records, newest first.
    pub groups: Vec<TaskGroup>,
    /// Lists stored under each date, in creation order.
    pub lists: BTreeMap<String, Vec<ListRef>>,
    /// Tasks of each list, in creation order.
    pub tasks: BTreeMap<ListId, Vec<Task>>,
    /// Category of each list.
    pub categories: BTreeMap<ListId, Category>,
    /// Number of unchecked tasks in each list.
    pub incomplete_counts: BTreeMap<ListId, u32>,
    /// Whether each list is expanded.
    pub list_expanded: BTreeMap<ListId, bool>,
    /// Whether each date bucket is expanded.
    pub group_expanded: BTreeMap<String, bool>,
    /// Whether each list's task panel is expanded.
    pub tasks_expanded: BTreeMap<ListId, bool>,
}

/// A per-list collection of the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// `tasks`
    Tasks,
    /// `categories`
    Categories,
    /// `incomplete_counts`
    Counts,
    /// `list_expanded`
    ListExpanded,
    /// `tasks_expanded`
    TasksExpanded,
}

impl Collection {
    /// Every per-list collection.
    pub const ALL: [Self; 5] =
        [Self::Tasks, Self::Categories, Self::Counts, Self::ListExpanded, Self::TasksExpanded];

    /// Short name for messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Categories => "categories",
            Self::Counts => "incomplete counts",
            Self::ListExpanded => "list expansion",
            Self::TasksExpanded => "task panel expansion",
        }
    }
}

/// One violated consistency rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    /// A per-list entry exists for a list no date holds.
    Orphan {
        /// Where the entry lives.
        collection: Collection,
        /// The unknown list.
        list: ListId,
    },
    /// A list held by a date has no entry in a per-list collection.
    Missing {
        /// Where the entry should be.
        collection: Collection,
        /// The list lacking it.
        list: ListId,
    },
    /// The same list is referenced more than once.
    DuplicateList(ListId),
    /// A list holds two tasks with the same id.
    DuplicateTask {
        /// The list.
        list: ListId,
        /// The repeated task id.
        task: TaskId,
    },
    /// Lists are stored under a date with no task group record.
    UngroupedDate(String),
    /// A date bucket expansion flag exists for a date with no group.
    OrphanGroupFlag(String),
    /// A grouped date has no expansion flag.
    MissingGroupFlag(String),
    /// A stored incomplete count disagrees with the tasks.
    CountMismatch {
        /// The list.
        list: ListId,
        /// What the count map says.
        stored: u32,
        /// What the tasks say.
        actual: u32,
    },
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Orphan { collection, list } => {
                write!(f, "{} entry for unknown list {list}", collection.name())
            }
            Self::Missing { collection, list } => {
                write!(f, "list {list} has no {} entry", collection.name())
            }
            Self::DuplicateList(list) => write!(f, "list {list} is referenced more than once"),
            Self::DuplicateTask { list, task } => {
                write!(f, "list {list} holds task {task} more than once")
            }
            Self::UngroupedDate(date) => write!(f, "lists stored under {date} have no group"),
            Self::OrphanGroupFlag(date) => write!(f, "expansion flag for unknown group {date}"),
            Self::MissingGroupFlag(date) => write!(f, "group {date} has no expansion flag"),
            Self::CountMismatch { list, stored, actual } => {
                write!(f, "list {list} count is {stored} but {actual} tasks are unchecked")
            }
        }
    }
}

impl Snapshot {
    /// Every list id held by some date, in date-key then creation order.
    pub fn list_ids(&self) -> impl Iterator<Item = ListId> + '_ {
        self.lists.values().flatten().map(|list| list.id)
    }

    /// Lists stored under a date.
    #[must_use]
    pub fn lists_on(&self, date: &str) -> Vec<ListId> {
        self.lists.get(date).map(|lists| lists.iter().map(|l| l.id).collect()).unwrap_or_default()
    }

    /// The date a list is stored under.
    #[must_use]
    pub fn date_of_list(&self, list: ListId) -> Option<&str> {
        self.lists
            .iter()
            .find(|(_, lists)| lists.iter().any(|l| l.id == list))
            .map(|(date, _)| date.as_str())
    }

    /// Whether any group record carries this date.
    #[must_use]
    pub fn has_group(&self, date: &str) -> bool {
        self.groups.iter().any(|g| g.date == date)
    }

    /// Look up a task.
    #[must_use]
    pub fn task(&self, list: ListId, task: TaskId) -> Option<&Task> {
        self.tasks.get(&list)?.iter().find(|t| t.id == task)
    }

    /// Largest identifier of any group, list or task.
    #[must_use]
    pub fn max_id(&self) -> u64 {
        let groups = self.groups.iter().map(|g| g.id.0);
        let lists = self.list_ids().map(|l| l.0);
        let tasks = self.tasks.values().flatten().map(|t| t.id.0);
        groups.chain(lists).chain(tasks).max().unwrap_or(0)
    }

    fn collection_keys(&self, collection: Collection) -> BTreeSet<ListId> {
        match collection {
            Collection::Tasks => self.tasks.keys().copied().collect(),
            Collection::Categories => self.categories.keys().copied().collect(),
            Collection::Counts => self.incomplete_counts.keys().copied().collect(),
            Collection::ListExpanded => self.list_expanded.keys().copied().collect(),
            Collection::TasksExpanded => self.tasks_expanded.keys().copied().collect(),
        }
    }

    /// Report every violated consistency rule. Empty means consistent.
    #[must_use]
    pub fn check_consistency(&self) -> Vec<Inconsistency> {
        let mut problems = Vec::new();

        let mut known = BTreeSet::new();
        for list in self.list_ids() {
            if !known.insert(list) {
                problems.push(Inconsistency::DuplicateList(list));
            }
        }

        for (list, tasks) in &self.tasks {
            let mut seen = BTreeSet::new();
            for task in tasks {
                if !seen.insert(task.id) {
                    problems.push(Inconsistency::DuplicateTask { list: *list, task: task.id });
                }
            }
        }

        for (date, lists) in &self.lists {
            if !lists.is_empty() && !self.has_group(date) {
                problems.push(Inconsistency::UngroupedDate(date.clone()));
            }
        }

        for collection in Collection::ALL {
            let keys = self.collection_keys(collection);
            for list in keys.difference(&known) {
                problems.push(Inconsistency::Orphan { collection, list: *list });
            }
            for list in known.difference(&keys) {
                problems.push(Inconsistency::Missing { collection, list: *list });
            }
        }

        let dates: BTreeSet<&str> = self.groups.iter().map(|g| g.date.as_str()).collect();
        for date in self.group_expanded.keys() {
            if !dates.contains(date.as_str()) {
                problems.push(Inconsistency::OrphanGroupFlag(date.clone()));
            }
        }
        for date in &dates {
            if !self.group_expanded.contains_key(*date) {
                problems.push(Inconsistency::MissingGroupFlag((*date).to_string()));
            }
        }

        let recomputed = projections::incomplete_counts(&self.tasks);
        for (list, stored) in &self.incomplete_counts {
            if let Some(&actual) = recomputed.get(list) {
                if actual != *stored {
                    problems.push(Inconsistency::CountMismatch { list: *list, stored: *stored, actual });
                }
            }
        }

        problems
    }

    /// Repair the snapshot in place and return how many fixes were made.
    ///
    /// Duplicate list references and task ids keep their first occurrence.
    /// A list that still has tasks but no date reference is filed again under
    /// the earliest creation day of its tasks. Dates holding lists but lacking
    /// a group get an (oldest) group record, remaining entries for unknown
    /// lists or dates are dropped, missing per-list entries get their creation
    /// defaults, and counts are recomputed from the tasks.
    pub fn reconcile(&mut self) -> usize {
        let mut repairs = 0;

        let mut known = BTreeSet::new();
        for lists in self.lists.values_mut() {
            let before = lists.len();
            lists.retain(|list| known.insert(list.id));
            repairs += before - lists.len();
        }

        let stray: Vec<ListId> = self
            .tasks
            .iter()
            .filter(|(list, tasks)| !tasks.is_empty() && !known.contains(*list))
            .map(|(list, _)| *list)
            .collect();
        for list in stray {
            let date = self.home_date(list);
            tracing::warn!(target: "daybook", %list, %date, "refiling list without a date");
            self.lists.entry(date).or_default().push(ListRef { id: list });
            known.insert(list);
            repairs += 1;
        }

        let ungrouped: Vec<String> = self
            .lists
            .iter()
            .filter(|(date, lists)| !lists.is_empty() && !self.has_group(date))
            .map(|(date, _)| date.clone())
            .collect();
        for date in ungrouped {
            let id = GroupId(self.max_id() + 1);
            self.groups.push(TaskGroup { id, date });
            repairs += 1;
        }

        repairs += retain_known(&mut self.tasks, &known);
        repairs += retain_known(&mut self.categories, &known);
        repairs += retain_known(&mut self.list_expanded, &known);
        repairs += retain_known(&mut self.tasks_expanded, &known);

        let dates: BTreeSet<String> = self.groups.iter().map(|g| g.date.clone()).collect();
        let before = self.group_expanded.len();
        self.group_expanded.retain(|date, _| dates.contains(date));
        repairs += before - self.group_expanded.len();

        for list in &known {
            repairs += fill(&mut self.tasks, *list, Vec::new);
            repairs += fill(&mut self.categories, *list, Category::default);
            repairs += fill(&mut self.list_expanded, *list, || expansion::DEFAULT_EXPANDED);
            repairs += fill(&mut self.tasks_expanded, *list, || expansion::DEFAULT_EXPANDED);
        }
        for date in dates {
            repairs += fill(&mut self.group_expanded, date, || expansion::DEFAULT_EXPANDED);
        }

        for tasks in self.tasks.values_mut() {
            let mut seen = BTreeSet::new();
            let before = tasks.len();
            tasks.retain(|task| seen.insert(task.id));
            repairs += before - tasks.len();
        }

        let counts = projections::incomplete_counts(&self.tasks);
        if counts != self.incomplete_counts {
            repairs += 1;
            self.incomplete_counts = counts;
        }

        repairs
    }

    /// Where to file a list whose date reference was lost: the earliest
    /// creation day among its tasks, else the newest group's date, else the
    /// Unix epoch day.
    fn home_date(&self, list: ListId) -> String {
        self.tasks
            .get(&list)
            .into_iter()
            .flatten()
            .filter_map(|task| dates::parse_date(&task.created_date).ok())
            .min()
            .map(dates::format_date)
            .or_else(|| self.groups.first().map(|g| g.date.clone()))
            .unwrap_or_else(|| dates::format_date(NaiveDate::default()))
    }
}

fn retain_known<V>(map: &mut BTreeMap<ListId, V>, known: &BTreeSet<ListId>) -> usize {
    let before = map.len();
    map.retain(|list, _| known.contains(list));
    before - map.len()
}

fn fill<K: Ord, V>(map: &mut BTreeMap<K, V>, key: K, default: impl FnOnce() -> V) -> usize {
    if map.contains_key(&key) {
        return 0;
    }
    map.insert(key, default());
    1
}
