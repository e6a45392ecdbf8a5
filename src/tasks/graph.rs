//! The entity graph: task groups, their lists, and the lists' tasks.
//!
//! Every operation here is a single `&mut self` call that updates all the
//! collections it touches before returning, so no caller can observe a list
//! that is referenced under a date but lacks its count, category or flags.
//!
//! Operations addressing an id that no longer exists do nothing and report
//! that through their return value (`None` or `false`).

use crate::config::EmptyListPolicy;
use crate::tasks::dates;
use crate::tasks::expansion::{self, DEFAULT_EXPANDED};
use crate::tasks::id::IdGenerator;
use crate::tasks::models::{
    Category, GroupId, ListId, ListRef, Task, TaskGroup, TaskId, PLACEHOLDER_CONTENT,
};
use crate::tasks::projections;
use crate::tasks::snapshot::Snapshot;
use crate::traits::Clock;
use chrono::NaiveDate;

/// What a task deletion removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRemoval {
    /// Only the task.
    TaskOnly,
    /// The task and its now-empty list.
    ListPruned,
    /// The task, its list, and the date bucket the list was the last one in.
    GroupPruned,
}

/// In-memory board state with its mutation operations.
#[derive(Debug)]
pub struct EntityGraph<C> {
    snapshot: Snapshot,
    ids: IdGenerator,
    clock: C,
    policy: EmptyListPolicy,
}

impl<C: Clock> EntityGraph<C> {
    /// Create an empty graph.
    pub fn new(clock: C, policy: EmptyListPolicy) -> Self {
        Self::from_snapshot(Snapshot::default(), clock, policy)
    }

    /// Wrap a loaded snapshot.
    ///
    /// The snapshot should already be reconciled. New ids are drawn above the
    /// largest id it contains.
    pub fn from_snapshot(snapshot: Snapshot, clock: C, policy: EmptyListPolicy) -> Self {
        let ids = IdGenerator::starting_after(snapshot.max_id());
        Self { snapshot, ids, clock, policy }
    }

    /// Current state.
    pub const fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Consume the graph, keeping its state.
    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot
    }

    /// What happens to a list when its last task is deleted.
    pub const fn policy(&self) -> EmptyListPolicy {
        self.policy
    }

    /// The clock stamping new entities.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Drop all state. Ids keep increasing across a clear.
    pub fn clear(&mut self) {
        self.snapshot = Snapshot::default();
    }

    fn today(&self) -> String {
        dates::format_date(self.clock.now().date())
    }

    fn next_id(&mut self) -> u64 {
        self.ids.next_id(&self.clock)
    }

    fn recompute_counts(&mut self) {
        self.snapshot.incomplete_counts = projections::incomplete_counts(&self.snapshot.tasks);
    }

    fn has_list(&self, list: ListId) -> bool {
        self.snapshot.date_of_list(list).is_some()
    }

    /// Create a task group stamped with today's date.
    ///
    /// The record goes to the front of the group sequence and the date's
    /// bucket is expanded.
    pub fn create_group(&mut self) -> GroupId {
        let id = GroupId(self.next_id());
        let date = self.today();
        self.snapshot.group_expanded.insert(date.clone(), DEFAULT_EXPANDED);
        self.snapshot.groups.insert(0, TaskGroup { id, date });
        id
    }

    /// Create an empty list under `date`.
    ///
    /// Returns `None` if no task group carries that date.
    pub fn create_list(&mut self, date: &str) -> Option<ListId> {
        if !self.snapshot.has_group(date) {
            return None;
        }

        let id = ListId(self.next_id());
        let s = &mut self.snapshot;
        s.lists.entry(date.to_string()).or_default().push(ListRef { id });
        s.tasks.insert(id, Vec::new());
        s.categories.insert(id, Category::Uncategorized);
        s.incomplete_counts.insert(id, 0);
        s.list_expanded.insert(id, DEFAULT_EXPANDED);
        s.tasks_expanded.insert(id, DEFAULT_EXPANDED);
        Some(id)
    }

    /// Append a placeholder task to a list.
    ///
    /// Returns `None` if the list does not exist.
    pub fn create_task(&mut self, list: ListId) -> Option<TaskId> {
        if !self.has_list(list) {
            return None;
        }

        let id = TaskId(self.next_id());
        let now = self.clock.now();
        let today = dates::format_date(now.date());
        let task = Task {
            id,
            time: dates::format_clock_time(now.time()),
            content: PLACEHOLDER_CONTENT.to_string(),
            checked: false,
            due_date: String::new(),
            created_date: today.clone(),
            last_edited_date: today,
        };
        self.snapshot.tasks.entry(list).or_default().push(task);
        self.recompute_counts();
        Some(id)
    }

    /// Apply `edit` to a task and stamp it as edited today.
    fn edit_task(&mut self, list: ListId, task: TaskId, edit: impl FnOnce(&mut Task)) -> bool {
        let today = self.today();
        let Some(target) = self
            .snapshot
            .tasks
            .get_mut(&list)
            .and_then(|tasks| tasks.iter_mut().find(|t| t.id == task))
        else {
            return false;
        };
        edit(target);
        target.last_edited_date = today;
        true
    }

    /// Replace a task's text.
    ///
    /// Text is trimmed; text that is empty after trimming stores the
    /// placeholder.
    pub fn update_task_content(&mut self, list: ListId, task: TaskId, text: &str) -> bool {
        let trimmed = text.trim();
        let content =
            if trimmed.is_empty() { PLACEHOLDER_CONTENT.to_string() } else { trimmed.to_string() };
        self.edit_task(list, task, |t| t.content = content)
    }

    /// Check or uncheck a task.
    pub fn update_task_checked(&mut self, list: ListId, task: TaskId, checked: bool) -> bool {
        let found = self.edit_task(list, task, |t| t.checked = checked);
        if found {
            self.recompute_counts();
        }
        found
    }

    /// Set or clear a task's due date.
    pub fn update_task_due_date(
        &mut self,
        list: ListId,
        task: TaskId,
        due: Option<NaiveDate>,
    ) -> bool {
        let due_date = due.map(dates::format_date).unwrap_or_default();
        self.edit_task(list, task, |t| t.due_date = due_date)
    }

    /// Delete a task.
    ///
    /// Under [`EmptyListPolicy::Prune`], a list left without tasks is removed
    /// along with every entry keyed by it, and a date left without lists loses
    /// its group records and expansion flag.
    pub fn delete_task(&mut self, list: ListId, task: TaskId) -> Option<TaskRemoval> {
        let tasks = self.snapshot.tasks.get_mut(&list)?;
        let position = tasks.iter().position(|t| t.id == task)?;
        tasks.remove(position);
        let now_empty = tasks.is_empty();
        self.recompute_counts();

        if !now_empty || self.policy == EmptyListPolicy::Keep {
            return Some(TaskRemoval::TaskOnly);
        }

        let Some(date) = self.snapshot.date_of_list(list).map(str::to_string) else {
            return Some(TaskRemoval::TaskOnly);
        };
        self.remove_list(&date, list);

        if self.snapshot.lists_on(&date).is_empty() {
            self.remove_date(&date);
            return Some(TaskRemoval::GroupPruned);
        }
        Some(TaskRemoval::ListPruned)
    }

    fn remove_list(&mut self, date: &str, list: ListId) {
        let s = &mut self.snapshot;
        if let Some(lists) = s.lists.get_mut(date) {
            lists.retain(|l| l.id != list);
        }
        forget_list(s, list);
    }

    fn remove_date(&mut self, date: &str) {
        let s = &mut self.snapshot;
        if let Some(lists) = s.lists.remove(date) {
            for list in lists {
                forget_list(s, list.id);
            }
        }
        s.groups.retain(|g| g.date != date);
        s.group_expanded.remove(date);
    }

    /// Delete every group record for `date`, its lists and their tasks.
    ///
    /// Returns whether anything was removed.
    pub fn delete_group(&mut self, date: &str) -> bool {
        let existed = self.snapshot.has_group(date) || self.snapshot.lists.contains_key(date);
        if existed {
            self.remove_date(date);
        }
        existed
    }

    /// Set a list's category.
    pub fn update_list_category(&mut self, list: ListId, category: Category) -> bool {
        if !self.has_list(list) {
            return false;
        }
        self.snapshot.categories.insert(list, category);
        true
    }

    /// Flip a list's expansion flag. Returns the new state.
    pub fn toggle_list(&mut self, list: ListId) -> Option<bool> {
        self.has_list(list).then(|| expansion::toggle(&mut self.snapshot.list_expanded, &list))
    }

    /// Flip a list's task panel flag. Returns the new state.
    pub fn toggle_list_tasks(&mut self, list: ListId) -> Option<bool> {
        self.has_list(list).then(|| expansion::toggle(&mut self.snapshot.tasks_expanded, &list))
    }

    /// Flip a date bucket's expansion flag. Returns the new state.
    pub fn toggle_group(&mut self, date: &str) -> Option<bool> {
        if !self.snapshot.has_group(date) {
            return None;
        }
        Some(expansion::toggle(&mut self.snapshot.group_expanded, &date.to_string()))
    }

    /// Collapse every list under `date` if all are expanded, otherwise expand
    /// them all. Returns the state applied.
    ///
    /// Returns `None` if the date holds no lists.
    pub fn toggle_group_lists(&mut self, date: &str) -> Option<bool> {
        let lists = self.snapshot.lists_on(date);
        if lists.is_empty() {
            return None;
        }
        let target = expansion::bulk_target(&self.snapshot.list_expanded, &lists);
        expansion::apply(&mut self.snapshot.list_expanded, &lists, target);
        Some(target)
    }
}

/// Remove every per-list entry for `list`.
fn forget_list(snapshot: &mut Snapshot, list: ListId) {
    snapshot.tasks.remove(&list);
    snapshot.categories.remove(&list);
    snapshot.incomplete_counts.remove(&list);
    snapshot.list_expanded.remove(&list);
    snapshot.tasks_expanded.remove(&list);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixedClock;

    fn graph(policy: EmptyListPolicy) -> EntityGraph<FixedClock> {
        EntityGraph::new(FixedClock::at(2024, 6, 1, 9, 30), policy)
    }

    fn count(g: &EntityGraph<FixedClock>, list: ListId) -> u32 {
        g.snapshot().incomplete_counts[&list]
    }

    fn assert_consistent(g: &EntityGraph<FixedClock>) {
        let problems = g.snapshot().check_consistency();
        assert!(problems.is_empty(), "{problems:?}");
    }

    #[test]
    fn test_create_group_prepends_with_today() {
        let mut g = graph(EmptyListPolicy::Keep);
        let first = g.create_group();
        g.clock().advance_days(1);
        let second = g.create_group();

        let groups = &g.snapshot().groups;
        assert_eq!(groups[0].id, second);
        assert_eq!(groups[0].date, "2/6/2024");
        assert_eq!(groups[1].id, first);
        assert_eq!(groups[1].date, "1/6/2024");
        assert_eq!(g.snapshot().group_expanded.get("2/6/2024"), Some(&true));
        assert_consistent(&g);
    }

    #[test]
    fn test_create_list_initializes_every_collection() {
        let mut g = graph(EmptyListPolicy::Keep);
        g.create_group();
        let list = g.create_list("1/6/2024").unwrap();

        let s = g.snapshot();
        assert_eq!(s.lists_on("1/6/2024"), vec![list]);
        assert!(s.tasks[&list].is_empty());
        assert_eq!(s.categories[&list], Category::Uncategorized);
        assert_eq!(s.incomplete_counts[&list], 0);
        assert!(s.list_expanded[&list]);
        assert!(s.tasks_expanded[&list]);
        assert_consistent(&g);
    }

    #[test]
    fn test_create_list_unknown_date() {
        let mut g = graph(EmptyListPolicy::Keep);
        assert_eq!(g.create_list("1/6/2024"), None);
        assert_eq!(*g.snapshot(), Snapshot::default());
    }

    #[test]
    fn test_create_task_fields() {
        let mut g = graph(EmptyListPolicy::Keep);
        g.create_group();
        let list = g.create_list("1/6/2024").unwrap();
        let id = g.create_task(list).unwrap();

        let task = g.snapshot().task(list, id).unwrap();
        assert!(task.is_placeholder());
        assert!(!task.checked);
        assert!(task.due_date.is_empty());
        assert_eq!(task.created_date, "1/6/2024");
        assert_eq!(task.last_edited_date, "1/6/2024");
        assert_eq!(task.time, "09:30 AM");
        assert_eq!(count(&g, list), 1);
    }

    #[test]
    fn test_ids_unique_within_one_tick() {
        let mut g = graph(EmptyListPolicy::Keep);
        let group = g.create_group();
        let list = g.create_list("1/6/2024").unwrap();
        let a = g.create_task(list).unwrap();
        let b = g.create_task(list).unwrap();

        assert!(group.0 < list.0);
        assert!(list.0 < a.0);
        assert!(a.0 < b.0);
    }

    #[test]
    fn test_count_scenario() {
        let mut g = graph(EmptyListPolicy::Keep);
        g.create_group();
        let l1 = g.create_list("1/6/2024").unwrap();

        let t1 = g.create_task(l1).unwrap();
        assert_eq!(count(&g, l1), 1);

        assert!(g.update_task_checked(l1, t1, true));
        assert_eq!(count(&g, l1), 0);

        let t2 = g.create_task(l1).unwrap();
        assert_eq!(count(&g, l1), 1);

        assert_eq!(g.delete_task(l1, t1), Some(TaskRemoval::TaskOnly));
        assert_eq!(count(&g, l1), 1);
        let tasks = &g.snapshot().tasks[&l1];
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, t2);
        assert_consistent(&g);
    }

    #[test]
    fn test_double_check_does_not_undercount() {
        let mut g = graph(EmptyListPolicy::Keep);
        g.create_group();
        let list = g.create_list("1/6/2024").unwrap();
        let task = g.create_task(list).unwrap();

        g.update_task_checked(list, task, true);
        g.update_task_checked(list, task, true);
        assert_eq!(count(&g, list), 0);

        g.update_task_checked(list, task, false);
        g.update_task_checked(list, task, false);
        assert_eq!(count(&g, list), 1);
    }

    #[test]
    fn test_keep_policy_leaves_empty_list() {
        let mut g = graph(EmptyListPolicy::Keep);
        g.create_group();
        let list = g.create_list("1/6/2024").unwrap();
        let task = g.create_task(list).unwrap();

        assert_eq!(g.delete_task(list, task), Some(TaskRemoval::TaskOnly));
        assert_eq!(g.snapshot().lists_on("1/6/2024"), vec![list]);
        assert_eq!(count(&g, list), 0);
        assert_consistent(&g);
    }

    #[test]
    fn test_prune_policy_cascades_to_bucket() {
        let mut g = graph(EmptyListPolicy::Prune);
        g.create_group();
        let list = g.create_list("1/6/2024").unwrap();
        let task = g.create_task(list).unwrap();

        assert_eq!(g.delete_task(list, task), Some(TaskRemoval::GroupPruned));

        let s = g.snapshot();
        assert!(!s.tasks.contains_key(&list));
        assert!(!s.categories.contains_key(&list));
        assert!(!s.incomplete_counts.contains_key(&list));
        assert!(!s.list_expanded.contains_key(&list));
        assert!(!s.tasks_expanded.contains_key(&list));
        assert!(!s.has_group("1/6/2024"));
        assert!(!s.group_expanded.contains_key("1/6/2024"));
        assert!(projections::board_view(s).is_empty());
        assert_consistent(&g);
    }

    #[test]
    fn test_prune_policy_keeps_bucket_with_other_lists() {
        let mut g = graph(EmptyListPolicy::Prune);
        g.create_group();
        let l1 = g.create_list("1/6/2024").unwrap();
        let l2 = g.create_list("1/6/2024").unwrap();
        let task = g.create_task(l1).unwrap();

        assert_eq!(g.delete_task(l1, task), Some(TaskRemoval::ListPruned));
        assert_eq!(g.snapshot().lists_on("1/6/2024"), vec![l2]);
        assert!(g.snapshot().has_group("1/6/2024"));
        assert_consistent(&g);
    }

    #[test]
    fn test_delete_group_cascades() {
        let mut g = graph(EmptyListPolicy::Keep);
        g.create_group();
        g.create_group();
        let l1 = g.create_list("1/6/2024").unwrap();
        let l2 = g.create_list("1/6/2024").unwrap();
        g.create_task(l1);
        g.create_task(l2);

        g.clock().advance_days(1);
        g.create_group();
        let other = g.create_list("2/6/2024").unwrap();

        assert!(g.delete_group("1/6/2024"));

        let s = g.snapshot();
        for list in [l1, l2] {
            assert!(!s.tasks.contains_key(&list));
            assert!(!s.categories.contains_key(&list));
            assert!(!s.incomplete_counts.contains_key(&list));
            assert!(!s.list_expanded.contains_key(&list));
            assert!(!s.tasks_expanded.contains_key(&list));
        }
        assert!(!s.has_group("1/6/2024"));
        assert_eq!(s.groups.len(), 1);
        assert_eq!(s.lists_on("2/6/2024"), vec![other]);
        assert_consistent(&g);

        assert!(!g.delete_group("1/6/2024"));
    }

    #[test]
    fn test_missing_ids_are_noops() {
        let mut g = graph(EmptyListPolicy::Prune);
        g.create_group();
        let list = g.create_list("1/6/2024").unwrap();
        let before = g.snapshot().clone();

        let ghost_list = ListId(1);
        let ghost_task = TaskId(2);
        assert_eq!(g.create_task(ghost_list), None);
        assert!(!g.update_task_content(list, ghost_task, "x"));
        assert!(!g.update_task_checked(ghost_list, ghost_task, true));
        assert!(!g.update_task_due_date(list, ghost_task, None));
        assert_eq!(g.delete_task(list, ghost_task), None);
        assert_eq!(g.delete_task(ghost_list, ghost_task), None);
        assert!(!g.update_list_category(ghost_list, Category::Ideas));
        assert_eq!(g.toggle_list(ghost_list), None);
        assert_eq!(g.toggle_list_tasks(ghost_list), None);
        assert_eq!(g.toggle_group("9/9/2099"), None);
        assert_eq!(g.toggle_group_lists("9/9/2099"), None);

        assert_eq!(*g.snapshot(), before);
    }

    #[test]
    fn test_update_content_stamps_edit_date() {
        let mut g = graph(EmptyListPolicy::Keep);
        g.create_group();
        let list = g.create_list("1/6/2024").unwrap();
        let task = g.create_task(list).unwrap();

        g.clock().advance_days(2);
        assert!(g.update_task_content(list, task, "  buy milk  "));

        let t = g.snapshot().task(list, task).unwrap();
        assert_eq!(t.content, "buy milk");
        assert_eq!(t.created_date, "1/6/2024");
        assert_eq!(t.last_edited_date, "3/6/2024");
    }

    #[test]
    fn test_blank_content_becomes_placeholder() {
        let mut g = graph(EmptyListPolicy::Keep);
        g.create_group();
        let list = g.create_list("1/6/2024").unwrap();
        let task = g.create_task(list).unwrap();

        g.update_task_content(list, task, "write report");
        g.update_task_content(list, task, "   ");
        assert!(g.snapshot().task(list, task).unwrap().is_placeholder());
    }

    #[test]
    fn test_due_date_set_and_clear() {
        let mut g = graph(EmptyListPolicy::Keep);
        g.create_group();
        let list = g.create_list("1/6/2024").unwrap();
        let task = g.create_task(list).unwrap();

        let due = NaiveDate::from_ymd_opt(2024, 7, 4).unwrap();
        assert!(g.update_task_due_date(list, task, Some(due)));
        assert_eq!(g.snapshot().task(list, task).unwrap().due_date, "4/7/2024");

        assert!(g.update_task_due_date(list, task, None));
        assert!(!g.snapshot().task(list, task).unwrap().has_due_date());
    }

    #[test]
    fn test_update_category() {
        let mut g = graph(EmptyListPolicy::Keep);
        g.create_group();
        let list = g.create_list("1/6/2024").unwrap();

        assert!(g.update_list_category(list, Category::Groceries));
        assert_eq!(g.snapshot().categories[&list], Category::Groceries);
    }

    #[test]
    fn test_toggles() {
        let mut g = graph(EmptyListPolicy::Keep);
        g.create_group();
        let list = g.create_list("1/6/2024").unwrap();

        assert_eq!(g.toggle_list(list), Some(false));
        assert_eq!(g.toggle_list(list), Some(true));
        assert_eq!(g.toggle_list_tasks(list), Some(false));
        assert!(g.snapshot().list_expanded[&list]);
        assert_eq!(g.toggle_group("1/6/2024"), Some(false));
        assert_eq!(g.toggle_group("1/6/2024"), Some(true));
    }

    #[test]
    fn test_toggle_group_lists() {
        let mut g = graph(EmptyListPolicy::Keep);
        g.create_group();
        let l1 = g.create_list("1/6/2024").unwrap();
        let l2 = g.create_list("1/6/2024").unwrap();

        // all expanded: collapse all
        assert_eq!(g.toggle_group_lists("1/6/2024"), Some(false));
        assert!(!g.snapshot().list_expanded[&l1]);
        assert!(!g.snapshot().list_expanded[&l2]);

        // mixed: expand all
        g.toggle_list(l1);
        assert_eq!(g.toggle_group_lists("1/6/2024"), Some(true));
        assert!(g.snapshot().list_expanded[&l1]);
        assert!(g.snapshot().list_expanded[&l2]);
    }

    #[test]
    fn test_from_snapshot_seeds_ids() {
        let mut g = graph(EmptyListPolicy::Keep);
        g.create_group();
        let list = g.create_list("1/6/2024").unwrap();
        let snapshot = g.into_snapshot();
        let max = snapshot.max_id();

        // a clock behind the stored ids must not reissue them
        let mut g =
            EntityGraph::from_snapshot(snapshot, FixedClock::at(2020, 1, 1, 0, 0), EmptyListPolicy::Keep);
        let task = g.create_task(list).unwrap();
        assert_eq!(task.0, max + 1);
    }

    #[test]
    fn test_clear() {
        let mut g = graph(EmptyListPolicy::Keep);
        g.create_group();
        g.clear();
        assert_eq!(*g.snapshot(), Snapshot::default());
    }
}
