//! The board: an entity graph bound to a slot store.
//!
//! Every mutation that changes state is followed by one full write of the
//! snapshot. A failed write is logged and leaves the board dirty; the next
//! committed mutation or an explicit [`TaskBoard::flush`] writes again.

use crate::config::{BoardConfig, EmptyListPolicy};
use crate::error::Result;
use crate::op_logging::OperationJournal;
use crate::tasks::codec::{self, LoadReport};
use crate::tasks::graph::{EntityGraph, TaskRemoval};
use crate::tasks::models::{Category, GroupId, ListId, TaskId};
use crate::tasks::projections::{self, BucketView};
use crate::tasks::snapshot::Snapshot;
use crate::traits::{Clock, SlotStore};
use chrono::NaiveDate;
use serde_json::json;

/// A persisted task board.
#[derive(Debug)]
pub struct TaskBoard<S, C> {
    store: S,
    graph: EntityGraph<C>,
    journal: Option<OperationJournal>,
    dirty: bool,
}

impl<S: SlotStore, C: Clock> TaskBoard<S, C> {
    /// Load the board held by `store`.
    ///
    /// If loading had to repair anything, the repaired state is written back
    /// straight away.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn open(
        store: S,
        clock: C,
        config: &BoardConfig,
        journal: Option<OperationJournal>,
    ) -> Result<(Self, LoadReport)> {
        let loaded = codec::load(&store)?;
        let graph = EntityGraph::from_snapshot(loaded.snapshot, clock, config.empty_lists);
        let mut board = Self { store, graph, journal, dirty: false };

        if !loaded.report.is_clean() {
            board.dirty = true;
            board.persist();
        }
        Ok((board, loaded.report))
    }

    /// Current state.
    pub const fn snapshot(&self) -> &Snapshot {
        self.graph.snapshot()
    }

    /// The rendering projection of the current state.
    pub fn view(&self) -> Vec<BucketView<'_>> {
        projections::board_view(self.graph.snapshot())
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The empty-list policy in force.
    pub const fn policy(&self) -> EmptyListPolicy {
        self.graph.policy()
    }

    /// Today's date by the board's clock, as `D/M/YYYY`.
    pub fn today(&self) -> String {
        crate::tasks::dates::format_date(self.graph.clock().now().date())
    }

    /// Whether the in-memory state has changes the store has not accepted.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn commit(&mut self, operation: &str, details: &serde_json::Value) {
        tracing::debug!(target: "daybook", operation, %details, "committed");
        if let Some(journal) = &self.journal {
            journal.record(operation, details);
        }
        self.dirty = true;
        self.persist();
    }

    fn persist(&mut self) {
        match codec::save(&self.store, self.graph.snapshot()) {
            Ok(()) => self.dirty = false,
            Err(err) => {
                tracing::error!(target: "daybook", error = %err, "failed to write board state");
            }
        }
    }

    /// Write the current state if a previous write failed.
    ///
    /// # Errors
    ///
    /// Returns the store error if the write fails again.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        codec::save(&self.store, self.graph.snapshot())?;
        self.dirty = false;
        Ok(())
    }

    /// Discard all state, in memory and in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be cleared.
    pub fn reset(&mut self) -> Result<()> {
        codec::clear(&self.store)?;
        self.graph.clear();
        self.dirty = false;
        tracing::info!(target: "daybook", "board reset");
        if let Some(journal) = &self.journal {
            journal.record("reset", &serde_json::Value::Null);
        }
        Ok(())
    }

    /// Create a task group for today.
    pub fn create_group(&mut self) -> GroupId {
        let id = self.graph.create_group();
        let date = self.graph.snapshot().groups.first().map(|g| g.date.clone());
        self.commit("create_group", &json!({ "group": id, "date": date }));
        id
    }

    /// Create a list under `date`.
    pub fn create_list(&mut self, date: &str) -> Option<ListId> {
        let id = self.graph.create_list(date)?;
        self.commit("create_list", &json!({ "date": date, "list": id }));
        Some(id)
    }

    /// Add a placeholder task to a list.
    pub fn create_task(&mut self, list: ListId) -> Option<TaskId> {
        let id = self.graph.create_task(list)?;
        self.commit("create_task", &json!({ "list": list, "task": id }));
        Some(id)
    }

    /// Replace a task's text.
    pub fn update_task_content(&mut self, list: ListId, task: TaskId, text: &str) -> bool {
        let found = self.graph.update_task_content(list, task, text);
        if found {
            self.commit("update_task_content", &json!({ "list": list, "task": task, "text": text }));
        }
        found
    }

    /// Check or uncheck a task.
    pub fn update_task_checked(&mut self, list: ListId, task: TaskId, checked: bool) -> bool {
        let found = self.graph.update_task_checked(list, task, checked);
        if found {
            self.commit(
                "update_task_checked",
                &json!({ "list": list, "task": task, "checked": checked }),
            );
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
        let found = self.graph.update_task_due_date(list, task, due);
        if found {
            let due = due.map(crate::tasks::dates::format_date);
            self.commit("update_task_due_date", &json!({ "list": list, "task": task, "due": due }));
        }
        found
    }

    /// Delete a task, pruning per the configured policy.
    pub fn delete_task(&mut self, list: ListId, task: TaskId) -> Option<TaskRemoval> {
        let removal = self.graph.delete_task(list, task)?;
        self.commit(
            "delete_task",
            &json!({ "list": list, "task": task, "removed": format!("{removal:?}") }),
        );
        Some(removal)
    }

    /// Delete the group records for `date` and everything under them.
    pub fn delete_group(&mut self, date: &str) -> bool {
        let existed = self.graph.delete_group(date);
        if existed {
            self.commit("delete_group", &json!({ "date": date }));
        }
        existed
    }

    /// Set a list's category.
    pub fn update_list_category(&mut self, list: ListId, category: Category) -> bool {
        let found = self.graph.update_list_category(list, category);
        if found {
            self.commit("update_list_category", &json!({ "list": list, "category": category }));
        }
        found
    }

    /// Flip a list's expansion flag.
    pub fn toggle_list(&mut self, list: ListId) -> Option<bool> {
        let expanded = self.graph.toggle_list(list)?;
        self.commit("toggle_list", &json!({ "list": list, "expanded": expanded }));
        Some(expanded)
    }

    /// Flip a list's task panel flag.
    pub fn toggle_list_tasks(&mut self, list: ListId) -> Option<bool> {
        let expanded = self.graph.toggle_list_tasks(list)?;
        self.commit("toggle_list_tasks", &json!({ "list": list, "expanded": expanded }));
        Some(expanded)
    }

    /// Flip a date bucket's expansion flag.
    pub fn toggle_group(&mut self, date: &str) -> Option<bool> {
        let expanded = self.graph.toggle_group(date)?;
        self.commit("toggle_group", &json!({ "date": date, "expanded": expanded }));
        Some(expanded)
    }

    /// Collapse or expand every list under `date`.
    pub fn toggle_group_lists(&mut self, date: &str) -> Option<bool> {
        let expanded = self.graph.toggle_group_lists(date)?;
        self.commit("toggle_group_lists", &json!({ "date": date, "expanded": expanded }));
        Some(expanded)
    }
}
