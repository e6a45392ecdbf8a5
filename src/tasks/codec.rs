//! Mapping between a [`Snapshot`] and the store's string slots.
//!
//! Each collection lives in its own slot as JSON. Loading is tolerant: a slot
//! that does not decode falls back to its empty default, task entries that are
//! not arrays are replaced by empty arrays, and each task is decoded on its
//! own so one drifted field costs at most that field. A tasks slot keyed by
//! something other than list ids cannot be trusted at all, so every slot is
//! removed and the board starts empty.
//!
//! Saving always rewrites every slot.

use crate::error::Result;
use crate::tasks::dates;
use crate::tasks::models::{ListId, Task};
use crate::tasks::snapshot::Snapshot;
use crate::traits::SlotStore;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

/// Task group records.
pub const GROUPS_SLOT: &str = "newTaskGroup";
/// Lists by date.
pub const LISTS_SLOT: &str = "taskLists";
/// Tasks by list.
pub const TASKS_SLOT: &str = "tasks";
/// Category by list.
pub const CATEGORIES_SLOT: &str = "listCategories";
/// Incomplete count by list.
pub const COUNTS_SLOT: &str = "incompleteCounts";
/// List expansion flags.
pub const LIST_EXPANDED_SLOT: &str = "expandedStates";
/// Date bucket expansion flags.
pub const GROUP_EXPANDED_SLOT: &str = "taskGroupExpandedStates";
/// Task panel expansion flags.
pub const TASKS_EXPANDED_SLOT: &str = "tasksExpandedStates";

/// Every slot the board owns.
pub const ALL_SLOTS: [&str; 8] = [
    GROUPS_SLOT,
    LISTS_SLOT,
    TASKS_SLOT,
    CATEGORIES_SLOT,
    COUNTS_SLOT,
    LIST_EXPANDED_SLOT,
    GROUP_EXPANDED_SLOT,
    TASKS_EXPANDED_SLOT,
];

/// What loading had to repair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Slots that did not decode and were replaced by their default.
    pub decode_failures: Vec<&'static str>,
    /// Lists whose task entry was not an array and was emptied.
    pub coerced_task_lists: Vec<String>,
    /// Tasks kept after defaulting or normalizing some of their fields.
    pub repaired_tasks: usize,
    /// Task entries discarded for lacking an integer id.
    pub dropped_tasks: usize,
    /// Map entries skipped because their key is not a list id.
    pub skipped_keys: usize,
    /// Why all persisted state was discarded, if it was.
    pub reset: Option<String>,
    /// Repairs made by reconciling the decoded collections.
    pub reconciled: usize,
}

impl LoadReport {
    /// Whether the stored state loaded without any repair.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.decode_failures.is_empty()
            && self.coerced_task_lists.is_empty()
            && self.repaired_tasks == 0
            && self.dropped_tasks == 0
            && self.skipped_keys == 0
            && self.reset.is_none()
            && self.reconciled == 0
    }
}

/// A loaded snapshot and how it was obtained.
#[derive(Debug, Clone)]
pub struct Loaded {
    /// The reconciled snapshot.
    pub snapshot: Snapshot,
    /// Repairs made on the way.
    pub report: LoadReport,
}

/// Load and repair the snapshot held by `store`.
///
/// # Errors
///
/// Returns an error only if the store cannot be read. Malformed content never
/// produces an error.
pub fn load<S: SlotStore + ?Sized>(store: &S) -> Result<Loaded> {
    let mut report = LoadReport::default();

    let tasks = match store.get(TASKS_SLOT)? {
        None => BTreeMap::new(),
        Some(raw) => match decode_tasks(&raw, &mut report) {
            Ok(tasks) => tasks,
            Err(reason) => {
                tracing::error!(target: "daybook", %reason, "stored tasks are corrupt, discarding all board state");
                if let Err(err) = clear(store) {
                    tracing::error!(target: "daybook", error = %err, "failed to remove corrupt slots");
                }
                report.reset = Some(reason);
                return Ok(Loaded { snapshot: Snapshot::default(), report });
            }
        },
    };

    let mut snapshot = Snapshot {
        groups: decode_slot(store, GROUPS_SLOT, &mut report)?,
        lists: decode_slot(store, LISTS_SLOT, &mut report)?,
        tasks,
        categories: decode_list_slot(store, CATEGORIES_SLOT, &mut report)?,
        incomplete_counts: decode_list_slot(store, COUNTS_SLOT, &mut report)?,
        list_expanded: decode_list_slot(store, LIST_EXPANDED_SLOT, &mut report)?,
        group_expanded: decode_slot(store, GROUP_EXPANDED_SLOT, &mut report)?,
        tasks_expanded: decode_list_slot(store, TASKS_EXPANDED_SLOT, &mut report)?,
    };

    report.reconciled = snapshot.reconcile();
    if report.reconciled > 0 {
        tracing::warn!(target: "daybook", repairs = report.reconciled, "reconciled inconsistent board state");
    }

    Ok(Loaded { snapshot, report })
}

/// Write every slot of `snapshot`.
///
/// # Errors
///
/// Returns an error if serialization or the store write fails.
pub fn save<S: SlotStore + ?Sized>(store: &S, snapshot: &Snapshot) -> Result<()> {
    store.set_all(&encode(snapshot)?)
}

/// Serialize a snapshot into `(slot, json)` pairs.
///
/// # Errors
///
/// Returns an error if a collection cannot be serialized.
pub fn encode(snapshot: &Snapshot) -> Result<Vec<(&'static str, String)>> {
    Ok(vec![
        (GROUPS_SLOT, serde_json::to_string(&snapshot.groups)?),
        (LISTS_SLOT, serde_json::to_string(&snapshot.lists)?),
        (TASKS_SLOT, serde_json::to_string(&snapshot.tasks)?),
        (CATEGORIES_SLOT, serde_json::to_string(&snapshot.categories)?),
        (COUNTS_SLOT, serde_json::to_string(&snapshot.incomplete_counts)?),
        (LIST_EXPANDED_SLOT, serde_json::to_string(&snapshot.list_expanded)?),
        (GROUP_EXPANDED_SLOT, serde_json::to_string(&snapshot.group_expanded)?),
        (TASKS_EXPANDED_SLOT, serde_json::to_string(&snapshot.tasks_expanded)?),
    ])
}

/// Remove every slot.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub fn clear<S: SlotStore + ?Sized>(store: &S) -> Result<()> {
    for slot in ALL_SLOTS {
        store.remove(slot)?;
    }
    Ok(())
}

fn decode_slot<S, T>(store: &S, slot: &'static str, report: &mut LoadReport) -> Result<T>
where
    S: SlotStore + ?Sized,
    T: DeserializeOwned + Default,
{
    let Some(raw) = store.get(slot)? else {
        return Ok(T::default());
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(err) => {
            tracing::warn!(target: "daybook", slot, error = %err, "slot did not decode, using default");
            report.decode_failures.push(slot);
            Ok(T::default())
        }
    }
}

/// Decode a map keyed by list id, skipping keys that are not list ids.
///
/// Older versions stored date keys alongside list ids in the expansion slot.
fn decode_list_slot<S, V>(
    store: &S,
    slot: &'static str,
    report: &mut LoadReport,
) -> Result<BTreeMap<ListId, V>>
where
    S: SlotStore + ?Sized,
    V: DeserializeOwned,
{
    let raw: BTreeMap<String, V> = decode_slot(store, slot, report)?;
    let mut decoded = BTreeMap::new();
    for (key, value) in raw {
        match key.parse::<ListId>() {
            Ok(list) => {
                decoded.insert(list, value);
            }
            Err(_) => {
                tracing::debug!(target: "daybook", slot, %key, "skipping non-list key");
                report.skipped_keys += 1;
            }
        }
    }
    Ok(decoded)
}

/// Decode the tasks slot.
///
/// `Err` carries the reason the slot counts as structurally corrupt: a key
/// that is not a list id. Everything below the keys is repaired in place.
fn decode_tasks(
    raw: &str,
    report: &mut LoadReport,
) -> std::result::Result<BTreeMap<ListId, Vec<Task>>, String> {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(target: "daybook", slot = TASKS_SLOT, error = %err, "slot did not decode, using default");
            report.decode_failures.push(TASKS_SLOT);
            return Ok(BTreeMap::new());
        }
    };
    let serde_json::Value::Object(entries) = value else {
        tracing::warn!(target: "daybook", slot = TASKS_SLOT, "slot is not an object, using default");
        report.decode_failures.push(TASKS_SLOT);
        return Ok(BTreeMap::new());
    };

    let mut tasks = BTreeMap::new();
    for (key, entry) in entries {
        let list: ListId = key.parse().map_err(|_| format!("task key {key:?} is not a list id"))?;
        let items = match entry {
            serde_json::Value::Array(items) => items,
            _ => {
                tracing::warn!(target: "daybook", list = %key, "task entry is not an array, emptying it");
                report.coerced_task_lists.push(key);
                Vec::new()
            }
        };

        let mut list_tasks = Vec::with_capacity(items.len());
        for item in items {
            match decode_task(item) {
                Some((task, repaired)) => {
                    if repaired {
                        tracing::warn!(target: "daybook", %list, task = %task.id, "repaired task fields");
                        report.repaired_tasks += 1;
                    }
                    list_tasks.push(task);
                }
                None => {
                    tracing::warn!(target: "daybook", %list, "dropping task without a usable id");
                    report.dropped_tasks += 1;
                }
            }
        }
        tasks.insert(list, list_tasks);
    }
    Ok(tasks)
}

const TEXT_FIELDS: [&str; 5] = ["time", "content", "dueDate", "createdDate", "lastEditedDate"];

/// Decode one stored task.
///
/// Fields of the wrong type fall back to their defaults and due dates are
/// rewritten as `D/M/YYYY`; a due date that is not a day is cleared. Returns
/// the task and whether anything changed, or `None` if the entry is not an
/// object with an integer id.
fn decode_task(value: serde_json::Value) -> Option<(Task, bool)> {
    let serde_json::Value::Object(mut fields) = value else {
        return None;
    };
    fields.get("id")?.as_u64()?;

    let before = fields.len();
    fields.retain(|name, value| match name.as_str() {
        "checked" => value.is_boolean(),
        name if TEXT_FIELDS.contains(&name) => value.is_string(),
        _ => true,
    });
    let mut repaired = fields.len() != before;

    let mut task: Task = serde_json::from_value(serde_json::Value::Object(fields)).ok()?;
    if task.has_due_date() {
        let normalized =
            dates::parse_due_date(&task.due_date).map(dates::format_date).unwrap_or_default();
        if normalized != task.due_date {
            task.due_date = normalized;
            repaired = true;
        }
    }
    Some((task, repaired))
}
