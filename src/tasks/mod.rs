//! The task board engine.
//!
//! A board holds dated task groups, the lists stored under each date, and the
//! tasks in each list, along with per-list categories, incomplete counts and
//! expand/collapse flags. The pieces:
//!
//! - [`graph`]: the mutation operations, each updating every affected
//!   collection at once
//! - [`projections`]: incomplete counts, date buckets and the rendered view
//! - [`codec`]: loading, repairing and saving the snapshot slots
//! - [`board`]: the graph bound to a store, writing after every change
//!
//! # Example
//!
//! ```no_run
//! use daybook::tasks::open_in;
//!
//! let (mut board, _report) = open_in(std::path::Path::new("/tmp/daybook")).unwrap();
//!
//! board.create_group();
//! let today = board.snapshot().groups[0].date.clone();
//! let list = board.create_list(&today).unwrap();
//! let task = board.create_task(list).unwrap();
//! board.update_task_content(list, task, "Water the plants");
//! board.update_task_checked(list, task, true);
//! ```

pub mod board;
pub mod codec;
pub mod dates;
pub mod expansion;
pub mod graph;
pub mod id;
pub mod models;
pub mod projections;
pub mod snapshot;

pub use board::TaskBoard;
pub use codec::LoadReport;
pub use graph::{EntityGraph, TaskRemoval};
pub use models::{Category, GroupId, ListId, ListRef, Task, TaskGroup, TaskId, PLACEHOLDER_CONTENT};
pub use projections::{BucketView, ListStatus, ListView, TaskView};
pub use snapshot::{Inconsistency, Snapshot};

use crate::config;
use crate::error::Result;
use crate::op_logging::OperationJournal;
use crate::storage::SqliteSlotStore;
use crate::traits::SystemClock;
use std::path::Path;

/// A board persisted in `SQLite` and stamped by the system clock.
pub type SqliteBoard = TaskBoard<SqliteSlotStore, SystemClock>;

/// Open the board kept in `data_dir`.
///
/// Reads (or writes default) `config.yaml` there, opens the configured
/// database, and enables the operation journal if the config asks for it.
///
/// # Errors
///
/// Returns an error if the config cannot be read or written, or the database
/// cannot be opened.
pub fn open_in(data_dir: &Path) -> Result<(SqliteBoard, LoadReport)> {
    let config = config::ensure_config_in(data_dir)?;
    let store = SqliteSlotStore::with_path(config.database_path(data_dir))?;
    let journal = config.debug_logging.then(|| OperationJournal::in_data_dir(data_dir));
    TaskBoard::open(store, SystemClock, &config, journal)
}
