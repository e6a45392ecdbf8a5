//! # `daybook`
//!
//! A personal task board: dated task groups holding categorized lists of
//! tasks, kept consistent in memory and persisted to a local slot store.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod op_logging;
pub mod paths;
pub mod storage;
pub mod tasks;
pub mod testing;
pub mod traits;

pub use config::{BoardConfig, EmptyListPolicy};
pub use error::{Error, Result};
pub use storage::SqliteSlotStore;
pub use tasks::TaskBoard;
pub use traits::{Clock, SlotStore, SystemClock};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
