//! Core traits for testability and abstraction.

use crate::error::Result;
use chrono::NaiveDateTime;

/// Trait for durable storage of named string slots.
///
/// This is the only I/O boundary of the engine. The production implementation
/// uses `SQLite`, while tests use an in-memory store.
pub trait SlotStore {
    /// Read a slot. Returns `None` if the slot has never been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a slot, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a slot. Removing a missing slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying medium cannot be written.
    fn remove(&self, key: &str) -> Result<()>;

    /// Write several slots.
    ///
    /// The default implementation writes them one at a time; implementations
    /// backed by a transactional medium should make the batch all-or-nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if any slot cannot be written.
    fn set_all(&self, entries: &[(&str, String)]) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// Source of wall-clock readings.
///
/// Dates stamped on entities and identifiers both come from here, so tests
/// can pin them.
pub trait Clock {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;

    /// Milliseconds since the Unix epoch.
    fn epoch_millis(&self) -> u64;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }

    fn epoch_millis(&self) -> u64 {
        u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
    }
}
