//! Testing utilities and in-memory implementations.
//!
//! These types are provided for use in tests. They may appear unused in
//! the library itself but are consumed by unit and integration tests.

#![allow(dead_code)]

use crate::error::{Error, Result};
use crate::traits::{Clock, SlotStore};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<NaiveDateTime>,
}

impl FixedClock {
    /// Create a clock reading the given local date and time.
    ///
    /// # Panics
    ///
    /// Panics if the arguments do not form a valid date and time.
    #[must_use]
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        let now = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .expect("valid fixed clock reading");
        Self { now: Cell::new(now) }
    }

    /// Set the current reading.
    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }

    /// Move the clock forward by some milliseconds.
    pub fn advance_millis(&self, millis: i64) {
        self.now.set(self.now.get() + Duration::milliseconds(millis));
    }

    /// Move the clock forward by whole days.
    pub fn advance_days(&self, days: i64) {
        self.now.set(self.now.get() + Duration::days(days));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }

    fn epoch_millis(&self) -> u64 {
        u64::try_from(self.now.get().and_utc().timestamp_millis()).unwrap_or(0)
    }
}

impl Clock for &FixedClock {
    fn now(&self) -> NaiveDateTime {
        (*self).now()
    }

    fn epoch_millis(&self) -> u64 {
        (*self).epoch_millis()
    }
}

/// An in-memory slot store.
///
/// Supports seeding raw slot contents and simulating write failures.
#[derive(Debug, Default)]
pub struct MemorySlotStore {
    slots: RefCell<BTreeMap<String, String>>,
    fail_writes: Cell<bool>,
    writes: Cell<usize>,
}

impl MemorySlotStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with raw slot contents.
    #[must_use]
    pub fn with_slots(slots: &[(&str, &str)]) -> Self {
        let store = Self::new();
        for (key, value) in slots {
            store.slots.borrow_mut().insert((*key).to_string(), (*value).to_string());
        }
        store
    }

    /// Make every subsequent write (set, remove) fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Number of successful `set`/`set_all` calls so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Raw contents of a slot.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }

    /// Names of all slots currently present.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.slots.borrow().keys().cloned().collect()
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.get() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "simulated write failure",
            )));
        }
        Ok(())
    }
}

impl SlotStore for MemorySlotStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable()?;
        self.slots.borrow_mut().insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        self.slots.borrow_mut().remove(key);
        Ok(())
    }

    fn set_all(&self, entries: &[(&str, String)]) -> Result<()> {
        self.check_writable()?;
        let mut slots = self.slots.borrow_mut();
        for (key, value) in entries {
            slots.insert((*key).to_string(), value.clone());
        }
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

impl SlotStore for &MemorySlotStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (*self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (*self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (*self).remove(key)
    }

    fn set_all(&self, entries: &[(&str, String)]) -> Result<()> {
        (*self).set_all(entries)
    }
}
