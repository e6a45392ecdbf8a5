//! Identifier generation.
//!
//! Identifiers are millisecond timestamps, as in snapshots written by earlier
//! versions, but drawn through a generator that never hands out the same
//! value twice: if the clock has not moved past the last issued id, the next
//! id is `last + 1`.

use crate::traits::Clock;

/// Monotonic, timestamp-shaped id source shared by groups, lists and tasks.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    /// Create a generator that will only issue ids greater than `floor`.
    ///
    /// Seed this with the largest id already present in a loaded snapshot.
    #[must_use]
    pub const fn starting_after(floor: u64) -> Self {
        Self { last: floor }
    }

    /// The last id issued (or the seed).
    #[must_use]
    pub const fn last(&self) -> u64 {
        self.last
    }

    /// Issue the next id.
    pub fn next_id(&mut self, clock: &dyn Clock) -> u64 {
        let candidate = clock.epoch_millis().max(self.last.saturating_add(1));
        self.last = candidate;
        candidate
    }
}
