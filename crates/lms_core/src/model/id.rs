//! Timestamp-based id generation.
//!
//! # Invariants
//! - Ids issued by one generator are strictly increasing as integers.
//! - A frozen or rewound clock yields `last + 1`, never a repeat.

use super::{now_epoch_ms, EntityId};
use std::cell::Cell;

/// Issues decimal millisecond ids.
pub struct IdGenerator {
    clock: fn() -> i64,
    last: Cell<i64>,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::with_clock(now_epoch_ms)
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a caller-provided clock; tests pin time with this.
    pub fn with_clock(clock: fn() -> i64) -> Self {
        Self {
            clock,
            last: Cell::new(i64::MIN),
        }
    }

    /// Returns `(id, created_at)` for a new record.
    ///
    /// `created_at` is the raw clock reading; the id may run ahead of it when
    /// several records are created within the same millisecond.
    pub fn next(&self) -> (EntityId, i64) {
        let now = (self.clock)();
        let candidate = if now > self.last.get() {
            now
        } else {
            self.last.get() + 1
        };
        self.last.set(candidate);
        (candidate.to_string(), now)
    }
}
