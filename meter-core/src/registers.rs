//! Registers shared between the gate interrupt and its consumers

use portable_atomic::{AtomicBool, AtomicU8, Ordering};
use crate::types::{RangeIndicator, Reading};

/// Duty cycle and range flag published once per gate closure.
///
/// Single writer (gate-closure interrupt), single reader per field (dispatch
/// loop for the duty, pin driver for the range). Both fields are one byte and
/// accessed only with plain loads and stores, so a reader observes either the
/// previous or the new value and no lock is taken.
pub struct SharedRegisters {
    duty: AtomicU8,
    range_high: AtomicBool,
}

impl SharedRegisters {
    /// Registers in their reset state: zero duty, low range
    pub const fn new() -> Self {
        Self {
            duty: AtomicU8::new(0),
            range_high: AtomicBool::new(false),
        }
    }

    /// Publish a gate reading (interrupt context only)
    pub fn publish(&self, reading: &Reading) {
        self.duty.store(reading.duty, Ordering::Relaxed);
        self.range_high.store(reading.range.is_high(), Ordering::Relaxed);
    }

    /// Current duty cycle
    pub fn duty(&self) -> u8 {
        self.duty.load(Ordering::Relaxed)
    }

    /// Current range flag
    pub fn range(&self) -> RangeIndicator {
        RangeIndicator::from_level(self.range_high.load(Ordering::Relaxed))
    }

    /// Return both registers to their reset state
    pub fn clear(&self) {
        self.duty.store(0, Ordering::Relaxed);
        self.range_high.store(false, Ordering::Relaxed);
    }
}

impl Default for SharedRegisters {
    fn default() -> Self {
        Self::new()
    }
}
