//! Software extension of the 16-bit hardware pulse counter

use crate::config::OVERFLOW_QUANTUM;

/// High-order part of the window's pulse count.
///
/// The hardware counter holds the low 16 bits; each wrap adds one
/// [`OVERFLOW_QUANTUM`] here. Touched only from interrupt context.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseAccumulator {
    high: u32,
}

impl PulseAccumulator {
    pub const fn new() -> Self {
        Self { high: 0 }
    }

    /// Hardware counter wrapped (called from the overflow interrupt)
    pub fn on_overflow(&mut self) {
        self.high = self.high.saturating_add(OVERFLOW_QUANTUM);
    }

    /// Combine the accumulated quanta with the raw counter value and clear
    /// the accumulator. The caller resets the hardware counter.
    pub fn latch(&mut self, raw: u16) -> u32 {
        let count = self.high.saturating_add(raw as u32);
        self.high = 0;
        count
    }

    /// Drop the accumulated quanta of an abandoned window
    pub fn clear(&mut self) {
        self.high = 0;
    }

    /// Effective count so far, without latching
    pub const fn peek(&self, raw: u16) -> u32 {
        self.high.saturating_add(raw as u32)
    }

    /// Accumulated overflow quanta in the current window
    pub const fn pending(&self) -> u32 {
        self.high
    }

    /// Number of hardware wraps in the current window
    pub const fn wraps(&self) -> u32 {
        self.high / OVERFLOW_QUANTUM
    }
}
