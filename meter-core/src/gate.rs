//! Gate window downcounter driven by the periodic timebase interrupt

/// Counts timebase ticks down to the next gate closure.
///
/// Owned by the timer interrupt handler; `remaining` stays within
/// `[0, reload]` and is only observed at zero transiently inside `tick`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GateTimer {
    remaining: u8,
    reload: u8,
}

impl GateTimer {
    /// Create a downcounter loaded with `gate_ticks`
    pub const fn new(gate_ticks: u8) -> Self {
        Self {
            remaining: gate_ticks,
            reload: gate_ticks,
        }
    }

    /// Consume one timebase tick. Returns true when the gate closes, in
    /// which case the downcounter has already been reloaded.
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.remaining = self.reload;
            true
        } else {
            false
        }
    }

    /// Ticks left before the current gate closes
    pub const fn remaining(&self) -> u8 {
        self.remaining
    }

    /// Ticks per gate window
    pub const fn reload(&self) -> u8 {
        self.reload
    }

    /// Restart the current window from a full count
    pub fn reset(&mut self) {
        self.remaining = self.reload;
    }
}
