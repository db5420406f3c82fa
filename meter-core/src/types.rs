//! Core data types for the frequency meter

/// Which decade the analog reading belongs to
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "std", derive(Hash))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangeIndicator {
    /// Below one-tenth of full scale (x1 scale)
    #[default]
    Low,
    /// Upper decade, up to full scale (x10 scale)
    High,
}

impl RangeIndicator {
    /// Convert a pin level into an indicator
    pub const fn from_level(high: bool) -> Self {
        if high {
            RangeIndicator::High
        } else {
            RangeIndicator::Low
        }
    }

    /// Pin level driving the indicator LED
    pub const fn is_high(&self) -> bool {
        matches!(self, RangeIndicator::High)
    }
}

/// How a duty quotient above 255 is reduced to the 8-bit register
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DutyOverflow {
    /// Clamp to 255
    #[default]
    Saturate,
    /// Keep the low 8 bits (full scale reads as zero)
    Wrap,
}

impl DutyOverflow {
    /// Reduce a duty quotient to the register width
    pub const fn reduce(&self, quotient: u32) -> u8 {
        match self {
            DutyOverflow::Saturate => {
                if quotient > u8::MAX as u32 {
                    u8::MAX
                } else {
                    quotient as u8
                }
            }
            DutyOverflow::Wrap => quotient as u8,
        }
    }
}

/// Result of one closed gate window
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// Effective pulse count over the window
    pub count: u32,
    /// Published duty cycle
    pub duty: u8,
    /// Published range flag
    pub range: RangeIndicator,
}

/// Interrupt flags latched by the timer peripherals
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingInterrupts {
    /// Pulse counter wrapped
    pub counter_overflow: bool,
    /// Gate timebase ticked
    pub gate_tick: bool,
}

impl PendingInterrupts {
    pub const NONE: PendingInterrupts = PendingInterrupts {
        counter_overflow: false,
        gate_tick: false,
    };

    pub const fn is_empty(&self) -> bool {
        !self.counter_overflow && !self.gate_tick
    }
}
