//! Build-time meter constants and the validated configuration derived from them

use crate::types::DutyOverflow;

/// Gate timer ticks per measurement window (200 x 2048 us = 409.6 ms).
/// The high-range divisor and `GATE_DURATION_US` both follow from it.
pub const GATE_TICKS: u8 = 200;

/// Full-scale frequency in whole units, the top of the high range.
/// Must be a multiple of [`LOW_RANGE_DIVISOR`].
pub const FULL_SCALE: u32 = 20;

/// The low range spans one-tenth of full scale.
pub const LOW_RANGE_DIVISOR: u32 = 10;

/// Pulses counted per gate tick for an input of one frequency unit.
///
/// One tick is 256 timebase counts of 8 us; the input passes a divide-by-8
/// prescaler, so 1 MHz yields 125 000 pulses/s x 2048 us = 256 per tick.
pub const TICK_COUNTS_PER_UNIT: u32 = 256;

/// Timebase counts per gate tick (8-bit free-running counter).
pub const TICK_TIMEBASE_COUNTS: u32 = 256;

/// Timebase count period in microseconds.
pub const TIMEBASE_COUNT_US: u32 = 8;

/// Gate tick period in microseconds.
pub const TICK_PERIOD_US: u32 = TICK_TIMEBASE_COUNTS * TIMEBASE_COUNT_US;

/// Gate window duration in microseconds (409 600 us).
pub const GATE_DURATION_US: u32 = TICK_PERIOD_US * GATE_TICKS as u32;

/// Value added to the accumulator on each wrap of the 16-bit hardware counter.
pub const OVERFLOW_QUANTUM: u32 = u16::MAX as u32 + 1;

/// Configuration validation failures
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Gate window must contain at least one tick
    ZeroGateTicks,
    /// Full scale must be a positive multiple of the low-range divisor
    InvalidFullScale,
    /// Range threshold does not fit a 32-bit pulse count
    ThresholdOverflow,
}

#[cfg(feature = "std")]
impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroGateTicks => write!(f, "Gate ticks must be non-zero"),
            ConfigError::InvalidFullScale => {
                write!(f, "Full scale must be a positive multiple of {}", LOW_RANGE_DIVISOR)
            }
            ConfigError::ThresholdOverflow => write!(f, "Range threshold overflows 32 bits"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Meter configuration parameters
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeterConfig {
    gate_ticks: u8,
    full_scale: u32,
    threshold: u32,
    overflow: DutyOverflow,
}

impl MeterConfig {
    /// Configuration built from the crate constants
    pub const DEFAULT: MeterConfig = match MeterConfig::new(GATE_TICKS, FULL_SCALE) {
        Ok(config) => config,
        Err(_) => panic!("invalid built-in meter constants"),
    };

    /// Create a new configuration with validation
    pub const fn new(gate_ticks: u8, full_scale: u32) -> Result<Self, ConfigError> {
        if gate_ticks == 0 {
            return Err(ConfigError::ZeroGateTicks);
        }
        if full_scale == 0 || full_scale % LOW_RANGE_DIVISOR != 0 {
            return Err(ConfigError::InvalidFullScale);
        }

        let per_gate = TICK_COUNTS_PER_UNIT * gate_ticks as u32;
        let threshold = match per_gate.checked_mul(full_scale / LOW_RANGE_DIVISOR) {
            Some(threshold) => threshold,
            None => return Err(ConfigError::ThresholdOverflow),
        };

        Ok(Self {
            gate_ticks,
            full_scale,
            threshold,
            overflow: DutyOverflow::Saturate,
        })
    }

    /// Select how out-of-range duty quotients are reduced to 8 bits
    pub const fn with_overflow(mut self, overflow: DutyOverflow) -> Self {
        self.overflow = overflow;
        self
    }

    pub const fn gate_ticks(&self) -> u8 {
        self.gate_ticks
    }

    pub const fn full_scale(&self) -> u32 {
        self.full_scale
    }

    pub const fn overflow(&self) -> DutyOverflow {
        self.overflow
    }

    /// Pulse count at the low/high crossover (one-tenth of full scale).
    /// Counts at or above it classify as high range.
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Divisor mapping full scale onto the top duty value
    pub const fn high_divisor(&self) -> u32 {
        self.gate_ticks as u32 * self.full_scale
    }

    /// Divisor mapping one-tenth of full scale onto the top duty value
    pub const fn low_divisor(&self) -> u32 {
        self.gate_ticks as u32 * (self.full_scale / LOW_RANGE_DIVISOR)
    }

    /// Gate window length in microseconds
    pub const fn gate_duration_us(&self) -> u32 {
        TICK_PERIOD_US * self.gate_ticks as u32
    }

    /// Pulse count an input of `units` produces over one gate window
    pub const fn expected_count(&self, units: u32) -> u32 {
        units.saturating_mul(TICK_COUNTS_PER_UNIT * self.gate_ticks as u32)
    }
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
