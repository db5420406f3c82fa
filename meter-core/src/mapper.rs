//! Two-regime mapping from a gate's pulse count to duty cycle and range

use crate::config::MeterConfig;
use crate::types::{RangeIndicator, Reading};

/// Pulse count at the low/high crossover for `config`
pub const fn threshold(config: &MeterConfig) -> u32 {
    config.threshold()
}

/// Classify a closed window's pulse count and scale it to a duty value.
///
/// Counts at or above the threshold use the full-scale divisor and raise the
/// range flag; counts below it use the one-tenth divisor so the low decade
/// spans the whole needle travel.
pub const fn classify(count: u32, config: &MeterConfig) -> Reading {
    let (range, divisor) = if count >= config.threshold() {
        (RangeIndicator::High, config.high_divisor())
    } else {
        (RangeIndicator::Low, config.low_divisor())
    };

    Reading {
        count,
        duty: config.overflow().reduce(count / divisor),
        range,
    }
}
