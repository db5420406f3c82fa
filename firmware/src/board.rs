//! Pin mapping and clock constants for the CH32V003 meter board
//!
//! ```text
//! Fin ------> PC2 (TIM1_ETR)
//! PD2 (PWM) --[R1]--+--[Radj]--[uA meter]--> GND
//!                   +--[22uF]--> GND
//! PD3 (LED) --[1k]--|>|--> GND      lit = high range
//! ```

use meter_core::config::{MeterConfig, TICK_TIMEBASE_COUNTS, TIMEBASE_COUNT_US};
#[cfg(feature = "legacy-wrap")]
use meter_core::DutyOverflow;

use crate::ch32v003::{GPIOC_BASE, GPIOD_BASE};

/// Core clock (internal RC oscillator)
pub const HSI_HZ: u32 = 24_000_000;

/// AHB divider programmed at bring-up (`RCC_HPRE_DIV1`)
pub const AHB_DIVIDER: u32 = 1;

/// Timer kernel clock: both timers sit behind the AHB prescaler
pub const TIMER_CLOCK_HZ: u32 = HSI_HZ / AHB_DIVIDER;

/// TIM2 prescaler giving one timebase count per `TIMEBASE_COUNT_US`
pub const TIMEBASE_PRESCALER: u32 = TIMER_CLOCK_HZ / 1_000_000 * TIMEBASE_COUNT_US;

/// Highest ETR edge rate TIM1 can sample (fCK_INT / 4)
pub const ETR_MAX_HZ: u32 = TIMER_CLOCK_HZ / 4;

/// Input prescaler ahead of TIM1
pub const ETR_PRESCALER: u32 = 8;

/// TIM2 auto-reload: 256 counts per gate tick
pub const TIMEBASE_RELOAD: u32 = TICK_TIMEBASE_COUNTS - 1;

/// Measured signal input (TIM1 external trigger)
pub const INPUT_PORT: u32 = GPIOC_BASE;
pub const INPUT_PIN: u8 = 2;

/// PWM analog proxy output
pub const PWM_PORT: u32 = GPIOD_BASE;
pub const PWM_PIN: u8 = 2;

/// Range indicator LED
pub const LED_PORT: u32 = GPIOD_BASE;
pub const LED_PIN: u8 = 3;

/// Shared by both timer interrupts so neither preempts the other
pub const TIMER_IRQ_PRIORITY: u8 = 0x80;

/// Readings buffered between the gate interrupt and the log drain
pub const TELEMETRY_DEPTH: usize = 8;

/// Meter configuration built into this firmware
#[cfg(not(feature = "legacy-wrap"))]
pub const fn meter_config() -> MeterConfig {
    MeterConfig::DEFAULT
}

/// Meter configuration built into this firmware (bit-exact legacy duty wrap)
#[cfg(feature = "legacy-wrap")]
pub const fn meter_config() -> MeterConfig {
    MeterConfig::DEFAULT.with_overflow(DutyOverflow::Wrap)
}
