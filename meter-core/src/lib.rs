#![cfg_attr(not(feature = "std"), no_std)]

//! # Meter Core
//!
//! Gated-counting frequency meter logic for embedded systems.
//! A gate timer closes fixed measurement windows, a software-extended pulse
//! counter accumulates input edges, and each closed window is mapped to an
//! 8-bit duty cycle plus a range flag for a two-decade analog readout.

pub mod config;
pub mod types;
pub mod gate;
pub mod counter;
pub mod mapper;
pub mod registers;
pub mod meter;
pub mod output;
pub mod telemetry;
pub mod hal;

#[cfg(feature = "test-utils")]
pub mod test_utils;


pub use config::*;
pub use types::*;
pub use gate::GateTimer;
pub use counter::PulseAccumulator;
pub use mapper::{classify, threshold};
pub use registers::SharedRegisters;
pub use meter::{initialize, FrequencyMeter};
pub use output::{drive_range_indicator, generate_output_sample, output_level};
pub use telemetry::TelemetryLink;
pub use hal::*;

/// Meter library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration: 409.6 ms gate, full scale of 20 units
pub const fn default_config() -> MeterConfig {
    MeterConfig::DEFAULT
}
