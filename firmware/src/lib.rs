#![no_std]

//! Firmware library: CH32V003 drivers, board constants and interrupt glue

#[cfg(test)]
extern crate std;

#[macro_use]
mod log;

pub mod board;
pub mod ch32v003;
pub mod app;

pub use meter_core::*;

pub use crate::app::{dispatch, log_readings, GateIsr};
pub use crate::ch32v003::{GpioOutput, Tim1PulseCounter, Tim2Timebase};
