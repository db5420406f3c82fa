//! PWM synthesis and range indicator drive

use crate::hal::{OutputLine, Timebase};
use crate::registers::SharedRegisters;

/// PWM pin level for a timebase count: high while `counter <= duty`
pub const fn output_level(counter: u8, duty: u8) -> bool {
    counter <= duty
}

/// One non-blocking PWM step for the dispatch loop: compare the free-running
/// timebase against the published duty and drive the PWM line.
pub fn generate_output_sample<T, L>(
    timebase: &T,
    registers: &SharedRegisters,
    pwm: &mut L,
) -> Result<(), L::Error>
where
    T: Timebase,
    L: OutputLine,
{
    pwm.set_state(output_level(timebase.counter(), registers.duty()))
}

/// Copy the published range flag to the indicator line
pub fn drive_range_indicator<L: OutputLine>(registers: &SharedRegisters, led: &mut L) -> Result<(), L::Error> {
    led.set_state(registers.range().is_high())
}
