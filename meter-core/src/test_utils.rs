//! Test utilities for meter core functionality

#[cfg(feature = "test-utils")]
pub mod signal_simulator {
    //! Synthetic input signal driving a meter through mock hardware

    use crate::config::{MeterConfig, TICK_COUNTS_PER_UNIT};
    use crate::hal::mock::MockMeterHal;
    use crate::hal::MeterHal;
    use crate::meter::{initialize, FrequencyMeter};
    use crate::output::{drive_range_indicator, generate_output_sample};
    use crate::registers::SharedRegisters;
    use crate::types::{PendingInterrupts, Reading};

    /// Largest edge burst fed between overflow checks; keeps at most one
    /// wrap pending, as the real counter interrupt does.
    const MAX_BURST: u32 = 0x8000;

    /// Feeds a constant input frequency into the meter one gate tick at a
    /// time, servicing interrupts in hardware order.
    pub struct SignalSimulator<'r> {
        meter: FrequencyMeter<'r>,
        hal: MockMeterHal,
        milli_units: u32,
        carry: u32,
        ticks: u64,
    }

    impl<'r> SignalSimulator<'r> {
        /// Bring up mock hardware and a freshly initialized meter
        pub fn new(config: MeterConfig, registers: &'r SharedRegisters) -> Self {
            let mut hal = MockMeterHal::new();
            hal.initialize().unwrap();
            Self {
                meter: initialize(config, registers),
                hal,
                milli_units: 0,
                carry: 0,
                ticks: 0,
            }
        }

        /// Input frequency in whole units
        pub fn set_frequency(&mut self, units: u32) {
            self.set_frequency_millis(units * 1000);
        }

        /// Input frequency in thousandths of a unit
        pub fn set_frequency_millis(&mut self, milli_units: u32) {
            self.milli_units = milli_units;
            self.carry = 0;
        }

        /// Expected pulses for the current input over `ticks` gate ticks
        pub fn expected_pulses(&self, ticks: u32) -> u64 {
            self.milli_units as u64 * TICK_COUNTS_PER_UNIT as u64 * ticks as u64 / 1000
        }

        /// Advance one timebase period. Returns the reading if the gate closed.
        pub fn step_tick(&mut self) -> Option<Reading> {
            let scaled = self.milli_units as u64 * TICK_COUNTS_PER_UNIT as u64 + self.carry as u64;
            let mut pulses = (scaled / 1000) as u32;
            self.carry = (scaled % 1000) as u32;

            while pulses > 0 {
                let burst = pulses.min(MAX_BURST);
                self.hal.counter.advance(burst);
                pulses -= burst;
                if self.hal.counter.take_overflow() {
                    let overflow = PendingInterrupts { counter_overflow: true, gate_tick: false };
                    self.meter.service(overflow, &mut self.hal.counter).unwrap();
                }
            }

            self.ticks += 1;
            let tick = PendingInterrupts { counter_overflow: false, gate_tick: true };
            let reading = self.meter.service(tick, &mut self.hal.counter).unwrap();
            if reading.is_some() {
                drive_range_indicator(self.meter.registers(), &mut self.hal.range_led).unwrap();
            }
            reading
        }

        /// Run until the open gate closes
        pub fn run_gate(&mut self) -> Reading {
            loop {
                if let Some(reading) = self.step_tick() {
                    return reading;
                }
            }
        }

        /// Run `n` consecutive gate windows
        pub fn run_gates(&mut self, n: usize) -> Vec<Reading> {
            (0..n).map(|_| self.run_gate()).collect()
        }

        /// Sweep the timebase through one PWM period and count high samples
        pub fn pwm_high_samples(&mut self) -> usize {
            let mut high = 0;
            for counter in 0..=u8::MAX {
                self.hal.timebase.set_counter(counter);
                generate_output_sample(&self.hal.timebase, self.meter.registers(), &mut self.hal.pwm)
                    .unwrap();
                if self.hal.pwm.is_high() {
                    high += 1;
                }
            }
            high
        }

        pub fn meter(&self) -> &FrequencyMeter<'r> {
            &self.meter
        }

        pub fn hal(&self) -> &MockMeterHal {
            &self.hal
        }

        pub fn hal_mut(&mut self) -> &mut MockMeterHal {
            &mut self.hal
        }

        /// Timebase ticks elapsed since start
        pub fn ticks(&self) -> u64 {
            self.ticks
        }
    }
}
