//! Interrupt and dispatch-loop glue between the timers and the meter core

use heapless::spsc::Consumer;
use meter_core::hal::{OutputLine, PulseCounter, Timebase};
use meter_core::telemetry::{self, TelemetryLink};
use meter_core::{
    drive_range_indicator, generate_output_sample, FrequencyMeter, PendingInterrupts, Reading,
    SharedRegisters,
};

/// Everything the timer interrupts own: meter state, the pulse counter,
/// the range LED and the producer end of the telemetry queue.
pub struct GateIsr<'r, 'q, C, L, const N: usize> {
    meter: FrequencyMeter<'r>,
    counter: C,
    range_led: L,
    telemetry: TelemetryLink<'q, N>,
}

impl<'r, 'q, C, L, const N: usize> GateIsr<'r, 'q, C, L, N>
where
    C: PulseCounter,
    L: OutputLine,
{
    pub fn new(meter: FrequencyMeter<'r>, counter: C, range_led: L, telemetry: TelemetryLink<'q, N>) -> Self {
        Self {
            meter,
            counter,
            range_led,
            telemetry,
        }
    }

    /// Service the latched timer flags (overflow before gate tick). On gate
    /// closure the range LED follows the new reading and the reading is
    /// queued for logging.
    pub fn handle(&mut self, pending: PendingInterrupts) -> Option<Reading> {
        if pending.is_empty() {
            return None;
        }

        match self.meter.service(pending, &mut self.counter) {
            Ok(Some(reading)) => {
                if drive_range_indicator(self.meter.registers(), &mut self.range_led).is_err() {
                    warn!("range LED write failed");
                }
                if !self.telemetry.report(reading) {
                    debug!("telemetry full, {} readings dropped", self.telemetry.dropped());
                }
                Some(reading)
            }
            Ok(None) => None,
            Err(_) => {
                warn!("pulse counter access failed");
                None
            }
        }
    }

    pub fn meter(&self) -> &FrequencyMeter<'r> {
        &self.meter
    }

    pub fn counter_mut(&mut self) -> &mut C {
        &mut self.counter
    }

    pub fn range_led(&self) -> &L {
        &self.range_led
    }

    /// Readings lost to a full telemetry queue
    pub fn dropped_readings(&self) -> u32 {
        self.telemetry.dropped()
    }
}

/// One dispatch-loop iteration of the PWM output
pub fn dispatch<T, L>(timebase: &T, registers: &SharedRegisters, pwm: &mut L)
where
    T: Timebase,
    L: OutputLine,
{
    // No failure path at loop rate; the next iteration rewrites the pin.
    let _ = generate_output_sample(timebase, registers, pwm);
}

/// Log every queued reading; returns how many were drained
#[cfg_attr(not(feature = "defmt"), allow(unused_variables))]
pub fn log_readings<const N: usize>(consumer: &mut Consumer<'_, Reading, N>) -> usize {
    telemetry::drain(consumer, |reading| {
        info!(
            "gate: {} pulses, duty {}, range {}",
            reading.count,
            reading.duty,
            reading.range
        );
    })
}
