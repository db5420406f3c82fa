//! Interrupt-side meter state and the gate/overflow handlers

use crate::config::MeterConfig;
use crate::counter::PulseAccumulator;
use crate::gate::GateTimer;
use crate::hal::PulseCounter;
use crate::mapper::classify;
use crate::registers::SharedRegisters;
use crate::types::{PendingInterrupts, Reading};

/// Interrupt-owned meter state.
///
/// Holds the gate downcounter and pulse accumulator, which only the
/// interrupt handlers touch, plus a shared borrow of the registers it
/// publishes to. Handlers run to completion at a single priority level, so
/// `&mut self` is never aliased.
pub struct FrequencyMeter<'r> {
    config: MeterConfig,
    gate: GateTimer,
    pulses: PulseAccumulator,
    registers: &'r SharedRegisters,
    last: Option<Reading>,
}

/// Bring the meter to its reset state: registers zeroed, downcounter loaded,
/// accumulator cleared. Call once before enabling interrupts.
pub fn initialize(config: MeterConfig, registers: &SharedRegisters) -> FrequencyMeter<'_> {
    registers.clear();

    #[cfg(feature = "defmt")]
    defmt::info!(
        "meter: gate {} ticks ({} us), threshold {} pulses",
        config.gate_ticks(),
        config.gate_duration_us(),
        config.threshold()
    );

    FrequencyMeter {
        config,
        gate: GateTimer::new(config.gate_ticks()),
        pulses: PulseAccumulator::new(),
        registers,
        last: None,
    }
}

impl<'r> FrequencyMeter<'r> {
    /// Pulse counter wrapped
    pub fn on_counter_overflow(&mut self) {
        self.pulses.on_overflow();
    }

    /// Timebase ticked. On gate closure the raw counter is read and zeroed,
    /// the window's count is classified and published, and the reading is
    /// returned. If the counter read fails the window is dropped whole:
    /// registers keep the previous reading and the next window starts empty.
    pub fn on_gate_tick<C: PulseCounter>(&mut self, counter: &mut C) -> Result<Option<Reading>, C::Error> {
        if !self.gate.tick() {
            return Ok(None);
        }

        let raw = match counter.take() {
            Ok(raw) => raw,
            Err(e) => {
                self.pulses.clear();
                return Err(e);
            }
        };
        let count = self.pulses.latch(raw);
        let reading = classify(count, &self.config);
        self.registers.publish(&reading);

        #[cfg(feature = "defmt")]
        {
            defmt::trace!("gate closed: {} pulses -> duty {}", reading.count, reading.duty);
            if self.last.map(|last| last.range) != Some(reading.range) {
                defmt::debug!("range -> {:?}", reading.range);
            }
        }

        self.last = Some(reading);
        Ok(Some(reading))
    }

    /// Run the handlers for every latched flag. A wrap that coincides with
    /// gate closure is credited to the closing window: overflow is always
    /// serviced first.
    pub fn service<C: PulseCounter>(
        &mut self,
        pending: PendingInterrupts,
        counter: &mut C,
    ) -> Result<Option<Reading>, C::Error> {
        if pending.counter_overflow {
            self.on_counter_overflow();
        }
        if pending.gate_tick {
            self.on_gate_tick(counter)
        } else {
            Ok(None)
        }
    }

    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    /// Ticks left in the open window
    pub fn ticks_remaining(&self) -> u8 {
        self.gate.remaining()
    }

    /// Overflow quanta accumulated in the open window
    pub fn pending_quanta(&self) -> u32 {
        self.pulses.pending()
    }

    /// Most recent gate reading
    pub fn last_reading(&self) -> Option<Reading> {
        self.last
    }

    pub fn registers(&self) -> &'r SharedRegisters {
        self.registers
    }
}
