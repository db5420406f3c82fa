//! Property tests for the mapping, accumulation and gating arithmetic

use proptest::prelude::*;

use meter_core::test_utils::signal_simulator::SignalSimulator;
use meter_core::{
    classify, output_level, DutyOverflow, GateTimer, MeterConfig, PulseAccumulator, RangeIndicator,
    SharedRegisters, OVERFLOW_QUANTUM,
};

const CONFIG: MeterConfig = MeterConfig::DEFAULT;

proptest! {
    #[test]
    fn low_range_is_floor_of_low_divisor(count in 0u32..102_400) {
        let reading = classify(count, &CONFIG);
        prop_assert_eq!(reading.range, RangeIndicator::Low);
        prop_assert_eq!(reading.duty as u32, count / (200 * 20 / 10));
    }

    #[test]
    fn high_range_is_floor_of_high_divisor(count in 102_400u32..1_020_000) {
        let reading = classify(count, &CONFIG);
        prop_assert_eq!(reading.range, RangeIndicator::High);
        prop_assert_eq!(reading.duty as u32, count / (200 * 20));
    }

    #[test]
    fn over_range_saturates(count in 1_020_000u32..) {
        let reading = classify(count, &CONFIG);
        prop_assert_eq!(reading.range, RangeIndicator::High);
        prop_assert_eq!(reading.duty, 255);
    }

    #[test]
    fn legacy_wrap_keeps_low_byte(count in any::<u32>()) {
        let legacy = CONFIG.with_overflow(DutyOverflow::Wrap);
        let divisor = if count >= CONFIG.threshold() { 4_000 } else { 400 };
        prop_assert_eq!(classify(count, &legacy).duty, (count / divisor) as u8);
    }

    #[test]
    fn duty_is_monotonic_within_a_range(a in any::<u32>(), b in any::<u32>()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (r_lo, r_hi) = (classify(lo, &CONFIG), classify(hi, &CONFIG));
        if r_lo.range == r_hi.range {
            prop_assert!(r_lo.duty <= r_hi.duty);
        }
    }

    #[test]
    fn overflow_accumulation(wraps in 0u32..2_000, residual in any::<u16>()) {
        let mut acc = PulseAccumulator::new();
        for _ in 0..wraps {
            acc.on_overflow();
        }
        prop_assert_eq!(acc.latch(residual), wraps * OVERFLOW_QUANTUM + residual as u32);
        prop_assert_eq!(acc.pending(), 0);
    }

    #[test]
    fn gate_closes_every_reload_ticks(reload in 1u8..=255, ticks in 0u32..2_000) {
        let mut gate = GateTimer::new(reload);
        let mut closures = 0;
        for _ in 0..ticks {
            if gate.tick() {
                closures += 1;
            }
            prop_assert!(gate.remaining() >= 1 && gate.remaining() <= reload);
        }
        prop_assert_eq!(closures, ticks / reload as u32);
    }

    #[test]
    fn pwm_high_fraction_tracks_duty(duty in any::<u8>()) {
        let high = (0..=u8::MAX).filter(|&c| output_level(c, duty)).count();
        prop_assert_eq!(high, duty as usize + 1);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn no_pulse_loss_across_gate_resets(milli_units in 0u32..25_000, gates in 1usize..4) {
        let regs = SharedRegisters::new();
        let mut sim = SignalSimulator::new(CONFIG, &regs);
        sim.set_frequency_millis(milli_units);

        let total: u64 = sim.run_gates(gates).iter().map(|r| r.count as u64).sum();
        prop_assert_eq!(total, sim.expected_pulses(200 * gates as u32));
        prop_assert_eq!(sim.meter().pending_quanta(), 0);
        prop_assert_eq!(sim.meter().ticks_remaining(), 200);
    }
}
