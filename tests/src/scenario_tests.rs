//! End-to-end measurement scenarios over the simulated signal path

use rstest::rstest;

use meter_core::test_utils::signal_simulator::SignalSimulator;
use meter_core::{DutyOverflow, MeterConfig, RangeIndicator, SharedRegisters};

#[rstest]
#[case::zero_input(0, 0, RangeIndicator::Low, 0)]
#[case::one_unit(1_000, 51_200, RangeIndicator::Low, 128)]
#[case::one_and_a_half_units(1_500, 76_800, RangeIndicator::Low, 192)]
#[case::threshold(2_000, 102_400, RangeIndicator::High, 25)]
#[case::mid_high_range(10_000, 512_000, RangeIndicator::High, 128)]
#[case::full_scale(20_000, 1_024_000, RangeIndicator::High, 255)]
fn measures_constant_input(
    #[case] milli_units: u32,
    #[case] count: u32,
    #[case] range: RangeIndicator,
    #[case] duty: u8,
) {
    let regs = SharedRegisters::new();
    let mut sim = SignalSimulator::new(MeterConfig::DEFAULT, &regs);
    sim.set_frequency_millis(milli_units);

    let reading = sim.run_gate();
    assert_eq!(reading.count, count);
    assert_eq!(reading.range, range);
    assert_eq!(reading.duty, duty);

    assert_eq!(regs.duty(), duty);
    assert_eq!(regs.range(), range);
    assert_eq!(sim.hal().range_led.is_high(), range.is_high());
    assert_eq!(sim.pwm_high_samples(), duty as usize + 1);
}

#[rstest]
#[case(DutyOverflow::Saturate, 255)]
#[case(DutyOverflow::Wrap, 0)]
fn over_range_duty_policy(#[case] overflow: DutyOverflow, #[case] duty: u8) {
    let regs = SharedRegisters::new();
    let config = MeterConfig::DEFAULT.with_overflow(overflow);
    let mut sim = SignalSimulator::new(config, &regs);
    sim.set_frequency(20);

    let reading = sim.run_gate();
    assert_eq!(reading.count, 1_024_000);
    assert_eq!(reading.range, RangeIndicator::High);
    assert_eq!(reading.duty, duty);
}

#[rstest]
fn first_reading_waits_for_full_gate() {
    let regs = SharedRegisters::new();
    let mut sim = SignalSimulator::new(MeterConfig::DEFAULT, &regs);
    sim.set_frequency(5);

    for _ in 0..199 {
        assert!(sim.step_tick().is_none());
        assert_eq!(regs.duty(), 0);
        assert_eq!(regs.range(), RangeIndicator::Low);
    }
    let reading = sim.step_tick().expect("gate closes on tick 200");
    assert_eq!(reading.duty, 64);
    assert_eq!(sim.ticks(), 200);
}

#[rstest]
fn range_indicator_follows_input_changes() {
    let regs = SharedRegisters::new();
    let mut sim = SignalSimulator::new(MeterConfig::DEFAULT, &regs);

    sim.set_frequency(3);
    assert_eq!(sim.run_gate().range, RangeIndicator::High);
    assert!(sim.hal().range_led.is_high());

    sim.set_frequency(1);
    assert_eq!(sim.run_gate().range, RangeIndicator::Low);
    assert!(!sim.hal().range_led.is_high());
    assert_eq!(regs.duty(), 128);
}

#[rstest]
fn consecutive_windows_are_independent() {
    let regs = SharedRegisters::new();
    let mut sim = SignalSimulator::new(MeterConfig::DEFAULT, &regs);
    sim.set_frequency(4);

    let readings = sim.run_gates(5);
    assert!(readings.iter().all(|r| r.count == 204_800 && r.duty == 51));
    assert_eq!(sim.meter().last_reading(), readings.last().copied());
}

#[rstest]
#[case(MeterConfig::new(100, 20).unwrap(), 1, 25_600, 128)]
#[case(MeterConfig::new(200, 10).unwrap(), 1, 51_200, 25)]
#[case(MeterConfig::new(200, 100).unwrap(), 5, 256_000, 128)]
fn alternate_configurations(
    #[case] config: MeterConfig,
    #[case] units: u32,
    #[case] count: u32,
    #[case] duty: u8,
) {
    let regs = SharedRegisters::new();
    let mut sim = SignalSimulator::new(config, &regs);
    sim.set_frequency(units);

    let reading = sim.run_gate();
    assert_eq!(reading.count, count);
    assert_eq!(reading.duty, duty);
}
