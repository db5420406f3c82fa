use criterion::{black_box, criterion_group, criterion_main, Criterion};

use meter_core::test_utils::signal_simulator::SignalSimulator;
use meter_core::{classify, output_level, MeterConfig, SharedRegisters};

fn bench_classify(c: &mut Criterion) {
    let config = MeterConfig::DEFAULT;
    c.bench_function("classify sweep", |b| {
        b.iter(|| {
            let mut acc = 0u32;
            for count in (0..1_100_000u32).step_by(1_000) {
                acc += classify(black_box(count), &config).duty as u32;
            }
            acc
        })
    });
}

fn bench_pwm_period(c: &mut Criterion) {
    c.bench_function("pwm period", |b| {
        b.iter(|| (0..=u8::MAX).filter(|&t| output_level(t, black_box(128))).count())
    });
}

fn bench_simulated_gate(c: &mut Criterion) {
    let regs = SharedRegisters::new();
    let mut sim = SignalSimulator::new(MeterConfig::DEFAULT, &regs);
    sim.set_frequency(7);
    c.bench_function("simulated gate window", |b| b.iter(|| sim.run_gate()));
}

criterion_group!(benches, bench_classify, bench_pwm_period, bench_simulated_gate);
criterion_main!(benches);
