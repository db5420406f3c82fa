#![no_std]
#![no_main]

#[cfg(feature = "defmt")]
use defmt_rtt as _;
use panic_halt as _;

use core::cell::RefCell;
use critical_section::Mutex;
use heapless::spsc::{Consumer, Queue};
use riscv_rt::entry;
use static_cell::StaticCell;

use gatemeter_firmware::board;
use gatemeter_firmware::ch32v003::{self, GpioOutput, Tim1PulseCounter, Tim2Timebase};
#[cfg(feature = "defmt")]
use gatemeter_firmware::log_readings;
use gatemeter_firmware::{dispatch, info, warn, GateIsr};
use meter_core::hal::{PulseCounter, Timebase};
use meter_core::{initialize, Reading, SharedRegisters, TelemetryLink};

// Critical section implementation for RISC-V
struct RiscvCriticalSection;
critical_section::set_impl!(RiscvCriticalSection);

unsafe impl critical_section::Impl for RiscvCriticalSection {
    unsafe fn acquire() -> critical_section::RawRestoreState {
        let mstatus = riscv::register::mstatus::read();
        riscv::register::mstatus::clear_mie();
        mstatus.mie() as u8
    }

    unsafe fn release(was_enabled: critical_section::RawRestoreState) {
        if was_enabled != 0 {
            riscv::register::mstatus::set_mie();
        }
    }
}

type MeterIsr = GateIsr<'static, 'static, Tim1PulseCounter, GpioOutput, { board::TELEMETRY_DEPTH }>;

// ========================================
// Global state
// ========================================

/// Duty cycle and range flag: written by the timer interrupts, read by the loop
static REGISTERS: SharedRegisters = SharedRegisters::new();

/// Interrupt-owned meter state, entered only from the timer vectors
static METER_ISR: Mutex<RefCell<Option<MeterIsr>>> = Mutex::new(RefCell::new(None));

static TELEMETRY: StaticCell<Queue<Reading, { board::TELEMETRY_DEPTH }>> = StaticCell::new();

// ========================================
// Bring-up
// ========================================

/// Clocks, pins and timers; interrupts stay masked
fn hardware_init() -> Tim2Timebase {
    ch32v003::configure_system_clock();
    ch32v003::enable_peripheral_clocks();
    ch32v003::configure_gpio_pins();

    let mut counter = Tim1PulseCounter::new();
    counter.configure();
    if counter.enable_overflow_interrupt().is_err() {
        // Counts above 0xFFFF per gate will read low
        warn!("TIM1 update interrupt did not enable");
    }

    let mut timebase = Tim2Timebase::new();
    timebase.configure();
    if timebase.enable_tick_interrupt().is_err() {
        warn!("TIM2 update interrupt did not enable, no gate ticks");
    }

    ch32v003::enable_timer_interrupts();

    info!("hardware initialized");
    timebase
}

/// Reset the meter state and hand it to the interrupt context
fn meter_init() -> Consumer<'static, Reading, { board::TELEMETRY_DEPTH }> {
    let (producer, consumer) = TELEMETRY.init(Queue::new()).split();

    let meter = initialize(board::meter_config(), &REGISTERS);
    let isr = GateIsr::new(
        meter,
        Tim1PulseCounter::new(),
        GpioOutput::new(board::LED_PORT, board::LED_PIN),
        TelemetryLink::new(producer),
    );

    critical_section::with(|cs| {
        METER_ISR.borrow(cs).replace(Some(isr));
    });

    consumer
}

// ========================================
// Main Application
// ========================================

/// Dispatch loop: PWM comparison as fast as the core allows, plus the
/// telemetry drain when logging is compiled in
fn main_loop(timebase: Tim2Timebase, mut readings: Consumer<'static, Reading, { board::TELEMETRY_DEPTH }>) -> ! {
    let mut pwm = GpioOutput::new(board::PWM_PORT, board::PWM_PIN);

    info!("dispatch loop started");

    loop {
        dispatch(&timebase, &REGISTERS, &mut pwm);

        #[cfg(feature = "defmt")]
        log_readings(&mut readings);
        #[cfg(not(feature = "defmt"))]
        let _ = &mut readings;
    }
}

#[entry]
fn main() -> ! {
    let timebase = hardware_init();
    let readings = meter_init();

    info!(
        "gatemeter: gate {} us, full scale {}",
        board::meter_config().gate_duration_us(),
        board::meter_config().full_scale()
    );

    unsafe { riscv::interrupt::enable() };

    main_loop(timebase, readings)
}

// ========================================
// Interrupt Handlers
// ========================================

/// Both timer vectors land here. Flags are read together so a coincident
/// wrap is serviced ahead of the gate closure.
fn service_timers() {
    let pending = ch32v003::take_pending();
    critical_section::with(|cs| {
        if let Some(isr) = METER_ISR.borrow(cs).borrow_mut().as_mut() {
            isr.handle(pending);
        }
    });
}

/// TIM1 update: input pulse counter wrapped
#[no_mangle]
extern "C" fn TIM1_UP_IRQHandler() {
    service_timers();
}

/// TIM2 update: gate timebase tick
#[no_mangle]
extern "C" fn TIM2_IRQHandler() {
    service_timers();
}
