//! CH32V003 register-level drivers for the meter peripherals
//!
//! TIM1 counts the input signal on ETR (PC2) through the /8 external
//! prescaler and wraps at 16 bits. TIM2 is the 8-bit timebase: its update
//! event is the gate tick and its running count is the PWM comparator.

use meter_core::hal::{HalError, OutputLine, PulseCounter, Timebase};
use meter_core::PendingInterrupts;

use crate::board;

// ========================================
// Memory map and register offsets
// ========================================

pub const RCC_BASE: u32 = 0x4002_1000;
pub const GPIOC_BASE: u32 = 0x4001_1000;
pub const GPIOD_BASE: u32 = 0x4001_1400;
pub const TIM1_BASE: u32 = 0x4001_2C00;
pub const TIM2_BASE: u32 = 0x4000_0000;
pub const PFIC_BASE: u32 = 0xE000_E000;

/// RCC register offsets
const RCC_CFGR0: u32 = 0x04;
const RCC_APB2PCENR: u32 = 0x18;
const RCC_APB1PCENR: u32 = 0x1C;

const RCC_IOPCEN: u32 = 1 << 4;
const RCC_IOPDEN: u32 = 1 << 5;
const RCC_TIM1EN: u32 = 1 << 11;
const RCC_TIM2EN: u32 = 1 << 0;

/// CFGR0 HPRE field; resets to SYSCLK/3
const RCC_HPRE_MASK: u32 = 0xF << 4;
pub const RCC_HPRE_DIV1: u32 = 0b0000 << 4;

/// GPIO register offsets
const GPIO_CFGLR: u32 = 0x00;
const GPIO_OUTDR: u32 = 0x0C;
const GPIO_BSHR: u32 = 0x10;

/// CFGLR nibbles
const PIN_INPUT_FLOATING: u32 = 0x4;
const PIN_OUTPUT_PUSH_PULL: u32 = 0x3;

/// Timer register offsets (TIM1 and TIM2 share the layout)
const TIM_CTLR1: u32 = 0x00;
const TIM_SMCFGR: u32 = 0x08;
const TIM_DMAINTENR: u32 = 0x0C;
const TIM_INTFR: u32 = 0x10;
const TIM_SWEVGR: u32 = 0x14;
const TIM_CNT: u32 = 0x24;
const TIM_PSC: u32 = 0x28;
const TIM_ATRLR: u32 = 0x2C;

const TIM_CEN: u32 = 1 << 0;
const TIM_URS: u32 = 1 << 2;
const TIM_UIE: u32 = 1 << 0;
const TIM_UIF: u32 = 1 << 0;
const TIM_UG: u32 = 1 << 0;

/// SMCFGR: external clock mode 2, ETR prescaler /8
const TIM_SMCFGR_ECE: u32 = 1 << 14;
const TIM_SMCFGR_ETPS_DIV8: u32 = 0b11 << 12;

/// PFIC interrupt enable (IRQs 32..63) and priority registers
const PFIC_IENR2: u32 = 0x104;
const PFIC_IPRIOR: u32 = 0x400;

pub const TIM1_UP_IRQN: u32 = 35;
pub const TIM2_IRQN: u32 = 38;

// ========================================
// Raw register access
// ========================================

#[inline(always)]
fn read_reg(addr: u32) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

#[inline(always)]
fn write_reg(addr: u32, value: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

#[inline(always)]
fn modify_reg(addr: u32, f: impl FnOnce(u32) -> u32) {
    write_reg(addr, f(read_reg(addr)));
}

/// Clear a timer's update flag if set; returns whether it was set
fn take_update_flag(timer_base: u32) -> bool {
    let intfr = timer_base + TIM_INTFR;
    if read_reg(intfr) & TIM_UIF != 0 {
        // rc_w0: writing 0 clears, 1 leaves other flags untouched
        write_reg(intfr, !TIM_UIF);
        true
    } else {
        false
    }
}

/// Read and clear both timer update flags
pub fn take_pending() -> PendingInterrupts {
    PendingInterrupts {
        counter_overflow: take_update_flag(TIM1_BASE),
        gate_tick: take_update_flag(TIM2_BASE),
    }
}

// ========================================
// Bring-up
// ========================================

/// Run HCLK, and with it both timers, at the undivided core clock
pub fn configure_system_clock() {
    modify_reg(RCC_BASE + RCC_CFGR0, |v| (v & !RCC_HPRE_MASK) | RCC_HPRE_DIV1);
}

/// Enable GPIOC, GPIOD, TIM1 and TIM2 clocks
pub fn enable_peripheral_clocks() {
    modify_reg(RCC_BASE + RCC_APB2PCENR, |v| v | RCC_IOPCEN | RCC_IOPDEN | RCC_TIM1EN);
    modify_reg(RCC_BASE + RCC_APB1PCENR, |v| v | RCC_TIM2EN);
}

fn configure_pin(port: u32, pin: u8, mode: u32) {
    let shift = pin as u32 * 4;
    modify_reg(port + GPIO_CFGLR, |v| (v & !(0xF << shift)) | (mode << shift));
}

/// Signal input floating, PWM and range LED as push-pull outputs driven low
pub fn configure_gpio_pins() {
    configure_pin(board::INPUT_PORT, board::INPUT_PIN, PIN_INPUT_FLOATING);

    write_reg(board::PWM_PORT + GPIO_BSHR, 1 << (board::PWM_PIN as u32 + 16));
    configure_pin(board::PWM_PORT, board::PWM_PIN, PIN_OUTPUT_PUSH_PULL);

    write_reg(board::LED_PORT + GPIO_BSHR, 1 << (board::LED_PIN as u32 + 16));
    configure_pin(board::LED_PORT, board::LED_PIN, PIN_OUTPUT_PUSH_PULL);
}

/// Set UIE and confirm it stuck
fn enable_update_interrupt(timer_base: u32) -> Result<(), HalError> {
    let dmaintenr = timer_base + TIM_DMAINTENR;
    modify_reg(dmaintenr, |v| v | TIM_UIE);
    if read_reg(dmaintenr) & TIM_UIE != 0 {
        Ok(())
    } else {
        Err(HalError::InterruptError)
    }
}

/// Counter register of a running timer
fn running_count(timer_base: u32) -> Result<u32, HalError> {
    if read_reg(timer_base + TIM_CTLR1) & TIM_CEN == 0 {
        return Err(HalError::TimerError);
    }
    Ok(read_reg(timer_base + TIM_CNT))
}

/// Reload prescalers with an update event, then drop the flag it raised
fn force_update(timer_base: u32) {
    write_reg(timer_base + TIM_SWEVGR, TIM_UG);
    write_reg(timer_base + TIM_INTFR, !TIM_UIF);
}

/// Enable TIM1_UP and TIM2 in the PFIC at one shared priority
pub fn enable_timer_interrupts() {
    for irqn in [TIM1_UP_IRQN, TIM2_IRQN] {
        let prio = PFIC_BASE + PFIC_IPRIOR + irqn;
        unsafe { core::ptr::write_volatile(prio as *mut u8, board::TIMER_IRQ_PRIORITY) };
    }
    modify_reg(PFIC_BASE + PFIC_IENR2, |v| {
        v | (1 << (TIM1_UP_IRQN - 32)) | (1 << (TIM2_IRQN - 32))
    });
}

// ========================================
// TIM1: input pulse counter
// ========================================

/// TIM1 clocked from ETR, wrapping at 0xFFFF
pub struct Tim1PulseCounter {
    _private: (),
}

impl Tim1PulseCounter {
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// External clock mode 2 with /8 prescaler, full 16-bit range
    pub fn configure(&mut self) {
        write_reg(TIM1_BASE + TIM_CTLR1, 0);
        write_reg(TIM1_BASE + TIM_SMCFGR, TIM_SMCFGR_ECE | TIM_SMCFGR_ETPS_DIV8);
        write_reg(TIM1_BASE + TIM_PSC, 0);
        write_reg(TIM1_BASE + TIM_ATRLR, 0xFFFF);
        force_update(TIM1_BASE);
        write_reg(TIM1_BASE + TIM_CNT, 0);
        // URS: only a real wrap raises the update flag
        write_reg(TIM1_BASE + TIM_CTLR1, TIM_URS | TIM_CEN);
    }
}

impl PulseCounter for Tim1PulseCounter {
    type Error = HalError;

    fn raw_count(&mut self) -> Result<u16, Self::Error> {
        running_count(TIM1_BASE).map(|cnt| cnt as u16)
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        write_reg(TIM1_BASE + TIM_CNT, 0);
        Ok(())
    }

    fn enable_overflow_interrupt(&mut self) -> Result<(), Self::Error> {
        enable_update_interrupt(TIM1_BASE)
    }
}

// ========================================
// TIM2: gate tick and PWM timebase
// ========================================

/// TIM2 counting 0..=255 at 125 kHz
pub struct Tim2Timebase {
    _private: (),
}

impl Tim2Timebase {
    pub const fn new() -> Self {
        Self { _private: () }
    }

    pub fn configure(&mut self) {
        write_reg(TIM2_BASE + TIM_CTLR1, 0);
        write_reg(TIM2_BASE + TIM_PSC, board::TIMEBASE_PRESCALER - 1);
        write_reg(TIM2_BASE + TIM_ATRLR, board::TIMEBASE_RELOAD);
        force_update(TIM2_BASE);
        write_reg(TIM2_BASE + TIM_CNT, 0);
        write_reg(TIM2_BASE + TIM_CTLR1, TIM_URS | TIM_CEN);
    }
}

impl Timebase for Tim2Timebase {
    type Error = HalError;

    fn counter(&self) -> u8 {
        read_reg(TIM2_BASE + TIM_CNT) as u8
    }

    fn enable_tick_interrupt(&mut self) -> Result<(), Self::Error> {
        enable_update_interrupt(TIM2_BASE)
    }
}

// ========================================
// GPIO outputs
// ========================================

/// Push-pull output pin written through BSHR
pub struct GpioOutput {
    port: u32,
    pin: u8,
}

impl GpioOutput {
    pub const fn new(port: u32, pin: u8) -> Self {
        Self { port, pin }
    }
}

impl OutputLine for GpioOutput {
    type Error = HalError;

    fn set_state(&mut self, high: bool) -> Result<(), Self::Error> {
        let bit = if high { self.pin as u32 } else { self.pin as u32 + 16 };
        write_reg(self.port + GPIO_BSHR, 1 << bit);
        Ok(())
    }

    fn get_state(&self) -> Result<bool, Self::Error> {
        Ok(read_reg(self.port + GPIO_OUTDR) & (1 << self.pin) != 0)
    }
}
