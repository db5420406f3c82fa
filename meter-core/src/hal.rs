//! Hardware Abstraction Layer for the frequency meter

use embedded_hal::digital::OutputPin;

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// GPIO operation failed
    GpioError,
    /// Timer or counter not running when accessed
    TimerError,
    /// Interrupt enable did not take effect
    InterruptError,
}

#[cfg(feature = "std")]
impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::GpioError => write!(f, "GPIO operation failed"),
            HalError::TimerError => write!(f, "Timer operation failed"),
            HalError::InterruptError => write!(f, "Interrupt configuration failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Hardware edge counter clocked by the measured signal
pub trait PulseCounter {
    type Error: From<HalError>;

    /// Current raw (low 16 bit) count
    fn raw_count(&mut self) -> Result<u16, Self::Error>;

    /// Zero the raw count
    fn reset(&mut self) -> Result<(), Self::Error>;

    /// Read then zero the raw count
    fn take(&mut self) -> Result<u16, Self::Error> {
        let raw = self.raw_count()?;
        self.reset()?;
        Ok(raw)
    }

    /// Enable the wrap interrupt
    fn enable_overflow_interrupt(&mut self) -> Result<(), Self::Error>;
}

/// Free-running 8-bit timebase. Its wrap is the gate tick and its count is
/// the PWM comparison value.
pub trait Timebase {
    type Error: From<HalError>;

    /// Current counter value
    fn counter(&self) -> u8;

    /// Enable the periodic tick interrupt
    fn enable_tick_interrupt(&mut self) -> Result<(), Self::Error>;
}

/// Digital output line (PWM pin or range LED)
pub trait OutputLine {
    type Error: From<HalError>;

    /// Set line level (true = high)
    fn set_state(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Get current line level
    fn get_state(&self) -> Result<bool, Self::Error>;

    /// Toggle line level
    fn toggle(&mut self) -> Result<(), Self::Error> {
        let current = self.get_state()?;
        self.set_state(!current)
    }
}

/// Complete meter HAL interface
pub trait MeterHal {
    type Counter: PulseCounter;
    type Timebase: Timebase;
    type RangeLed: OutputLine;
    type PwmOut: OutputLine;
    type Error: From<HalError>;

    /// Configure clocks, pins and timers
    fn initialize(&mut self) -> Result<(), Self::Error>;

    /// Access to the input pulse counter
    fn pulse_counter(&mut self) -> &mut Self::Counter;

    /// Access to the gate/PWM timebase
    fn timebase(&mut self) -> &mut Self::Timebase;

    /// Access to the range indicator output
    fn range_led(&mut self) -> &mut Self::RangeLed;

    /// Access to the PWM output
    fn pwm_output(&mut self) -> &mut Self::PwmOut;
}

/// Generic implementation for embedded-hal compatible output pins
pub struct EmbeddedHalLine<P> {
    pin: P,
    inverted: bool,
    state: bool,
}

impl<P> EmbeddedHalLine<P>
where
    P: OutputPin,
{
    pub fn new(pin: P, inverted: bool) -> Self {
        Self {
            pin,
            inverted,
            state: false,
        }
    }

    /// Give back the wrapped pin
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P> OutputLine for EmbeddedHalLine<P>
where
    P: OutputPin,
{
    type Error = HalError;

    fn set_state(&mut self, high: bool) -> Result<(), Self::Error> {
        let level = high != self.inverted;
        if level {
            self.pin.set_high().map_err(|_| HalError::GpioError)?;
        } else {
            self.pin.set_low().map_err(|_| HalError::GpioError)?;
        }
        self.state = high;
        Ok(())
    }

    fn get_state(&self) -> Result<bool, Self::Error> {
        // Output pins can't be read back through embedded-hal; report the
        // last level written.
        Ok(self.state)
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    use super::*;

    /// 16-bit counter that wraps like the hardware and latches an overflow flag
    #[derive(Debug, Default)]
    pub struct MockPulseCounter {
        raw: u16,
        overflow_pending: bool,
        interrupt_enabled: bool,
        failed_reads: u32,
    }

    impl MockPulseCounter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Feed input edges; returns the number of wraps they caused
        pub fn advance(&mut self, pulses: u32) -> u32 {
            let total = self.raw as u64 + pulses as u64;
            self.raw = total as u16;
            let wraps = (total >> 16) as u32;
            if wraps > 0 {
                self.overflow_pending = true;
            }
            wraps
        }

        /// Clear and return the overflow flag
        pub fn take_overflow(&mut self) -> bool {
            core::mem::take(&mut self.overflow_pending)
        }

        pub fn set_raw(&mut self, raw: u16) {
            self.raw = raw;
        }

        pub fn interrupt_enabled(&self) -> bool {
            self.interrupt_enabled
        }

        /// Make the next `reads` counter reads fail with `TimerError`
        pub fn fail_reads(&mut self, reads: u32) {
            self.failed_reads = reads;
        }
    }

    impl PulseCounter for MockPulseCounter {
        type Error = HalError;

        fn raw_count(&mut self) -> Result<u16, Self::Error> {
            if self.failed_reads > 0 {
                self.failed_reads -= 1;
                return Err(HalError::TimerError);
            }
            Ok(self.raw)
        }

        fn reset(&mut self) -> Result<(), Self::Error> {
            self.raw = 0;
            Ok(())
        }

        fn enable_overflow_interrupt(&mut self) -> Result<(), Self::Error> {
            self.interrupt_enabled = true;
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    pub struct MockTimebase {
        counter: u8,
        interrupt_enabled: bool,
    }

    impl MockTimebase {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_counter(&mut self, counter: u8) {
            self.counter = counter;
        }

        pub fn interrupt_enabled(&self) -> bool {
            self.interrupt_enabled
        }
    }

    impl Timebase for MockTimebase {
        type Error = HalError;

        fn counter(&self) -> u8 {
            self.counter
        }

        fn enable_tick_interrupt(&mut self) -> Result<(), Self::Error> {
            self.interrupt_enabled = true;
            Ok(())
        }
    }

    /// Output line that records its level and the number of writes
    #[derive(Debug, Default)]
    pub struct MockLine {
        state: bool,
        writes: usize,
    }

    impl MockLine {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn is_high(&self) -> bool {
            self.state
        }

        pub fn writes(&self) -> usize {
            self.writes
        }
    }

    impl OutputLine for MockLine {
        type Error = HalError;

        fn set_state(&mut self, high: bool) -> Result<(), Self::Error> {
            self.state = high;
            self.writes += 1;
            Ok(())
        }

        fn get_state(&self) -> Result<bool, Self::Error> {
            Ok(self.state)
        }
    }

    /// Mock hardware collection
    #[derive(Debug, Default)]
    pub struct MockMeterHal {
        pub counter: MockPulseCounter,
        pub timebase: MockTimebase,
        pub range_led: MockLine,
        pub pwm: MockLine,
        initialized: bool,
    }

    impl MockMeterHal {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn is_initialized(&self) -> bool {
            self.initialized
        }
    }

    impl MeterHal for MockMeterHal {
        type Counter = MockPulseCounter;
        type Timebase = MockTimebase;
        type RangeLed = MockLine;
        type PwmOut = MockLine;
        type Error = HalError;

        fn initialize(&mut self) -> Result<(), Self::Error> {
            self.counter.reset()?;
            self.counter.enable_overflow_interrupt()?;
            self.timebase.enable_tick_interrupt()?;
            self.pwm.set_state(false)?;
            self.initialized = true;
            Ok(())
        }

        fn pulse_counter(&mut self) -> &mut Self::Counter {
            &mut self.counter
        }

        fn timebase(&mut self) -> &mut Self::Timebase {
            &mut self.timebase
        }

        fn range_led(&mut self) -> &mut Self::RangeLed {
            &mut self.range_led
        }

        fn pwm_output(&mut self) -> &mut Self::PwmOut {
            &mut self.pwm
        }
    }
}
