//! PWM abstraction

use periph_core::{Error, Signal};

/// Start level of a PWM cycle
///
/// Selected when a driver is constructed. Per-call inversion is available
/// through [`Pwm::set_with_inversion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PwmMode {
    /// Counting up, the output is active while the counter is below the
    /// pulse value.
    #[default]
    Mode1,
    /// Counting up, the output is inactive while the counter is below the
    /// pulse value.
    Mode2,
}

#[cfg(feature = "defmt")]
impl defmt::Format for PwmMode {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            PwmMode::Mode1 => defmt::write!(fmt, "Mode1"),
            PwmMode::Mode2 => defmt::write!(fmt, "Mode2"),
        }
    }
}

/// PWM channel
///
/// Failures are reported through [`Pwm::error`]; a failed operation leaves
/// the channel state unchanged.
pub trait Pwm {
    /// Set the counter top value, i.e. the value of a 100 % duty cycle
    ///
    /// A top value below the current [`value`](Self::value) is rejected and
    /// leaves the channel unchanged.
    fn set_max_value(&mut self, max_value: u32);

    /// Current counter top value
    fn max_value(&self) -> u32;

    /// Set the pulse value with normal polarity
    fn set(&mut self, value: u32) {
        self.set_with_inversion(value, false);
    }

    /// Set the pulse value, inverting the output polarity for this call only
    ///
    /// Valid whether the channel is running or not. Values above
    /// [`max_value`](Self::max_value) are rejected, never clamped.
    fn set_with_inversion(&mut self, value: u32, inverted: bool);

    /// Last pulse value successfully set
    fn value(&self) -> u32;

    /// Start generating the signal; no-op when already running
    fn start(&mut self);

    /// Stop generating the signal; no-op when already stopped
    fn stop(&mut self);

    /// Whether the signal is being generated
    fn is_enabled(&self) -> bool;

    /// Emitted when an operation fails
    fn error(&self) -> &Signal<Error>;
}
