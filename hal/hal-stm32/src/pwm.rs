//! STM32 PWM implementation on a timer output compare channel

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use periph_core::{error_codes, ClassId, Error, PeriphResult, Signal};
use periph_hal::pwm::{Pwm, PwmMode};

use crate::sys::{HalFailure, OcConfig, OcMode, OcPolarity, TimChannel, TimHandle};

error_codes! {
    /// Error codes of [`Stm32Pwm`]
    pub enum Stm32PwmError(ClassId::STM32_PWM) {
        SetHalError,
        SetHalBusy,
        SetHalTimeout,
        StartHalError,
        StartHalBusy,
        StartHalTimeout,
        StopHalError,
        StopHalBusy,
        StopHalTimeout,
        /// Pulse value above the counter top value
        SetValueOutOfRange,
        /// Counter top value below the current pulse value
        SetMaxValueBelowValue,
    }
}

impl Stm32PwmError {
    fn set(failure: HalFailure) -> Self {
        match failure {
            HalFailure::Error => Self::SetHalError,
            HalFailure::Busy => Self::SetHalBusy,
            HalFailure::Timeout => Self::SetHalTimeout,
        }
    }

    fn start(failure: HalFailure) -> Self {
        match failure {
            HalFailure::Error => Self::StartHalError,
            HalFailure::Busy => Self::StartHalBusy,
            HalFailure::Timeout => Self::StartHalTimeout,
        }
    }

    fn stop(failure: HalFailure) -> Self {
        match failure {
            HalFailure::Error => Self::StopHalError,
            HalFailure::Busy => Self::StopHalBusy,
            HalFailure::Timeout => Self::StopHalTimeout,
        }
    }
}

/// PWM channel configuration
#[derive(Debug, Clone)]
pub struct PwmConfig {
    pub channel: TimChannel,
    /// Output compare fast mode
    pub fast_mode: bool,
    pub mode: PwmMode,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            channel: TimChannel::Channel1,
            fast_mode: false,
            mode: PwmMode::Mode1,
        }
    }
}

impl PwmConfig {
    /// Create a configuration builder
    pub fn builder() -> PwmConfigBuilder {
        PwmConfigBuilder::default()
    }
}

/// Builder for [`PwmConfig`]
#[derive(Debug, Clone, Default)]
pub struct PwmConfigBuilder {
    config: PwmConfig,
}

impl PwmConfigBuilder {
    /// Timer channel driving the output
    pub fn channel(mut self, channel: TimChannel) -> Self {
        self.config.channel = channel;
        self
    }

    /// Enable output compare fast mode
    pub fn fast_mode(mut self, enabled: bool) -> Self {
        self.config.fast_mode = enabled;
        self
    }

    /// Start level of a PWM cycle
    pub fn mode(mut self, mode: PwmMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Finish the configuration
    pub fn build(self) -> PwmConfig {
        self.config
    }
}

/// [`Pwm`] implementation for STM32 timers
///
/// The counter top value lives in the timer's auto-reload register, so it is
/// shared by every channel of the timer.
pub struct Stm32Pwm<'a, H: TimHandle> {
    handle: &'a mut H,
    config: PwmConfig,
    value: u32,
    enabled: bool,
    error: Signal<Error>,
}

impl<'a, H: TimHandle> Stm32Pwm<'a, H> {
    /// Create a stopped PWM channel on a configured timer
    pub fn new(handle: &'a mut H, config: PwmConfig) -> Self {
        Self {
            handle,
            config,
            value: 0,
            enabled: false,
            error: Signal::new(),
        }
    }

    pub fn config(&self) -> &PwmConfig {
        &self.config
    }

    /// Set the pulse value, returning the failure instead of emitting it
    pub fn try_set(&mut self, value: u32, inverted: bool) -> PeriphResult<()> {
        if value > self.handle.autoreload() {
            return Err(Error::new(Stm32PwmError::SetValueOutOfRange));
        }
        let oc = OcConfig {
            mode: match self.config.mode {
                PwmMode::Mode1 => OcMode::Pwm1,
                PwmMode::Mode2 => OcMode::Pwm2,
            },
            pulse: value,
            polarity: if inverted {
                OcPolarity::Low
            } else {
                OcPolarity::High
            },
            fast_mode: self.config.fast_mode,
        };
        self.handle
            .pwm_config_channel(&oc, self.config.channel)
            .into_result()
            .map_err(|f| Error::new(Stm32PwmError::set(f)))?;
        self.value = value;
        Ok(())
    }

    /// Set the counter top value, returning the failure instead of emitting it
    ///
    /// A top value below the current pulse value is rejected.
    pub fn try_set_max_value(&mut self, max_value: u32) -> PeriphResult<()> {
        if max_value < self.value {
            return Err(Error::new(Stm32PwmError::SetMaxValueBelowValue));
        }
        self.handle.set_autoreload(max_value);
        Ok(())
    }

    /// Start the channel, returning the failure instead of emitting it
    pub fn try_start(&mut self) -> PeriphResult<()> {
        if self.enabled {
            return Ok(());
        }
        self.handle
            .pwm_start(self.config.channel)
            .into_result()
            .map_err(|f| Error::new(Stm32PwmError::start(f)))?;
        self.enabled = true;
        log::debug!("pwm {:?}: started", self.config.channel);
        Ok(())
    }

    /// Stop the channel, returning the failure instead of emitting it
    pub fn try_stop(&mut self) -> PeriphResult<()> {
        if !self.enabled {
            return Ok(());
        }
        self.handle
            .pwm_stop(self.config.channel)
            .into_result()
            .map_err(|f| Error::new(Stm32PwmError::stop(f)))?;
        self.enabled = false;
        log::debug!("pwm {:?}: stopped", self.config.channel);
        Ok(())
    }

    fn report(&self, result: PeriphResult<()>) {
        if let Err(error) = result {
            log::warn!("pwm {:?}: {}", self.config.channel, error);
            self.error.emit(error);
        }
    }
}

impl<H: TimHandle> Pwm for Stm32Pwm<'_, H> {
    fn set_max_value(&mut self, max_value: u32) {
        let result = self.try_set_max_value(max_value);
        self.report(result);
    }

    fn max_value(&self) -> u32 {
        self.handle.autoreload()
    }

    fn set_with_inversion(&mut self, value: u32, inverted: bool) {
        let result = self.try_set(value, inverted);
        self.report(result);
    }

    fn value(&self) -> u32 {
        self.value
    }

    fn start(&mut self) {
        let result = self.try_start();
        self.report(result);
    }

    fn stop(&mut self) {
        let result = self.try_stop();
        self.report(result);
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn error(&self) -> &Signal<Error> {
        &self.error
    }
}

impl<H: TimHandle> ErrorType for Stm32Pwm<'_, H> {
    type Error = Error;
}

/// Duty cycles are expressed on the timer's own scale, capped at `u16::MAX`.
/// Errors are returned, not emitted on [`Pwm::error`].
impl<H: TimHandle> SetDutyCycle for Stm32Pwm<'_, H> {
    fn max_duty_cycle(&self) -> u16 {
        u16::try_from(self.handle.autoreload()).unwrap_or(u16::MAX)
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let max = self.handle.autoreload();
        let value = if max <= u32::from(u16::MAX) {
            u32::from(duty)
        } else {
            (u64::from(duty) * u64::from(max) / u64::from(u16::MAX)) as u32
        };
        self.try_set(value, false)
    }
}
