//! Boundary to the ST vendor HAL
//!
//! The vendor driver is opaque to this crate. Each handle trait mirrors the
//! subset of vendor calls a driver forwards to, and every fallible call
//! returns the vendor's four-valued [`HalStatus`]. Board support code
//! implements these traits on top of the C HAL handles.

/// Status returned by every vendor call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HalStatus {
    Ok = 0,
    Error = 1,
    Busy = 2,
    Timeout = 3,
}

/// Failing subset of [`HalStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalFailure {
    Error,
    Busy,
    Timeout,
}

impl HalStatus {
    /// Split the status into success or failure reason
    pub fn into_result(self) -> Result<(), HalFailure> {
        match self {
            HalStatus::Ok => Ok(()),
            HalStatus::Error => Err(HalFailure::Error),
            HalStatus::Busy => Err(HalFailure::Busy),
            HalStatus::Timeout => Err(HalFailure::Timeout),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for HalFailure {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            HalFailure::Error => defmt::write!(fmt, "HalError"),
            HalFailure::Busy => defmt::write!(fmt, "HalBusy"),
            HalFailure::Timeout => defmt::write!(fmt, "HalTimeout"),
        }
    }
}

// --- Timer ---

/// Timer capture/compare channel (`TIM_CHANNEL_x`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimChannel {
    Channel1,
    Channel2,
    Channel3,
    Channel4,
}

/// Output compare mode (`TIM_OCMODE_PWMx`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcMode {
    Pwm1,
    Pwm2,
}

/// Output compare polarity (`TIM_OCPOLARITY_x`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcPolarity {
    High,
    Low,
}

/// Output compare channel configuration (`TIM_OC_InitTypeDef`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcConfig {
    pub mode: OcMode,
    pub pulse: u32,
    pub polarity: OcPolarity,
    pub fast_mode: bool,
}

/// Configured timer instance (`TIM_HandleTypeDef`)
pub trait TimHandle {
    /// Auto-reload register value (`__HAL_TIM_GET_AUTORELOAD`)
    fn autoreload(&self) -> u32;

    /// Write the auto-reload register (`__HAL_TIM_SET_AUTORELOAD`)
    fn set_autoreload(&mut self, value: u32);

    /// `HAL_TIM_PWM_ConfigChannel`; a running channel keeps running
    fn pwm_config_channel(&mut self, config: &OcConfig, channel: TimChannel) -> HalStatus;

    /// `HAL_TIM_PWM_Start`
    fn pwm_start(&mut self, channel: TimChannel) -> HalStatus;

    /// `HAL_TIM_PWM_Stop`
    fn pwm_stop(&mut self, channel: TimChannel) -> HalStatus;
}

// --- RTC ---

/// Time of day in binary format (`RTC_TimeTypeDef`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RtcTime {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    /// Synchronous prescaler down-counter
    pub sub_seconds: u32,
    /// Synchronous prescaler value, i.e. sub-second ticks per second minus one
    pub second_fraction: u32,
}

/// Date in binary format (`RTC_DateTypeDef`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RtcDate {
    /// 1 = Monday .. 7 = Sunday
    pub week_day: u8,
    pub month: u8,
    pub date: u8,
    /// Years since 2000
    pub year: u8,
}

/// Configured RTC instance (`RTC_HandleTypeDef`)
///
/// As on the hardware, the date must be read after the time to unlock the
/// shadow registers.
pub trait RtcHandle {
    /// `HAL_RTC_GetTime`
    fn get_time(&mut self, time: &mut RtcTime) -> HalStatus;

    /// `HAL_RTC_SetTime`
    fn set_time(&mut self, time: &RtcTime) -> HalStatus;

    /// `HAL_RTC_GetDate`
    fn get_date(&mut self, date: &mut RtcDate) -> HalStatus;

    /// `HAL_RTC_SetDate`
    fn set_date(&mut self, date: &RtcDate) -> HalStatus;
}

// --- DAC ---

/// DAC output channel (`DAC_CHANNEL_x`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DacChannel {
    Channel1,
    Channel2,
}

/// Sample data alignment (`DAC_ALIGN_x`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DacAlignment {
    Right8,
    Right12,
    Left12,
}

impl DacAlignment {
    /// Bytes per sample in the DMA buffer
    pub const fn stride(self) -> usize {
        match self {
            DacAlignment::Right8 => 1,
            DacAlignment::Right12 | DacAlignment::Left12 => 2,
        }
    }
}

/// Configured DAC instance with its DMA stream (`DAC_HandleTypeDef`)
pub trait DacHandle {
    /// `HAL_DAC_Start_DMA`; `length` counts samples, not bytes
    fn start_dma(
        &mut self,
        channel: DacChannel,
        data: &'static [u8],
        length: usize,
        alignment: DacAlignment,
    ) -> HalStatus;

    /// `HAL_DAC_Stop_DMA`
    fn stop_dma(&mut self, channel: DacChannel) -> HalStatus;
}
