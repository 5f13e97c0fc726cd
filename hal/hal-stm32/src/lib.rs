//! STM32 drivers for the periph HAL traits
//!
//! Each driver wraps one configured vendor handle (see [`sys`]), translates
//! every vendor status into a distinct [`Error`](periph_core::Error) code and
//! reports failures and completions through signals.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![forbid(unsafe_code)]

pub mod dac;
pub mod pwm;
pub mod rtc;
pub mod sys;

pub use dac::{DacConfig, DmaState, Stm32AnalogOutDma, Stm32AnalogOutDmaError};
pub use pwm::{PwmConfig, PwmConfigBuilder, Stm32Pwm, Stm32PwmError};
pub use rtc::{Stm32Rtc, Stm32RtcError};
pub use sys::{HalFailure, HalStatus};
