//! Hardware Abstraction Layer (HAL) for embedded peripherals
//!
//! This crate defines vendor-agnostic capability traits. Application code
//! depends on these traits only; concrete drivers bind them to a vendor
//! hardware handle and report failures and completions through
//! [`Signal`](periph_core::Signal)s.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod analog_out_dma;
pub mod pwm;
pub mod rtc;

// Re-export commonly used types
pub use analog_out_dma::AnalogOutDma;
pub use periph_core::{Error, Signal};
pub use pwm::{Pwm, PwmMode};
pub use rtc::{days_in_month, is_leap_year, DateTime, Rtc};
