#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![forbid(unsafe_code)]

//! # periph core
//!
//! Building blocks shared by every periph driver:
//!
//! - [`Error`] identifies which class failed, in which operation and why,
//!   optionally chained to the errors that caused it.
//! - [`Signal`] delivers notifications (completion, errors) to connected
//!   slots without allocating, including from interrupt context.
//! - [`Shared`] makes a driver reachable from its interrupt handler.

pub mod error;
pub mod shared;
pub mod signal;

pub use error::*;
pub use shared::*;
pub use signal::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type used by fallible periph operations
pub type PeriphResult<T> = Result<T, Error>;
