//! Error model shared by every peripheral driver
//!
//! An [`Error`] names the class that failed ([`ClassId`]) and the specific
//! failure within that class (an [`ErrorCode`] enumerant stored as `u8`).
//! Errors can carry a short chain of originating errors without allocating.

use core::fmt;
use heapless::Vec;

/// Maximum number of causes an [`Error`] keeps in its chain
pub const MAX_CAUSE_DEPTH: usize = 3;

/// Identifier of the component type that raised an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(pub u16);

impl ClassId {
    /// [`Signal`](crate::Signal) connection management
    pub const SIGNAL: ClassId = ClassId(1);
    /// STM32 timer based PWM driver
    pub const STM32_PWM: ClassId = ClassId(0x0100);
    /// STM32 real-time clock driver
    pub const STM32_RTC: ClassId = ClassId(0x0101);
    /// STM32 DAC driven by DMA
    pub const STM32_ANALOG_OUT_DMA: ClassId = ClassId(0x0102);

    /// First class id available to application defined drivers
    pub const USER: ClassId = ClassId(0x8000);

    /// Create a class id from a raw value
    pub const fn new(id: u16) -> Self {
        ClassId(id)
    }

    /// Get the raw class id value
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Name of a class id known to this crate
    pub const fn name(self) -> Option<&'static str> {
        match self {
            ClassId::SIGNAL => Some("Signal"),
            ClassId::STM32_PWM => Some("Stm32Pwm"),
            ClassId::STM32_RTC => Some("Stm32Rtc"),
            ClassId::STM32_ANALOG_OUT_DMA => Some("Stm32AnalogOutDma"),
            _ => None,
        }
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "ClassId({:#06x})", self.0),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ClassId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "ClassId({=u16:#x})", self.0);
    }
}

/// Error code enumeration scoped to one class
///
/// Implementations are generated with [`error_codes!`](crate::error_codes).
/// Discriminants start at zero and are contiguous.
pub trait ErrorCode: Copy + Into<u8> + TryFrom<u8> {
    /// Class owning these codes
    const CLASS_ID: ClassId;

    /// Enumerant name, e.g. `"SetHalBusy"`
    fn name(self) -> &'static str;
}

/// Identity of one error site: the class and the code within it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Origin {
    pub class_id: ClassId,
    pub error_code: u8,
}

impl Origin {
    /// Check whether this origin is the given code
    pub fn is<C: ErrorCode>(&self, code: C) -> bool {
        self.class_id == C::CLASS_ID && self.error_code == code.into()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.class_id, self.error_code)
    }
}

/// Error raised by a peripheral driver
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Error {
    origin: Origin,
    causes: Vec<Origin, MAX_CAUSE_DEPTH>,
}

impl Error {
    /// Create an error from a typed code
    pub fn new<C: ErrorCode>(code: C) -> Self {
        Self::from_raw(C::CLASS_ID, code.into())
    }

    /// Create an error from raw class and code values
    pub const fn from_raw(class_id: ClassId, error_code: u8) -> Self {
        Self {
            origin: Origin {
                class_id,
                error_code,
            },
            causes: Vec::new(),
        }
    }

    /// Class that raised this error
    pub fn class_id(&self) -> ClassId {
        self.origin.class_id
    }

    /// Raw error code within the class
    pub fn error_code(&self) -> u8 {
        self.origin.error_code
    }

    /// Class and code of this error
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Check whether this error is the given code
    pub fn is<C: ErrorCode>(&self, code: C) -> bool {
        self.origin.is(code)
    }

    /// Decode the error code as `C`, if the error belongs to `C`'s class
    pub fn code<C: ErrorCode>(&self) -> Option<C> {
        if self.origin.class_id != C::CLASS_ID {
            return None;
        }
        C::try_from(self.origin.error_code).ok()
    }

    /// Chain `cause` (and its own causes) behind this error
    ///
    /// Only the nearest [`MAX_CAUSE_DEPTH`] causes are kept.
    pub fn caused_by(mut self, cause: &Error) -> Self {
        self.causes.clear();
        for origin in core::iter::once(&cause.origin).chain(cause.causes.iter()) {
            if self.causes.push(*origin).is_err() {
                break;
            }
        }
        self
    }

    /// Nearest cause, if any
    pub fn cause(&self) -> Option<Origin> {
        self.causes.first().copied()
    }

    /// All recorded causes, nearest first
    pub fn causes(&self) -> impl Iterator<Item = &Origin> + '_ {
        self.causes.iter()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.origin)?;
        for cause in &self.causes {
            write!(f, " <- {}", cause)?;
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "defmt")]
impl defmt::Format for Origin {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}:{=u8}", self.class_id, self.error_code);
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.origin);
        for cause in &self.causes {
            defmt::write!(fmt, " <- {}", cause);
        }
    }
}

#[cfg(feature = "embedded-hal")]
impl embedded_hal::pwm::Error for Error {
    fn kind(&self) -> embedded_hal::pwm::ErrorKind {
        embedded_hal::pwm::ErrorKind::Other
    }
}

/// Define a `#[repr(u8)]` error code enum bound to a [`ClassId`]
///
/// ```
/// use periph_core::{error_codes, ClassId, Error};
///
/// error_codes! {
///     /// Codes raised by a user driver
///     pub enum HeaterError(ClassId::USER) {
///         EnableHalBusy,
///         EnableHalTimeout,
///     }
/// }
///
/// let err = Error::new(HeaterError::EnableHalTimeout);
/// assert_eq!(err.error_code(), 1);
/// assert_eq!(err.code::<HeaterError>(), Some(HeaterError::EnableHalTimeout));
/// ```
#[macro_export]
macro_rules! error_codes {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($class:expr) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )*
        }

        impl $name {
            /// Every code of this class, in discriminant order
            pub const ALL: &'static [$name] = &[$($name::$variant),*];
        }

        impl $crate::ErrorCode for $name {
            const CLASS_ID: $crate::ClassId = $class;

            fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant),)*
                }
            }
        }

        impl ::core::convert::From<$name> for u8 {
            fn from(code: $name) -> u8 {
                code as u8
            }
        }

        impl ::core::convert::TryFrom<u8> for $name {
            type Error = u8;

            fn try_from(raw: u8) -> ::core::result::Result<Self, u8> {
                $name::ALL.get(raw as usize).copied().ok_or(raw)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str($crate::ErrorCode::name(*self))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    error_codes! {
        enum Probe(ClassId::USER) {
            ReadHalError,
            ReadHalBusy,
            WriteHalTimeout,
        }
    }

    error_codes! {
        enum Other(ClassId(0x8001)) {
            ReadHalError,
        }
    }

    #[test]
    fn test_codes_are_contiguous() {
        assert_eq!(u8::from(Probe::ReadHalError), 0);
        assert_eq!(u8::from(Probe::WriteHalTimeout), 2);
        assert_eq!(Probe::try_from(1), Ok(Probe::ReadHalBusy));
        assert_eq!(Probe::try_from(3), Err(3));
    }

    #[test]
    fn test_code_matching_respects_class() {
        let err = Error::new(Probe::ReadHalError);
        assert!(err.is(Probe::ReadHalError));
        assert!(!err.is(Other::ReadHalError));
        assert_eq!(err.code::<Other>(), None);
    }

    #[test]
    fn test_cause_chain_truncates() {
        let mut err = Error::new(Probe::ReadHalError);
        for _ in 0..MAX_CAUSE_DEPTH + 2 {
            err = Error::new(Probe::WriteHalTimeout).caused_by(&err);
        }
        assert_eq!(err.causes().count(), MAX_CAUSE_DEPTH);
        assert!(err.cause().unwrap().is(Probe::WriteHalTimeout));
    }
}
