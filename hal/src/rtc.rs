//! Real-time clock abstraction

use core::fmt;
use periph_core::{Error, Signal};

/// Calendar date and time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTime {
    /// 0..=999
    pub millisecond: u16,
    /// 0..=59
    pub second: u8,
    /// 0..=59
    pub minute: u8,
    /// 0..=23
    pub hour: u8,
    /// 1..=31
    pub day: u8,
    /// 1..=12
    pub month: u8,
    pub year: u16,
}

impl DateTime {
    /// Check that every field is within its range and the day exists in
    /// the month
    ///
    /// The year range depends on the hardware and is checked by drivers.
    pub fn is_valid(&self) -> bool {
        self.millisecond < 1000
            && self.second < 60
            && self.minute < 60
            && self.hour < 24
            && self.day >= 1
            && self.day <= days_in_month(self.year, self.month)
    }
}

/// Number of days in `month` of `year`, 0 for a month outside `1..=12`
pub const fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Gregorian leap year rule
pub const fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}",
            self.year, self.month, self.day, self.hour, self.minute, self.second, self.millisecond
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DateTime {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "{=u16}-{=u8}-{=u8} {=u8}:{=u8}:{=u8}.{=u16}",
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.millisecond
        );
    }
}

/// Real-time clock
///
/// Every getter reads the hardware; two consecutive reads may observe a
/// rollover in between. Use [`date_time`](Self::date_time) for a consistent
/// snapshot. Getters return `None` after reporting a read failure through
/// [`error`](Self::error).
///
/// Every setter rewrites the whole time and date representation, so fields
/// other than the one being set keep their value. Single field setters only
/// check the field's own range: `set_day(31)` in February or `set_month(2)`
/// on the 31st is accepted. Use [`set_date_time`](Self::set_date_time) to
/// have the whole date checked against the calendar.
pub trait Rtc {
    fn millisecond(&mut self) -> Option<u16>;
    fn set_millisecond(&mut self, millisecond: u16);

    fn second(&mut self) -> Option<u8>;
    fn set_second(&mut self, second: u8);

    fn minute(&mut self) -> Option<u8>;
    fn set_minute(&mut self, minute: u8);

    fn hour(&mut self) -> Option<u8>;
    fn set_hour(&mut self, hour: u8);

    fn day(&mut self) -> Option<u8>;
    fn set_day(&mut self, day: u8);

    fn month(&mut self) -> Option<u8>;
    fn set_month(&mut self, month: u8);

    fn year(&mut self) -> Option<u16>;
    fn set_year(&mut self, year: u16);

    /// Read all fields at once
    fn date_time(&mut self) -> Option<DateTime>;

    /// Write all fields at once
    ///
    /// Rejected unless [`DateTime::is_valid`] holds.
    fn set_date_time(&mut self, date_time: &DateTime);

    /// Emitted when an operation fails
    fn error(&self) -> &Signal<Error>;
}
