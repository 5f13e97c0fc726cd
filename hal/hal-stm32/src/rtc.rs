//! STM32 real-time clock implementation

use periph_core::{error_codes, ClassId, Error, PeriphResult, Signal};
use periph_hal::rtc::{DateTime, Rtc};

use crate::sys::{HalFailure, RtcDate, RtcHandle, RtcTime};

/// Year stored as zero in the RTC year register
pub const BASE_YEAR: u16 = 2000;

error_codes! {
    /// Error codes of [`Stm32Rtc`]
    pub enum Stm32RtcError(ClassId::STM32_RTC) {
        SetMillisecondHalError,
        SetMillisecondHalBusy,
        SetMillisecondHalTimeout,
        SetSecondHalError,
        SetSecondHalBusy,
        SetSecondHalTimeout,
        SetMinuteHalError,
        SetMinuteHalBusy,
        SetMinuteHalTimeout,
        SetHourHalError,
        SetHourHalBusy,
        SetHourHalTimeout,
        SetDayHalError,
        SetDayHalBusy,
        SetDayHalTimeout,
        SetMonthHalError,
        SetMonthHalBusy,
        SetMonthHalTimeout,
        SetYearHalError,
        SetYearHalBusy,
        SetYearHalTimeout,
        /// Reading the time registers failed
        HalTimeHalError,
        HalTimeHalBusy,
        HalTimeHalTimeout,
        /// Reading the date registers failed
        HalDateHalError,
        HalDateHalBusy,
        HalDateHalTimeout,
        SetDateTimeHalError,
        SetDateTimeHalBusy,
        SetDateTimeHalTimeout,
        SetMillisecondInvalidValue,
        SetSecondInvalidValue,
        SetMinuteInvalidValue,
        SetHourInvalidValue,
        SetDayInvalidValue,
        SetMonthInvalidValue,
        SetYearInvalidValue,
        SetDateTimeInvalidValue,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Setter {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
    DateTime,
}

impl Stm32RtcError {
    fn hal(setter: Setter, failure: HalFailure) -> Self {
        use HalFailure::{Busy, Error, Timeout};
        match (setter, failure) {
            (Setter::Millisecond, Error) => Self::SetMillisecondHalError,
            (Setter::Millisecond, Busy) => Self::SetMillisecondHalBusy,
            (Setter::Millisecond, Timeout) => Self::SetMillisecondHalTimeout,
            (Setter::Second, Error) => Self::SetSecondHalError,
            (Setter::Second, Busy) => Self::SetSecondHalBusy,
            (Setter::Second, Timeout) => Self::SetSecondHalTimeout,
            (Setter::Minute, Error) => Self::SetMinuteHalError,
            (Setter::Minute, Busy) => Self::SetMinuteHalBusy,
            (Setter::Minute, Timeout) => Self::SetMinuteHalTimeout,
            (Setter::Hour, Error) => Self::SetHourHalError,
            (Setter::Hour, Busy) => Self::SetHourHalBusy,
            (Setter::Hour, Timeout) => Self::SetHourHalTimeout,
            (Setter::Day, Error) => Self::SetDayHalError,
            (Setter::Day, Busy) => Self::SetDayHalBusy,
            (Setter::Day, Timeout) => Self::SetDayHalTimeout,
            (Setter::Month, Error) => Self::SetMonthHalError,
            (Setter::Month, Busy) => Self::SetMonthHalBusy,
            (Setter::Month, Timeout) => Self::SetMonthHalTimeout,
            (Setter::Year, Error) => Self::SetYearHalError,
            (Setter::Year, Busy) => Self::SetYearHalBusy,
            (Setter::Year, Timeout) => Self::SetYearHalTimeout,
            (Setter::DateTime, Error) => Self::SetDateTimeHalError,
            (Setter::DateTime, Busy) => Self::SetDateTimeHalBusy,
            (Setter::DateTime, Timeout) => Self::SetDateTimeHalTimeout,
        }
    }

    fn invalid(setter: Setter) -> Self {
        match setter {
            Setter::Millisecond => Self::SetMillisecondInvalidValue,
            Setter::Second => Self::SetSecondInvalidValue,
            Setter::Minute => Self::SetMinuteInvalidValue,
            Setter::Hour => Self::SetHourInvalidValue,
            Setter::Day => Self::SetDayInvalidValue,
            Setter::Month => Self::SetMonthInvalidValue,
            Setter::Year => Self::SetYearInvalidValue,
            Setter::DateTime => Self::SetDateTimeInvalidValue,
        }
    }

    fn hal_time(failure: HalFailure) -> Self {
        match failure {
            HalFailure::Error => Self::HalTimeHalError,
            HalFailure::Busy => Self::HalTimeHalBusy,
            HalFailure::Timeout => Self::HalTimeHalTimeout,
        }
    }

    fn hal_date(failure: HalFailure) -> Self {
        match failure {
            HalFailure::Error => Self::HalDateHalError,
            HalFailure::Busy => Self::HalDateHalBusy,
            HalFailure::Timeout => Self::HalDateHalTimeout,
        }
    }
}

/// Registers rewritten by a setter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Time,
    Date,
    Both,
}

/// Failed register read: the emitted error plus the vendor reason
struct ReadFailure {
    error: Error,
    failure: HalFailure,
}

/// [`Rtc`] implementation for STM32
///
/// The RTC keeps years as an offset from [`BASE_YEAR`], so only
/// `2000..=2099` can be stored. The weekday register is recomputed whenever
/// the date is written.
pub struct Stm32Rtc<'a, H: RtcHandle> {
    handle: &'a mut H,
    error: Signal<Error>,
}

impl<'a, H: RtcHandle> Stm32Rtc<'a, H> {
    /// Wrap a configured RTC handle
    pub fn new(handle: &'a mut H) -> Self {
        Self {
            handle,
            error: Signal::new(),
        }
    }

    /// Read time then date, which also unlocks the shadow registers
    fn snapshot(&mut self) -> Result<(RtcTime, RtcDate), ReadFailure> {
        let mut time = RtcTime::default();
        self.handle
            .get_time(&mut time)
            .into_result()
            .map_err(|failure| ReadFailure {
                error: Error::new(Stm32RtcError::hal_time(failure)),
                failure,
            })?;
        let mut date = RtcDate::default();
        self.handle
            .get_date(&mut date)
            .into_result()
            .map_err(|failure| ReadFailure {
                error: Error::new(Stm32RtcError::hal_date(failure)),
                failure,
            })?;
        Ok((time, date))
    }

    /// Read the full date and time, returning the failure instead of emitting it
    pub fn try_date_time(&mut self) -> PeriphResult<DateTime> {
        let (time, date) = self.snapshot().map_err(|r| r.error)?;
        Ok(to_date_time(&time, &date))
    }

    /// Read-modify-write of the time and date registers
    fn try_update(
        &mut self,
        setter: Setter,
        valid: bool,
        part: Part,
        apply: impl FnOnce(&mut RtcTime, &mut RtcDate),
    ) -> PeriphResult<()> {
        if !valid {
            return Err(Error::new(Stm32RtcError::invalid(setter)));
        }
        let (mut time, mut date) = self.snapshot().map_err(|r| {
            Error::new(Stm32RtcError::hal(setter, r.failure)).caused_by(&r.error)
        })?;
        apply(&mut time, &mut date);

        if matches!(part, Part::Time | Part::Both) {
            self.handle
                .set_time(&time)
                .into_result()
                .map_err(|f| Error::new(Stm32RtcError::hal(setter, f)))?;
        }
        if matches!(part, Part::Date | Part::Both) {
            let year = BASE_YEAR + u16::from(date.year);
            if let Some(day) = week_day(year, date.month, date.date) {
                date.week_day = day;
            }
            self.handle
                .set_date(&date)
                .into_result()
                .map_err(|f| Error::new(Stm32RtcError::hal(setter, f)))?;
        }
        log::debug!("rtc: {:?} updated", setter);
        Ok(())
    }

    fn read<T>(&mut self, field: impl FnOnce(&RtcTime, &RtcDate) -> T) -> Option<T> {
        match self.snapshot() {
            Ok((time, date)) => Some(field(&time, &date)),
            Err(r) => {
                self.report(Err(r.error));
                None
            }
        }
    }

    fn report(&self, result: PeriphResult<()>) {
        if let Err(error) = result {
            log::warn!("rtc: {}", error);
            self.error.emit(error);
        }
    }
}

impl<H: RtcHandle> Rtc for Stm32Rtc<'_, H> {
    fn millisecond(&mut self) -> Option<u16> {
        self.read(|time, _| millisecond(time))
    }

    fn set_millisecond(&mut self, millisecond: u16) {
        let valid = millisecond < 1000;
        let result = self.try_update(Setter::Millisecond, valid, Part::Time, |time, _| {
            time.sub_seconds = sub_seconds(time.second_fraction, millisecond);
        });
        self.report(result);
    }

    fn second(&mut self) -> Option<u8> {
        self.read(|time, _| time.seconds)
    }

    fn set_second(&mut self, second: u8) {
        let result = self.try_update(Setter::Second, second < 60, Part::Time, |time, _| {
            time.seconds = second;
        });
        self.report(result);
    }

    fn minute(&mut self) -> Option<u8> {
        self.read(|time, _| time.minutes)
    }

    fn set_minute(&mut self, minute: u8) {
        let result = self.try_update(Setter::Minute, minute < 60, Part::Time, |time, _| {
            time.minutes = minute;
        });
        self.report(result);
    }

    fn hour(&mut self) -> Option<u8> {
        self.read(|time, _| time.hours)
    }

    fn set_hour(&mut self, hour: u8) {
        let result = self.try_update(Setter::Hour, hour < 24, Part::Time, |time, _| {
            time.hours = hour;
        });
        self.report(result);
    }

    fn day(&mut self) -> Option<u8> {
        self.read(|_, date| date.date)
    }

    fn set_day(&mut self, day: u8) {
        let valid = (1..=31).contains(&day);
        let result = self.try_update(Setter::Day, valid, Part::Date, |_, date| {
            date.date = day;
        });
        self.report(result);
    }

    fn month(&mut self) -> Option<u8> {
        self.read(|_, date| date.month)
    }

    fn set_month(&mut self, month: u8) {
        let valid = (1..=12).contains(&month);
        let result = self.try_update(Setter::Month, valid, Part::Date, |_, date| {
            date.month = month;
        });
        self.report(result);
    }

    fn year(&mut self) -> Option<u16> {
        self.read(|_, date| BASE_YEAR + u16::from(date.year))
    }

    fn set_year(&mut self, year: u16) {
        let result = match year_offset(year) {
            Some(offset) => self.try_update(Setter::Year, true, Part::Date, |_, date| {
                date.year = offset;
            }),
            None => Err(Error::new(Stm32RtcError::SetYearInvalidValue)),
        };
        self.report(result);
    }

    fn date_time(&mut self) -> Option<DateTime> {
        self.read(to_date_time)
    }

    fn set_date_time(&mut self, date_time: &DateTime) {
        let dt = *date_time;
        let result = match year_offset(dt.year) {
            Some(offset) => {
                self.try_update(Setter::DateTime, dt.is_valid(), Part::Both, |time, date| {
                    time.hours = dt.hour;
                    time.minutes = dt.minute;
                    time.seconds = dt.second;
                    time.sub_seconds = sub_seconds(time.second_fraction, dt.millisecond);
                    date.date = dt.day;
                    date.month = dt.month;
                    date.year = offset;
                })
            }
            None => Err(Error::new(Stm32RtcError::SetDateTimeInvalidValue)),
        };
        self.report(result);
    }

    fn error(&self) -> &Signal<Error> {
        &self.error
    }
}

fn year_offset(year: u16) -> Option<u8> {
    year.checked_sub(BASE_YEAR)
        .filter(|offset| *offset < 100)
        .map(|offset| offset as u8)
}

fn millisecond(time: &RtcTime) -> u16 {
    let fraction = u64::from(time.second_fraction);
    let elapsed = fraction.saturating_sub(u64::from(time.sub_seconds));
    ((elapsed * 1000) / (fraction + 1)).min(999) as u16
}

fn sub_seconds(second_fraction: u32, millisecond: u16) -> u32 {
    let fraction = u64::from(second_fraction);
    let elapsed = u64::from(millisecond) * (fraction + 1) / 1000;
    fraction.saturating_sub(elapsed) as u32
}

fn to_date_time(time: &RtcTime, date: &RtcDate) -> DateTime {
    DateTime {
        millisecond: millisecond(time),
        second: time.seconds,
        minute: time.minutes,
        hour: time.hours,
        day: date.date,
        month: date.month,
        year: BASE_YEAR + u16::from(date.year),
    }
}

/// ISO weekday, 1 = Monday .. 7 = Sunday
fn week_day(year: u16, month: u8, day: u8) -> Option<u8> {
    const OFFSETS: [u16; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
    let offset = OFFSETS.get(usize::from(month).checked_sub(1)?)?;
    let y = if month < 3 { year - 1 } else { year };
    let dow = (y + y / 4 - y / 100 + y / 400 + offset + u16::from(day)) % 7;
    Some(if dow == 0 { 7 } else { dow as u8 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_day() {
        assert_eq!(week_day(2024, 3, 15), Some(5));
        assert_eq!(week_day(2000, 1, 1), Some(6));
        assert_eq!(week_day(2023, 12, 31), Some(7));
        assert_eq!(week_day(2023, 0, 1), None);
    }

    #[test]
    fn test_sub_second_conversion() {
        let time = RtcTime {
            sub_seconds: sub_seconds(255, 500),
            second_fraction: 255,
            ..RtcTime::default()
        };
        assert_eq!(time.sub_seconds, 127);
        assert_eq!(millisecond(&time), 500);
    }

    #[test]
    fn test_year_offset() {
        assert_eq!(year_offset(2000), Some(0));
        assert_eq!(year_offset(2099), Some(99));
        assert_eq!(year_offset(1999), None);
        assert_eq!(year_offset(2100), None);
    }
}
