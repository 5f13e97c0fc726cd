//! Application code written against the HAL traits runs on a test double

use periph_core::{Error, Signal};
use periph_hal::{days_in_month, DateTime, Pwm, Rtc};

/// In-memory PWM channel
#[derive(Default)]
struct FakePwm {
    max: u32,
    value: u32,
    inverted: bool,
    enabled: bool,
    error: Signal<Error>,
}

impl Pwm for FakePwm {
    fn set_max_value(&mut self, max_value: u32) {
        if max_value >= self.value {
            self.max = max_value;
        }
    }

    fn max_value(&self) -> u32 {
        self.max
    }

    fn set_with_inversion(&mut self, value: u32, inverted: bool) {
        if value <= self.max {
            self.value = value;
            self.inverted = inverted;
        }
    }

    fn value(&self) -> u32 {
        self.value
    }

    fn start(&mut self) {
        self.enabled = true;
    }

    fn stop(&mut self) {
        self.enabled = false;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn error(&self) -> &Signal<Error> {
        &self.error
    }
}

/// In-memory clock
#[derive(Default)]
struct FakeRtc {
    now: DateTime,
    error: Signal<Error>,
}

impl Rtc for FakeRtc {
    fn millisecond(&mut self) -> Option<u16> {
        Some(self.now.millisecond)
    }

    fn set_millisecond(&mut self, millisecond: u16) {
        self.now.millisecond = millisecond;
    }

    fn second(&mut self) -> Option<u8> {
        Some(self.now.second)
    }

    fn set_second(&mut self, second: u8) {
        self.now.second = second;
    }

    fn minute(&mut self) -> Option<u8> {
        Some(self.now.minute)
    }

    fn set_minute(&mut self, minute: u8) {
        self.now.minute = minute;
    }

    fn hour(&mut self) -> Option<u8> {
        Some(self.now.hour)
    }

    fn set_hour(&mut self, hour: u8) {
        self.now.hour = hour;
    }

    fn day(&mut self) -> Option<u8> {
        Some(self.now.day)
    }

    fn set_day(&mut self, day: u8) {
        self.now.day = day;
    }

    fn month(&mut self) -> Option<u8> {
        Some(self.now.month)
    }

    fn set_month(&mut self, month: u8) {
        self.now.month = month;
    }

    fn year(&mut self) -> Option<u16> {
        Some(self.now.year)
    }

    fn set_year(&mut self, year: u16) {
        self.now.year = year;
    }

    fn date_time(&mut self) -> Option<DateTime> {
        Some(self.now)
    }

    fn set_date_time(&mut self, date_time: &DateTime) {
        self.now = *date_time;
    }

    fn error(&self) -> &Signal<Error> {
        &self.error
    }
}

/// Dims a channel to a percentage of its range
fn dim(pwm: &mut dyn Pwm, percent: u32) {
    let value = pwm.max_value() * percent / 100;
    pwm.set(value);
    pwm.start();
}

/// Stamps the first of next month at midnight
fn next_month(rtc: &mut dyn Rtc) -> Option<DateTime> {
    let now = rtc.date_time()?;
    let (month, year) = if now.month == 12 {
        (1, now.year + 1)
    } else {
        (now.month + 1, now.year)
    };
    Some(DateTime {
        day: 1,
        month,
        year,
        ..DateTime::default()
    })
}

#[test]
fn test_dim_through_trait_object() {
    let mut pwm = FakePwm::default();
    pwm.set_max_value(1000);
    dim(&mut pwm, 25);

    assert!(pwm.is_enabled());
    assert_eq!(pwm.value(), 250);
    assert!(!pwm.inverted);
}

#[test]
fn test_next_month_through_trait_object() {
    let mut rtc = FakeRtc::default();
    rtc.set_date_time(&DateTime {
        millisecond: 0,
        second: 1,
        minute: 2,
        hour: 3,
        day: 31,
        month: 12,
        year: 2024,
    });

    let next = next_month(&mut rtc).unwrap();
    assert_eq!((next.day, next.month, next.year), (1, 1, 2025));
    assert!(next.is_valid());
}

#[test]
fn test_date_time_display() {
    let dt = DateTime {
        millisecond: 7,
        second: 5,
        minute: 4,
        hour: 3,
        day: 2,
        month: 1,
        year: 2030,
    };
    assert_eq!(dt.to_string(), "2030-01-02 03:04:05.007");
}

#[test]
fn test_date_time_calendar_validity() {
    assert_eq!(days_in_month(2024, 2), 29);
    assert_eq!(days_in_month(2023, 2), 28);
    assert_eq!(days_in_month(2100, 2), 28);
    assert_eq!(days_in_month(2000, 2), 29);
    assert_eq!(days_in_month(2023, 4), 30);
    assert_eq!(days_in_month(2023, 13), 0);

    let feb = |day| DateTime {
        day,
        month: 2,
        year: 2024,
        ..DateTime::default()
    };
    assert!(feb(29).is_valid());
    assert!(!feb(30).is_valid());
    assert!(!feb(0).is_valid());
}
