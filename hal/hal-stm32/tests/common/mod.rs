//! Fake vendor handles and signal recorders shared by the driver tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use periph_core::{Error, Observer};
use periph_hal_stm32::sys::{
    DacAlignment, DacChannel, DacHandle, HalStatus, OcConfig, RtcDate, RtcHandle, RtcTime,
    TimChannel, TimHandle,
};

/// State of a fake handle, inspectable while a driver borrows the handle
pub struct Probe<S>(Arc<Mutex<S>>);

impl<S> Probe<S> {
    pub fn get(&self) -> MutexGuard<'_, S> {
        self.0.lock().unwrap()
    }
}

// --- Timer ---

pub struct TimState {
    pub autoreload: u32,
    pub configs: Vec<(OcConfig, TimChannel)>,
    pub running: bool,
    pub config_status: HalStatus,
    pub start_status: HalStatus,
    pub stop_status: HalStatus,
    pub start_calls: usize,
    pub stop_calls: usize,
}

pub struct FakeTim(Arc<Mutex<TimState>>);

impl FakeTim {
    pub fn new() -> (Self, Probe<TimState>) {
        let state = Arc::new(Mutex::new(TimState {
            autoreload: 0xFFFF,
            configs: Vec::new(),
            running: false,
            config_status: HalStatus::Ok,
            start_status: HalStatus::Ok,
            stop_status: HalStatus::Ok,
            start_calls: 0,
            stop_calls: 0,
        }));
        (Self(state.clone()), Probe(state))
    }
}

impl TimHandle for FakeTim {
    fn autoreload(&self) -> u32 {
        self.0.lock().unwrap().autoreload
    }

    fn set_autoreload(&mut self, value: u32) {
        self.0.lock().unwrap().autoreload = value;
    }

    fn pwm_config_channel(&mut self, config: &OcConfig, channel: TimChannel) -> HalStatus {
        let mut s = self.0.lock().unwrap();
        if s.config_status == HalStatus::Ok {
            s.configs.push((*config, channel));
        }
        s.config_status
    }

    fn pwm_start(&mut self, _channel: TimChannel) -> HalStatus {
        let mut s = self.0.lock().unwrap();
        s.start_calls += 1;
        if s.start_status == HalStatus::Ok {
            s.running = true;
        }
        s.start_status
    }

    fn pwm_stop(&mut self, _channel: TimChannel) -> HalStatus {
        let mut s = self.0.lock().unwrap();
        s.stop_calls += 1;
        if s.stop_status == HalStatus::Ok {
            s.running = false;
        }
        s.stop_status
    }
}

// --- RTC ---

pub struct RtcState {
    pub time: RtcTime,
    pub date: RtcDate,
    pub get_time_status: HalStatus,
    pub get_date_status: HalStatus,
    pub set_time_status: HalStatus,
    pub set_date_status: HalStatus,
    pub time_writes: usize,
    pub date_writes: usize,
}

pub struct FakeRtc(Arc<Mutex<RtcState>>);

impl FakeRtc {
    /// Clock at 2024-03-15 (Friday) 13:45:30.000, 1 ms sub-second resolution
    pub fn new() -> (Self, Probe<RtcState>) {
        let state = Arc::new(Mutex::new(RtcState {
            time: RtcTime {
                hours: 13,
                minutes: 45,
                seconds: 30,
                sub_seconds: 999,
                second_fraction: 999,
            },
            date: RtcDate {
                week_day: 5,
                month: 3,
                date: 15,
                year: 24,
            },
            get_time_status: HalStatus::Ok,
            get_date_status: HalStatus::Ok,
            set_time_status: HalStatus::Ok,
            set_date_status: HalStatus::Ok,
            time_writes: 0,
            date_writes: 0,
        }));
        (Self(state.clone()), Probe(state))
    }
}

impl RtcHandle for FakeRtc {
    fn get_time(&mut self, time: &mut RtcTime) -> HalStatus {
        let s = self.0.lock().unwrap();
        *time = s.time;
        s.get_time_status
    }

    fn set_time(&mut self, time: &RtcTime) -> HalStatus {
        let mut s = self.0.lock().unwrap();
        if s.set_time_status == HalStatus::Ok {
            s.time = *time;
            s.time_writes += 1;
        }
        s.set_time_status
    }

    fn get_date(&mut self, date: &mut RtcDate) -> HalStatus {
        let s = self.0.lock().unwrap();
        *date = s.date;
        s.get_date_status
    }

    fn set_date(&mut self, date: &RtcDate) -> HalStatus {
        let mut s = self.0.lock().unwrap();
        if s.set_date_status == HalStatus::Ok {
            s.date = *date;
            s.date_writes += 1;
        }
        s.set_date_status
    }
}

// --- DAC ---

pub struct DacState {
    pub start_status: HalStatus,
    pub stop_status: HalStatus,
    pub start_calls: usize,
    pub stop_calls: usize,
    /// Channel, buffer address, sample count and alignment of the last start
    pub last_start: Option<(DacChannel, usize, usize, DacAlignment)>,
}

pub struct FakeDac(Arc<Mutex<DacState>>);

impl FakeDac {
    pub fn new() -> (Self, Probe<DacState>) {
        let state = Arc::new(Mutex::new(DacState {
            start_status: HalStatus::Ok,
            stop_status: HalStatus::Ok,
            start_calls: 0,
            stop_calls: 0,
            last_start: None,
        }));
        (Self(state.clone()), Probe(state))
    }
}

impl DacHandle for FakeDac {
    fn start_dma(
        &mut self,
        channel: DacChannel,
        data: &'static [u8],
        length: usize,
        alignment: DacAlignment,
    ) -> HalStatus {
        let mut s = self.0.lock().unwrap();
        s.start_calls += 1;
        if s.start_status == HalStatus::Ok {
            s.last_start = Some((channel, data.as_ptr() as usize, length, alignment));
        }
        s.start_status
    }

    fn stop_dma(&mut self, _channel: DacChannel) -> HalStatus {
        let mut s = self.0.lock().unwrap();
        s.stop_calls += 1;
        s.stop_status
    }
}

// --- Signal recorders ---

/// Collects every emitted error
#[derive(Default)]
pub struct ErrorLog(Mutex<Vec<Error>>);

impl ErrorLog {
    pub fn leak() -> &'static ErrorLog {
        Box::leak(Box::default())
    }

    pub fn errors(&self) -> Vec<Error> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

impl Observer<Error> for ErrorLog {
    fn notify(&self, error: Error) {
        self.0.lock().unwrap().push(error);
    }
}

/// Counts argument-less emissions
#[derive(Default)]
pub struct Counter(AtomicUsize);

impl Counter {
    pub fn leak() -> &'static Counter {
        Box::leak(Box::default())
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl Observer<()> for Counter {
    fn notify(&self, _: ()) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}
