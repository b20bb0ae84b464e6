//! # DS3231 RTC
//!
//! The RTC keeps local wall-clock time and drives the SQW pin at 1 Hz. The
//! falling edge of SQW is the seconds tick of the whole clock: a listener
//! task turns it into [`SQW_TICK`], which the event loop consumes.
//!
//! SQW and the alarm interrupt share the INT/SQW pin, so the alarm is
//! matched in software and the DS3231 alarm registers stay unused.

use core::cell::Cell;

use chrono::{NaiveDateTime, Timelike};
use clock_core::TimeOfDay;
use critical_section::Mutex as CsMutex;
use defmt::{info, warn};
use ds3231::{Config, DS3231, InterruptControl, Oscillator, SquareWaveFrequency, TimeRepresentation};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::Instant;
use esp_hal::gpio::{Input, InputConfig, InputPin, Pull};

use crate::config::RTC_I2C_ADDR;
use crate::error::RtcError;
use crate::i2c::I2cBus;
use crate::mk_static;

pub type Rtc = DS3231<I2cBus>;
// 读取也需要 &mut self，所以不能用 RwLock
pub type RtcMutex = Mutex<CriticalSectionRawMutex, Rtc>;

/// Raised on every SQW falling edge, carries the edge time.
pub static SQW_TICK: Signal<CriticalSectionRawMutex, Instant> = Signal::new();

/// Ticks raised while the previous one was still pending.
static MISSED_TICKS: CsMutex<Cell<u32>> = CsMutex::new(Cell::new(0));

pub fn missed_ticks() -> u32 {
    critical_section::with(|cs| MISSED_TICKS.borrow(cs).get())
}

/// Configure the DS3231 for 24-hour mode with a 1 Hz square wave.
pub async fn init(bus: I2cBus) -> Result<&'static RtcMutex, RtcError> {
    let config = Config {
        time_representation: TimeRepresentation::TwentyFourHour,
        square_wave_frequency: SquareWaveFrequency::Hz1,
        interrupt_control: InterruptControl::SquareWave,
        battery_backed_square_wave: false,
        oscillator_enable: Oscillator::Enabled,
    };

    let mut rtc = DS3231::new(bus, RTC_I2C_ADDR);
    rtc.configure(&config).await?;

    // OSF 置位说明晶振停过（比如电池没电），时间不可信
    let mut status = rtc.status().await?;
    if status.oscillator_stop_flag() {
        warn!("[rtc] oscillator was stopped, time may be wrong");
        status.set_oscillator_stop_flag(false);
        rtc.set_status(status).await?;
    }

    info!("[rtc] configured, SQW at 1Hz");
    Ok(mk_static!(RtcMutex, Mutex::new(rtc)))
}

pub async fn read_time(rtc: &RtcMutex) -> Result<TimeOfDay, RtcError> {
    let datetime = rtc.lock().await.datetime().await?;
    Ok(to_time_of_day(&datetime)?)
}

pub async fn set_time(rtc: &RtcMutex, datetime: &NaiveDateTime) -> Result<(), RtcError> {
    rtc.lock().await.set_datetime(datetime).await?;
    info!(
        "[rtc] time set to {=u32}:{=u32}:{=u32}",
        datetime.hour(),
        datetime.minute(),
        datetime.second()
    );
    Ok(())
}

pub fn to_time_of_day(datetime: &NaiveDateTime) -> Result<TimeOfDay, clock_core::TimeError> {
    TimeOfDay::new(
        datetime.hour() as u8,
        datetime.minute() as u8,
        datetime.second() as u8,
    )
}

/// SQW 是开漏输出，需要上拉
pub fn sqw_input(pin: impl InputPin + 'static) -> Input<'static> {
    Input::new(pin, InputConfig::default().with_pull(Pull::Up))
}

#[embassy_executor::task]
pub async fn listen_for_sqw(mut sqw: Input<'static>) {
    info!("[rtc] listening for SQW");
    loop {
        sqw.wait_for_falling_edge().await;
        let now = Instant::now();

        if SQW_TICK.signaled() {
            let missed = critical_section::with(|cs| {
                let cell = MISSED_TICKS.borrow(cs);
                cell.set(cell.get() + 1);
                cell.get()
            });
            warn!("[rtc] previous tick not consumed ({} missed)", missed);
        }
        SQW_TICK.signal(now);
    }
}
