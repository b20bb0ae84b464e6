//! # Event loop
//!
//! The only task that touches [`AlarmClock`]. It wakes on the SQW tick, a
//! debounced button edge, a fresh NTP time or the poll ticker, feeds the
//! event to the core and applies the resulting buzzer command, LED state and
//! display frame.

use clock_core::{AlarmClock, AlarmEvent, Settings};
use defmt::{debug, error, info, warn};
use embassy_futures::select::{Either4, select4};
use embassy_time::{Duration, Instant, Ticker};

use crate::button::{BUTTON_EVENTS, ButtonEvent};
use crate::buzzer::Buzzer;
use crate::display::ClockFace;
use crate::led::set_status_led;
use crate::ntp::NTP_TIME;
use crate::rtc::{self, RtcMutex, SQW_TICK};

/// 蜂鸣节奏和长按检测的轮询周期
const POLL_INTERVAL: Duration = Duration::from_millis(20);

pub(crate) fn core_instant(instant: Instant) -> clock_core::Instant {
    clock_core::Instant::from_ticks(instant.as_millis())
}

/// Read the RTC and load it into the core.
async fn resync(rtc: &RtcMutex, clock: &mut AlarmClock) -> Option<AlarmEvent> {
    match rtc::read_time(rtc).await {
        Ok(time) => clock.sync(time, core_instant(Instant::now())),
        Err(e) => {
            warn!("[app] RTC read failed, keeping mirrored time: {}", e);
            None
        }
    }
}

fn log_event(event: AlarmEvent) {
    match event {
        AlarmEvent::Triggered => info!("[app] alarm ringing"),
        AlarmEvent::Snoozed => info!("[app] alarm snoozed"),
        AlarmEvent::Resumed => info!("[app] snooze over, ringing again"),
        AlarmEvent::Dismissed => info!("[app] alarm dismissed"),
        AlarmEvent::TimedOut => warn!("[app] alarm timed out unanswered"),
    }
}

#[embassy_executor::task]
pub async fn run(
    rtc: &'static RtcMutex,
    mut buzzer: Buzzer,
    mut face: ClockFace,
    settings: Settings,
) {
    let mut clock = AlarmClock::new(settings);
    let mut led_on = None;

    if let Some(event) = resync(rtc, &mut clock).await {
        log_event(event);
    }

    let mut ticker = Ticker::every(POLL_INTERVAL);
    info!("[app] event loop running");

    loop {
        let event = match select4(
            SQW_TICK.wait(),
            BUTTON_EVENTS.receive(),
            NTP_TIME.wait(),
            ticker.next(),
        )
        .await
        {
            Either4::First(at) => {
                let tick = clock.on_second(core_instant(at));
                // 每分钟从 RTC 校正一次，丢掉的秒脉冲在这里补回
                if tick.minute_rolled {
                    let missed = rtc::missed_ticks();
                    if missed > 0 {
                        debug!("[app] {} SQW ticks missed since boot", missed);
                    }
                    resync(rtc, &mut clock).await.or(tick.event)
                } else {
                    tick.event
                }
            }
            Either4::Second(ButtonEvent { edge, at }) => clock.on_button(edge, core_instant(at)),
            Either4::Third(datetime) => match rtc::set_time(rtc, &datetime).await {
                Ok(()) => resync(rtc, &mut clock).await,
                Err(e) => {
                    error!("[app] failed to write NTP time to RTC: {}", e);
                    None
                }
            },
            Either4::Fourth(()) => None,
        };
        if let Some(event) = event {
            log_event(event);
        }

        let output = clock.poll(core_instant(Instant::now()));
        if let Some(event) = output.event {
            log_event(event);
        }
        buzzer.apply(output.buzzer);

        let enabled = clock.settings().alarm_enabled;
        if led_on != Some(enabled) {
            set_status_led(enabled).await;
            led_on = Some(enabled);
        }

        if clock.take_redraw() {
            if let Err(e) = face.render(&clock.view()) {
                error!("[app] {}", e);
            }
        }
    }
}
