//! # clock-core
//!
//! Hardware independent logic of the bedside alarm clock.
//!
//! The firmware feeds this crate with three kinds of input:
//! - the 1 Hz tick coming from the RTC SQW pin ([`AlarmClock::on_second`]),
//! - debounced button edges ([`AlarmClock::on_button`]),
//! - the monotonic time, polled frequently ([`AlarmClock::poll`]).
//!
//! In return it tells the firmware what the buzzer should do and what the
//! display should show. Nothing here touches a peripheral, so everything can
//! be tested on the host.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod alarm;
pub mod buzzer;
pub mod clock;
pub mod debounce;
pub mod menu;
pub mod settings;
pub mod time;

pub use alarm::{AlarmEvent, AlarmMachine, AlarmState, AlarmTiming};
pub use buzzer::{BeepPattern, BuzzerCommand};
pub use clock::{AlarmClock, AlarmStatus, ClockView, Output, SecondTick};
pub use debounce::{ButtonEdge, Debouncer};
pub use menu::{Menu, MenuOutcome, Page, PressKind};
pub use settings::Settings;
pub use time::{AlarmTime, HourFormat, TimeError, TimeOfDay};

/// Monotonic instant with millisecond resolution.
pub type Instant = fugit::TimerInstantU64<1000>;

/// Duration with millisecond resolution.
pub type Duration = fugit::MillisDurationU64;

/// Time elapsed between `since` and `now`, saturating at zero if `now` is
/// earlier than `since`.
#[inline]
pub(crate) fn elapsed(since: Instant, now: Instant) -> Duration {
    now.checked_duration_since(since)
        .unwrap_or(Duration::from_ticks(0))
}
