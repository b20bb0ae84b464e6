//! Single-button settings pages.
//!
//! | page          | short press           | long press            |
//! |---------------|-----------------------|-----------------------|
//! | `Clock`       | alarm on/off          | edit alarm hour       |
//! | `AlarmHour`   | hour + 1              | edit alarm minute     |
//! | `AlarmMinute` | minute + 1            | edit hour format      |
//! | `HourFormat`  | 12h / 24h             | save, back to `Clock` |
//!
//! Edits go to a draft copy. Leaving an edit page alone for the idle timeout
//! throws the draft away.

use crate::settings::Settings;
use crate::{Duration, Instant, elapsed};

pub const DEFAULT_LONG_PRESS: Duration = Duration::from_ticks(1_000);
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_ticks(15_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Page {
    Clock,
    AlarmHour,
    AlarmMinute,
    HourFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressKind {
    Short,
    Long,
}

/// What a menu step asks of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    Unchanged,
    /// Page or draft changed, the screen needs a redraw.
    Redraw,
    /// New settings to apply.
    Apply(Settings),
}

#[derive(Debug, Clone)]
pub struct Menu {
    page: Page,
    draft: Option<Settings>,
    long_press: Duration,
    idle_timeout: Duration,
    pressed_at: Option<Instant>,
    long_fired: bool,
    last_input: Instant,
}

impl Default for Menu {
    fn default() -> Self {
        Self::new(DEFAULT_LONG_PRESS, DEFAULT_IDLE_TIMEOUT)
    }
}

impl Menu {
    pub fn new(long_press: Duration, idle_timeout: Duration) -> Self {
        Self {
            page: Page::Clock,
            draft: None,
            long_press,
            idle_timeout,
            pressed_at: None,
            long_fired: false,
            last_input: Instant::from_ticks(0),
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    /// Settings being edited, `None` on the clock page.
    pub fn draft(&self) -> Option<&Settings> {
        self.draft.as_ref()
    }

    pub fn press(&mut self, now: Instant) {
        self.pressed_at = Some(now);
        self.long_fired = false;
        self.last_input = now;
    }

    pub fn release(&mut self, now: Instant, current: &Settings) -> MenuOutcome {
        let Some(_) = self.pressed_at.take() else {
            return MenuOutcome::Unchanged;
        };
        self.last_input = now;
        if self.long_fired {
            return MenuOutcome::Unchanged;
        }
        self.handle(PressKind::Short, current)
    }

    pub fn poll(&mut self, now: Instant, current: &Settings) -> MenuOutcome {
        if let Some(at) = self.pressed_at {
            if !self.long_fired && elapsed(at, now) >= self.long_press {
                self.long_fired = true;
                self.last_input = now;
                return self.handle(PressKind::Long, current);
            }
            return MenuOutcome::Unchanged;
        }

        if self.page != Page::Clock && elapsed(self.last_input, now) >= self.idle_timeout {
            info!("[menu] idle, discarding changes");
            self.page = Page::Clock;
            self.draft = None;
            return MenuOutcome::Redraw;
        }
        MenuOutcome::Unchanged
    }

    /// Drop any edit in progress, e.g. when the alarm starts ringing.
    pub fn reset(&mut self) {
        self.page = Page::Clock;
        self.draft = None;
        self.pressed_at = None;
        self.long_fired = false;
    }

    fn handle(&mut self, kind: PressKind, current: &Settings) -> MenuOutcome {
        debug!("[menu] {} press on {}", kind, self.page);
        let draft = self.draft.get_or_insert(*current);

        match (self.page, kind) {
            (Page::Clock, PressKind::Short) => {
                let mut next = *current;
                next.alarm_enabled = !next.alarm_enabled;
                self.draft = None;
                return MenuOutcome::Apply(next);
            }
            (Page::Clock, PressKind::Long) => self.page = Page::AlarmHour,
            (Page::AlarmHour, PressKind::Short) => draft.alarm = draft.alarm.next_hour(),
            (Page::AlarmHour, PressKind::Long) => self.page = Page::AlarmMinute,
            (Page::AlarmMinute, PressKind::Short) => draft.alarm = draft.alarm.next_minute(),
            (Page::AlarmMinute, PressKind::Long) => self.page = Page::HourFormat,
            (Page::HourFormat, PressKind::Short) => {
                draft.hour_format = draft.hour_format.toggled()
            }
            (Page::HourFormat, PressKind::Long) => {
                let next = *draft;
                self.draft = None;
                self.page = Page::Clock;
                info!("[menu] settings saved");
                return MenuOutcome::Apply(next);
            }
        }
        MenuOutcome::Redraw
    }
}
