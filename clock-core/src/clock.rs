//! The alarm clock event loop state.
//!
//! [`AlarmClock`] ties the wall time, the alarm machine and the settings
//! pages together. It owns no hardware: the firmware calls
//! [`AlarmClock::on_second`] from the SQW tick, [`AlarmClock::on_button`]
//! for every debounced edge and [`AlarmClock::poll`] every few tens of
//! milliseconds, then applies the returned [`Output`].

use crate::alarm::{AlarmEvent, AlarmMachine, AlarmState};
use crate::buzzer::BuzzerCommand;
use crate::debounce::ButtonEdge;
use crate::menu::{Menu, MenuOutcome, Page};
use crate::settings::Settings;
use crate::time::TimeOfDay;
use crate::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Output {
    pub buzzer: BuzzerCommand,
    pub event: Option<AlarmEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SecondTick {
    /// The mirrored time crossed a minute boundary, resync from the RTC.
    pub minute_rolled: bool,
    pub event: Option<AlarmEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmStatus {
    Off,
    Set,
    Ringing,
    /// Ringing, button held, dismiss pending.
    Holding,
    Snoozed,
}

/// Everything the display needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockView {
    pub time: TimeOfDay,
    /// Settings shown: the draft while editing, the live ones otherwise.
    pub settings: Settings,
    pub page: Page,
    pub status: AlarmStatus,
    /// A short press would snooze the ringing alarm.
    pub snooze_available: bool,
    /// `false` until the first RTC read succeeded.
    pub synced: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PressOwner {
    Alarm,
    Menu,
}

#[derive(Debug, Clone)]
pub struct AlarmClock {
    time: TimeOfDay,
    synced: bool,
    settings: Settings,
    alarm: AlarmMachine,
    menu: Menu,
    owner: Option<PressOwner>,
    redraw: bool,
}

impl AlarmClock {
    pub fn new(settings: Settings) -> Self {
        Self {
            time: TimeOfDay::MIDNIGHT,
            synced: false,
            settings,
            alarm: AlarmMachine::new(settings.timing),
            menu: Menu::default(),
            owner: None,
            redraw: true,
        }
    }

    pub fn time(&self) -> TimeOfDay {
        self.time
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn alarm_state(&self) -> AlarmState {
        self.alarm.state()
    }

    /// Replace the mirrored time with an authoritative RTC reading.
    pub fn sync(&mut self, time: TimeOfDay, now: Instant) -> Option<AlarmEvent> {
        if self.synced && self.time != time {
            debug!(
                "[clock] resync {=u8}:{=u8}:{=u8}",
                time.hour(),
                time.minute(),
                time.second()
            );
        }
        self.time = time;
        self.synced = true;
        self.redraw = true;
        self.check_alarm(now)
    }

    /// One SQW pulse.
    pub fn on_second(&mut self, now: Instant) -> SecondTick {
        let minute_rolled = self.time.tick();
        self.redraw = true;
        SecondTick {
            minute_rolled,
            event: self.check_alarm(now),
        }
    }

    pub fn on_button(&mut self, edge: ButtonEdge, now: Instant) -> Option<AlarmEvent> {
        match edge {
            ButtonEdge::Pressed => {
                if self.alarm.press(now) {
                    self.owner = Some(PressOwner::Alarm);
                    self.redraw = true;
                } else {
                    self.owner = Some(PressOwner::Menu);
                    self.menu.press(now);
                }
                None
            }
            ButtonEdge::Released => match self.owner.take() {
                Some(PressOwner::Alarm) => {
                    let event = self.alarm.release(now);
                    self.redraw = true;
                    event
                }
                Some(PressOwner::Menu) => {
                    let outcome = self.menu.release(now, &self.settings);
                    self.apply_outcome(outcome);
                    None
                }
                None => None,
            },
        }
    }

    pub fn poll(&mut self, now: Instant) -> Output {
        let (buzzer, event) = self.alarm.poll(now);
        if event.is_some() {
            self.redraw = true;
        }

        if !self.alarm.is_active() {
            let outcome = self.menu.poll(now, &self.settings);
            self.apply_outcome(outcome);
        }

        Output { buzzer, event }
    }

    /// Apply new settings, dropping a running alarm if it no longer applies.
    pub fn apply_settings(&mut self, next: Settings) {
        if self.settings.invalidates_alarm(&next) {
            self.alarm.cancel();
        }
        self.alarm.set_timing(next.timing);
        self.settings = next;
        self.redraw = true;
        info!(
            "[clock] alarm {=u8}:{=u8} enabled={=bool}",
            next.alarm.hour(),
            next.alarm.minute(),
            next.alarm_enabled
        );
    }

    pub fn view(&self) -> ClockView {
        let status = match self.alarm.state() {
            AlarmState::Ringing {
                hold_started: Some(_),
                ..
            } => AlarmStatus::Holding,
            AlarmState::Ringing { .. } => AlarmStatus::Ringing,
            AlarmState::Snoozed { .. } => AlarmStatus::Snoozed,
            AlarmState::Idle if self.settings.alarm_enabled => AlarmStatus::Set,
            AlarmState::Idle => AlarmStatus::Off,
        };

        ClockView {
            time: self.time,
            settings: self.menu.draft().copied().unwrap_or(self.settings),
            page: self.menu.page(),
            status,
            snooze_available: self.alarm.can_snooze(),
            synced: self.synced,
        }
    }

    /// Whether the view changed since the last call.
    pub fn take_redraw(&mut self) -> bool {
        core::mem::replace(&mut self.redraw, false)
    }

    fn check_alarm(&mut self, now: Instant) -> Option<AlarmEvent> {
        // 还没读到 RTC 时，镜像时间从午夜开始数，不可信
        if !self.synced {
            return None;
        }
        let event = self.alarm.check(
            self.time,
            self.settings.alarm,
            self.settings.alarm_enabled,
            now,
        );
        if event == Some(AlarmEvent::Triggered) {
            // 响铃时放弃正在编辑的设置
            self.menu.reset();
            if self.owner == Some(PressOwner::Menu) {
                self.owner = None;
            }
        }
        event
    }

    fn apply_outcome(&mut self, outcome: MenuOutcome) {
        match outcome {
            MenuOutcome::Unchanged => {}
            MenuOutcome::Redraw => self.redraw = true,
            MenuOutcome::Apply(next) => self.apply_settings(next),
        }
    }
}
