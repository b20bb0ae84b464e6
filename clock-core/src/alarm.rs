//! Alarm state machine and buzzer control.
//!
//! ```text
//!            alarm minute reached
//!   Idle ───────────────────────────▶ Ringing ◀──────────┐
//!    ▲                                │  │                │ snooze over
//!    │  hold >= dismiss / ring timeout │  │ short press    │
//!    ├────────────────────────────────┘  ▼                │
//!    │              hold >= dismiss     Snoozed ──────────┘
//!    └───────────────────────────────────┘
//! ```
//!
//! While the button is held during `Ringing` the buzzer goes quiet so the
//! sleeper can tell the press was noticed. Holding long enough dismisses the
//! alarm without waiting for the release.

use crate::buzzer::{BeepPattern, BuzzerCommand};
use crate::time::{AlarmTime, TimeOfDay};
use crate::{Duration, Instant, elapsed};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmTiming {
    /// How long the button must be held to dismiss.
    pub dismiss_hold: Duration,
    /// Ringing stops by itself after this long.
    pub ring_timeout: Duration,
    /// Snooze length; zero disables snoozing.
    pub snooze: Duration,
    /// Snoozes allowed per alarm.
    pub max_snoozes: u8,
}

impl AlarmTiming {
    pub const DEFAULT: AlarmTiming = AlarmTiming {
        dismiss_hold: Duration::from_ticks(3_000),
        ring_timeout: Duration::from_ticks(5 * 60 * 1_000),
        snooze: Duration::from_ticks(9 * 60 * 1_000),
        max_snoozes: 3,
    };

    pub const fn with_snooze_minutes(self, minutes: u8) -> Self {
        Self {
            snooze: Duration::from_ticks(minutes as u64 * 60 * 1_000),
            ..self
        }
    }
}

impl Default for AlarmTiming {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmState {
    Idle,
    Ringing {
        since: Instant,
        hold_started: Option<Instant>,
    },
    Snoozed {
        until: Instant,
        hold_started: Option<Instant>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmEvent {
    Triggered,
    Snoozed,
    Resumed,
    Dismissed,
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct AlarmMachine {
    state: AlarmState,
    timing: AlarmTiming,
    pattern: BeepPattern,
    pattern_start: Instant,
    snoozes: u8,
    /// Minute (hour, minute) during which the alarm last fired.
    fired_minute: Option<(u8, u8)>,
}

impl AlarmMachine {
    pub fn new(timing: AlarmTiming) -> Self {
        Self {
            state: AlarmState::Idle,
            timing,
            pattern: BeepPattern::ALARM,
            pattern_start: Instant::from_ticks(0),
            snoozes: 0,
            fired_minute: None,
        }
    }

    pub fn state(&self) -> AlarmState {
        self.state
    }

    pub fn timing(&self) -> AlarmTiming {
        self.timing
    }

    pub fn set_timing(&mut self, timing: AlarmTiming) {
        self.timing = timing;
    }

    /// Ringing or snoozed: the button belongs to the alarm.
    pub fn is_active(&self) -> bool {
        !matches!(self.state, AlarmState::Idle)
    }

    pub fn snoozes_used(&self) -> u8 {
        self.snoozes
    }

    fn ring(&mut self, now: Instant) {
        self.state = AlarmState::Ringing {
            since: now,
            hold_started: None,
        };
        self.pattern_start = now;
    }

    fn finish(&mut self, event: AlarmEvent) -> AlarmEvent {
        info!("[alarm] stopped: {}", event);
        self.state = AlarmState::Idle;
        self.snoozes = 0;
        event
    }

    /// A short press would snooze rather than restart the ring pattern.
    pub fn can_snooze(&self) -> bool {
        self.timing.snooze.ticks() > 0 && self.snoozes < self.timing.max_snoozes
    }

    fn hold_done(&self, hold_started: Option<Instant>, now: Instant) -> bool {
        hold_started.is_some_and(|start| elapsed(start, now) >= self.timing.dismiss_hold)
    }

    /// Compare the wall clock with the alarm and start ringing on a match.
    pub fn check(
        &mut self,
        wall: TimeOfDay,
        alarm: AlarmTime,
        enabled: bool,
        now: Instant,
    ) -> Option<AlarmEvent> {
        let minute = (wall.hour(), wall.minute());
        if self.fired_minute.is_some_and(|fired| fired != minute) {
            self.fired_minute = None;
        }

        if !enabled || !wall.matches(alarm) || self.fired_minute.is_some() {
            return None;
        }
        if self.is_active() {
            return None;
        }

        self.fired_minute = Some(minute);
        self.ring(now);
        info!(
            "[alarm] ringing at {=u8}:{=u8}:{=u8}",
            wall.hour(),
            wall.minute(),
            wall.second()
        );
        Some(AlarmEvent::Triggered)
    }

    /// Button went down. Returns `true` if the alarm took the press.
    pub fn press(&mut self, now: Instant) -> bool {
        match &mut self.state {
            AlarmState::Idle => false,
            AlarmState::Ringing { hold_started, .. } | AlarmState::Snoozed { hold_started, .. } => {
                hold_started.get_or_insert(now);
                debug!("[alarm] hold started");
                true
            }
        }
    }

    /// Button came back up.
    pub fn release(&mut self, now: Instant) -> Option<AlarmEvent> {
        match self.state {
            AlarmState::Ringing {
                since,
                hold_started: Some(start),
            } => {
                if elapsed(start, now) >= self.timing.dismiss_hold {
                    return Some(self.finish(AlarmEvent::Dismissed));
                }
                if self.can_snooze() {
                    self.snoozes += 1;
                    self.state = AlarmState::Snoozed {
                        until: now + self.timing.snooze,
                        hold_started: None,
                    };
                    info!(
                        "[alarm] snoozed ({=u8}/{=u8})",
                        self.snoozes,
                        self.timing.max_snoozes
                    );
                    return Some(AlarmEvent::Snoozed);
                }
                // 不能再贪睡，继续响
                self.state = AlarmState::Ringing {
                    since,
                    hold_started: None,
                };
                self.pattern_start = now;
                None
            }
            AlarmState::Snoozed {
                until,
                hold_started: Some(start),
            } => {
                if elapsed(start, now) >= self.timing.dismiss_hold {
                    return Some(self.finish(AlarmEvent::Dismissed));
                }
                self.state = AlarmState::Snoozed {
                    until,
                    hold_started: None,
                };
                None
            }
            _ => None,
        }
    }

    /// Advance timers. Call often (every few tens of milliseconds).
    pub fn poll(&mut self, now: Instant) -> (BuzzerCommand, Option<AlarmEvent>) {
        match self.state {
            AlarmState::Idle => (BuzzerCommand::Silent, None),
            AlarmState::Ringing {
                since,
                hold_started,
            } => {
                if self.hold_done(hold_started, now) {
                    return (BuzzerCommand::Silent, Some(self.finish(AlarmEvent::Dismissed)));
                }
                if elapsed(since, now) >= self.timing.ring_timeout {
                    warn!("[alarm] nobody answered, giving up");
                    return (BuzzerCommand::Silent, Some(self.finish(AlarmEvent::TimedOut)));
                }
                if hold_started.is_some() {
                    return (BuzzerCommand::Silent, None);
                }
                let command = self.pattern.command_at(elapsed(self.pattern_start, now));
                (command, None)
            }
            AlarmState::Snoozed {
                until,
                hold_started,
            } => {
                if self.hold_done(hold_started, now) {
                    return (BuzzerCommand::Silent, Some(self.finish(AlarmEvent::Dismissed)));
                }
                if hold_started.is_none() && now >= until {
                    info!("[alarm] snooze over");
                    self.ring(now);
                    let command = self.pattern.command_at(Duration::from_ticks(0));
                    return (command, Some(AlarmEvent::Resumed));
                }
                (BuzzerCommand::Silent, None)
            }
        }
    }

    /// Stop whatever is going on without an event.
    pub fn cancel(&mut self) {
        if self.is_active() {
            info!("[alarm] cancelled");
        }
        self.state = AlarmState::Idle;
        self.snoozes = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: u64) -> Instant {
        Instant::from_ticks(ms)
    }

    fn secs(s: u64) -> u64 {
        s * 1_000
    }

    fn alarm() -> AlarmTime {
        AlarmTime::new(6, 30).unwrap()
    }

    fn wall(h: u8, m: u8, s: u8) -> TimeOfDay {
        TimeOfDay::new(h, m, s).unwrap()
    }

    fn ringing(timing: AlarmTiming) -> AlarmMachine {
        let mut m = AlarmMachine::new(timing);
        assert_eq!(
            m.check(wall(6, 30, 0), alarm(), true, at(0)),
            Some(AlarmEvent::Triggered)
        );
        m
    }

    #[test]
    fn fires_once_per_alarm_minute() {
        let mut m = AlarmMachine::new(AlarmTiming::DEFAULT);
        assert_eq!(m.check(wall(6, 29, 59), alarm(), true, at(0)), None);
        assert_eq!(
            m.check(wall(6, 30, 0), alarm(), true, at(1_000)),
            Some(AlarmEvent::Triggered)
        );

        // 在同一分钟内长按关闭后不会再次触发
        assert!(m.press(at(2_000)));
        let (_, ev) = m.poll(at(5_000));
        assert_eq!(ev, Some(AlarmEvent::Dismissed));
        assert_eq!(m.check(wall(6, 30, 5), alarm(), true, at(6_000)), None);

        // 下一天同一分钟会再触发
        assert_eq!(m.check(wall(6, 31, 0), alarm(), true, at(7_000)), None);
        assert_eq!(
            m.check(wall(6, 30, 0), alarm(), true, at(8_000)),
            Some(AlarmEvent::Triggered)
        );
    }

    #[test]
    fn missed_second_zero_still_triggers() {
        let mut m = AlarmMachine::new(AlarmTiming::DEFAULT);
        assert_eq!(
            m.check(wall(6, 30, 2), alarm(), true, at(0)),
            Some(AlarmEvent::Triggered)
        );
    }

    #[test]
    fn disabled_alarm_never_rings() {
        let mut m = AlarmMachine::new(AlarmTiming::DEFAULT);
        assert_eq!(m.check(wall(6, 30, 0), alarm(), false, at(0)), None);
        assert_eq!(m.poll(at(10)).0, BuzzerCommand::Silent);
    }

    #[test]
    fn buzzer_follows_pattern_while_ringing() {
        let mut m = ringing(AlarmTiming::DEFAULT);
        assert_eq!(m.poll(at(50)).0, BuzzerCommand::Tone);
        assert_eq!(m.poll(at(150)).0, BuzzerCommand::Silent);
        assert_eq!(m.poll(at(250)).0, BuzzerCommand::Tone);
    }

    #[test]
    fn hold_silences_then_dismisses_while_still_held() {
        let mut m = ringing(AlarmTiming::DEFAULT);
        assert!(m.press(at(1_000)));
        assert_eq!(m.poll(at(1_050)), (BuzzerCommand::Silent, None));
        assert_eq!(m.poll(at(3_999)), (BuzzerCommand::Silent, None));
        assert_eq!(
            m.poll(at(4_000)),
            (BuzzerCommand::Silent, Some(AlarmEvent::Dismissed))
        );
        assert_eq!(m.state(), AlarmState::Idle);
        // 之后的松开不再产生事件
        assert_eq!(m.release(at(4_500)), None);
    }

    #[test]
    fn short_press_snoozes_and_snooze_resumes() {
        let timing = AlarmTiming::DEFAULT.with_snooze_minutes(1);
        let mut m = ringing(timing);
        assert!(m.press(at(1_000)));
        assert_eq!(m.release(at(1_300)), Some(AlarmEvent::Snoozed));
        assert_eq!(m.poll(at(30_000)), (BuzzerCommand::Silent, None));

        let (cmd, ev) = m.poll(at(1_300 + secs(60)));
        assert_eq!(ev, Some(AlarmEvent::Resumed));
        assert_eq!(cmd, BuzzerCommand::Tone);
        assert!(matches!(m.state(), AlarmState::Ringing { .. }));
    }

    #[test]
    fn snooze_limit_keeps_ringing() {
        let timing = AlarmTiming {
            max_snoozes: 1,
            ..AlarmTiming::DEFAULT.with_snooze_minutes(1)
        };
        let mut m = ringing(timing);
        assert!(m.can_snooze());
        m.press(at(100));
        assert_eq!(m.release(at(200)), Some(AlarmEvent::Snoozed));
        assert!(!m.can_snooze());
        assert_eq!(m.poll(at(200 + secs(60))).1, Some(AlarmEvent::Resumed));

        let t = 200 + secs(61);
        m.press(at(t));
        assert_eq!(m.release(at(t + 100)), None);
        assert!(matches!(m.state(), AlarmState::Ringing { .. }));
        // 图案从松开时刻重新开始
        assert_eq!(m.poll(at(t + 150)).0, BuzzerCommand::Tone);
    }

    #[test]
    fn zero_snooze_disables_snoozing() {
        let mut m = ringing(AlarmTiming::DEFAULT.with_snooze_minutes(0));
        assert!(!m.can_snooze());
        m.press(at(100));
        assert_eq!(m.release(at(300)), None);
        assert!(matches!(m.state(), AlarmState::Ringing { .. }));
    }

    #[test]
    fn new_timing_applies_to_running_alarm() {
        let mut m = ringing(AlarmTiming::DEFAULT);
        m.set_timing(AlarmTiming::DEFAULT.with_snooze_minutes(0));
        assert_eq!(m.timing().snooze, Duration::from_ticks(0));
        assert!(!m.can_snooze());
        m.press(at(100));
        assert_eq!(m.release(at(300)), None);
    }

    #[test]
    fn ring_timeout_stops_alarm() {
        let mut m = ringing(AlarmTiming::DEFAULT);
        assert_eq!(m.poll(at(secs(299))).1, None);
        assert_eq!(
            m.poll(at(secs(300))),
            (BuzzerCommand::Silent, Some(AlarmEvent::TimedOut))
        );
        assert!(!m.is_active());
    }

    #[test]
    fn hold_during_snooze_dismisses() {
        let mut m = ringing(AlarmTiming::DEFAULT);
        m.press(at(100));
        m.release(at(200));
        assert!(m.press(at(10_000)));
        assert_eq!(m.release(at(10_500)), None);
        assert!(matches!(m.state(), AlarmState::Snoozed { .. }));

        assert!(m.press(at(20_000)));
        assert_eq!(m.poll(at(23_000)).1, Some(AlarmEvent::Dismissed));
        assert_eq!(m.snoozes_used(), 0);
    }

    #[test]
    fn idle_machine_ignores_button() {
        let mut m = AlarmMachine::new(AlarmTiming::DEFAULT);
        assert!(!m.press(at(0)));
        assert_eq!(m.release(at(100)), None);
    }

    #[test]
    fn cancel_resets_state_and_snoozes() {
        let mut m = ringing(AlarmTiming::DEFAULT);
        m.press(at(100));
        m.release(at(200));
        assert_eq!(m.snoozes_used(), 1);
        m.cancel();
        assert_eq!(m.state(), AlarmState::Idle);
        assert_eq!(m.snoozes_used(), 0);
    }
}
