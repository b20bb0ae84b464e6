//! Push button debouncing.
//!
//! The firmware samples the raw pin level at a fixed rate and feeds it to a
//! [`Debouncer`]. The logical state only follows the raw level once the raw
//! level has been stable for the configured window, so contact bounce never
//! reaches the alarm or the settings pages.

use crate::{Duration, Instant, elapsed};

/// 默认稳定时间窗口
pub const DEFAULT_STABLE_FOR: Duration = Duration::from_ticks(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEdge {
    Pressed,
    Released,
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    stable_for: Duration,
    pressed: bool,
    /// When the raw level started to differ from `pressed`.
    candidate_since: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_STABLE_FOR)
    }
}

impl Debouncer {
    pub fn new(stable_for: Duration) -> Self {
        Self {
            stable_for,
            pressed: false,
            candidate_since: None,
        }
    }

    /// Logical (debounced) state.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Feed one raw sample. Returns an edge when the logical state changes.
    pub fn update(&mut self, raw_pressed: bool, now: Instant) -> Option<ButtonEdge> {
        if raw_pressed == self.pressed {
            // 抖动结束前电平又回来了
            self.candidate_since = None;
            return None;
        }

        let since = *self.candidate_since.get_or_insert(now);
        if elapsed(since, now) < self.stable_for {
            return None;
        }

        self.pressed = raw_pressed;
        self.candidate_since = None;
        Some(if raw_pressed {
            ButtonEdge::Pressed
        } else {
            ButtonEdge::Released
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: u64) -> Instant {
        Instant::from_ticks(ms)
    }

    #[test]
    fn stable_press_and_release_emit_once() {
        let mut d = Debouncer::new(Duration::from_ticks(30));
        assert_eq!(d.update(true, at(0)), None);
        assert_eq!(d.update(true, at(15)), None);
        assert_eq!(d.update(true, at(30)), Some(ButtonEdge::Pressed));
        assert_eq!(d.update(true, at(35)), None);
        assert!(d.is_pressed());

        assert_eq!(d.update(false, at(500)), None);
        assert_eq!(d.update(false, at(530)), Some(ButtonEdge::Released));
        assert_eq!(d.update(false, at(600)), None);
        assert!(!d.is_pressed());
    }

    #[test]
    fn bounces_shorter_than_window_are_ignored() {
        let mut d = Debouncer::new(Duration::from_ticks(30));
        for t in (0..200).step_by(10) {
            // 每 10ms 翻转一次
            let raw = (t / 10) % 2 == 0;
            assert_eq!(d.update(raw, at(t)), None);
        }
        assert!(!d.is_pressed());
    }

    #[test]
    fn bounce_restarts_the_window() {
        let mut d = Debouncer::new(Duration::from_ticks(30));
        d.update(true, at(0));
        d.update(false, at(20));
        assert_eq!(d.update(true, at(25)), None);
        assert_eq!(d.update(true, at(50)), None);
        assert_eq!(d.update(true, at(55)), Some(ButtonEdge::Pressed));
    }
}
