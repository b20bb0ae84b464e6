//! Beep patterns for the passive buzzer.

use crate::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BuzzerCommand {
    #[default]
    Silent,
    Tone,
}

/// One step of a pattern: tone on or off for `duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub on: bool,
    pub duration: Duration,
}

const fn step(on: bool, ms: u64) -> Step {
    Step {
        on,
        duration: Duration::from_ticks(ms),
    }
}

/// A cyclic on/off table, repeated until the alarm stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeepPattern {
    steps: &'static [Step],
}

/// 四声短响，然后停顿
static ALARM_STEPS: [Step; 8] = [
    step(true, 100),
    step(false, 100),
    step(true, 100),
    step(false, 100),
    step(true, 100),
    step(false, 100),
    step(true, 100),
    step(false, 800),
];

impl BeepPattern {
    pub const ALARM: BeepPattern = BeepPattern {
        steps: &ALARM_STEPS,
    };

    /// `steps` must not be empty and must have a non-zero total length.
    pub const fn new(steps: &'static [Step]) -> Self {
        Self { steps }
    }

    pub fn period(&self) -> Duration {
        self.steps
            .iter()
            .fold(Duration::from_ticks(0), |acc, s| acc + s.duration)
    }

    /// Command for a point in time, `elapsed` after the pattern started.
    pub fn command_at(&self, elapsed: Duration) -> BuzzerCommand {
        let period = self.period().ticks();
        if period == 0 {
            return BuzzerCommand::Silent;
        }

        let mut offset = elapsed.ticks() % period;
        for s in self.steps {
            let len = s.duration.ticks();
            if offset < len {
                return if s.on {
                    BuzzerCommand::Tone
                } else {
                    BuzzerCommand::Silent
                };
            }
            offset -= len;
        }
        BuzzerCommand::Silent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_ticks(v)
    }

    #[test]
    fn alarm_pattern_cycles() {
        let p = BeepPattern::ALARM;
        assert_eq!(p.period(), ms(1500));
        assert_eq!(p.command_at(ms(0)), BuzzerCommand::Tone);
        assert_eq!(p.command_at(ms(99)), BuzzerCommand::Tone);
        assert_eq!(p.command_at(ms(100)), BuzzerCommand::Silent);
        assert_eq!(p.command_at(ms(650)), BuzzerCommand::Tone);
        assert_eq!(p.command_at(ms(750)), BuzzerCommand::Silent);
        assert_eq!(p.command_at(ms(1499)), BuzzerCommand::Silent);
        // 第二个周期
        assert_eq!(p.command_at(ms(1500)), BuzzerCommand::Tone);
        assert_eq!(p.command_at(ms(1700)), BuzzerCommand::Tone);
    }

    #[test]
    fn empty_pattern_is_silent() {
        static NONE: [Step; 0] = [];
        let p = BeepPattern::new(&NONE);
        assert_eq!(p.command_at(ms(10)), BuzzerCommand::Silent);
    }
}
