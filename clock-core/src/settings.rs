//! User settings.
//!
//! Settings live in RAM only. At boot they come from the build-time
//! defaults, afterwards the settings pages change them.

use crate::alarm::AlarmTiming;
use crate::time::{AlarmTime, HourFormat, TimeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    pub alarm: AlarmTime,
    pub alarm_enabled: bool,
    pub hour_format: HourFormat,
    pub timing: AlarmTiming,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            alarm: AlarmTime::default(),
            alarm_enabled: false,
            hour_format: HourFormat::TwentyFour,
            timing: AlarmTiming::DEFAULT,
        }
    }
}

impl Settings {
    /// Settings with an enabled alarm at `hour:minute`.
    pub fn with_alarm(hour: u8, minute: u8) -> Result<Self, TimeError> {
        Ok(Self {
            alarm: AlarmTime::new(hour, minute)?,
            alarm_enabled: true,
            ..Self::default()
        })
    }

    /// Whether the alarm machine has to drop a running or pending alarm
    /// when switching from `self` to `next`.
    pub fn invalidates_alarm(&self, next: &Settings) -> bool {
        (self.alarm_enabled && !next.alarm_enabled) || self.alarm != next.alarm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_alarm_validates() {
        let s = Settings::with_alarm(7, 15).unwrap();
        assert!(s.alarm_enabled);
        assert_eq!(s.alarm, AlarmTime::new(7, 15).unwrap());
        assert_eq!(Settings::with_alarm(25, 0), Err(TimeError::InvalidHour(25)));
    }

    #[test]
    fn only_alarm_changes_invalidate() {
        let s = Settings::with_alarm(7, 15).unwrap();

        let mut other = s;
        other.hour_format = HourFormat::Twelve;
        assert!(!s.invalidates_alarm(&other));

        other.alarm = s.alarm.next_minute();
        assert!(s.invalidates_alarm(&other));

        let mut off = s;
        off.alarm_enabled = false;
        assert!(s.invalidates_alarm(&off));
        assert!(!off.invalidates_alarm(&s));
    }
}
