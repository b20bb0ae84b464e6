//! Wall-clock time of day and alarm time.

use core::fmt::Write as _;

/// Longest rendering is `"12:59:59 PM"`.
pub type TimeString = heapless::String<11>;
/// Longest rendering is `"12:59 PM"`.
pub type AlarmString = heapless::String<8>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeError {
    #[error("hour {0} is out of range 0..=23")]
    InvalidHour(u8),
    #[error("minute {0} is out of range 0..=59")]
    InvalidMinute(u8),
    #[error("second {0} is out of range 0..=59")]
    InvalidSecond(u8),
}

/// 12 或 24 小时制显示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HourFormat {
    #[default]
    TwentyFour,
    Twelve,
}

impl HourFormat {
    pub fn toggled(self) -> Self {
        match self {
            HourFormat::TwentyFour => HourFormat::Twelve,
            HourFormat::Twelve => HourFormat::TwentyFour,
        }
    }
}

/// Splits a 24-hour value into the 12-hour dial value and the AM/PM suffix.
fn twelve_hour(hour: u8) -> (u8, &'static str) {
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let dial = match hour % 12 {
        0 => 12,
        h => h,
    };
    (dial, suffix)
}

fn check_hour(hour: u8) -> Result<(), TimeError> {
    if hour > 23 {
        return Err(TimeError::InvalidHour(hour));
    }
    Ok(())
}

fn check_minute(minute: u8) -> Result<(), TimeError> {
    if minute > 59 {
        return Err(TimeError::InvalidMinute(minute));
    }
    Ok(())
}

/// Time of day as kept by the RTC, 24-hour representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
    second: u8,
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay {
        hour: 0,
        minute: 0,
        second: 0,
    };

    pub fn new(hour: u8, minute: u8, second: u8) -> Result<Self, TimeError> {
        check_hour(hour)?;
        check_minute(minute)?;
        if second > 59 {
            return Err(TimeError::InvalidSecond(second));
        }
        Ok(Self {
            hour,
            minute,
            second,
        })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    /// Advance by one second. Returns `true` when the minute rolled over.
    pub fn tick(&mut self) -> bool {
        self.second += 1;
        if self.second < 60 {
            return false;
        }
        self.second = 0;
        self.minute += 1;
        if self.minute == 60 {
            self.minute = 0;
            self.hour = (self.hour + 1) % 24;
        }
        true
    }

    /// Hour and minute equal the alarm's, whatever the second.
    pub fn matches(&self, alarm: AlarmTime) -> bool {
        self.hour == alarm.hour && self.minute == alarm.minute
    }

    pub fn format(&self, format: HourFormat) -> TimeString {
        let mut out = TimeString::new();
        // capacity fits the longest form, write! cannot fail
        let _ = match format {
            HourFormat::TwentyFour => write!(
                out,
                "{:02}:{:02}:{:02}",
                self.hour, self.minute, self.second
            ),
            HourFormat::Twelve => {
                let (dial, suffix) = twelve_hour(self.hour);
                write!(
                    out,
                    "{:02}:{:02}:{:02} {}",
                    dial, self.minute, self.second, suffix
                )
            }
        };
        out
    }
}

/// Hour and minute at which the alarm rings, every day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmTime {
    hour: u8,
    minute: u8,
}

impl AlarmTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, TimeError> {
        check_hour(hour)?;
        check_minute(minute)?;
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn next_hour(self) -> Self {
        Self {
            hour: (self.hour + 1) % 24,
            ..self
        }
    }

    pub fn next_minute(self) -> Self {
        Self {
            minute: (self.minute + 1) % 60,
            ..self
        }
    }

    pub fn format(&self, format: HourFormat) -> AlarmString {
        let mut out = AlarmString::new();
        let _ = match format {
            HourFormat::TwentyFour => write!(out, "{:02}:{:02}", self.hour, self.minute),
            HourFormat::Twelve => {
                let (dial, suffix) = twelve_hour(self.hour);
                write!(out, "{:02}:{:02} {}", dial, self.minute, suffix)
            }
        };
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_fields() {
        assert_eq!(TimeOfDay::new(24, 0, 0), Err(TimeError::InvalidHour(24)));
        assert_eq!(TimeOfDay::new(0, 60, 0), Err(TimeError::InvalidMinute(60)));
        assert_eq!(TimeOfDay::new(0, 0, 60), Err(TimeError::InvalidSecond(60)));
        assert_eq!(AlarmTime::new(7, 75), Err(TimeError::InvalidMinute(75)));
        assert!(AlarmTime::new(23, 59).is_ok());
    }

    #[test]
    fn tick_rolls_minute_hour_and_day() {
        let mut t = TimeOfDay::new(6, 59, 58).unwrap();
        assert!(!t.tick());
        assert_eq!(t, TimeOfDay::new(6, 59, 59).unwrap());
        assert!(t.tick());
        assert_eq!(t, TimeOfDay::new(7, 0, 0).unwrap());

        let mut t = TimeOfDay::new(23, 59, 59).unwrap();
        assert!(t.tick());
        assert_eq!(t, TimeOfDay::MIDNIGHT);
    }

    #[test]
    fn matches_ignores_seconds() {
        let alarm = AlarmTime::new(6, 30).unwrap();
        assert!(TimeOfDay::new(6, 30, 0).unwrap().matches(alarm));
        assert!(TimeOfDay::new(6, 30, 41).unwrap().matches(alarm));
        assert!(!TimeOfDay::new(6, 31, 0).unwrap().matches(alarm));
        assert!(!TimeOfDay::new(18, 30, 0).unwrap().matches(alarm));
    }

    #[test]
    fn alarm_steps_wrap() {
        let a = AlarmTime::new(23, 59).unwrap();
        assert_eq!(a.next_hour(), AlarmTime::new(0, 59).unwrap());
        assert_eq!(a.next_minute(), AlarmTime::new(23, 0).unwrap());
    }

    #[test]
    fn formats_both_hour_modes() {
        let t = TimeOfDay::new(0, 5, 9).unwrap();
        assert_eq!(t.format(HourFormat::TwentyFour).as_str(), "00:05:09");
        assert_eq!(t.format(HourFormat::Twelve).as_str(), "12:05:09 AM");

        let t = TimeOfDay::new(12, 0, 0).unwrap();
        assert_eq!(t.format(HourFormat::Twelve).as_str(), "12:00:00 PM");

        let t = TimeOfDay::new(19, 45, 3).unwrap();
        assert_eq!(t.format(HourFormat::Twelve).as_str(), "07:45:03 PM");

        let a = AlarmTime::new(6, 30).unwrap();
        assert_eq!(a.format(HourFormat::TwentyFour).as_str(), "06:30");
        assert_eq!(a.format(HourFormat::Twelve).as_str(), "06:30 AM");
    }
}
