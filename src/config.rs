//! 构建时配置
//!
//! All values come from environment variables read at compile time, e.g.
//!
//! ```text
//! ALARM_HOUR=6 ALARM_MINUTE=45 TZ_OFFSET=8 WIFI_SSID=home WIFI_PASSWORD=secret cargo run --release
//! ```
//!
//! Invalid numbers fall back to the default; out of range values fail the
//! build.

use clock_core::{HourFormat, Settings};
use defmt::warn;

/// Parses an unsigned number in `radix`, returning `default` if `value` is
/// missing, empty, not a number or larger than `u8::MAX`.
const fn parse_u8(value: Option<&str>, radix: u32, default: u8) -> u8 {
    match value {
        Some(value) => parse_digits(value.as_bytes(), radix, default),
        None => default,
    }
}

const fn parse_digits(bytes: &[u8], radix: u32, default: u8) -> u8 {
    if bytes.is_empty() {
        return default;
    }

    let mut acc: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let digit = match bytes[i] {
            b @ b'0'..=b'9' => (b - b'0') as u32,
            b @ b'a'..=b'f' => (b - b'a' + 10) as u32,
            b @ b'A'..=b'F' => (b - b'A' + 10) as u32,
            _ => return default,
        };
        if digit >= radix {
            return default;
        }
        acc = acc * radix + digit;
        if acc > u8::MAX as u32 {
            return default;
        }
        i += 1;
    }
    acc as u8
}

const fn parse_i8(value: Option<&str>, default: i8) -> i8 {
    let Some(value) = value else {
        return default;
    };
    // 解析失败时返回 200，超出 i8 范围，落到 default
    match value.as_bytes() {
        [b'-', rest @ ..] => match parse_digits(rest, 10, 200) {
            v if v > 128 => default,
            v => -(v as i16) as i8,
        },
        digits => match parse_digits(digits, 10, 200) {
            v if v > 127 => default,
            v => v as i8,
        },
    }
}

const fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value {
        None => default,
        Some(v) => matches!(v.as_bytes(), b"1" | b"true" | b"yes" | b"on"),
    }
}

pub const ALARM_HOUR: u8 = parse_u8(option_env!("ALARM_HOUR"), 10, 7);
pub const ALARM_MINUTE: u8 = parse_u8(option_env!("ALARM_MINUTE"), 10, 0);
pub const ALARM_ENABLED: bool = parse_bool(option_env!("ALARM_ENABLED"), true);
pub const SNOOZE_MINUTES: u8 = parse_u8(option_env!("SNOOZE_MINUTES"), 10, 9);

pub const HOUR_FORMAT: HourFormat = match parse_u8(option_env!("HOUR_FORMAT"), 10, 24) {
    12 => HourFormat::Twelve,
    _ => HourFormat::TwentyFour,
};

/// Hours east of UTC. The RTC keeps local time, NTP answers in UTC.
pub const TZ_OFFSET: i8 = parse_i8(option_env!("TZ_OFFSET"), 0);

/// 7-bit address, given in hex.
pub const RTC_I2C_ADDR: u8 = parse_u8(option_env!("RTC_I2C_ADDR"), 16, 0x68);

/// WiFi is only brought up when an SSID is configured.
pub const WIFI_SSID: Option<&str> = option_env!("WIFI_SSID");
pub const WIFI_PASSWORD: &str = match option_env!("WIFI_PASSWORD") {
    Some(p) => p,
    None => "",
};
pub const NTP_SERVER: &str = match option_env!("NTP_SERVER") {
    Some(s) => s,
    None => "pool.ntp.org",
};

const _: () = assert!(ALARM_HOUR < 24, "ALARM_HOUR must be 0..=23");
const _: () = assert!(ALARM_MINUTE < 60, "ALARM_MINUTE must be 0..=59");
const _: () = assert!(TZ_OFFSET >= -12 && TZ_OFFSET <= 14, "TZ_OFFSET must be -12..=14");

/// Settings the clock boots with.
pub fn boot_settings() -> Settings {
    let mut settings = match Settings::with_alarm(ALARM_HOUR, ALARM_MINUTE) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("[config] bad alarm time: {}", e);
            Settings::default()
        }
    };
    settings.alarm_enabled = ALARM_ENABLED;
    settings.hour_format = HOUR_FORMAT;
    settings.timing = settings.timing.with_snooze_minutes(SNOOZE_MINUTES);
    settings
}
