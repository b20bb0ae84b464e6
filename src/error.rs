//! 错误类型
//!
//! Tasks log these and keep going; only `main` turns them into panics.

use clock_core::TimeError;
use ds3231::DS3231Error;
use embassy_embedded_hal::shared_bus::I2cDeviceError;

pub type BusError = I2cDeviceError<esp_hal::i2c::master::Error>;

/// DS3231 读写错误
#[derive(Debug)]
pub enum RtcError {
    Bus(DS3231Error<BusError>),
    /// The RTC answered with a time the clock cannot represent.
    InvalidTime(TimeError),
}

impl From<DS3231Error<BusError>> for RtcError {
    fn from(value: DS3231Error<BusError>) -> Self {
        Self::Bus(value)
    }
}

impl From<TimeError> for RtcError {
    fn from(value: TimeError) -> Self {
        Self::InvalidTime(value)
    }
}

impl defmt::Format for RtcError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            RtcError::Bus(e) => defmt::write!(f, "RTC bus error: {}", defmt::Debug2Format(e)),
            RtcError::InvalidTime(e) => defmt::write!(f, "RTC returned invalid time: {}", e),
        }
    }
}

/// 蜂鸣器 PWM 配置错误
#[derive(Debug)]
pub enum BuzzerError {
    Timer(esp_hal::ledc::timer::Error),
    Channel(esp_hal::ledc::channel::Error),
}

impl From<esp_hal::ledc::timer::Error> for BuzzerError {
    fn from(value: esp_hal::ledc::timer::Error) -> Self {
        Self::Timer(value)
    }
}

impl From<esp_hal::ledc::channel::Error> for BuzzerError {
    fn from(value: esp_hal::ledc::channel::Error) -> Self {
        Self::Channel(value)
    }
}

impl defmt::Format for BuzzerError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            BuzzerError::Timer(e) => {
                defmt::write!(f, "LEDC timer error: {}", defmt::Debug2Format(e))
            }
            BuzzerError::Channel(e) => {
                defmt::write!(f, "LEDC channel error: {}", defmt::Debug2Format(e))
            }
        }
    }
}

/// 显示屏错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    Spi,
    Init,
    Draw,
}

impl defmt::Format for DisplayError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            DisplayError::Spi => defmt::write!(f, "Display SPI setup failed"),
            DisplayError::Init => defmt::write!(f, "Display controller init failed"),
            DisplayError::Draw => defmt::write!(f, "Display write failed"),
        }
    }
}

/// NTP 同步错误
#[derive(Debug)]
pub enum NtpError {
    LinkTimeout,
    DhcpTimeout,
    Socket,
    Dns,
    NoAddress,
    Request(sntpc::Error),
    BadTimestamp(u32),
}

impl defmt::Format for NtpError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            NtpError::LinkTimeout => defmt::write!(f, "Network link timed out"),
            NtpError::DhcpTimeout => defmt::write!(f, "DHCP address request timed out"),
            NtpError::Socket => defmt::write!(f, "Failed to bind UDP socket"),
            NtpError::Dns => defmt::write!(f, "DNS lookup failed"),
            NtpError::NoAddress => defmt::write!(f, "DNS returned no address"),
            NtpError::Request(e) => {
                defmt::write!(f, "SNTP request failed: {}", defmt::Debug2Format(e))
            }
            NtpError::BadTimestamp(secs) => {
                defmt::write!(f, "SNTP timestamp {} out of range", secs)
            }
        }
    }
}
