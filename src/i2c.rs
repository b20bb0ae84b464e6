use embassy_embedded_hal::shared_bus::asynch::i2c::I2cDevice;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use esp_hal::gpio::interconnect::PeripheralOutput;
use esp_hal::i2c::master::Config as I2cConfig;
use esp_hal::i2c::master::{I2c, Instance};
use esp_hal::time::Rate;
use esp_hal::Async;

use crate::mk_static;

pub type I2cAsync = I2c<'static, Async>;
pub type I2cMutex = Mutex<CriticalSectionRawMutex, I2cAsync>;
/// 共享总线上的一个设备句柄
pub type I2cBus = I2cDevice<'static, CriticalSectionRawMutex, I2cAsync>;

/// 初始化 I2C
///
/// DS3231 支持 400kHz 快速模式。总线放在 mutex 里，
/// 之后可以通过 [`device`] 给每个外设一个句柄。
///
/// # Panics
///
/// 当 I2C 初始化失败时会 panic
pub fn init(
    i2c: impl Instance + 'static,
    sda: impl PeripheralOutput<'static>,
    scl: impl PeripheralOutput<'static>,
) -> &'static I2cMutex {
    let i2c = I2c::new(
        i2c,
        I2cConfig::default().with_frequency(Rate::from_khz(400)),
    )
    .expect("Failed to initialize I2C")
    .with_sda(sda)
    .with_scl(scl)
    .into_async();

    mk_static!(I2cMutex, Mutex::new(i2c))
}

/// 获取共享总线上的设备句柄
pub fn device(bus: &'static I2cMutex) -> I2cBus {
    I2cDevice::new(bus)
}
