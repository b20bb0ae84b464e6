#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

use defmt::info;
use embassy_executor::Spawner;
use esp_hal::clock::CpuClock;
use esp_hal::timer::timg::TimerGroup;
use {esp_backtrace as _, esp_println as _};

mod app;
mod button;
mod buzzer;
mod config;
mod display;
mod error;
mod i2c;
mod led;
mod ntp;
mod rtc;
mod wifi;

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

/// 把值放进一个 `StaticCell`，得到 `&'static mut`
#[macro_export]
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write($val);
        x
    }};
}

#[esp_rtos::main]
async fn main(spawner: Spawner) {
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // WiFi 驱动需要堆
    esp_alloc::heap_allocator!(size: 64 * 1024);

    let time_g0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(time_g0.timer0);

    info!("Embassy initialized!");

    led::status_led_init(peripherals.GPIO1).await;

    // RTC: I2C0 on GPIO41/42, SQW on GPIO4
    let i2c_bus = i2c::init(peripherals.I2C0, peripherals.GPIO41, peripherals.GPIO42);
    let rtc = rtc::init(i2c::device(i2c_bus))
        .await
        .expect("failed to configure DS3231");
    spawner
        .spawn(rtc::listen_for_sqw(rtc::sqw_input(peripherals.GPIO4)))
        .expect("failed to spawn SQW task");

    spawner
        .spawn(button::read_button(button::button_input(peripherals.GPIO0)))
        .expect("failed to spawn button task");

    let mut buzzer =
        buzzer::Buzzer::new(peripherals.LEDC, peripherals.GPIO5).expect("failed to set up buzzer");
    buzzer.chirp().await;

    let face = display::ClockFace::new(display::DisplayPins {
        spi: peripherals.SPI2,
        sck: peripherals.GPIO12,
        mosi: peripherals.GPIO11,
        miso: peripherals.GPIO13,
        cs: peripherals.GPIO21,
        dc: peripherals.GPIO40,
        rst: peripherals.GPIO14,
    })
    .expect("failed to initialize display");

    match config::WIFI_SSID {
        Some(ssid) => {
            let stack = wifi::init(spawner, peripherals.WIFI, ssid);
            spawner
                .spawn(ntp::fetch_time(stack))
                .expect("failed to spawn ntp task");
        }
        None => info!("WIFI_SSID not set, running from the RTC only"),
    }

    spawner
        .spawn(app::run(rtc, buzzer, face, config::boot_settings()))
        .expect("failed to spawn event loop");
}
