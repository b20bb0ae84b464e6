use defmt::info;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex as EmbassyMutex;
use esp_hal::gpio::{Level, Output, OutputConfig, OutputPin};

/// 闹钟状态指示灯，闹钟开启时点亮
pub static STATUS_LED: EmbassyMutex<CriticalSectionRawMutex, Option<Output<'static>>> =
    EmbassyMutex::new(None);

pub async fn status_led_init(led: impl OutputPin + 'static) {
    // 分配 GPIO 引脚
    let led = Output::new(led, Level::Low, OutputConfig::default());
    STATUS_LED.lock().await.replace(led);
    info!("Status LED init done");
}

pub async fn set_status_led(on: bool) {
    if let Some(led) = STATUS_LED.lock().await.as_mut() {
        led.set_level(Level::from(on));
    }
}
