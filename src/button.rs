use clock_core::{ButtonEdge, Debouncer};
use defmt::{debug, info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Ticker};
use esp_hal::gpio::{Input, InputConfig, InputPin, Pull};

use crate::app::core_instant;

/// 采样间隔
const SAMPLE_INTERVAL: Duration = Duration::from_millis(5);

/// A debounced edge and when it was detected.
#[derive(Debug, Clone, Copy, defmt::Format)]
pub struct ButtonEvent {
    pub edge: ButtonEdge,
    pub at: Instant,
}

pub static BUTTON_EVENTS: Channel<CriticalSectionRawMutex, ButtonEvent, 8> = Channel::new();

/// 按键低电平有效，使用内部上拉
pub fn button_input(pin: impl InputPin + 'static) -> Input<'static> {
    let input = Input::new(pin, InputConfig::default().with_pull(Pull::Up));
    info!("Alarm button initialized");
    input
}

/// 按键检测任务
///
/// 空闲时等待下降沿中断唤醒，按下后每 5 毫秒采样一次，
/// 交给 [`Debouncer`] 过滤抖动，直到按键稳定松开。
/// 只把稳定后的边沿发送到 [`BUTTON_EVENTS`]。
#[embassy_executor::task]
pub async fn read_button(mut button: Input<'static>) {
    let mut debouncer = Debouncer::default();
    let mut ticker = Ticker::every(SAMPLE_INTERVAL);

    loop {
        if !debouncer.is_pressed() && button.is_high() {
            button.wait_for_falling_edge().await;
            debug!("[button] woke on falling edge");
            ticker.reset();
        }

        let now = Instant::now();
        if let Some(edge) = debouncer.update(button.is_low(), core_instant(now)) {
            info!("[button] {}", edge);
            if BUTTON_EVENTS.try_send(ButtonEvent { edge, at: now }).is_err() {
                warn!("[button] event queue full, dropping {}", edge);
            }
        }

        ticker.next().await;
    }
}
