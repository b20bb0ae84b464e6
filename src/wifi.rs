//! # WiFi
//!
//! Station mode only, used for the NTP lookup. The controller task keeps the
//! link up and reconnects after a drop; `embassy-net` takes care of DHCP.

use defmt::{debug, info, warn};
use embassy_executor::Spawner;
use embassy_net::{Stack, StackResources};
use embassy_time::Timer;
use esp_hal::peripherals::WIFI;
use esp_hal::rng::Rng;
use esp_radio::wifi::{
    ClientConfig, Config as WifiConfig, ModeConfig, WifiController, WifiDevice, WifiEvent,
    WifiStaState,
};
use esp_radio::Controller;

use crate::config::WIFI_PASSWORD;
use crate::mk_static;

/// DHCP + DNS + 一个 NTP 的 UDP socket
const MAX_NET_SOCKETS: usize = 3;
const RECONNECT_DELAY_MS: u64 = 5_000;

/// Bring up the radio and the network stack, spawning the driver tasks.
///
/// # Panics
///
/// Panics if the radio cannot be initialized.
pub fn init(
    spawner: Spawner,
    peripherals_wifi: WIFI<'static>,
    ssid: &'static str,
) -> Stack<'static> {
    let radio_init = mk_static!(
        Controller<'static>,
        esp_radio::init().expect("Failed to init WiFi controller")
    );

    let (wifi_controller, interfaces) =
        esp_radio::wifi::new(radio_init, peripherals_wifi, WifiConfig::default())
            .expect("Failed to create WiFi interface");

    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        mk_static!(
            StackResources<MAX_NET_SOCKETS>,
            StackResources::<MAX_NET_SOCKETS>::new()
        ),
        seed,
    );

    spawner
        .spawn(connect(wifi_controller, ssid))
        .expect("failed to spawn wifi task");
    spawner
        .spawn(net_runner(runner))
        .expect("failed to spawn net runner task");

    info!("[wifi] station mode, SSID {}", ssid);
    stack
}

#[embassy_executor::task]
async fn net_runner(mut runner: embassy_net::Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

/// 保持连接，断开后等待 5 秒重连
#[embassy_executor::task]
async fn connect(mut controller: WifiController<'static>, ssid: &'static str) {
    loop {
        if matches!(esp_radio::wifi::sta_state(), WifiStaState::Connected) {
            controller.wait_for_event(WifiEvent::StaDisconnected).await;
            warn!("[wifi] disconnected");
            Timer::after_millis(RECONNECT_DELAY_MS).await;
        }

        if !matches!(controller.is_started(), Ok(true)) {
            let station_config = ModeConfig::Client(
                ClientConfig::default()
                    .with_ssid(ssid.into())
                    .with_password(WIFI_PASSWORD.into()),
            );
            if let Err(e) = controller.set_config(&station_config) {
                warn!("[wifi] bad station config: {}", e);
                Timer::after_millis(RECONNECT_DELAY_MS).await;
                continue;
            }
            debug!("[wifi] starting");
            if let Err(e) = controller.start_async().await {
                warn!("[wifi] failed to start: {}", e);
                Timer::after_millis(RECONNECT_DELAY_MS).await;
                continue;
            }
        }

        match controller.connect_async().await {
            Ok(()) => info!("[wifi] connected"),
            Err(e) => {
                warn!("[wifi] failed to connect: {}", e);
                Timer::after_millis(RECONNECT_DELAY_MS).await
            }
        }
    }
}
