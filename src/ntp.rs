//! # SNTP
//!
//! Queries [`NTP_SERVER`] once the network is up and hands the local time to
//! the event loop through [`NTP_TIME`]. The event loop writes it to the RTC.
//! A failed query is retried after a minute, a good one is repeated daily.

use core::net::{IpAddr, SocketAddr};

use chrono::{DateTime, NaiveDateTime};
use defmt::{info, warn};
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::Stack;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer, WithTimeout as _};
use sntpc::NtpContext;

use crate::config::{NTP_SERVER, TZ_OFFSET};
use crate::error::NtpError;

const NTP_PORT: u16 = 123;
const NETWORK_TIMEOUT: Duration = Duration::from_secs(180);
const RETRY_AFTER: Duration = Duration::from_secs(60);
const RESYNC_AFTER: Duration = Duration::from_secs(24 * 60 * 60);

/// Local wall time from the last successful query.
pub static NTP_TIME: Signal<CriticalSectionRawMutex, NaiveDateTime> = Signal::new();

/// 本地时钟，单位微秒，只用来计算往返延迟
#[derive(Copy, Clone, Default)]
struct BootTimestamp(u64);

impl sntpc::NtpTimestampGenerator for BootTimestamp {
    fn init(&mut self) {
        self.0 = Instant::now().as_micros();
    }

    fn timestamp_sec(&self) -> u64 {
        self.0 / 1_000_000
    }

    fn timestamp_subsec_micros(&self) -> u32 {
        (self.0 % 1_000_000) as u32
    }
}

#[embassy_executor::task]
pub async fn fetch_time(stack: Stack<'static>) {
    let mut rx_meta = [PacketMetadata::EMPTY; 4];
    let mut tx_meta = [PacketMetadata::EMPTY; 4];
    let mut rx_buffer = [0u8; 512];
    let mut tx_buffer = [0u8; 512];

    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    if let Err(e) = socket.bind(NTP_PORT) {
        warn!("[ntp] {}: {}", NtpError::Socket, e);
        return;
    }

    loop {
        match query(stack, &socket).await {
            Ok(time) => {
                info!("[ntp] local time {}", defmt::Debug2Format(&time));
                NTP_TIME.signal(time);
                Timer::after(RESYNC_AFTER).await;
            }
            Err(e) => {
                warn!("[ntp] {}, retrying", e);
                Timer::after(RETRY_AFTER).await;
            }
        }
    }
}

async fn query(stack: Stack<'static>, socket: &UdpSocket<'_>) -> Result<NaiveDateTime, NtpError> {
    stack
        .wait_link_up()
        .with_timeout(NETWORK_TIMEOUT)
        .await
        .map_err(|_| NtpError::LinkTimeout)?;
    stack
        .wait_config_up()
        .with_timeout(NETWORK_TIMEOUT)
        .await
        .map_err(|_| NtpError::DhcpTimeout)?;
    if let Some(config) = stack.config_v4() {
        info!("[ntp] got IP {}", config.address);
    }

    let addrs = stack
        .dns_query(NTP_SERVER, smoltcp::wire::DnsQueryType::A)
        .with_timeout(NETWORK_TIMEOUT)
        .await
        .map_err(|_| NtpError::Dns)?
        .map_err(|_| NtpError::Dns)?;
    let addr: IpAddr = addrs.first().copied().ok_or(NtpError::NoAddress)?.into();

    info!("[ntp] querying {}", NTP_SERVER);
    let result = sntpc::get_time(
        SocketAddr::from((addr, NTP_PORT)),
        socket,
        NtpContext::new(BootTimestamp::default()),
    )
    .await
    .map_err(NtpError::Request)?;

    to_local(result.sec())
}

/// UTC 秒数加上时区偏移
fn to_local(utc_secs: u32) -> Result<NaiveDateTime, NtpError> {
    let local = i64::from(utc_secs) + i64::from(TZ_OFFSET) * 3600;
    DateTime::from_timestamp(local, 0)
        .map(|dt| dt.naive_utc())
        .ok_or(NtpError::BadTimestamp(utc_secs))
}
