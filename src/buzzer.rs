//! # Buzzer
//!
//! Passive buzzer on an LEDC PWM channel. The LEDC timer runs at the tone
//! frequency; the alarm pattern only switches the duty between 0 and 50 %.

use clock_core::BuzzerCommand;
use defmt::{error, info};
use esp_hal::gpio::DriveMode;
use esp_hal::gpio::interconnect::PeripheralOutput;
use esp_hal::ledc::channel::{self, Channel, ChannelIFace};
use esp_hal::ledc::timer::{self, Timer, TimerIFace};
use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed};
use esp_hal::peripherals::LEDC;
use esp_hal::time::Rate;

use crate::error::BuzzerError;
use crate::mk_static;

/// 无源蜂鸣器的谐振频率附近最响
const TONE: Rate = Rate::from_hz(2_700);
const TONE_DUTY_PCT: u8 = 50;

pub struct Buzzer {
    channel: Channel<'static, LowSpeed>,
    state: BuzzerCommand,
}

impl Buzzer {
    pub fn new(
        ledc: LEDC<'static>,
        pin: impl PeripheralOutput<'static>,
    ) -> Result<Self, BuzzerError> {
        let mut ledc = Ledc::new(ledc);
        ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);

        let lstimer0 = mk_static!(
            Timer<'static, LowSpeed>,
            ledc.timer::<LowSpeed>(timer::Number::Timer0)
        );
        lstimer0.configure(timer::config::Config {
            duty: timer::config::Duty::Duty10Bit,
            clock_source: timer::LSClockSource::APBClk,
            frequency: TONE,
        })?;
        let lstimer0: &'static Timer<'static, LowSpeed> = lstimer0;

        let mut channel0 = ledc.channel(channel::Number::Channel0, pin);
        channel0.configure(channel::config::Config {
            timer: lstimer0,
            duty_pct: 0,
            drive_mode: DriveMode::PushPull,
        })?;

        info!("[buzzer] ready");
        Ok(Self {
            channel: channel0,
            state: BuzzerCommand::Silent,
        })
    }

    /// Drive the buzzer. Only touches the hardware when the command changes.
    pub fn apply(&mut self, command: BuzzerCommand) {
        if command == self.state {
            return;
        }

        let duty = match command {
            BuzzerCommand::Tone => TONE_DUTY_PCT,
            BuzzerCommand::Silent => 0,
        };
        match self.channel.set_duty(duty) {
            Ok(()) => self.state = command,
            Err(e) => error!(
                "[buzzer] failed to set duty: {}",
                BuzzerError::from(e)
            ),
        }
    }

    /// 上电提示音
    pub async fn chirp(&mut self) {
        for _ in 0..2 {
            self.apply(BuzzerCommand::Tone);
            embassy_time::Timer::after_millis(60).await;
            self.apply(BuzzerCommand::Silent);
            embassy_time::Timer::after_millis(60).await;
        }
    }
}
