//! ST7789 clock face
//!
//! Draws a [`ClockView`] as three lines of text. Every line is drawn with a
//! background colour and padded to a fixed width, so a line can be redrawn
//! in place without clearing the screen.

use core::fmt::Write as _;

use clock_core::{AlarmStatus, ClockView, Page};
use defmt::{error, info};
use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Text};
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use esp_hal::delay::Delay;
use esp_hal::gpio::interconnect::{PeripheralInput, PeripheralOutput};
use esp_hal::gpio::{Level, Output, OutputConfig, OutputPin};
use esp_hal::spi::Mode;
use esp_hal::spi::master::{Config, Instance, Spi};
use esp_hal::time::Rate;
use esp_hal::Blocking;
use mipidsi::interface::SpiInterface;
use mipidsi::models::ST7789;
use mipidsi::options::ColorInversion;

use crate::error::DisplayError;
use crate::mk_static;

const WIDTH: u16 = 240;
const HEIGHT: u16 = 240;
const CENTER_X: i32 = WIDTH as i32 / 2;

type DisplaySpi = ExclusiveDevice<Spi<'static, Blocking>, Output<'static>, NoDelay>;
pub type Screen =
    mipidsi::Display<SpiInterface<'static, DisplaySpi, Output<'static>>, ST7789, Output<'static>>;

/// SPI and control pins of the panel.
pub struct DisplayPins<S, SCK, MOSI, MISO, CS, DC, RST> {
    pub spi: S,
    pub sck: SCK,
    pub mosi: MOSI,
    pub miso: MISO,
    pub cs: CS,
    pub dc: DC,
    pub rst: RST,
}

type Line = heapless::String<32>;

pub struct ClockFace {
    screen: Screen,
    last: Option<ClockView>,
}

impl ClockFace {
    pub fn new<S, SCK, MOSI, MISO, CS, DC, RST>(
        pins: DisplayPins<S, SCK, MOSI, MISO, CS, DC, RST>,
    ) -> Result<Self, DisplayError>
    where
        S: Instance + 'static,
        SCK: PeripheralOutput<'static>,
        MOSI: PeripheralOutput<'static>,
        MISO: PeripheralInput<'static>,
        CS: OutputPin + 'static,
        DC: OutputPin + 'static,
        RST: OutputPin + 'static,
    {
        let spi = Spi::new(
            pins.spi,
            Config::default()
                .with_frequency(Rate::from_mhz(40))
                .with_mode(Mode::_0),
        )
        .map_err(|_| DisplayError::Spi)?
        .with_sck(pins.sck)
        .with_mosi(pins.mosi)
        .with_miso(pins.miso);

        let cs = Output::new(pins.cs, Level::High, OutputConfig::default());
        let dc = Output::new(pins.dc, Level::Low, OutputConfig::default());
        let rst = Output::new(pins.rst, Level::High, OutputConfig::default());

        let spi_device = ExclusiveDevice::new_no_delay(spi, cs).map_err(|_| DisplayError::Spi)?;
        let buffer = mk_static!([u8; 512], [0_u8; 512]);
        let di = SpiInterface::new(spi_device, dc, buffer);

        let mut delay = Delay::new();
        let mut screen = mipidsi::Builder::new(ST7789, di)
            .display_size(WIDTH, HEIGHT)
            .invert_colors(ColorInversion::Inverted)
            .reset_pin(rst)
            .init(&mut delay)
            .map_err(|e| {
                error!("[display] init: {}", defmt::Debug2Format(&e));
                DisplayError::Init
            })?;

        screen.clear(Rgb565::BLACK).map_err(|_| DisplayError::Draw)?;
        info!("[display] ST7789 {}x{} ready", WIDTH, HEIGHT);

        Ok(Self { screen, last: None })
    }

    /// Redraw the lines that differ from the previous frame.
    pub fn render(&mut self, view: &ClockView) -> Result<(), DisplayError> {
        let last = self.last;
        let changed = |f: fn(&ClockView) -> Line| last.as_ref().is_none_or(|l| f(l) != f(view));

        if changed(time_line) {
            let color = match view.status {
                AlarmStatus::Ringing | AlarmStatus::Holding => Rgb565::RED,
                _ => Rgb565::WHITE,
            };
            self.draw(&time_line(view), 90, &FONT_10X20, color)?;
        }
        if changed(alarm_line) {
            self.draw(&alarm_line(view), 140, &FONT_10X20, Rgb565::YELLOW)?;
        }
        if changed(hint_line) {
            self.draw(&hint_line(view), 200, &FONT_6X10, Rgb565::CYAN)?;
        }

        self.last = Some(*view);
        Ok(())
    }

    fn draw(
        &mut self,
        text: &str,
        y: i32,
        font: &'static MonoFont<'static>,
        color: Rgb565,
    ) -> Result<(), DisplayError> {
        let style: MonoTextStyle<'_, Rgb565> = MonoTextStyleBuilder::new()
            .font(font)
            .text_color(color)
            .background_color(Rgb565::BLACK)
            .build();

        Text::with_alignment(text, Point::new(CENTER_X, y), style, Alignment::Center)
            .draw(&mut self.screen)
            .map_err(|_| DisplayError::Draw)?;
        Ok(())
    }
}

/// 居中补齐到固定宽度，覆盖上一帧的文字
fn padded(text: &str, width: usize) -> Line {
    let mut line = Line::new();
    let _ = write!(line, "{:^width$}", text, width = width);
    line
}

fn time_line(view: &ClockView) -> Line {
    if !view.synced {
        return padded("--:--:--", 11);
    }
    padded(&view.time.format(view.settings.hour_format), 11)
}

fn alarm_line(view: &ClockView) -> Line {
    let alarm = view.settings.alarm.format(view.settings.hour_format);
    let mut line = Line::new();
    let _ = match view.page {
        Page::AlarmHour => write!(line, "[{}] hour", alarm),
        Page::AlarmMinute => write!(line, "[{}] minute", alarm),
        Page::HourFormat => match view.settings.hour_format {
            clock_core::HourFormat::TwentyFour => write!(line, "24 hour clock"),
            clock_core::HourFormat::Twelve => write!(line, "12 hour clock"),
        },
        Page::Clock => match view.status {
            AlarmStatus::Off => write!(line, "Alarm off"),
            AlarmStatus::Set => write!(line, "Alarm {}", alarm),
            AlarmStatus::Ringing => write!(line, "WAKE UP"),
            AlarmStatus::Holding => write!(line, "keep holding"),
            AlarmStatus::Snoozed => write!(line, "Snoozed {}", alarm),
        },
    };
    padded(&line, 20)
}

fn hint_line(view: &ClockView) -> Line {
    let hint = match (view.page, view.status) {
        (Page::Clock, AlarmStatus::Ringing | AlarmStatus::Holding) if view.snooze_available => {
            "hold to stop, tap to snooze"
        }
        (Page::Clock, AlarmStatus::Ringing | AlarmStatus::Holding) => "hold to stop",
        (Page::Clock, AlarmStatus::Snoozed) => "hold to stop",
        (Page::Clock, _) => "tap: alarm on/off  hold: set",
        (Page::HourFormat, _) => "tap: change  hold: save",
        _ => "tap: change  hold: next",
    };
    padded(hint, 28)
}
