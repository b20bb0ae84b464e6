//! Drives `AlarmClock` the way the firmware event loop does: 5 ms button
//! sampling through the debouncer, a 20 ms poll and a 1 Hz SQW tick.

use clock_core::{
    AlarmClock, AlarmEvent, AlarmStatus, AlarmTime, BuzzerCommand, Debouncer, HourFormat,
    Instant, Page, Settings, TimeOfDay,
};

const SAMPLE_MS: u64 = 5;
const POLL_MS: u64 = 20;
const SECOND_MS: u64 = 1_000;

struct Rig {
    clock: AlarmClock,
    debouncer: Debouncer,
    now: u64,
    raw_pressed: bool,
    events: Vec<AlarmEvent>,
    buzzer: BuzzerCommand,
    tone_ms: u64,
}

impl Rig {
    fn new(settings: Settings, time: TimeOfDay) -> Self {
        let mut clock = AlarmClock::new(settings);
        let mut events = Vec::new();
        events.extend(clock.sync(time, Instant::from_ticks(0)));
        Self {
            clock,
            debouncer: Debouncer::default(),
            now: 0,
            raw_pressed: false,
            events,
            buzzer: BuzzerCommand::Silent,
            tone_ms: 0,
        }
    }

    fn step(&mut self) {
        self.now += SAMPLE_MS;
        let now = Instant::from_ticks(self.now);

        if let Some(edge) = self.debouncer.update(self.raw_pressed, now) {
            self.events.extend(self.clock.on_button(edge, now));
        }
        if self.now % SECOND_MS == 0 {
            let tick = self.clock.on_second(now);
            self.events.extend(tick.event);
        }
        if self.now % POLL_MS == 0 {
            let out = self.clock.poll(now);
            self.buzzer = out.buzzer;
            self.events.extend(out.event);
        }
        if self.buzzer == BuzzerCommand::Tone {
            self.tone_ms += SAMPLE_MS;
        }
    }

    fn run(&mut self, ms: u64) {
        for _ in 0..ms / SAMPLE_MS {
            self.step();
        }
    }

    /// Press with contact bounce on both edges.
    fn press_for(&mut self, ms: u64) {
        for bounce in [true, false, true, false] {
            self.raw_pressed = bounce;
            self.step();
        }
        self.raw_pressed = true;
        self.run(ms);
        for bounce in [false, true, false, true] {
            self.raw_pressed = bounce;
            self.step();
        }
        self.raw_pressed = false;
        self.run(100);
    }

    fn take_events(&mut self) -> Vec<AlarmEvent> {
        core::mem::take(&mut self.events)
    }
}

fn time(h: u8, m: u8, s: u8) -> TimeOfDay {
    TimeOfDay::new(h, m, s).unwrap()
}

#[test]
fn alarm_rings_on_sqw_tick_and_hold_dismisses() {
    let mut rig = Rig::new(Settings::with_alarm(6, 30).unwrap(), time(6, 29, 55));
    rig.run(4_900);
    assert!(rig.take_events().is_empty());
    assert_eq!(rig.tone_ms, 0);

    rig.run(200);
    assert_eq!(rig.take_events(), vec![AlarmEvent::Triggered]);
    assert_eq!(rig.clock.time(), time(6, 30, 0));

    rig.run(3_000);
    assert!(rig.tone_ms > 0);

    rig.press_for(3_500);
    assert_eq!(rig.take_events(), vec![AlarmEvent::Dismissed]);
    assert_eq!(rig.clock.view().status, AlarmStatus::Set);

    // 松开之后不应该被设置页面当成短按
    assert!(rig.clock.settings().alarm_enabled);
    assert_eq!(rig.clock.view().page, Page::Clock);

    let before = rig.tone_ms;
    rig.run(10_000);
    assert_eq!(rig.tone_ms, before);
    assert!(rig.take_events().is_empty());
}

#[test]
fn buzzer_is_silent_while_button_held() {
    let mut rig = Rig::new(Settings::with_alarm(6, 30).unwrap(), time(6, 30, 0));
    assert_eq!(rig.take_events(), vec![AlarmEvent::Triggered]);
    rig.run(1_000);

    rig.raw_pressed = true;
    rig.run(100);
    let before = rig.tone_ms;
    rig.run(2_000);
    assert_eq!(rig.tone_ms, before);
    assert_eq!(rig.clock.view().status, AlarmStatus::Holding);
}

#[test]
fn short_press_snoozes_until_snooze_expires() {
    let mut settings = Settings::with_alarm(6, 30).unwrap();
    settings.timing = settings.timing.with_snooze_minutes(1);
    let mut rig = Rig::new(settings, time(6, 30, 0));
    rig.run(2_000);
    rig.take_events();

    rig.press_for(300);
    assert_eq!(rig.take_events(), vec![AlarmEvent::Snoozed]);
    assert_eq!(rig.clock.view().status, AlarmStatus::Snoozed);

    let before = rig.tone_ms;
    rig.run(55_000);
    assert_eq!(rig.tone_ms, before);

    rig.run(10_000);
    assert_eq!(rig.take_events(), vec![AlarmEvent::Resumed]);
    assert!(rig.tone_ms > before);
}

#[test]
fn unanswered_alarm_times_out() {
    let mut rig = Rig::new(Settings::with_alarm(6, 30).unwrap(), time(6, 29, 59));
    rig.run(1_000);
    assert_eq!(rig.take_events(), vec![AlarmEvent::Triggered]);

    rig.run(5 * 60 * 1_000 + 100);
    assert_eq!(rig.take_events(), vec![AlarmEvent::TimedOut]);
    assert_eq!(rig.buzzer, BuzzerCommand::Silent);
}

#[test]
fn settings_pages_move_the_alarm() {
    let mut rig = Rig::new(Settings::with_alarm(6, 30).unwrap(), time(22, 0, 0));

    // 长按进入小时页，短按两次，然后依次长按到保存
    rig.press_for(1_200);
    assert_eq!(rig.clock.view().page, Page::AlarmHour);
    rig.press_for(200);
    rig.press_for(200);
    assert_eq!(rig.clock.view().settings.alarm, AlarmTime::new(8, 30).unwrap());
    // 还没保存
    assert_eq!(rig.clock.settings().alarm, AlarmTime::new(6, 30).unwrap());

    rig.press_for(1_200);
    assert_eq!(rig.clock.view().page, Page::AlarmMinute);
    rig.press_for(1_200);
    assert_eq!(rig.clock.view().page, Page::HourFormat);
    rig.press_for(200);
    rig.press_for(1_200);

    assert_eq!(rig.clock.view().page, Page::Clock);
    let saved = rig.clock.settings();
    assert_eq!(saved.alarm, AlarmTime::new(8, 30).unwrap());
    assert_eq!(saved.hour_format, HourFormat::Twelve);
    assert!(rig.take_events().is_empty());
}

#[test]
fn short_press_on_clock_page_toggles_alarm() {
    let mut rig = Rig::new(Settings::with_alarm(6, 30).unwrap(), time(6, 29, 58));
    rig.press_for(200);
    assert!(!rig.clock.settings().alarm_enabled);
    assert_eq!(rig.clock.view().status, AlarmStatus::Off);

    rig.run(5_000);
    assert!(rig.take_events().is_empty());
    assert_eq!(rig.tone_ms, 0);
}

#[test]
fn rtc_resync_corrects_drift() {
    let mut rig = Rig::new(Settings::default(), time(12, 0, 0));
    rig.run(3_000);
    assert_eq!(rig.clock.time(), time(12, 0, 3));

    rig.clock.sync(time(12, 0, 5), Instant::from_ticks(rig.now));
    assert_eq!(rig.clock.time(), time(12, 0, 5));
}
