// This library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this library.  If not, see <http://www.gnu.org/licenses/>.

use super::*;
use crate::calendar::DateTime;
use crate::display::{Dim, BLANK};
use crate::hardware::{Hardware, Timing};
use crate::input::Control;
use crate::settings::{get, set, Key};
use crate::signal::{Route, Source};
use crate::testing::{Buttons, FakeRtc, Log, NoDelay, Out, RamStore, Recorder, RecordingDriver};
use crate::time::SoftRtc;

const B: u8 = BLANK;

static UNDB: Hardware = Hardware::UNDB;

static FOUR: Hardware = Hardware {
    display_size: 4,
    functions: &[Function::Time, Function::Timer, Function::Thermometer],
    alt_function: Some(Function::Thermometer),
    has_piezo: true,
    has_switch: false,
    has_pulse: true,
    has_indicator: false,
    has_alt: true,
    rotary: true,
    soft_alarm_switch: false,
    soft_power_switch: false,
    timing: Timing::DEFAULT,
};

/// Drives a clock through whole loop passes.
struct Rig<R: Rtc> {
    clock: Clock<R, RamStore, Recorder, Log>,
    buttons: Buttons,
    driver: RecordingDriver,
    delay: NoDelay,
    millis: u32,
}

impl<R: Rtc> Rig<R> {
    fn new(hw: &'static Hardware, rtc: R) -> Self {
        Rig {
            clock: Clock::new(hw, rtc, RamStore::new(), Recorder::default(), Log::default(), false, 0),
            buttons: Buttons::default(),
            driver: RecordingDriver::default(),
            delay: NoDelay::default(),
            millis: 0,
        }
    }

    fn poll(&mut self) {
        self.driver.lit.clear();
        self.delay.waits.clear();
        self.clock
            .poll(self.millis, &mut self.buttons, &mut self.driver, &mut self.delay)
            .unwrap();
    }

    /// Run for `ms`, a pass every 10 ms.
    fn run(&mut self, ms: u32) {
        let end = self.millis + ms;
        while self.millis < end {
            self.millis += 10;
            self.poll();
        }
    }

    /// Press and release a control.
    fn tap(&mut self, ctrl: Control) {
        self.buttons.down = Some(ctrl);
        self.run(100);
        self.buttons.down = None;
        self.run(100);
    }

    /// Hold a control for `ms`, then let go.
    fn hold(&mut self, ctrl: Control, ms: u32) {
        self.buttons.down = Some(ctrl);
        self.run(ms);
        self.buttons.down = None;
        self.run(100);
    }

    fn set(&mut self, key: Key, value: u16) {
        set(&mut self.clock.store, key, value);
    }

    fn digits(&self) -> &[u8] {
        self.clock.display.digits()
    }

    fn log(&self) -> &str {
        &self.clock.io.log.0
    }

    fn events(&self) -> &[Out] {
        &self.clock.io.out.events
    }
}

fn soft_rtc(t: DateTime) -> SoftRtc {
    let mut rtc = SoftRtc::new(0);
    rtc.set_date(t.year, t.month, t.day).unwrap();
    rtc.set_time(t.hour, t.minute, t.second).unwrap();
    rtc
}

fn rig_at(t: DateTime) -> Rig<SoftRtc> {
    let mut rig = Rig::new(&UNDB, soft_rtc(t));
    rig.set(Key::DigitFade, 0);
    rig
}

#[test]
fn test_boot_repairs_settings_and_shows_time() {
    let mut rig = rig_at(DateTime::new(2024, 3, 1, 9, 5, 7));
    rig.poll();
    assert!(rig.log().starts_with("nixieclock "));
    assert!(rig.log().contains("settings: repaired "));
    assert_eq!(rig.clock.state(), State::Running(Function::Time));
    assert_eq!(rig.digits(), &[B, 9, 0, 5, 0, 7]);
}

#[test]
fn test_twelve_hour_with_leading_zero() {
    let mut rig = rig_at(DateTime::new(2024, 3, 1, 13, 5, 7));
    rig.set(Key::TimeFormat, 1);
    rig.set(Key::LeadingZero, 1);
    rig.run(1000);
    assert_eq!(&rig.digits()[..4], &[0, 1, 0, 5]);
}

#[test]
fn test_sel_cycles_functions() {
    let mut rig = rig_at(DateTime::new(2024, 2, 29, 12, 0, 0));
    rig.tap(Control::Sel);
    assert_eq!(rig.clock.state(), State::Running(Function::Date));
    // m/d/weekday: Thursday is day 5.
    assert_eq!(rig.digits(), &[B, 2, 2, 9, B, 5]);
    rig.tap(Control::Sel);
    assert_eq!(rig.clock.state(), State::Running(Function::DayCount));
    rig.tap(Control::Down);
    assert_eq!(rig.clock.state(), State::Running(Function::Date));
}

#[test]
fn test_temporary_function_times_out() {
    let mut rig = rig_at(DateTime::new(2024, 2, 29, 12, 0, 0));
    rig.tap(Control::Sel);
    rig.run(4500);
    assert_eq!(rig.clock.state(), State::Running(Function::Date));
    rig.run(1000);
    assert_eq!(rig.clock.state(), State::Running(Function::Time));
}

#[test]
fn test_set_time() {
    let mut rig = rig_at(DateTime::new(2024, 2, 29, 7, 0, 30));
    rig.hold(Control::Sel, 1500);
    assert!(matches!(rig.clock.state(), State::Editing(Function::Time, _)));
    rig.tap(Control::Up);
    rig.tap(Control::Up);
    rig.tap(Control::Sel);
    assert_eq!(rig.clock.state(), State::Running(Function::Time));
    let t = rig.clock.now;
    assert_eq!((t.hour, t.minute, t.second), (7, 2, 0));
    assert!(rig.log().contains("set time 7:02\n"));
}

#[test]
fn test_edit_abandoned_by_alt() {
    let mut rig = rig_at(DateTime::new(2024, 2, 29, 7, 0, 30));
    rig.hold(Control::Sel, 1500);
    rig.tap(Control::Up);
    rig.tap(Control::Alt);
    assert_eq!(rig.clock.state(), State::Running(Function::Time));
    assert_eq!(rig.clock.now.minute, 0);
}

#[test]
fn test_edit_times_out() {
    let mut rig = rig_at(DateTime::new(2024, 2, 29, 7, 0, 30));
    rig.hold(Control::Sel, 1500);
    rig.run(299_000);
    assert!(rig.clock.state().is_setting());
    rig.run(2000);
    assert_eq!(rig.clock.state(), State::Running(Function::Time));
    assert!(rig.log().contains("setting timed out"));
}

#[test]
fn test_set_date_pages() {
    let mut rig = rig_at(DateTime::new(2024, 2, 29, 12, 0, 0));
    rig.tap(Control::Sel);
    rig.hold(Control::Sel, 1500);
    assert!(matches!(rig.clock.state(), State::Editing(Function::Date, s) if s.page == 1));
    rig.tap(Control::Down);
    rig.tap(Control::Sel);
    let State::Editing(_, s) = rig.clock.state() else {
        panic!("not editing");
    };
    assert_eq!((s.page, s.value, s.staged.year), (2, 2, Some(2023)));
    rig.tap(Control::Sel);
    // 2023 has no 29 February, so the day is held to 28.
    let State::Editing(_, s) = rig.clock.state() else {
        panic!("not editing");
    };
    assert_eq!((s.page, s.value, s.max), (3, 28, 28));
    assert_eq!(&rig.digits()[..4], &[B, 2, 2, 8]);
    rig.tap(Control::Sel);
    let t = rig.clock.now;
    assert_eq!((t.year, t.month, t.day), (2023, 2, 28));
}

#[test]
fn test_day_count() {
    let mut rig = rig_at(DateTime::new(2024, 1, 1, 12, 0, 0));
    rig.set(Key::DayCountYear, 2024);
    rig.set(Key::DayCountMonth, 12);
    rig.set(Key::DayCountDay, 31);
    rig.tap(Control::Sel);
    rig.tap(Control::Sel);
    assert_eq!(rig.clock.state(), State::Running(Function::DayCount));
    assert_eq!(rig.digits(), &[B, B, B, 3, 6, 5]);
}

#[test]
fn test_long_hold_enters_options_from_edit() {
    let mut rig = rig_at(DateTime::new(2024, 1, 1, 12, 0, 0));
    rig.hold(Control::Sel, 3500);
    assert_eq!(rig.clock.state(), State::OptionsMenu(0));
    assert_eq!(rig.digits(), &[B, 1, B, B, B, B]);
}

#[test]
fn test_options_menu_skips_hidden_options() {
    let mut rig = rig_at(DateTime::new(2024, 1, 1, 12, 0, 0));
    rig.hold(Control::Sel, 3500);
    // Option 7, the strike signal, has no choice on this board.
    for _ in 0..6 {
        rig.tap(Control::Up);
    }
    assert_eq!(rig.clock.state(), State::OptionsMenu(7));
    rig.tap(Control::Down);
    assert_eq!(rig.clock.state(), State::OptionsMenu(5));
    // Backwards off the start wraps round, past the temperature unit as
    // there's no thermometer.
    let mut rig = rig_at(DateTime::new(2024, 1, 1, 12, 0, 0));
    rig.hold(Control::Sel, 3500);
    rig.tap(Control::Down);
    assert_eq!(rig.clock.state(), State::OptionsMenu(28));
}

#[test]
fn test_option_edit_saves_value() {
    let mut rig = rig_at(DateTime::new(2024, 1, 1, 12, 0, 0));
    rig.hold(Control::Sel, 3500);
    rig.tap(Control::Sel);
    assert!(matches!(rig.clock.state(), State::OptionsEditing(0, _)));
    rig.tap(Control::Down);
    assert_eq!(rig.digits(), &[B, 1, B, B, B, 1]);
    rig.tap(Control::Sel);
    assert_eq!(rig.clock.state(), State::OptionsMenu(0));
    assert_eq!(get(&rig.clock.store, Key::TimeFormat), 1);
    rig.tap(Control::Alt);
    assert_eq!(rig.clock.state(), State::Running(Function::Time));
}

#[test]
fn test_pitch_option_previews() {
    let mut rig = rig_at(DateTime::new(2024, 1, 1, 12, 0, 0));
    rig.clock.state = State::OptionsEditing(12, Session::new(1, 76, 49, 88));
    rig.tap(Control::Up);
    assert!(rig.events().contains(&Out::Tone(2216)));
    assert!(!rig.clock.signal.is_sounding());
}

#[test]
fn test_ninety_minute_countdown_raises_once() {
    let mut rig = rig_at(DateTime::new(2024, 1, 1, 12, 0, 0));
    rig.clock.countdown.set(90 * 60);
    rig.clock.show(Function::Timer);
    rig.millis = 990;
    rig.buttons.down = Some(Control::Up);
    rig.run(10);
    rig.buttons.down = None;
    assert!(rig.clock.countdown.is_running());

    let mut raised = 0;
    let mut sounding = false;
    let mut last_shown = u32::MAX;
    for _ in 0..5400 + 600 {
        rig.millis += 1000;
        rig.poll();
        let now = rig.clock.signal.source() == Some(Source::Timer);
        if now && !sounding {
            raised += 1;
            assert_eq!(rig.millis, 1000 + 5_400_000);
            last_shown = rig.clock.countdown.display_secs(rig.clock.drift.ms(rig.millis));
        }
        sounding = now;
    }
    assert_eq!(raised, 1);
    assert_eq!(last_shown, 0);
    assert_eq!(rig.clock.state(), State::Running(Function::Time));
}

#[test]
fn test_timer_display_and_pause() {
    let mut rig = rig_at(DateTime::new(2024, 1, 1, 12, 0, 0));
    rig.clock.countdown.set(3 * 3600 + 25 * 60);
    rig.clock.show(Function::Timer);
    assert_eq!(rig.digits(), &[B, 3, 2, 5, 0, 0]);
    rig.tap(Control::Up);
    rig.run(3000);
    rig.tap(Control::Up);
    assert!(!rig.clock.countdown.is_running());
    rig.tap(Control::Down);
    assert!(!rig.clock.countdown.is_started());
    assert_eq!(rig.digits(), &[B, 3, 2, 5, 0, 0]);
}

#[test]
fn test_stopwatch_lap() {
    let mut rig = rig_at(DateTime::new(2024, 1, 1, 12, 0, 0));
    rig.clock.show(Function::Timer);
    rig.tap(Control::Up);
    rig.run(4500);
    rig.tap(Control::Down);
    assert!(rig.clock.countdown.is_lapped());
    assert_eq!(rig.digits(), &[B, B, B, 0, 0, 4]);
    rig.run(3500);
    assert_eq!(rig.digits(), &[B, B, B, 0, 0, 4]);
    rig.tap(Control::Down);
    assert!(!rig.clock.countdown.is_lapped());
    assert!(rig.clock.countdown.is_running());
    assert_eq!(rig.digits(), &[B, B, B, 0, 0, 8]);
}

#[test]
fn test_four_digit_timer_shifts_left() {
    let mut rig = Rig::new(&FOUR, soft_rtc(DateTime::new(2024, 1, 1, 12, 0, 0)));
    rig.clock.countdown.set(5 * 60 + 7);
    rig.clock.show(Function::Timer);
    assert_eq!(rig.digits(), &[B, 5, 0, 7]);
}

#[test]
fn test_timer_edit_pages() {
    let mut rig = rig_at(DateTime::new(2024, 1, 1, 12, 0, 0));
    rig.clock.show(Function::Timer);
    rig.hold(Control::Sel, 1500);
    rig.tap(Control::Up);
    rig.tap(Control::Sel);
    rig.tap(Control::Up);
    rig.tap(Control::Up);
    rig.tap(Control::Sel);
    assert_eq!(rig.clock.countdown.duration(), 62);
    assert_eq!(rig.clock.state(), State::Running(Function::Timer));
}

#[test]
fn test_alarm_snooze_and_cancel() {
    let mut rig = rig_at(DateTime::new(2024, 1, 1, 6, 59, 58));
    rig.set(Key::AlarmTime, 7 * 60);
    rig.set(Key::AlarmOn, 1);
    rig.set(Key::AlarmSnooze, 1);
    rig.run(2500);
    assert_eq!(rig.clock.signal.source(), Some(Source::Alarm));

    rig.tap(Control::Sel);
    assert!(!rig.clock.signal.is_sounding());
    assert!(rig.clock.signal.is_snoozing());
    // The press was used up silencing the alarm.
    assert_eq!(rig.clock.state(), State::Running(Function::Time));

    rig.run(60_000);
    assert_eq!(rig.clock.signal.source(), Some(Source::Alarm));

    // No snooze the second time if Alt cancels it.
    rig.tap(Control::Sel);
    rig.tap(Control::Alt);
    assert!(!rig.clock.signal.is_snoozing());
    rig.run(61_000);
    assert!(!rig.clock.signal.is_sounding());
}

#[test]
fn test_alarm_respects_work_days() {
    // 2024-01-06 is a Saturday.
    let mut rig = rig_at(DateTime::new(2024, 1, 6, 6, 59, 58));
    rig.set(Key::AlarmTime, 7 * 60);
    rig.set(Key::AlarmOn, 1);
    rig.set(Key::AlarmDays, 1);
    rig.run(3000);
    assert!(!rig.clock.signal.is_sounding());
}

#[test]
fn test_alarm_switch_route_holds_relay() {
    let mut rig = rig_at(DateTime::new(2024, 1, 1, 6, 59, 58));
    rig.set(Key::AlarmTime, 7 * 60);
    rig.set(Key::AlarmOn, 1);
    rig.set(Key::AlarmSignal, Route::Switch as u16);
    rig.run(2500);
    assert_eq!(rig.events(), &[Out::Switch(true)]);
    assert!(rig.log().contains("switch on\n"));
}

#[test]
fn test_hour_count_strike() {
    let mut rig = rig_at(DateTime::new(2024, 1, 1, 14, 59, 59));
    rig.set(Key::Strike, 3);
    rig.run(5000);
    let beeps = rig.events().iter().filter(|e| matches!(e, Out::Tone(_))).count();
    assert_eq!(beeps, 3);
}

#[test]
fn test_pips() {
    let mut rig = rig_at(DateTime::new(2024, 1, 1, 14, 59, 54));
    rig.set(Key::Strike, 2);
    rig.run(7000);
    let beeps = rig.events().iter().filter(|e| matches!(e, Out::Tone(_))).count();
    assert_eq!(beeps, 6);
}

#[test]
fn test_no_strike_while_editing() {
    let mut rig = rig_at(DateTime::new(2024, 1, 1, 14, 59, 57));
    rig.set(Key::Strike, 1);
    rig.hold(Control::Sel, 1500);
    rig.run(2000);
    assert!(rig.events().is_empty());
}

#[test]
fn test_soft_power_switch() {
    let mut rig = rig_at(DateTime::new(2024, 1, 1, 12, 0, 0));
    rig.tap(Control::Alt);
    assert!(rig.clock.signal.switch_on());
    rig.tap(Control::Alt);
    assert!(!rig.clock.signal.switch_on());
    assert_eq!(rig.events(), &[Out::Switch(true), Out::Switch(false)]);
}

#[test]
fn test_alt_jumps_to_function() {
    let mut rig = Rig::new(&FOUR, FakeRtc::new(DateTime::new(2024, 1, 1, 12, 0, 0)));
    rig.clock.rtc.temp = Some(2160);
    rig.tap(Control::Alt);
    assert_eq!(rig.clock.state(), State::Running(Function::Thermometer));
    assert_eq!(rig.digits(), &[B, B, 2, 2]);
}

#[test]
fn test_thermometer_below_zero() {
    let mut rig = Rig::new(&FOUR, FakeRtc::new(DateTime::new(2024, 1, 1, 12, 0, 0)));
    rig.clock.rtc.temp = Some(-500);
    rig.tap(Control::Alt);
    assert_eq!(rig.digits(), &[B, B, B, 0]);
    rig.set(Key::TempUnit, 1);
    rig.clock.rtc.now.second = 1;
    rig.run(100);
    assert_eq!(rig.digits(), &[B, B, 2, 3]);
}

#[test]
fn test_rtc_failure_keeps_last_time() {
    let mut rig = Rig::new(&UNDB, FakeRtc::new(DateTime::new(2024, 1, 1, 12, 34, 56)));
    rig.poll();
    rig.clock.rtc.fail = true;
    rig.clock.rtc.now = DateTime::new(2024, 1, 1, 0, 0, 0);
    rig.run(2000);
    assert_eq!(rig.clock.now.minute, 34);
    assert_eq!(rig.digits(), &[1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_night_dim_and_wake() {
    let mut rig = rig_at(DateTime::new(2024, 1, 1, 23, 0, 0));
    rig.set(Key::NightMode, 2);
    rig.run(1000);
    assert_eq!(rig.clock.dim, Dim::Off);
    assert_eq!(rig.driver.lit, [crate::testing::Lit::Dark]);

    // The first press only lights the display.
    rig.tap(Control::Sel);
    assert_eq!(rig.clock.dim, Dim::Full);
    assert_eq!(rig.clock.state(), State::Running(Function::Time));
    rig.run(11_000);
    assert_eq!(rig.clock.dim, Dim::Off);
}

#[test]
fn test_away_on_days_off() {
    // Sunday.
    let mut rig = rig_at(DateTime::new(2024, 1, 7, 12, 0, 0));
    rig.set(Key::AwayMode, 1);
    rig.run(1000);
    assert_eq!(rig.clock.dim, Dim::Off);
}

#[test]
fn test_auto_date_scrolls_in_and_out() {
    let mut rig = rig_at(DateTime::new(2024, 2, 29, 12, 0, 29));
    rig.set(Key::AutoDate, 3);
    rig.run(1050);
    assert_eq!(rig.clock.state(), State::Running(Function::Date));
    assert!(rig.clock.display.is_scrolling());
    rig.run(1000);
    assert!(rig.clock.display.is_armed());
    assert_eq!(rig.digits(), &[B, 2, 2, 9, B, 5]);
    rig.run(3000);
    assert_eq!(rig.clock.state(), State::Running(Function::Time));
    rig.run(1000);
    assert!(!rig.clock.display.is_scrolling());
    assert_eq!(&rig.digits()[..4], &[1, 2, 0, 0]);
}

#[test]
fn test_spring_forward_and_fall_back() {
    // Second Sunday of March 2024 in North America.
    let mut rig = rig_at(DateTime::new(2024, 3, 10, 1, 59, 59));
    rig.set(Key::AutoDst, 1);
    rig.run(1500);
    assert_eq!(rig.clock.now.hour, 3);
    assert_eq!(get(&rig.clock.store, Key::DstOn), 1);
    assert!(rig.log().contains("dst +1h"));

    // First Sunday of November.
    let mut rig = rig_at(DateTime::new(2024, 11, 3, 1, 59, 59));
    rig.set(Key::AutoDst, 1);
    rig.set(Key::DstOn, 1);
    rig.run(1500);
    assert_eq!(rig.clock.now.hour, 1);
    assert_eq!(get(&rig.clock.store, Key::DstOn), 0);
    // The repeated hour doesn't spring forward again.
    rig.run(3_600_000);
    assert_eq!(rig.clock.now.hour, 2);
    assert_eq!(get(&rig.clock.store, Key::DstOn), 0);
}

#[test]
fn test_setting_time_before_transition_keeps_it() {
    let mut rig = rig_at(DateTime::new(2024, 3, 10, 1, 57, 50));
    rig.set(Key::AutoDst, 1);
    rig.hold(Control::Sel, 1500);
    rig.tap(Control::Up);
    rig.tap(Control::Sel);
    let t = rig.clock.now;
    assert_eq!((t.hour, t.minute), (1, 58));
    assert_eq!(get(&rig.clock.store, Key::DstOn), 0);
    rig.run(121_000);
    assert_eq!(rig.clock.now.hour, 3);
    assert_eq!(get(&rig.clock.store, Key::DstOn), 1);

    let mut rig = rig_at(DateTime::new(2024, 11, 3, 1, 57, 50));
    rig.set(Key::AutoDst, 1);
    rig.hold(Control::Sel, 1500);
    rig.tap(Control::Up);
    rig.tap(Control::Sel);
    assert_eq!(get(&rig.clock.store, Key::DstOn), 1);
    rig.run(121_000);
    assert_eq!(rig.clock.now.hour, 1);
    assert_eq!(get(&rig.clock.store, Key::DstOn), 0);
}

#[test]
fn test_setting_time_after_fall_back_latches() {
    let mut rig = rig_at(DateTime::new(2024, 11, 3, 4, 0, 30));
    rig.set(Key::AutoDst, 1);
    rig.set(Key::DstOn, 1);
    rig.hold(Control::Sel, 1500);
    rig.tap(Control::Sel);
    assert_eq!(get(&rig.clock.store, Key::DstOn), 0);
    assert_eq!(rig.clock.fell_back_on, Some(3));
}

#[test]
fn test_boot_keeps_stored_dst_flag() {
    let mut store = RamStore::new();
    set(&mut store, Key::AutoDst, 1);
    set(&mut store, Key::DstOn, 0);
    let rtc = soft_rtc(DateTime::new(2024, 7, 1, 12, 0, 0));
    let clock = Clock::new(&UNDB, rtc, store, Recorder::default(), Log::default(), false, 0);
    assert_eq!(get(&clock.store, Key::DstOn), 0);
    assert_eq!(clock.fell_back_on, None);
}

#[test]
fn test_cleaning_runs_at_clean_time() {
    let mut rig = rig_at(DateTime::new(2024, 1, 1, 2, 59, 59));
    rig.run(1500);
    assert!(rig.clock.display.is_cleaning());
    rig.run(25_000);
    assert!(!rig.clock.display.is_cleaning());
    assert_eq!(&rig.digits()[..4], &[B, 3, 0, 0]);
}

#[test]
fn test_indicator_follows_switch() {
    let mut rig = rig_at(DateTime::new(2024, 1, 1, 12, 0, 0));
    rig.set(Key::Indicator, 2);
    rig.tap(Control::Alt);
    assert!(rig.clock.io.out.indicator);
}
