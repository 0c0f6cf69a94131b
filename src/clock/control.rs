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
//! What each control does, in each state.

use ufmt::{uWrite, uwriteln};

use super::{Clock, Countdown, Function, Session, State};
use crate::calendar::{days_in_month, minutes_to_hm};
use crate::display::Dim;
use crate::dst::{self, Region};
use crate::input::{Action, Control, Event, Hold};
use crate::rtc::Rtc;
use crate::settings::{self, applies, ConfigStore, Key, OPTIONS};
use crate::signal::{note_hz, Outputs, Pattern, Route, Source, Voice};

/// `value + delta`, held within `min..=max`.
pub fn bounded_step(value: u16, delta: i16, min: u16, max: u16) -> u16 {
    (value as i32 + delta as i32).clamp(min as i32, max as i32) as u16
}

impl<R, S, O, W> Clock<R, S, O, W>
where
    R: Rtc,
    S: ConfigStore,
    O: Outputs,
    W: uWrite,
{
    pub(crate) fn ctrl_evt(&mut self, a: Action) {
        if a.event == Event::Press {
            if self.signal.is_sounding() {
                let snooze = self.get(Key::AlarmSnooze);
                if self.signal.source() == Some(Source::Alarm) && snooze > 0 {
                    self.signal.snooze(&mut self.io, snooze * 60);
                } else {
                    self.signal.stop(&mut self.io);
                }
                self.input.stop();
                return;
            }
            if self.dim == Dim::Off {
                self.wake_remain = self.hw.timing.unoff_secs;
                self.dim = Dim::Full;
                self.input.stop();
                return;
            }
        }

        match self.state {
            State::Running(f) => self.running_evt(f, a),
            State::Editing(f, s) => self.editing_evt(f, s, a),
            State::OptionsMenu(i) => self.menu_evt(i, a),
            State::OptionsEditing(i, s) => self.option_evt(i, s, a),
        }
    }

    fn running_evt(&mut self, f: Function, a: Action) {
        let hw = self.hw;
        match (a.ctrl, a.event) {
            (Control::Sel, Event::LongHold) => {
                self.enter_options();
                self.input.stop();
            }
            (Control::Sel, Event::ShortHold) => self.start_set(f),
            (Control::Sel, Event::Release(Hold::None)) => self.fn_scroll(true),
            (Control::Up | Control::Down, Event::Press) => {
                let up = a.ctrl == Control::Up;
                match f {
                    Function::Alarm if hw.soft_alarm_switch => {
                        settings::set(&mut self.store, Key::AlarmOn, up as u16);
                        if !up {
                            self.signal.cancel_snooze();
                        }
                        self.update_display();
                    }
                    Function::Timer => self.timer_button(up),
                    _ => self.fn_scroll(up),
                }
            }
            (Control::Alt, Event::Press) => {
                if self.signal.is_snoozing() {
                    self.signal.cancel_snooze();
                    uwriteln!(&mut self.io.log, "snooze off").ok();
                } else if hw.soft_power_switch && hw.has_switch {
                    self.signal.toggle_power(&mut self.io);
                } else if let Some(alt) = hw.alt_function {
                    self.show(alt);
                }
                self.input.stop();
            }
            _ => {}
        }
    }

    /// Up starts and pauses.  Down takes a lap on a running stopwatch and
    /// clears a stopped timer.
    fn timer_button(&mut self, up: bool) {
        let ms = self.drift.ms(self.millis);
        if up {
            if self.countdown.is_running() {
                self.countdown.pause(ms);
            } else {
                self.countdown.start(ms);
                let sleep = self.countdown.duration() > 0
                    && settings::route(&self.store, Key::TimerSignal) == Route::Switch;
                if sleep {
                    self.signal.set_power(&mut self.io, true);
                }
            }
        } else if self.countdown.is_running() {
            self.countdown.lap(ms);
        } else {
            self.countdown.clear();
        }
        self.update_display();
    }

    fn editing_evt(&mut self, f: Function, mut s: Session, a: Action) {
        match (a.ctrl, a.event) {
            (Control::Up | Control::Down, Event::Press) => {
                s.adjust(a.ctrl == Control::Up, a.velocity);
                self.state = State::Editing(f, s);
                self.update_display();
            }
            (Control::Sel, Event::Press) => {
                self.commit(f, s);
                self.input.stop();
            }
            (Control::Alt, Event::Press) => {
                self.show(f);
                self.input.stop();
            }
            (Control::Sel, Event::LongHold) => {
                self.enter_options();
                self.input.stop();
            }
            _ => {}
        }
    }

    fn menu_evt(&mut self, i: usize, a: Action) {
        match (a.ctrl, a.event) {
            (Control::Up | Control::Down, Event::Press) => {
                self.state = State::OptionsMenu(self.opt_scroll(i, a.ctrl == Control::Up));
                self.update_display();
            }
            (Control::Sel, Event::Press) => {
                let f = OPTIONS[i].field();
                let value = self.get(OPTIONS[i]);
                self.state = State::OptionsEditing(i, Session::new(1, value, f.min, f.max));
                self.update_display();
            }
            (Control::Sel, Event::ShortHold) | (Control::Alt, Event::Press) => {
                self.show(Function::Time);
                self.input.stop();
            }
            _ => {}
        }
    }

    fn option_evt(&mut self, i: usize, mut s: Session, a: Action) {
        let key = OPTIONS[i];
        match (a.ctrl, a.event) {
            (Control::Up | Control::Down, Event::Press) => {
                s.adjust(a.ctrl == Control::Up, a.velocity);
                self.state = State::OptionsEditing(i, s);
                self.preview(key, s.value);
                self.update_display();
            }
            (Control::Sel, Event::Press) => {
                settings::set(&mut self.store, key, s.value);
                if key == Key::AutoDst {
                    self.sync_dst();
                }
                self.state = State::OptionsMenu(i);
                self.update_display();
            }
            (Control::Sel, Event::ShortHold) | (Control::Alt, Event::Press) => {
                self.show(Function::Time);
                self.input.stop();
            }
            _ => {}
        }
    }

    fn enter_options(&mut self) {
        self.state = State::OptionsMenu(self.opt_scroll(OPTIONS.len() - 1, true));
        self.update_display();
    }

    /// The next option that applies to this hardware, wrapping around.
    pub(crate) fn opt_scroll(&self, from: usize, up: bool) -> usize {
        let n = OPTIONS.len();
        let mut i = from;
        for _ in 0..n {
            i = if up { (i + 1) % n } else { (i + n - 1) % n };
            if applies(OPTIONS[i], self.hw) {
                return i;
            }
        }
        from
    }

    pub(crate) fn fn_scroll(&mut self, up: bool) {
        let fns = self.hw.functions;
        let n = fns.len();
        let cur = match self.state {
            State::Running(f) => fns.iter().position(|x| *x == f).unwrap_or(0),
            _ => 0,
        };
        let next = if up { (cur + 1) % n } else { (cur + n - 1) % n };
        self.show(fns[next]);
    }

    fn start_set(&mut self, f: Function) {
        let s = match f {
            Function::Time => Session::new(1, self.now.minute_of_day(), 0, 1439),
            Function::Date => Session::new(1, self.now.year, 2000, 2099),
            Function::DayCount => {
                let year = Key::DayCountYear.field();
                Session::new(1, self.get(Key::DayCountYear), year.min, year.max)
            }
            Function::Alarm => Session::new(1, self.get(Key::AlarmTime), 0, 1439),
            Function::Timer => {
                if self.countdown.is_started() {
                    self.countdown.clear();
                    self.update_display();
                    return;
                }
                let max = Countdown::MAX_SECS / 60;
                Session::new(1, self.countdown.duration() / 60, 0, max)
            }
            Function::Thermometer | Function::Tester => return,
        };
        self.state = State::Editing(f, s);
        self.update_display();
    }

    /// Save the page being edited and move on to the next one, if any.
    fn commit(&mut self, f: Function, s: Session) {
        let next = match (f, s.page) {
            (Function::Time, _) => {
                let (h, m) = minutes_to_hm(s.value);
                if self.rtc.set_time(h, m, 0).is_err() {
                    uwriteln!(&mut self.io.log, "rtc write failed").ok();
                }
                self.drift.reset();
                let pad = if m < 10 { "0" } else { "" };
                uwriteln!(&mut self.io.log, "set time {}:{}{}", h, pad, m).ok();
                self.sync_dst();
                None
            }
            (Function::Date | Function::DayCount, 1) => {
                let month = match f {
                    Function::Date => self.now.month as u16,
                    _ => self.get(Key::DayCountMonth),
                };
                let mut next = s.next_page(month, 1, 12);
                next.staged.year = Some(s.value);
                Some(next)
            }
            (Function::Date | Function::DayCount, 2) => {
                let year = s.staged.year.unwrap_or(self.now.year);
                let day = match f {
                    Function::Date => self.now.day as u16,
                    _ => self.get(Key::DayCountDay),
                };
                let last = days_in_month(year, s.value as u8) as u16;
                let mut next = s.next_page(day, 1, last);
                next.staged.month = Some(s.value as u8);
                Some(next)
            }
            (Function::Date, _) => {
                let year = s.staged.year.unwrap_or(self.now.year);
                let month = s.staged.month.unwrap_or(self.now.month);
                if self.rtc.set_date(year, month, s.value as u8).is_err() {
                    uwriteln!(&mut self.io.log, "rtc write failed").ok();
                }
                uwriteln!(&mut self.io.log, "set date {}-{}-{}", year, month, s.value).ok();
                self.sync_dst();
                None
            }
            (Function::DayCount, _) => {
                let store = &mut self.store;
                if let Some(year) = s.staged.year {
                    settings::set(store, Key::DayCountYear, year);
                }
                if let Some(month) = s.staged.month {
                    settings::set(store, Key::DayCountMonth, month as u16);
                }
                settings::set(store, Key::DayCountDay, s.value);
                None
            }
            (Function::Alarm, _) => {
                settings::set(&mut self.store, Key::AlarmTime, s.value);
                settings::set(&mut self.store, Key::AlarmOn, 1);
                self.signal.cancel_snooze();
                None
            }
            (Function::Timer, 1) => {
                let secs = self.countdown.duration() % 60;
                self.countdown.set(s.value * 60 + secs);
                Some(s.next_page(secs, 0, 59))
            }
            (Function::Timer, _) => {
                let mins = self.countdown.duration() / 60;
                self.countdown.set(mins * 60 + s.value);
                None
            }
            (Function::Thermometer | Function::Tester, _) => None,
        };
        match next {
            Some(next) => {
                self.state = State::Editing(f, next);
                self.update_display();
            }
            None => {
                if let Ok(t) = self.rtc.now() {
                    self.now = t;
                }
                self.show(f);
            }
        }
    }

    /// Record whether summer time is in force, after the user has set the
    /// local time or chosen a region.
    pub(crate) fn sync_dst(&mut self) {
        let Ok(t) = self.rtc.now() else {
            return;
        };
        let region = Region::from(self.get(Key::AutoDst));
        let on = dst::is_dst_by_hour(region, t.year, t.month, t.day, t.hour);
        settings::set(&mut self.store, Key::DstOn, on as u16);
        // Already past the fall-back hour today: don't spring forward
        // through the repeated hour.
        let fell_back = !on
            && dst::is_transition_day(region, t.year, t.month, t.day)
            && !dst::is_dst(region, t.year, t.month, t.day);
        self.fell_back_on = fell_back.then_some(t.day);
    }

    /// Play a beep in the pitch or pattern being chosen.
    fn preview(&mut self, key: Key, value: u16) {
        let (pitch, pattern) = match key.preview_source() {
            Some(Key::StrikeSignal) => (Key::StrikePitch, None),
            Some(Key::AlarmSignal) => (Key::AlarmPitch, Some(Key::AlarmPattern)),
            Some(Key::TimerSignal) => (Key::TimerPitch, Some(Key::TimerPattern)),
            _ => return,
        };
        let note = if key == pitch { value } else { self.get(pitch) };
        let pattern = match pattern {
            Some(k) if k == key => Pattern::from(value),
            Some(k) => Pattern::from(self.get(k)),
            None => Pattern::Short,
        };
        let voice = Voice {
            route: Route::Piezo,
            hz: note_hz(note),
            pattern,
        };
        self.signal.start(&mut self.io, Source::Preview, voice, 0, self.millis);
    }
}
