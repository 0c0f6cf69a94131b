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
//! Lay out whatever is being shown onto the digits.

use ufmt::uWrite;

use super::{Clock, Function, Session, State};
use crate::calendar::{day_delta, minutes_to_hm, to_12h};
use crate::rtc::Rtc;
use crate::settings::{ConfigStore, Key, OPTIONS};
use crate::signal::Outputs;

impl<R, S, O, W> Clock<R, S, O, W>
where
    R: Rtc,
    S: ConfigStore,
    O: Outputs,
    W: uWrite,
{
    pub(crate) fn update_display(&mut self) {
        if self.display.is_scrolling() || self.display.is_cleaning() {
            return;
        }
        let shown = match self.state {
            State::Running(f) => Some(f),
            _ => None,
        };
        if self.display.is_armed() && shown != self.scrolled {
            self.scrolled = None;
            self.display.scroll_out(self.millis);
            return;
        }
        match self.state {
            State::Running(f) => self.render_function(f),
            State::Editing(f, s) => self.render_edit(f, &s),
            State::OptionsMenu(i) => self.render_option(i, None),
            State::OptionsEditing(i, s) => self.render_option(i, Some(s.value)),
        }
    }

    fn leading_zeros(&self) -> bool {
        self.get(Key::LeadingZero) == 1
    }

    fn hour(&self, h: u8) -> u32 {
        if self.get(Key::TimeFormat) == 1 {
            to_12h(h) as u32
        } else {
            h as u32
        }
    }

    /// Hours and minutes at 0-3, and `rest` at 4-5 if there's room.
    fn render_hm(&mut self, h: u8, m: u8, rest: Option<u32>) {
        let lz = self.leading_zeros();
        let h = self.hour(h);
        let d = &mut self.display;
        d.edit(h, 0, 1, lz, true);
        d.edit(m as u32, 2, 3, true, true);
        match rest {
            Some(v) => d.edit(v, 4, 5, true, true),
            None => d.blank(4, 5, true),
        }
    }

    fn render_function(&mut self, f: Function) {
        let t = self.now;
        let lz = self.leading_zeros();
        let six = self.display.size() >= 6;
        let last = self.display.size() - 1;
        match f {
            Function::Time => {
                let rest = match self.get(Key::AutoDate) {
                    1 => t.day,
                    _ => t.second,
                };
                self.render_hm(t.hour, t.minute, Some(rest as u32));
            }
            Function::Date => {
                let yy = (t.year % 100) as u32;
                let (m, d) = (t.month as u32, t.day as u32);
                let weekday = t.weekday as u32 + 1;
                let format = self.get(Key::DateFormat);
                let disp = &mut self.display;
                match format {
                    1 | 2 => {
                        let (a, b) = if format == 1 { (m, d) } else { (d, m) };
                        disp.edit(a, 0, 1, lz, true);
                        disp.edit(b, 2, 3, true, true);
                        disp.blank(4, 4, true);
                        disp.edit(weekday, 5, 5, true, true);
                    }
                    fmt => {
                        let (a, b, c) = match fmt {
                            3 => (m, d, yy),
                            4 => (d, m, yy),
                            _ => (yy, m, d),
                        };
                        disp.edit(a, 0, 1, lz || fmt == 5, true);
                        disp.edit(b, 2, 3, true, true);
                        disp.edit(c, 4, 5, true, true);
                    }
                }
            }
            Function::DayCount => {
                let target = (
                    self.get(Key::DayCountYear),
                    self.get(Key::DayCountMonth) as u8,
                    self.get(Key::DayCountDay) as u8,
                );
                let days = day_delta((t.year, t.month, t.day), target).unsigned_abs();
                self.display.edit(days, 0, last, false, true);
            }
            Function::Alarm => {
                let (h, m) = minutes_to_hm(self.get(Key::AlarmTime));
                let on = self.get(Key::AlarmOn) as u32;
                let h = self.hour(h);
                let d = &mut self.display;
                d.edit(h, 0, 1, lz, true);
                d.edit(m as u32, 2, 3, true, true);
                d.blank(4, 4, true);
                d.edit(on, 5, 5, true, true);
            }
            Function::Timer => {
                let secs = self.countdown.display_secs(self.drift.ms(self.millis));
                let (h, m, s) = (secs / 3600, secs / 60 % 60, secs % 60);
                let d = &mut self.display;
                if six {
                    if h > 0 {
                        d.edit(h, 0, 1, lz, true);
                    } else {
                        d.blank(0, 1, true);
                    }
                    d.edit(m, 2, 3, h > 0 || lz, true);
                    d.edit(s, 4, 5, true, true);
                } else if h > 0 {
                    d.edit(h, 0, 1, lz, true);
                    d.edit(m, 2, 3, true, true);
                } else {
                    d.edit(m, 0, 1, lz, true);
                    d.edit(s, 2, 3, true, true);
                }
            }
            Function::Thermometer => match self.rtc.temperature() {
                Some(c) => {
                    let v = match self.get(Key::TempUnit) {
                        1 => c as i32 * 9 / 5 + 3200,
                        _ => c as i32,
                    };
                    // Hundredths to whole degrees, rounded.  The tubes
                    // have no minus sign, so below zero reads 0.
                    let whole = (v.max(0) as u32 + 50) / 100;
                    self.display.edit(whole, 0, last, false, true);
                }
                None => self.display.blank(0, last, true),
            },
            Function::Tester => {
                let digit = self.tester_digit as u32;
                for pos in 0..=last {
                    self.display.edit(digit, pos, pos, true, false);
                }
            }
        }
    }

    fn render_edit(&mut self, f: Function, s: &Session) {
        let lz = self.leading_zeros();
        let v = s.value as u32;
        match (f, s.page) {
            (Function::Time | Function::Alarm, _) => {
                let (h, m) = minutes_to_hm(s.value);
                self.render_hm(h, m, None);
            }
            (Function::Date | Function::DayCount, 1) => {
                let d = &mut self.display;
                d.edit(v, 0, 3, true, true);
                d.blank(4, 5, true);
            }
            (Function::Date | Function::DayCount, 2) => {
                let d = &mut self.display;
                d.edit(v, 0, 1, lz, true);
                d.blank(2, 5, true);
            }
            (Function::Date | Function::DayCount, _) => {
                let month = s.staged.month.unwrap_or(1) as u32;
                let d = &mut self.display;
                d.edit(month, 0, 1, lz, true);
                d.edit(v, 2, 3, true, true);
                d.blank(4, 5, true);
            }
            (Function::Timer, 1) => {
                let d = &mut self.display;
                d.edit(v / 60, 0, 1, lz, true);
                d.edit(v % 60, 2, 3, true, true);
                d.blank(4, 5, true);
            }
            (Function::Timer, _) => {
                let mins = (self.countdown.duration() / 60) as u32;
                let six = self.display.size() >= 6;
                let d = &mut self.display;
                if six {
                    d.edit(mins / 60, 0, 1, lz, true);
                    d.edit(mins % 60, 2, 3, true, true);
                    d.edit(v, 4, 5, true, true);
                } else {
                    d.blank(0, 1, true);
                    d.edit(v, 2, 3, true, true);
                }
            }
            (Function::Thermometer | Function::Tester, _) => {}
        }
    }

    /// Option number at 0-1, and the value if it's being edited.
    fn render_option(&mut self, i: usize, value: Option<u16>) {
        let key = OPTIONS[i];
        let last = self.display.size() - 1;
        let d = &mut self.display;
        d.edit(i as u32 + 1, 0, 1, false, true);
        match value {
            None => d.blank(2, last, true),
            Some(v) if key.is_time() => {
                // A four digit display has no room left for the number.
                let at = last - 3;
                let (h, m) = minutes_to_hm(v);
                d.edit(h as u32, at, at + 1, false, true);
                d.edit(m as u32, at + 2, at + 3, true, true);
            }
            Some(v) => d.edit(v as u32, 2, last, false, true),
        }
    }
}
