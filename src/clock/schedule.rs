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
//! Everything driven by the time of day.

use ufmt::{uWrite, uwriteln};

use super::{Clock, Function, State, Tick};
use crate::calendar::{is_day_in_range, is_time_in_range, to_12h};
use crate::display::Dim;
use crate::dst::{self, Region};
use crate::rtc::Rtc;
use crate::settings::{self, ConfigStore, Key};
use crate::signal::{note_hz, Outputs, Pattern, Route, Source, Voice};

impl<R, S, O, W> Clock<R, S, O, W>
where
    R: Rtc,
    S: ConfigStore,
    O: Outputs,
    W: uWrite,
{
    /// Read the RTC and act on anything due.  `force` redraws the display
    /// even if the second hasn't changed.
    pub(crate) fn check_rtc(&mut self, force: bool) {
        let hw = self.hw;
        let t = &hw.timing;
        let idle = self.millis.wrapping_sub(self.input.last_input());
        match self.state {
            State::Running(f) => {
                let temporary = !matches!(f, Function::Time | Function::Tester)
                    && !(f == Function::Timer && self.countdown.is_running())
                    && !self.signal.is_sounding()
                    && self.page_remain == 0;
                if temporary && idle >= t.temp_timeout_secs as u32 * 1000 {
                    self.show(Function::Time);
                }
            }
            _ => {
                if idle >= t.setting_timeout_secs as u32 * 1000 {
                    uwriteln!(&mut self.io.log, "setting timed out").ok();
                    self.show(Function::Time);
                }
            }
        }

        self.signal.expire(&mut self.io, self.millis);

        // On a failed read carry on with the last good time.
        if let Ok(now) = self.rtc.now() {
            self.now = now;
        }
        let changed = self.last_second != Some(self.now.second);
        if changed {
            self.last_second = Some(self.now.second);
            self.on_second();
        }
        if changed || force {
            self.dim = self.compute_dim();
            if !self.state.is_setting() {
                self.update_display();
            }
        }
    }

    fn on_second(&mut self) {
        let now = self.now;
        if now.second == 0 {
            if !self.drift.check(self.millis) {
                uwriteln!(&mut self.io.log, "drift: measurement discarded").ok();
            }
            if now.minute == 0 {
                self.auto_dst();
            }
            self.check_alarm();
            self.check_cleaning();
        }

        self.wake_remain = self.wake_remain.saturating_sub(1);
        if self.page_remain > 0 {
            self.page_remain -= 1;
            if self.page_remain == 0 && self.state == State::Running(Function::Date) {
                self.show(Function::Time);
            }
        }

        // Sustained signals first, so one raised below starts its full run.
        self.signal.tick_second(&mut self.io, self.millis);
        self.strike();
        self.auto_date();
        self.tick_countdown();
        if self.signal.tick_snooze() && self.get(Key::AlarmOn) == 1 {
            self.start_signal(Source::Alarm, true);
        }
        if self.state == State::Running(Function::Tester) {
            self.tester_digit = (self.tester_digit + 1) % 10;
        }
    }

    /// Voice for a sustained or one-off signal from `source`.
    fn voice(&self, source: Source) -> Voice {
        let (route, pitch, pattern) = match source {
            Source::Alarm => (Key::AlarmSignal, Key::AlarmPitch, Some(Key::AlarmPattern)),
            Source::Timer => (Key::TimerSignal, Key::TimerPitch, Some(Key::TimerPattern)),
            Source::Strike | Source::Preview => (Key::StrikeSignal, Key::StrikePitch, None),
        };
        Voice {
            route: settings::route(&self.store, route),
            hz: note_hz(self.get(pitch)),
            pattern: pattern.map_or(Pattern::Short, |k| Pattern::from(self.get(k))),
        }
    }

    pub(crate) fn start_signal(&mut self, source: Source, sustained: bool) {
        let hw = self.hw;
        let t = &hw.timing;
        let voice = self.voice(source);
        let secs = match (sustained, voice.route) {
            (false, _) => 0,
            (true, Route::Switch) => t.switch_secs,
            (true, _) => t.signal_secs,
        };
        self.signal.start(&mut self.io, source, voice, secs, self.millis);
    }

    fn check_alarm(&mut self) {
        if self.get(Key::AlarmOn) == 0
            || self.signal.is_snoozing()
            || self.now.minute_of_day() != self.get(Key::AlarmTime)
        {
            return;
        }
        let workday = is_day_in_range(
            self.get(Key::WorkWeekStart) as u8,
            self.get(Key::WorkWeekEnd) as u8,
            self.now.weekday,
        );
        let today = match self.get(Key::AlarmDays) {
            1 => workday,
            2 => !workday,
            _ => true,
        };
        if today {
            self.start_signal(Source::Alarm, true);
        }
    }

    fn check_cleaning(&mut self) {
        if self.get(Key::Clean) == 1
            && self.now.minute_of_day() == self.get(Key::CleanTime)
            && !self.state.is_setting()
        {
            self.display.clean(self.millis);
        }
    }

    /// Called at the top of each hour.  Moves the RTC an hour either way
    /// when the region's summer time starts or ends.
    fn auto_dst(&mut self) {
        let region = Region::from(self.get(Key::AutoDst));
        let t = self.now;
        if !dst::is_transition_day(region, t.year, t.month, t.day) {
            return;
        }
        let want = dst::is_dst_by_hour(region, t.year, t.month, t.day, t.hour);
        let applied = self.get(Key::DstOn) == 1;
        if want == applied {
            return;
        }
        let (hour, sign) = if want {
            if self.fell_back_on == Some(t.day) {
                return;
            }
            ((t.hour + 1) % 24, "+")
        } else {
            self.fell_back_on = Some(t.day);
            ((t.hour + 23) % 24, "-")
        };
        if self.rtc.set_hour(hour).is_err() {
            uwriteln!(&mut self.io.log, "rtc write failed").ok();
            return;
        }
        settings::set(&mut self.store, Key::DstOn, want as u16);
        uwriteln!(&mut self.io.log, "dst {}1h", sign).ok();
        if let Ok(now) = self.rtc.now() {
            self.now = now;
            self.last_second = Some(now.second);
        }
    }

    fn strike(&mut self) {
        let mode = self.get(Key::Strike);
        if mode == 0 || self.state.is_setting() || self.signal.is_sounding() || self.dim == Dim::Off {
            return;
        }
        let t = self.now;
        let top = t.minute == 0 && t.second == 0;
        let pattern = match mode {
            1 if top => Pattern::Short,
            2 if t.minute == 59 && t.second >= 55 => Pattern::Pip,
            2 if top => Pattern::LongPip,
            3 if top => Pattern::Count(to_12h(t.hour)),
            4 if top => Pattern::Bell,
            4 if t.minute == 30 && t.second == 0 => Pattern::HalfBell,
            _ => return,
        };
        let voice = Voice {
            pattern,
            ..self.voice(Source::Strike)
        };
        self.signal.start(&mut self.io, Source::Strike, voice, 0, self.millis);
    }

    /// Put the date up for a few seconds at :30.
    fn auto_date(&mut self) {
        let mode = self.get(Key::AutoDate);
        if self.now.second != 30
            || mode < 2
            || self.state != State::Running(Function::Time)
            || !self.hw.has_function(Function::Date)
        {
            return;
        }
        self.show(Function::Date);
        self.page_remain = self.hw.timing.page_secs;
        if mode == 3 {
            self.display.scroll_in(self.millis);
            self.scrolled = Some(Function::Date);
        }
    }

    fn tick_countdown(&mut self) {
        let ms = self.drift.ms(self.millis);
        match self.countdown.tick(ms) {
            Tick::Idle | Tick::Running => {}
            Tick::Overflow => {
                uwriteln!(&mut self.io.log, "timer overflow").ok();
            }
            Tick::Expired => self.timer_done(ms),
        }
    }

    fn timer_done(&mut self, ms: u32) {
        if settings::route(&self.store, Key::TimerSignal) == Route::Switch {
            // Sleep timer: the radio goes off.
            self.signal.set_power(&mut self.io, false);
            return;
        }
        if self.get(Key::TimerRunout) == 1 {
            self.countdown.start(ms);
            self.start_signal(Source::Timer, false);
            return;
        }
        self.show(Function::Timer);
        self.start_signal(Source::Timer, true);
    }

    fn compute_dim(&self) -> Dim {
        if self.wake_remain > 0 || self.state.is_setting() || self.signal.is_sounding() {
            return Dim::Full;
        }
        let mins = self.now.minute_of_day();
        let workday = is_day_in_range(
            self.get(Key::WorkWeekStart) as u8,
            self.get(Key::WorkWeekEnd) as u8,
            self.now.weekday,
        );
        let away = match self.get(Key::AwayMode) {
            1 => !workday,
            2 => workday && is_time_in_range(self.get(Key::WorkStart), self.get(Key::WorkEnd), mins),
            _ => false,
        };
        if away {
            return Dim::Off;
        }
        let night = is_time_in_range(self.get(Key::NightStart), self.get(Key::NightEnd), mins);
        match self.get(Key::NightMode) {
            1 if night => Dim::Dim,
            2 if night => Dim::Off,
            _ => Dim::Full,
        }
    }
}
