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
//! Software RTC for clocks with no RTC chip.
//!
//! Keeps a broken-down date and time, advanced from the millisecond
//! counter the same way Arduino's Time library advances `sysTime`.

use core::convert::Infallible;

use crate::calendar::{day_of_week, days_in_month, DateTime};
use crate::rtc::Rtc;

pub struct SoftRtc {
    now: DateTime,
    prev_millis: u32,
    last_millis: u32,
    /// Milliseconds per second, trimmed to compensate for a crystal that
    /// runs fast or slow.
    second_ms: u32,
}

impl SoftRtc {
    /// `anti_drift` is milliseconds to add per second: positive if the
    /// crystal runs slow.
    pub fn new(anti_drift: i16) -> Self {
        let anti_drift = anti_drift.clamp(-500, 500);
        SoftRtc {
            now: DateTime::default(),
            prev_millis: 0,
            last_millis: 0,
            second_ms: (1000 - anti_drift as i32) as u32,
        }
    }

    fn advance(&mut self) {
        let t = &mut self.now;
        t.second += 1;
        if t.second < 60 {
            return;
        }
        t.second = 0;
        t.minute += 1;
        if t.minute < 60 {
            return;
        }
        t.minute = 0;
        t.hour += 1;
        if t.hour < 24 {
            return;
        }
        t.hour = 0;
        t.day += 1;
        if t.day > days_in_month(t.year, t.month) {
            t.day = 1;
            t.month += 1;
            if t.month > 12 {
                t.month = 1;
                t.year += 1;
            }
        }
        t.weekday = day_of_week(t.year, t.month, t.day);
    }
}

impl Rtc for SoftRtc {
    type Error = Infallible;

    fn tick(&mut self, millis: u32) {
        self.last_millis = millis;
        while millis.wrapping_sub(self.prev_millis) >= self.second_ms {
            self.prev_millis = self.prev_millis.wrapping_add(self.second_ms);
            self.advance();
        }
    }

    fn now(&mut self) -> Result<DateTime, Infallible> {
        Ok(self.now)
    }

    fn set_date(&mut self, year: u16, month: u8, day: u8) -> Result<(), Infallible> {
        self.now.year = year;
        self.now.month = month;
        self.now.day = day.min(days_in_month(year, month));
        self.now.weekday = day_of_week(year, month, self.now.day);
        Ok(())
    }

    fn set_time(&mut self, hour: u8, minute: u8, second: u8) -> Result<(), Infallible> {
        self.now.hour = hour;
        self.now.minute = minute;
        self.now.second = second;
        // Start the new second now rather than part way through.
        self.prev_millis = self.last_millis;
        Ok(())
    }
}
