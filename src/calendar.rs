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
//! Calendar arithmetic.
//!
//! Dates are plain year/month/day triples.  Nothing here converts to
//! seconds since an epoch: the clock only ever needs weekdays and day
//! counts, and the RTC chip keeps its own broken-down time.

/// Day count origin.  Dates before this are not representable on the RTC.
pub const EPOCH_YEAR: u16 = 2000;

/// A snapshot of wall-clock time as reported by the RTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateTime {
    pub year: u16,
    /// 1-12
    pub month: u8,
    /// 1-31
    pub day: u8,
    /// 0 = Sunday
    pub weekday: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        DateTime {
            year,
            month,
            day,
            weekday: day_of_week(year, month, day),
            hour,
            minute,
            second,
        }
    }

    /// Minutes since midnight.
    pub fn minute_of_day(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }
}

impl Default for DateTime {
    fn default() -> Self {
        DateTime::new(EPOCH_YEAR, 1, 1, 0, 0, 0)
    }
}

pub const fn is_leap(y: u16) -> bool {
    (y % 4 == 0 && y % 100 != 0) || y % 400 == 0
}

pub const fn days_in_month(y: u16, m: u8) -> u8 {
    match m {
        2 => {
            if is_leap(y) {
                29
            } else {
                28
            }
        }
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

pub const fn days_in_year(y: u16) -> u16 {
    if is_leap(y) {
        366
    } else {
        365
    }
}

/// Day of the week, 0 = Sunday, by Zeller's congruence.
///
/// January and February count as months 13 and 14 of the previous year so
/// the leap day falls at the end of the cycle.
pub const fn day_of_week(y: u16, m: u8, d: u8) -> u8 {
    let (y, m) = if m < 3 {
        (y as u32 - 1, m as u32 + 12)
    } else {
        (y as u32, m as u32)
    };
    let k = y % 100;
    let j = y / 100;
    // h: 0 = Saturday, 1 = Sunday, ...
    let h = (d as u32 + (13 * (m + 1)) / 5 + k + k / 4 + j / 4 + 5 * j) % 7;
    ((h + 6) % 7) as u8
}

/// Days from 2000-01-01 to the given date.
///
/// Sums whole years, then whole months, then the remaining days.
pub fn day_count(y: u16, m: u8, d: u8) -> i32 {
    let mut count: i32 = 0;
    if y >= EPOCH_YEAR {
        for yr in EPOCH_YEAR..y {
            count += days_in_year(yr) as i32;
        }
    } else {
        for yr in y..EPOCH_YEAR {
            count -= days_in_year(yr) as i32;
        }
    }
    for mo in 1..m {
        count += days_in_month(y, mo) as i32;
    }
    count + d as i32 - 1
}

/// Signed number of days from date `a` to date `b`.
pub fn day_delta(a: (u16, u8, u8), b: (u16, u8, u8)) -> i32 {
    day_count(b.0, b.1, b.2) - day_count(a.0, a.1, a.2)
}

/// Day of month of the `nth` (1-based) Sunday of a month.
pub const fn nth_sunday(y: u16, m: u8, nth: u8) -> u8 {
    let first = day_of_week(y, m, 1);
    let first_sunday = if first == 0 { 1 } else { 8 - first };
    first_sunday + (nth - 1) * 7
}

pub const fn last_sunday(y: u16, m: u8) -> u8 {
    let last = days_in_month(y, m);
    last - day_of_week(y, m, last)
}

/// Is minute-of-day `t` within `[start, end)`?  Ranges may wrap past
/// midnight; an empty range (start == end) never matches.
pub fn is_time_in_range(start: u16, end: u16, t: u16) -> bool {
    if start <= end {
        start <= t && t < end
    } else {
        t >= start || t < end
    }
}

/// Is weekday `d` within `[start, end]`?  Ranges may wrap past Saturday.
pub fn is_day_in_range(start: u8, end: u8, d: u8) -> bool {
    if start <= end {
        start <= d && d <= end
    } else {
        d >= start || d <= end
    }
}

/// Split minutes since midnight into (hour, minute).
pub fn minutes_to_hm(mins: u16) -> (u8, u8) {
    ((mins / 60 % 24) as u8, (mins % 60) as u8)
}

/// 24-hour hour to 12-hour dial hour (1-12).
pub fn to_12h(h: u8) -> u8 {
    match h % 12 {
        0 => 12,
        v => v,
    }
}
