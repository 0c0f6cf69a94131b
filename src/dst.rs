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
//! Automatic daylight saving time rules.

use crate::calendar::{last_sunday, nth_sunday};

/// Regions selectable by the auto DST option, in option value order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    Off = 0,
    NorthAmerica = 1,
    UnitedKingdom = 2,
    CentralEurope = 3,
    Australia = 4,
    NewZealand = 5,
}

impl From<u16> for Region {
    fn from(v: u16) -> Self {
        match v {
            1 => Region::NorthAmerica,
            2 => Region::UnitedKingdom,
            3 => Region::CentralEurope,
            4 => Region::Australia,
            5 => Region::NewZealand,
            _ => Region::Off,
        }
    }
}

#[derive(Clone, Copy)]
enum Week {
    Nth(u8),
    Last,
}

/// A transition: the given Sunday of a month, at a local hour.
#[derive(Clone, Copy)]
struct Edge {
    month: u8,
    week: Week,
    hour: u8,
}

struct Rule {
    start: Edge,
    end: Edge,
}

impl Edge {
    fn day(&self, y: u16) -> u8 {
        match self.week {
            Week::Nth(n) => nth_sunday(y, self.month, n),
            Week::Last => last_sunday(y, self.month),
        }
    }

    /// Is (m, d, h) at or after this transition?
    fn reached(&self, y: u16, m: u8, d: u8, h: u8) -> bool {
        let td = self.day(y);
        (m, d, h) >= (self.month, td, self.hour)
    }
}

const fn edge(month: u8, week: Week, hour: u8) -> Edge {
    Edge { month, week, hour }
}

fn rule(region: Region) -> Option<Rule> {
    let r = match region {
        Region::Off => return None,
        Region::NorthAmerica => Rule {
            start: edge(3, Week::Nth(2), 2),
            end: edge(11, Week::Nth(1), 2),
        },
        Region::UnitedKingdom => Rule {
            start: edge(3, Week::Last, 1),
            end: edge(10, Week::Last, 2),
        },
        Region::CentralEurope => Rule {
            start: edge(3, Week::Last, 2),
            end: edge(10, Week::Last, 3),
        },
        Region::Australia => Rule {
            start: edge(10, Week::Nth(1), 2),
            end: edge(4, Week::Nth(1), 3),
        },
        Region::NewZealand => Rule {
            start: edge(9, Week::Last, 2),
            end: edge(4, Week::Nth(1), 3),
        },
    };
    Some(r)
}

/// Is DST in effect at local hour `h` of the given date?
///
/// The end hour is in DST terms, so on the fall-back day hours before it
/// still count as DST even after the clock has been set back.  Callers
/// have to latch the fall-back themselves.
pub fn is_dst_by_hour(region: Region, y: u16, m: u8, d: u8, h: u8) -> bool {
    let Some(r) = rule(region) else {
        return false;
    };
    let started = r.start.reached(y, m, d, h);
    let ended = r.end.reached(y, m, d, h);
    if r.start.month < r.end.month {
        started && !ended
    } else {
        // Southern hemisphere: DST spans the new year.
        started || !ended
    }
}

/// Is DST in effect for most of the given day?  On a transition day this
/// is true for spring forward and false for fall back.
pub fn is_dst(region: Region, y: u16, m: u8, d: u8) -> bool {
    is_dst_by_hour(region, y, m, d, 12)
}

/// Is the given date a transition day for the region?
pub fn is_transition_day(region: Region, y: u16, m: u8, d: u8) -> bool {
    match rule(region) {
        Some(r) => {
            (r.start.month == m && r.start.day(y) == d) || (r.end.month == m && r.end.day(y) == d)
        }
        None => false,
    }
}
