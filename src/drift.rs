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
//! Drift-compensated millisecond clock.
//!
//! The millisecond counter is fine grained but its crystal drifts; the RTC
//! is accurate but only ticks once a second.  Once a minute (on the RTC's
//! top of minute) the counter is compared against the 60000 ms it should
//! have counted, and the error is queued in a buffer.  Each loop pass bleeds
//! at most one millisecond of the buffer into a running offset, so the
//! corrected clock is nudged rather than jumped.
//!
//! Known limitation: the offset can move backwards, so `ms()` minus an
//! earlier `ms()` can come out negative (i.e. hugely positive when
//! wrapped).  Anything measuring durations with it must bound the result
//! and treat an implausible value as an overflow.

/// RTC seconds between drift checks.
pub const CHECK_SECS: u32 = 60;

const EXPECTED_MS: u32 = CHECK_SECS * 1000;

#[derive(Default)]
pub struct DriftClock {
    last_check: Option<u32>,
    buffer: i16,
    offset: i32,
}

impl DriftClock {
    pub const fn new() -> Self {
        DriftClock {
            last_check: None,
            buffer: 0,
            offset: 0,
        }
    }

    /// Call at each RTC top of minute with the raw millisecond count.
    ///
    /// Returns false if the measurement was discarded because it doesn't
    /// fit the buffer.
    pub fn check(&mut self, millis: u32) -> bool {
        let Some(last) = self.last_check.replace(millis) else {
            return true;
        };
        let elapsed = millis.wrapping_sub(last);
        let error = EXPECTED_MS as i64 - elapsed as i64;
        let queued = i16::try_from(error)
            .ok()
            .and_then(|e| self.buffer.checked_add(e));
        match queued {
            Some(b) => {
                self.buffer = b;
                true
            }
            None => false,
        }
    }

    /// Call every loop pass.  Moves at most 1 ms from the buffer into the
    /// offset.
    pub fn apply(&mut self) {
        match self.buffer {
            b if b > 0 => {
                self.buffer -= 1;
                self.offset = self.offset.wrapping_add(1);
            }
            b if b < 0 => {
                self.buffer += 1;
                self.offset = self.offset.wrapping_sub(1);
            }
            _ => {}
        }
    }

    /// Corrected milliseconds.
    pub fn ms(&self, millis: u32) -> u32 {
        millis.wrapping_add(self.offset as u32)
    }

    /// Forget the last check, e.g. when the RTC has just been set and the
    /// current minute is not a whole minute long.
    pub fn reset(&mut self) {
        self.last_check = None;
        self.buffer = 0;
    }

    pub fn buffer(&self) -> i16 {
        self.buffer
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }
}
