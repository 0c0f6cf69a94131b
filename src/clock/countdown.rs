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
//! Countdown timer, or a stopwatch when no duration is set.
//!
//! Timestamps are drift corrected milliseconds, which can step backwards,
//! so an elapsed time beyond the longest possible run is taken as an
//! overflow and the timer is cleared.
//!
//! A running stopwatch can hold a lap: the display freezes on the lap time
//! while the count carries on underneath.

/// Longest run shown on the display without its last second dropping off.
const MAX_MS: u32 = Countdown::MAX_SECS as u32 * 1000 + 999;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    Idle,
    Running,
    /// Reached zero on this tick.
    Expired,
    /// Elapsed time was implausible, timer cleared.
    Overflow,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Countdown {
    duration: u16,
    run_start: Option<u32>,
    /// Time run before the last pause.
    banked: u32,
    done: bool,
    /// Elapsed ms frozen on the display.
    lap: Option<u32>,
}

impl Countdown {
    /// 17:59:59
    pub const MAX_SECS: u16 = 64799;

    pub const fn new() -> Self {
        Countdown {
            duration: 0,
            run_start: None,
            banked: 0,
            done: false,
            lap: None,
        }
    }

    /// Set the duration in seconds, stopping the timer.  0 makes it a
    /// stopwatch.
    pub fn set(&mut self, secs: u16) {
        *self = Countdown {
            duration: secs.min(Self::MAX_SECS),
            ..Countdown::new()
        };
    }

    pub fn duration(&self) -> u16 {
        self.duration
    }

    pub fn is_running(&self) -> bool {
        self.run_start.is_some()
    }

    /// Running, paused part way, or finished.
    pub fn is_started(&self) -> bool {
        self.run_start.is_some() || self.banked > 0 || self.done
    }

    /// Start or resume.  A finished countdown starts again from the top.
    pub fn start(&mut self, ms: u32) {
        if self.done {
            self.clear();
        }
        if self.run_start.is_none() {
            self.run_start = Some(ms);
        }
    }

    pub fn pause(&mut self, ms: u32) {
        self.lap = None;
        if let Some(start) = self.run_start.take() {
            self.banked = self.banked.saturating_add(ms.wrapping_sub(start));
            if self.banked > MAX_MS {
                self.clear();
            }
        }
    }

    /// Back to the full duration, stopped.
    pub fn clear(&mut self) {
        self.run_start = None;
        self.banked = 0;
        self.done = false;
        self.lap = None;
    }

    pub fn is_lapped(&self) -> bool {
        self.lap.is_some()
    }

    /// Freeze the display of a running stopwatch, or let it catch up
    /// again.  Returns false when there is no running stopwatch.
    pub fn lap(&mut self, ms: u32) -> bool {
        if self.duration > 0 || self.run_start.is_none() {
            return false;
        }
        self.lap = match self.lap {
            Some(_) => None,
            None => Some(self.elapsed_ms(ms).min(MAX_MS)),
        };
        true
    }

    fn elapsed_ms(&self, ms: u32) -> u32 {
        let running = self.run_start.map_or(0, |start| ms.wrapping_sub(start));
        self.banked.saturating_add(running)
    }

    /// Call once a second.
    pub fn tick(&mut self, ms: u32) -> Tick {
        if self.run_start.is_none() {
            return Tick::Idle;
        }
        let elapsed = self.elapsed_ms(ms);
        if elapsed > MAX_MS {
            self.clear();
            return Tick::Overflow;
        }
        if self.duration > 0 && elapsed >= self.duration as u32 * 1000 {
            self.run_start = None;
            self.banked = 0;
            self.done = true;
            return Tick::Expired;
        }
        Tick::Running
    }

    /// Seconds to show: time left on a countdown, time elapsed on a
    /// stopwatch.
    pub fn display_secs(&self, ms: u32) -> u32 {
        if self.done {
            return 0;
        }
        let elapsed = self.lap.unwrap_or_else(|| self.elapsed_ms(ms).min(MAX_MS));
        if self.duration == 0 {
            elapsed / 1000
        } else {
            (self.duration as u32 * 1000).saturating_sub(elapsed).div_ceil(1000)
        }
    }
}
