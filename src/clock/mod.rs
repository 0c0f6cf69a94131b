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
//! The clock: every piece of state, and the main loop pass.

mod control;
mod countdown;
mod render;
mod schedule;

pub use control::bounded_step;
pub use countdown::{Countdown, Tick};

use embedded_hal::delay::DelayNs;
use ufmt::{uWrite, uwriteln};

use crate::calendar::DateTime;
use crate::display::{DigitDriver, Dim, Display, Effect};
use crate::drift::DriftClock;
use crate::hardware::Hardware;
use crate::input::{Controls, Input};
use crate::rtc::Rtc;
use crate::settings::{self, ConfigStore, Key};
use crate::signal::{Logged, Outputs, Signal};

/// The things a clock can show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    Time,
    Date,
    DayCount,
    Alarm,
    Timer,
    Thermometer,
    /// Cycles every digit once a second, for checking tubes.
    Tester,
}

/// Date parts already chosen on earlier pages of a date edit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PartialDate {
    pub year: Option<u16>,
    pub month: Option<u8>,
}

/// One page of an edit in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Session {
    /// From 1.
    pub page: u8,
    pub value: u16,
    pub min: u16,
    pub max: u16,
    pub staged: PartialDate,
}

impl Session {
    pub fn new(page: u8, value: u16, min: u16, max: u16) -> Self {
        Session {
            page,
            value: value.clamp(min, max),
            min,
            max,
            staged: PartialDate::default(),
        }
    }

    /// Wide ranges move in tens when adjusted quickly.
    pub fn velocity(&self) -> bool {
        self.max - self.min > 30
    }

    pub fn adjust(&mut self, up: bool, fast: bool) {
        let step = if fast && self.velocity() { 10 } else { 1 };
        let delta = if up { step } else { -step };
        self.value = bounded_step(self.value, delta, self.min, self.max);
    }

    /// The following page, keeping staged values.
    fn next_page(&self, value: u16, min: u16, max: u16) -> Self {
        Session {
            staged: self.staged,
            ..Session::new(self.page + 1, value, min, max)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Running(Function),
    Editing(Function, Session),
    /// Index into `settings::OPTIONS`.
    OptionsMenu(usize),
    OptionsEditing(usize, Session),
}

impl State {
    pub fn is_setting(&self) -> bool {
        !matches!(self, State::Running(_))
    }
}

pub struct Clock<R, S, O, W> {
    pub(crate) hw: &'static Hardware,
    pub(crate) rtc: R,
    pub(crate) store: S,
    pub(crate) io: Logged<O, W>,
    pub(crate) input: Input,
    pub(crate) display: Display,
    pub(crate) signal: Signal,
    pub(crate) drift: DriftClock,
    pub(crate) countdown: Countdown,
    pub(crate) state: State,
    /// Last good RTC reading.
    pub(crate) now: DateTime,
    /// Raw milliseconds at the start of this pass.
    pub(crate) millis: u32,
    last_second: Option<u8>,
    pub(crate) dim: Dim,
    /// Seconds the display stays lit after a press while it was off.
    wake_remain: u16,
    /// Seconds left of an automatic page, such as the date at :30.
    page_remain: u8,
    /// Function that was scrolled in and is waiting to scroll out.
    scrolled: Option<Function>,
    /// Day of month the clocks last went back, so the repeated hour isn't
    /// sprung forward again.
    fell_back_on: Option<u8>,
    tester_digit: u8,
}

impl<R, S, O, W> Clock<R, S, O, W>
where
    R: Rtc,
    S: ConfigStore,
    O: Outputs,
    W: uWrite,
{
    /// Bring up the clock.  `hard` resets every setting to its default.
    pub fn new(hw: &'static Hardware, rtc: R, store: S, out: O, log: W, hard: bool, millis: u32) -> Self {
        let mut clock = Clock {
            hw,
            rtc,
            store,
            io: Logged { out, log },
            input: Input::new(),
            display: Display::new(hw.display_size),
            signal: Signal::new(hw.timing.pulse_ms),
            drift: DriftClock::new(),
            countdown: Countdown::new(),
            state: State::Running(Function::Time),
            now: DateTime::default(),
            millis,
            last_second: None,
            dim: Dim::Full,
            wake_remain: 0,
            page_remain: 0,
            scrolled: None,
            fell_back_on: None,
            tester_digit: 0,
        };

        let repaired = settings::init(&mut clock.store, hw, hard);
        uwriteln!(&mut clock.io.log, "nixieclock {}", env!("CARGO_PKG_VERSION")).ok();
        if hard {
            uwriteln!(&mut clock.io.log, "settings: reset").ok();
        } else {
            uwriteln!(&mut clock.io.log, "settings: repaired {}", repaired).ok();
        }
        clock.check_rtc(true);
        clock
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn log(&mut self) -> &mut W {
        &mut self.io.log
    }

    /// One pass of the main loop.
    pub fn poll<C, D, T>(&mut self, millis: u32, controls: &mut C, driver: &mut D, delay: &mut T) -> Result<(), D::Error>
    where
        C: Controls,
        D: DigitDriver,
        T: DelayNs,
    {
        let hw = self.hw;
        self.millis = millis;
        self.rtc.tick(millis);
        match self.display.effects(millis, hw.timing.scroll_ms, hw.timing.clean_ms) {
            Effect::ScrolledOut | Effect::Cleaned => self.update_display(),
            Effect::None => {}
        }
        self.drift.apply();

        self.check_rtc(false);
        self.check_inputs(controls);

        self.signal.service(&mut self.io, millis);
        self.update_indicator();

        let fade_ms = self.get(Key::DigitFade) * 10;
        self.display.cycle(driver, delay, millis, self.dim, fade_ms)
    }

    fn check_inputs<C: Controls>(&mut self, controls: &mut C) {
        let hw = self.hw;
        if let Some(action) = self.input.poll(controls, self.millis, &hw.timing) {
            self.ctrl_evt(action);
        }
        if matches!(self.state, State::Editing(..) | State::OptionsEditing(..)) {
            if let Some(action) = self.input.repeat(self.millis, &hw.timing) {
                self.ctrl_evt(action);
            }
        }
    }

    fn update_indicator(&mut self) {
        if !self.hw.has_indicator {
            return;
        }
        let on = match self.get(Key::Indicator) {
            1 => self.signal.is_sounding(),
            2 => self.signal.switch_on(),
            3 => self.dim != Dim::Off,
            _ => false,
        };
        self.io.set_indicator(on);
    }

    pub(crate) fn get(&self, key: Key) -> u16 {
        settings::get(&self.store, key)
    }

    /// Show a function, leaving any edit.
    pub(crate) fn show(&mut self, f: Function) {
        self.state = State::Running(f);
        self.page_remain = 0;
        self.update_display();
    }
}

#[cfg(test)]
mod tests;
