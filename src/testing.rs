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
//! In-memory stand-ins for the board, used by the unit tests.

extern crate std;

use core::convert::Infallible;
use embedded_hal::delay::DelayNs;
use std::string::String;
use std::vec::Vec;

use crate::calendar::DateTime;
use crate::display::DigitDriver;
use crate::hardware::DRIVERS;
use crate::input::{Control, Controls};
use crate::rtc::Rtc;
use crate::settings::ConfigStore;
use crate::signal::Outputs;

/// EEPROM image, erased to 0xff like a new chip.
pub struct RamStore {
    pub bytes: [u8; 64],
    pub writes: usize,
}

impl RamStore {
    pub fn new() -> Self {
        RamStore {
            bytes: [0xff; 64],
            writes: 0,
        }
    }
}

impl ConfigStore for RamStore {
    fn read_byte(&self, addr: u16) -> u8 {
        self.bytes[addr as usize]
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        self.writes += 1;
        self.bytes[addr as usize] = value;
    }
}

/// An RTC whose reads can be made to fail.
pub struct FakeRtc {
    pub now: DateTime,
    pub fail: bool,
    pub temp: Option<i16>,
}

impl FakeRtc {
    pub fn new(now: DateTime) -> Self {
        FakeRtc {
            now,
            fail: false,
            temp: None,
        }
    }
}

impl Rtc for FakeRtc {
    type Error = ();

    fn now(&mut self) -> Result<DateTime, ()> {
        if self.fail {
            Err(())
        } else {
            Ok(self.now)
        }
    }

    fn set_date(&mut self, year: u16, month: u8, day: u8) -> Result<(), ()> {
        let t = self.now;
        self.now = DateTime::new(year, month, day, t.hour, t.minute, t.second);
        Ok(())
    }

    fn set_time(&mut self, hour: u8, minute: u8, second: u8) -> Result<(), ()> {
        let t = self.now;
        self.now = DateTime::new(t.year, t.month, t.day, hour, minute, second);
        Ok(())
    }

    fn temperature(&mut self) -> Option<i16> {
        self.temp
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Out {
    Tone(u16),
    NoTone,
    Switch(bool),
    Pulse(bool),
}

/// Records output changes.  The indicator is kept as a level.
#[derive(Default)]
pub struct Recorder {
    pub events: Vec<Out>,
    pub indicator: bool,
}

impl Outputs for Recorder {
    fn tone(&mut self, hz: u16) {
        self.events.push(Out::Tone(hz));
    }

    fn no_tone(&mut self) {
        self.events.push(Out::NoTone);
    }

    fn set_switch(&mut self, on: bool) {
        self.events.push(Out::Switch(on));
    }

    fn set_pulse(&mut self, on: bool) {
        self.events.push(Out::Pulse(on));
    }

    fn set_indicator(&mut self, on: bool) {
        self.indicator = on;
    }
}

/// Buttons held down by the test.
#[derive(Default)]
pub struct Buttons {
    pub down: Option<Control>,
    pub also: Option<Control>,
    pub turns: i8,
}

impl Controls for Buttons {
    fn pressed(&mut self, ctrl: Control) -> bool {
        self.down == Some(ctrl) || self.also == Some(ctrl)
    }

    fn rotation(&mut self) -> i8 {
        core::mem::take(&mut self.turns)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lit {
    On(usize, [u8; DRIVERS]),
    Dark,
}

#[derive(Default)]
pub struct RecordingDriver {
    pub lit: Vec<Lit>,
}

impl DigitDriver for RecordingDriver {
    type Error = Infallible;

    fn light(&mut self, channel: usize, codes: [u8; DRIVERS]) -> Result<(), Infallible> {
        self.lit.push(Lit::On(channel, codes));
        Ok(())
    }

    fn dark(&mut self) -> Result<(), Infallible> {
        self.lit.push(Lit::Dark);
        Ok(())
    }
}

/// Returns at once, noting each wait in microseconds.
#[derive(Default)]
pub struct NoDelay {
    pub waits: Vec<u32>,
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waits.push(ns / 1000);
    }

    fn delay_us(&mut self, us: u32) {
        self.waits.push(us);
    }
}

/// Diagnostic stream captured as text.
#[derive(Default)]
pub struct Log(pub String);

impl ufmt::uWrite for Log {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        self.0.push_str(s);
        Ok(())
    }
}
