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
//! The Arduino Nano build of the Universal Nixie Driver Board.
//!
//! | pin     | use                          |
//! |---------|------------------------------|
//! | D0, D1  | serial diagnostics           |
//! | D2-D5   | first decoder, BCD A-D       |
//! | D6-D8   | second decoder, BCD A-C      |
//! | A2      | second decoder, BCD D        |
//! | D9      | piezo (OC1A)                 |
//! | D10     | indicator                    |
//! | D11-D13 | anode channels               |
//! | A0, A1  | Up, Down                     |
//! | A3      | switched output              |
//! | A4, A5  | I2C to the DS3231            |
//! | A6, A7  | Sel, Alt (analog only)       |
//!
//! All buttons pull to ground.

use arduino_hal::adc::channel;
use arduino_hal::port::mode::{Input, Output, PullUp};
use arduino_hal::port::Pin;

use nixieclock::calendar::DateTime;
use nixieclock::ds3231::Ds3231;
use nixieclock::hardware::Hardware;
use nixieclock::input::{Control, Controls};
use nixieclock::rtc::Rtc;
use nixieclock::settings::ConfigStore;
use nixieclock::signal::Outputs;
use nixieclock::time::SoftRtc;

use crate::timer::Tone;

pub const BAUD: u32 = 19200;

pub static HARDWARE: Hardware = Hardware::UNDB;

/// A6 and A7 read below this when their button is down.
const ANALOG_PRESSED: u16 = 512;

pub struct Eeprom(pub arduino_hal::Eeprom);

impl ConfigStore for Eeprom {
    fn read_byte(&self, addr: u16) -> u8 {
        self.0.read_byte(addr)
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        self.0.write_byte(addr, value);
    }
}

pub struct Buttons {
    pub adc: arduino_hal::Adc,
    pub up: Pin<Input<PullUp>>,
    pub down: Pin<Input<PullUp>>,
}

impl Buttons {
    pub fn sel(&mut self) -> bool {
        self.adc.read_blocking(&channel::ADC6) < ANALOG_PRESSED
    }
}

impl Controls for Buttons {
    fn pressed(&mut self, ctrl: Control) -> bool {
        match ctrl {
            Control::Sel => self.sel(),
            Control::Alt => self.adc.read_blocking(&channel::ADC7) < ANALOG_PRESSED,
            Control::Up => self.up.is_low(),
            Control::Down => self.down.is_low(),
        }
    }
}

pub struct Signals {
    pub tone: Tone,
    pub switch: Pin<Output>,
    pub indicator: Pin<Output>,
}

impl Outputs for Signals {
    fn tone(&mut self, hz: u16) {
        self.tone.play(hz);
    }

    fn no_tone(&mut self) {
        self.tone.stop();
    }

    fn set_switch(&mut self, on: bool) {
        if on {
            self.switch.set_high();
        } else {
            self.switch.set_low();
        }
    }

    // Not fitted on this board.
    fn set_pulse(&mut self, _on: bool) {}

    fn set_indicator(&mut self, on: bool) {
        if on {
            self.indicator.set_high();
        } else {
            self.indicator.set_low();
        }
    }
}

/// The DS3231 if it answers, otherwise time kept from the crystal.
pub enum BoardRtc {
    Chip(Ds3231<arduino_hal::I2c>),
    Soft(SoftRtc),
}

impl BoardRtc {
    pub fn probe(i2c: arduino_hal::I2c) -> Self {
        let mut chip = Ds3231::new(i2c);
        match chip.probe() {
            Ok(()) => BoardRtc::Chip(chip),
            Err(_) => BoardRtc::Soft(SoftRtc::new(0)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BoardRtc::Chip(_) => "ds3231",
            BoardRtc::Soft(_) => "soft",
        }
    }
}

impl Rtc for BoardRtc {
    type Error = ();

    fn tick(&mut self, millis: u32) {
        if let BoardRtc::Soft(rtc) = self {
            rtc.tick(millis);
        }
    }

    fn now(&mut self) -> Result<DateTime, ()> {
        match self {
            BoardRtc::Chip(rtc) => rtc.now().map_err(|_| ()),
            BoardRtc::Soft(rtc) => rtc.now().map_err(|_| ()),
        }
    }

    fn set_date(&mut self, year: u16, month: u8, day: u8) -> Result<(), ()> {
        match self {
            BoardRtc::Chip(rtc) => rtc.set_date(year, month, day).map_err(|_| ()),
            BoardRtc::Soft(rtc) => rtc.set_date(year, month, day).map_err(|_| ()),
        }
    }

    fn set_time(&mut self, hour: u8, minute: u8, second: u8) -> Result<(), ()> {
        match self {
            BoardRtc::Chip(rtc) => rtc.set_time(hour, minute, second).map_err(|_| ()),
            BoardRtc::Soft(rtc) => rtc.set_time(hour, minute, second).map_err(|_| ()),
        }
    }

    fn temperature(&mut self) -> Option<i16> {
        match self {
            BoardRtc::Chip(rtc) => rtc.temperature(),
            BoardRtc::Soft(_) => None,
        }
    }
}
