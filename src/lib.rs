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
//! Firmware for multi-function nixie tube clocks.
//!
//! Everything that doesn't touch the AVR directly lives here, so it can be
//! tested on the host.  The board binary supplies the pins, timers and
//! EEPROM through the traits in each module.

#![no_std]

pub mod calendar;
pub mod clock;
pub mod display;
pub mod drift;
pub mod ds3231;
pub mod dst;
pub mod hardware;
pub mod input;
pub mod rtc;
pub mod settings;
pub mod signal;
pub mod time;

#[cfg(test)]
mod testing;
