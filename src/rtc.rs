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
//! Time peripheral interface.

use crate::calendar::DateTime;

/// A source of wall-clock time with one second resolution.
///
/// Implemented by the DS3231 driver and by `SoftRtc` for boards with no
/// RTC chip fitted.
pub trait Rtc {
    type Error;

    /// Called once per loop pass with the current millisecond count.  Only
    /// clocks that keep time in software need it.
    fn tick(&mut self, _millis: u32) {}

    fn now(&mut self) -> Result<DateTime, Self::Error>;

    fn set_date(&mut self, year: u16, month: u8, day: u8) -> Result<(), Self::Error>;

    fn set_time(&mut self, hour: u8, minute: u8, second: u8) -> Result<(), Self::Error>;

    /// Set the hour, leaving minutes and seconds running.
    fn set_hour(&mut self, hour: u8) -> Result<(), Self::Error> {
        let t = self.now()?;
        self.set_time(hour, t.minute, t.second)
    }

    /// Temperature in hundredths of a degree Celsius, if the chip has a
    /// sensor.
    fn temperature(&mut self) -> Option<i16> {
        None
    }
}
