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
//! DS3231 RTC interface

use embedded_hal::i2c::I2c;

use crate::calendar::{day_of_week, DateTime, EPOCH_YEAR};
use crate::rtc::Rtc;

// 104 is the DS3231 RTC device address
pub const RTC_ADDRESS: u8 = 104;

const REG_SECONDS: u8 = 0x00;
const REG_DAY: u8 = 0x03;
const REG_TEMP_MSB: u8 = 0x11;

fn bcd_decode(v: u8) -> u8 {
    (v >> 4) * 10 + (v & 0b00001111)
}

fn bcd_encode(v: u8) -> u8 {
    ((v / 10) << 4) | (v % 10)
}

pub struct Ds3231<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Ds3231<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Ds3231 { i2c }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Check the chip answers.  Used at boot to decide between the chip and
    /// the software clock.
    pub fn probe(&mut self) -> Result<(), I2C::Error> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(RTC_ADDRESS, &[REG_SECONDS], &mut buf)
    }
}

impl<I2C: I2c> Rtc for Ds3231<I2C> {
    type Error = I2C::Error;

    fn now(&mut self) -> Result<DateTime, I2C::Error> {
        let mut buf = [0u8; 7];
        self.i2c.write_read(RTC_ADDRESS, &[REG_SECONDS], &mut buf)?;

        // The weekday register is whatever it was last set to, so ignore it.
        let year = EPOCH_YEAR + bcd_decode(buf[6]) as u16;
        let month = bcd_decode(buf[5] & 0b00011111); // drop the century bit
        let day = bcd_decode(buf[4] & 0b00111111);
        Ok(DateTime {
            year,
            month,
            day,
            weekday: day_of_week(year, month, day),
            hour: bcd_decode(buf[2] & 0b00111111), // assume 24 hour mode
            minute: bcd_decode(buf[1] & 0b01111111),
            second: bcd_decode(buf[0] & 0b01111111),
        })
    }

    fn set_date(&mut self, year: u16, month: u8, day: u8) -> Result<(), I2C::Error> {
        let yy = year.saturating_sub(EPOCH_YEAR).min(99) as u8;
        let buf = [
            REG_DAY,
            day_of_week(year, month, day) + 1,
            bcd_encode(day),
            bcd_encode(month),
            bcd_encode(yy),
        ];
        self.i2c.write(RTC_ADDRESS, &buf)
    }

    fn set_time(&mut self, hour: u8, minute: u8, second: u8) -> Result<(), I2C::Error> {
        let buf = [
            REG_SECONDS,
            bcd_encode(second),
            bcd_encode(minute),
            bcd_encode(hour),
        ];
        self.i2c.write(RTC_ADDRESS, &buf)
    }

    fn temperature(&mut self) -> Option<i16> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(RTC_ADDRESS, &[REG_TEMP_MSB], &mut buf)
            .ok()?;
        // Whole degrees in the MSB, quarter degrees in the top two LSB bits.
        Some(buf[0] as i8 as i16 * 100 + (buf[1] >> 6) as i16 * 25)
    }
}
