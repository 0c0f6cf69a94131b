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
//! Nixie clock firmware for an Arduino Nano (ATmega328P at 16 MHz).
//!
//! Holding Sel while powering up puts every setting back to its default.

#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
mod board;
#[cfg(all(target_arch = "avr", feature = "panic-serial"))]
mod panic;
#[cfg(target_arch = "avr")]
mod timer;

#[cfg(all(target_arch = "avr", not(feature = "panic-serial")))]
use panic_halt as _;

#[cfg(target_arch = "avr")]
#[arduino_hal::entry]
fn main() -> ! {
    use nixieclock::clock::Clock;
    use nixieclock::display::Sn74141;
    use ufmt::uwriteln;

    use board::{BoardRtc, Buttons, Eeprom, Signals, BAUD, HARDWARE};

    let dp = arduino_hal::Peripherals::take().unwrap();
    let pins = arduino_hal::pins!(dp);
    let mut serial = arduino_hal::default_serial!(dp, pins, BAUD);

    timer::init_tc0(&dp.TC0);
    // SAFETY: the millis ISR is the only interrupt and is installed above.
    unsafe { avr_device::interrupt::enable() };

    let mut driver = Sn74141::new(
        [
            pins.d2.into_output().downgrade(),
            pins.d3.into_output().downgrade(),
            pins.d4.into_output().downgrade(),
            pins.d5.into_output().downgrade(),
        ],
        [
            pins.d6.into_output().downgrade(),
            pins.d7.into_output().downgrade(),
            pins.d8.into_output().downgrade(),
            pins.a2.into_output().downgrade(),
        ],
        [
            pins.d11.into_output().downgrade(),
            pins.d12.into_output().downgrade(),
            pins.d13.into_output().downgrade(),
        ],
    );

    let mut buttons = Buttons {
        adc: arduino_hal::Adc::new(dp.ADC, Default::default()),
        up: pins.a0.into_pull_up_input().downgrade(),
        down: pins.a1.into_pull_up_input().downgrade(),
    };
    let hard = buttons.sel();

    pins.d9.into_output();
    let signals = Signals {
        tone: timer::Tone::new(dp.TC1),
        switch: pins.a3.into_output().downgrade(),
        indicator: pins.d10.into_output().downgrade(),
    };

    let i2c = arduino_hal::I2c::new(
        dp.TWI,
        pins.a4.into_pull_up_input(),
        pins.a5.into_pull_up_input(),
        50000,
    );
    let rtc = BoardRtc::probe(i2c);
    uwriteln!(&mut serial, "rtc: {}\r", rtc.name()).ok();

    let store = Eeprom(arduino_hal::Eeprom::new(dp.EEPROM));
    let mut clock = Clock::new(&HARDWARE, rtc, store, signals, serial, hard, timer::millis());
    let mut delay = arduino_hal::Delay::new();

    loop {
        if clock.poll(timer::millis(), &mut buttons, &mut driver, &mut delay).is_err() {
            uwriteln!(clock.log(), "display fault\r").ok();
        }
    }
}

// The firmware only runs on the AVR; everything testable is in the library.
#[cfg(not(target_arch = "avr"))]
fn main() {}
