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
//! Hardware timers: the millisecond counter on TC0 and the piezo tone on
//! TC1.
//!
//! The counter is the Arduino `millis()`, after
//! https://blog.rahix.de/005-avr-hal-millis/.  It is 32 bits wide so the
//! drift check, the countdown and the input timing all see the same
//! wrapping clock, rolling over after about 49 days.

use avr_device::interrupt::Mutex;
use core::cell;

// Possible Values:
//
// ╔═══════════╦══════════════╦═══════════════════╗
// ║ PRESCALER ║ TIMER_COUNTS ║ Overflow Interval ║
// ╠═══════════╬══════════════╬═══════════════════╣
// ║        64 ║          250 ║              1 ms ║
// ║       256 ║          125 ║              2 ms ║
// ║       256 ║          250 ║              4 ms ║
// ║      1024 ║          125 ║              8 ms ║
// ║      1024 ║          250 ║             16 ms ║
// ╚═══════════╩══════════════╩═══════════════════╝
const PRESCALER: u32 = 64;
const TIMER_COUNTS: u32 = 250;

const MILLIS_INCREMENT: u32 = PRESCALER * TIMER_COUNTS / 16000;

static MILLIS_COUNTER: Mutex<cell::Cell<u32>> = Mutex::new(cell::Cell::new(0));

/// Timer/Counter 0 Compare Match A interrupt service routine.
#[avr_device::interrupt(atmega328p)]
fn TIMER0_COMPA() {
    avr_device::interrupt::free(|cs| {
        let counter_cell = MILLIS_COUNTER.borrow(cs);
        let counter = counter_cell.get();
        counter_cell.set(counter.wrapping_add(MILLIS_INCREMENT));
    })
}

/// Milliseconds counted since `init_tc0()` was called.
pub fn millis() -> u32 {
    avr_device::interrupt::free(|cs| MILLIS_COUNTER.borrow(cs).get())
}

/// Run TC0 in CTC mode, interrupting every `MILLIS_INCREMENT` ms.
pub fn init_tc0(tc0: &arduino_hal::pac::TC0) {
    tc0.tccr0a.write(|w| w.wgm0().ctc());
    tc0.ocr0a.write(|w| w.bits(TIMER_COUNTS as u8));
    tc0.tccr0b.write(|w| match PRESCALER {
        8 => w.cs0().prescale_8(),
        64 => w.cs0().prescale_64(),
        256 => w.cs0().prescale_256(),
        _ => w.cs0().prescale_1024(),
    });
    tc0.timsk0.write(|w| w.ocie0a().set_bit());

    avr_device::interrupt::free(|cs| {
        MILLIS_COUNTER.borrow(cs).set(0);
    });
}

/// Square wave on OC1A (D9) for the piezo.
///
/// TC1 toggles the pin on each compare match in CTC mode, so the output
/// frequency is F_CPU / (2 * 8 * (1 + OCR1A)).
pub struct Tone {
    tc1: arduino_hal::pac::TC1,
}

impl Tone {
    /// The D9 pin must already be an output.
    pub fn new(tc1: arduino_hal::pac::TC1) -> Self {
        tc1.tccr1a.reset();
        tc1.tccr1b.reset();
        Tone { tc1 }
    }

    pub fn play(&mut self, hz: u16) {
        let hz = hz.max(31) as u32;
        let top = (1_000_000 / hz - 1) as u16;
        self.tc1.tcnt1.write(|w| w.bits(0));
        self.tc1.ocr1a.write(|w| w.bits(top));
        self.tc1.tccr1a.write(|w| w.com1a().match_toggle());
        // WGM13:12 = 01, CTC with OCR1A as top.
        self.tc1
            .tccr1b
            .write(|w| unsafe { w.wgm1().bits(0b01) }.cs1().prescale_8());
    }

    pub fn stop(&mut self) {
        self.tc1.tccr1b.write(|w| w.cs1().no_clock());
        self.tc1.tccr1a.write(|w| w.com1a().disconnected());
    }
}
