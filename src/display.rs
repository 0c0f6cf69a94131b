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
//! Nixie display buffer, animations and multiplexing.
//!
//! Digits are wired in pairs: anode channel `c` lights position `c` through
//! the first decoder and position `c + channels` through the second.  Each
//! channel is lit in turn for `FRAME_US`.  When a digit changes, the frame
//! is shared between the old code and the new one, the new one's share
//! growing until it has the whole frame.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::hardware::{DRIVERS, MAX_DIGITS};

/// Code the decoders show as no digit at all.
pub const BLANK: u8 = 15;

/// How long each anode channel is lit per pass.
pub const FRAME_US: u32 = 2500;

/// Dark part of each frame when dimmed.
pub const DIM_DARK_US: u32 = 2000;

/// Frames in one cleaning run: every digit, ten times over.
const CLEAN_FRAMES: u8 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dim {
    Full,
    Dim,
    Off,
}

/// What `effects` finished this pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    None,
    ScrolledOut,
    Cleaned,
}

/// Cathode decoders and anode switches.
pub trait DigitDriver {
    type Error;

    /// Light anode `channel` with one code per decoder.
    fn light(&mut self, channel: usize, codes: [u8; DRIVERS]) -> Result<(), Self::Error>;

    /// All anodes off.
    fn dark(&mut self) -> Result<(), Self::Error>;
}

/// Two SN74141 BCD decoders sharing up to three anode channels.
pub struct Sn74141<P> {
    bcd: [[P; 4]; DRIVERS],
    anodes: [P; 3],
}

impl<P: OutputPin> Sn74141<P> {
    /// BCD pins are least significant bit first.
    pub fn new(a: [P; 4], b: [P; 4], anodes: [P; 3]) -> Self {
        Sn74141 { bcd: [a, b], anodes }
    }

    pub fn release(self) -> ([[P; 4]; DRIVERS], [P; 3]) {
        (self.bcd, self.anodes)
    }
}

impl<P: OutputPin> DigitDriver for Sn74141<P> {
    type Error = P::Error;

    fn light(&mut self, channel: usize, codes: [u8; DRIVERS]) -> Result<(), P::Error> {
        self.dark()?;
        for (pins, code) in self.bcd.iter_mut().zip(codes) {
            for (bit, pin) in pins.iter_mut().enumerate() {
                pin.set_state(((code >> bit) & 1 == 1).into())?;
            }
        }
        match self.anodes.get_mut(channel) {
            Some(anode) => anode.set_high(),
            None => Ok(()),
        }
    }

    fn dark(&mut self) -> Result<(), P::Error> {
        for anode in self.anodes.iter_mut() {
            anode.set_low()?;
        }
        Ok(())
    }
}

pub struct Display {
    size: usize,
    next: [u8; MAX_DIGITS],
    last: [u8; MAX_DIGITS],
    staging: [u8; MAX_DIGITS],
    /// 0 idle, >0 frames left scrolling in, <0 frames left scrolling out,
    /// `i8::MIN` scrolled in and waiting to scroll out.
    scroll: i8,
    scroll_at: u32,
    cleaning: u8,
    clean_at: u32,
    fade_start: Option<u32>,
}

impl Display {
    pub const fn new(size: usize) -> Self {
        Display {
            size: if size > MAX_DIGITS { MAX_DIGITS } else { size },
            next: [BLANK; MAX_DIGITS],
            last: [BLANK; MAX_DIGITS],
            staging: [BLANK; MAX_DIGITS],
            scroll: 0,
            scroll_at: 0,
            cleaning: 0,
            clean_at: 0,
            fade_start: None,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Codes the display is heading for.
    pub fn digits(&self) -> &[u8] {
        &self.next[..self.size]
    }

    fn put(&mut self, pos: usize, code: u8, fade: bool) {
        if pos >= self.size {
            return;
        }
        if fade && self.next[pos] != code {
            self.fade_start = None;
        }
        self.next[pos] = code;
        if !fade {
            self.last[pos] = code;
        }
    }

    /// Show `n` across positions `start..=end`, most significant digit
    /// first.  Digits that don't fit are dropped.  Without leading zeros
    /// the unused high positions are blank.
    pub fn edit(&mut self, n: u32, start: usize, end: usize, leading_zeros: bool, fade: bool) {
        let mut n = n;
        for pos in (start..=end).rev() {
            let code = if n == 0 && pos != end && !leading_zeros {
                BLANK
            } else {
                (n % 10) as u8
            };
            n /= 10;
            self.put(pos, code, fade);
        }
    }

    pub fn blank(&mut self, start: usize, end: usize, fade: bool) {
        for pos in start..=end {
            self.put(pos, BLANK, fade);
        }
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll != 0 && self.scroll != i8::MIN
    }

    /// Scrolled in and waiting for the next change to scroll out.
    pub fn is_armed(&self) -> bool {
        self.scroll == i8::MIN
    }

    pub fn disarm(&mut self) {
        if self.is_armed() {
            self.scroll = 0;
        }
    }

    pub fn is_cleaning(&self) -> bool {
        self.cleaning > 0
    }

    /// Bring the current contents in from the right.
    pub fn scroll_in(&mut self, now: u32) {
        self.staging = self.next;
        self.blank(0, MAX_DIGITS - 1, false);
        self.scroll = self.size as i8 + 1;
        self.scroll_at = now;
    }

    /// Move the current contents off to the left.
    pub fn scroll_out(&mut self, now: u32) {
        self.staging = self.next;
        self.scroll = -(self.size as i8);
        self.scroll_at = now;
    }

    /// Cycle every digit through every tube, to keep unused cathodes from
    /// being poisoned.
    pub fn clean(&mut self, now: u32) {
        self.scroll = 0;
        self.cleaning = CLEAN_FRAMES;
        self.clean_at = now;
        self.clean_frame();
    }

    fn clean_frame(&mut self) {
        let digit = (CLEAN_FRAMES - self.cleaning) % 10;
        for pos in 0..self.size {
            self.put(pos, digit, false);
        }
    }

    /// Draw the frame for the current `scroll` count.  An exit at 0 has
    /// shifted everything off.
    fn scroll_frame(&mut self, entering: bool) {
        let size = self.size;
        if entering {
            let r = self.scroll as usize;
            for i in 0..size {
                let code = if i >= r { self.staging[i - r] } else { BLANK };
                self.put(i, code, false);
            }
        } else {
            let k = (size as i8 + self.scroll) as usize;
            for i in 0..size {
                let code = if i + k < size { self.staging[i + k] } else { BLANK };
                self.put(i, code, false);
            }
        }
    }

    /// Advance scrolling and cleaning.  Call every pass.
    pub fn effects(&mut self, now: u32, scroll_ms: u16, clean_ms: u16) -> Effect {
        if self.cleaning > 0 {
            if now.wrapping_sub(self.clean_at) < clean_ms as u32 {
                return Effect::None;
            }
            self.clean_at = now;
            self.cleaning -= 1;
            if self.cleaning == 0 {
                return Effect::Cleaned;
            }
            self.clean_frame();
            return Effect::None;
        }
        if !self.is_scrolling() || now.wrapping_sub(self.scroll_at) < scroll_ms as u32 {
            return Effect::None;
        }
        self.scroll_at = now;
        if self.scroll > 0 {
            self.scroll -= 1;
            self.scroll_frame(true);
            if self.scroll == 0 {
                self.scroll = i8::MIN;
            }
            Effect::None
        } else {
            self.scroll += 1;
            self.scroll_frame(false);
            if self.scroll == 0 {
                Effect::ScrolledOut
            } else {
                Effect::None
            }
        }
    }

    /// Share of `FRAME_US` given to the incoming codes.
    fn incoming_us(&mut self, now: u32, fade_ms: u16) -> u32 {
        if self.last == self.next || fade_ms == 0 {
            return FRAME_US;
        }
        let start = *self.fade_start.get_or_insert(now);
        let elapsed = now.wrapping_sub(start);
        if elapsed >= fade_ms as u32 {
            FRAME_US
        } else {
            FRAME_US * elapsed / fade_ms as u32
        }
    }

    /// Light every channel once.  Blocks for about `channels * FRAME_US`.
    pub fn cycle<D: DigitDriver, T: DelayNs>(
        &mut self,
        driver: &mut D,
        delay: &mut T,
        now: u32,
        dim: Dim,
        fade_ms: u16,
    ) -> Result<(), D::Error> {
        let channels = self.size / DRIVERS;
        let pair = |buf: &[u8; MAX_DIGITS], c: usize| [buf[c], buf[c + channels]];
        match dim {
            Dim::Off => {
                self.last = self.next;
                self.fade_start = None;
                driver.dark()
            }
            Dim::Dim => {
                self.last = self.next;
                self.fade_start = None;
                for c in 0..channels {
                    driver.light(c, pair(&self.next, c))?;
                    delay.delay_us(FRAME_US - DIM_DARK_US);
                    driver.dark()?;
                    delay.delay_us(DIM_DARK_US);
                }
                Ok(())
            }
            Dim::Full => {
                let incoming = self.incoming_us(now, fade_ms);
                if incoming >= FRAME_US {
                    self.last = self.next;
                    self.fade_start = None;
                }
                for c in 0..channels {
                    if incoming < FRAME_US {
                        driver.light(c, pair(&self.last, c))?;
                        delay.delay_us(FRAME_US - incoming);
                    }
                    if incoming > 0 {
                        driver.light(c, pair(&self.next, c))?;
                        delay.delay_us(incoming);
                    }
                }
                driver.dark()
            }
        }
    }
}
