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
//! Debounced control events.
//!
//! Only one control is in use at a time: while one is held the others are
//! ignored.  A press is reported as soon as it is first seen, then once for
//! each hold tier reached, then on release.

use crate::hardware::Timing;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Sel,
    Alt,
    Up,
    Down,
}

const CONTROLS: [Control; 4] = [Control::Sel, Control::Alt, Control::Up, Control::Down];

/// How long a control was held.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hold {
    None,
    Short,
    Long,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Press,
    ShortHold,
    LongHold,
    Release(Hold),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Action {
    pub ctrl: Control,
    pub event: Event,
    /// Adjust in big steps: the encoder is turning fast or an adjust
    /// button has been held a long time.
    pub velocity: bool,
}

impl Action {
    pub const fn new(ctrl: Control, event: Event) -> Self {
        Action {
            ctrl,
            event,
            velocity: false,
        }
    }
}

/// The physical buttons and encoder.
pub trait Controls {
    fn pressed(&mut self, ctrl: Control) -> bool;

    /// Encoder detents since the last call, positive for Up.  Not called
    /// while a button is held, so the count must be kept until it is.
    fn rotation(&mut self) -> i8 {
        0
    }
}

pub struct Input {
    held: Option<Control>,
    press_at: u32,
    seen_at: u32,
    hold: Hold,
    /// The rest of the current press is ignored.
    stopped: bool,
    repeat_at: u32,
    /// Direction and time of the last encoder detent.
    last_detent: Option<(Control, u32)>,
    last_input: u32,
}

impl Input {
    pub const fn new() -> Self {
        Input {
            held: None,
            press_at: 0,
            seen_at: 0,
            hold: Hold::None,
            stopped: false,
            repeat_at: 0,
            last_detent: None,
            last_input: 0,
        }
    }

    /// When a control was last touched.
    pub fn last_input(&self) -> u32 {
        self.last_input
    }

    pub fn held(&self) -> Option<Control> {
        self.held
    }

    /// Swallow the rest of the current press: no more hold or release
    /// events until the control is let go.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn poll<C: Controls>(&mut self, controls: &mut C, now: u32, t: &Timing) -> Option<Action> {
        // Detents turned while a button is held wait in the count.
        let turn = if self.held.is_none() { controls.rotation() } else { 0 };
        if turn != 0 {
            let ctrl = if turn > 0 { Control::Up } else { Control::Down };
            let velocity = self
                .last_detent
                .is_some_and(|(c, at)| c == ctrl && now.wrapping_sub(at) < t.velocity_ms as u32);
            self.last_detent = Some((ctrl, now));
            self.last_input = now;
            return Some(Action {
                ctrl,
                event: Event::Press,
                velocity,
            });
        }

        let Some(ctrl) = self.held else {
            let ctrl = CONTROLS.into_iter().find(|c| controls.pressed(*c))?;
            self.held = Some(ctrl);
            self.press_at = now;
            self.seen_at = now;
            self.repeat_at = now;
            self.hold = Hold::None;
            self.stopped = false;
            self.last_input = now;
            return Some(Action::new(ctrl, Event::Press));
        };

        if !controls.pressed(ctrl) {
            if now.wrapping_sub(self.seen_at) < t.debounce_ms as u32 {
                return None;
            }
            self.held = None;
            self.last_input = now;
            return self.emit(ctrl, Event::Release(self.hold));
        }

        self.seen_at = now;
        self.last_input = now;
        let held_ms = now.wrapping_sub(self.press_at);
        match self.hold {
            Hold::None if held_ms >= t.hold_short_ms as u32 => {
                self.hold = Hold::Short;
                self.emit(ctrl, Event::ShortHold)
            }
            Hold::Short if held_ms >= t.hold_long_ms as u32 => {
                self.hold = Hold::Long;
                self.emit(ctrl, Event::LongHold)
            }
            _ => None,
        }
    }

    /// Auto-repeat for a held Up or Down, once it is past the short hold.
    pub fn repeat(&mut self, now: u32, t: &Timing) -> Option<Action> {
        let ctrl = self.held?;
        if self.stopped
            || self.hold == Hold::None
            || !matches!(ctrl, Control::Up | Control::Down)
            || now.wrapping_sub(self.repeat_at) < t.repeat_ms as u32
        {
            return None;
        }
        self.repeat_at = now;
        Some(Action {
            ctrl,
            event: Event::Press,
            velocity: self.hold == Hold::Long,
        })
    }

    fn emit(&self, ctrl: Control, event: Event) -> Option<Action> {
        (!self.stopped).then_some(Action::new(ctrl, event))
    }
}

impl Default for Input {
    fn default() -> Self {
        Input::new()
    }
}
