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
//! Signal outputs: piezo, switched appliance and pulsed bell.
//!
//! Only one signal sounds at a time.  Starting a signal always stops the
//! previous one first, returning every output to rest.

use ufmt::{uWrite, uwriteln};

/// Physical outputs driven by signals.
pub trait Outputs {
    fn tone(&mut self, hz: u16);
    fn no_tone(&mut self);
    fn set_switch(&mut self, on: bool);
    fn set_pulse(&mut self, on: bool);
    fn set_indicator(&mut self, on: bool);
}

/// Outputs paired with the diagnostic stream, which reports every switch
/// and pulse toggle.
pub struct Logged<O, W> {
    pub out: O,
    pub log: W,
}

impl<O: Outputs, W: uWrite> Outputs for Logged<O, W> {
    fn tone(&mut self, hz: u16) {
        self.out.tone(hz);
    }

    fn no_tone(&mut self) {
        self.out.no_tone();
    }

    fn set_switch(&mut self, on: bool) {
        uwriteln!(&mut self.log, "switch {}", if on { "on" } else { "off" }).ok();
        self.out.set_switch(on);
    }

    fn set_pulse(&mut self, on: bool) {
        uwriteln!(&mut self.log, "pulse {}", if on { "on" } else { "off" }).ok();
        self.out.set_pulse(on);
    }

    fn set_indicator(&mut self, on: bool) {
        self.out.set_indicator(on);
    }
}

/// Which output a signal uses.  Values match the signal options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Piezo = 0,
    Switch = 1,
    Pulse = 2,
}

impl From<u16> for Route {
    fn from(v: u16) -> Self {
        match v {
            1 => Route::Switch,
            2 => Route::Pulse,
            _ => Route::Piezo,
        }
    }
}

/// What raised a signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    Alarm,
    Timer,
    Strike,
    /// A beep played while choosing a pitch or pattern.
    Preview,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pattern {
    Long,
    Short,
    Double,
    Triple,
    Quad,
    Cuckoo,
    Pip,
    LongPip,
    /// `n` short beeps, e.g. the hour.
    Count(u8),
    Bell,
    HalfBell,
}

impl From<u16> for Pattern {
    fn from(v: u16) -> Self {
        match v {
            1 => Pattern::Short,
            2 => Pattern::Double,
            3 => Pattern::Triple,
            4 => Pattern::Quad,
            5 => Pattern::Cuckoo,
            _ => Pattern::Long,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tone {
    Off,
    High,
    /// A major third below.
    Low,
}

#[derive(Clone, Copy)]
struct Step(Tone, u16);

const LONG: &[Step] = &[Step(Tone::High, 500)];
const SHORT: &[Step] = &[Step(Tone::High, 120)];
const DOUBLE: &[Step] = &[Step(Tone::High, 120), Step(Tone::Off, 120), Step(Tone::High, 120)];
const TRIPLE: &[Step] = &[
    Step(Tone::High, 120),
    Step(Tone::Off, 120),
    Step(Tone::High, 120),
    Step(Tone::Off, 120),
    Step(Tone::High, 120),
];
const QUAD: &[Step] = &[
    Step(Tone::High, 100),
    Step(Tone::Off, 80),
    Step(Tone::High, 100),
    Step(Tone::Off, 80),
    Step(Tone::High, 100),
    Step(Tone::Off, 80),
    Step(Tone::High, 100),
];
const CUCKOO: &[Step] = &[Step(Tone::High, 200), Step(Tone::Off, 50), Step(Tone::Low, 350)];
const PIP: &[Step] = &[Step(Tone::High, 100)];
const COUNT: &[Step] = &[Step(Tone::High, 150), Step(Tone::Off, 250)];
const BELL: &[Step] = &[Step(Tone::High, 400), Step(Tone::Off, 100), Step(Tone::Low, 700)];
const HALF_BELL: &[Step] = &[Step(Tone::Low, 700)];

impl Pattern {
    fn steps(self) -> &'static [Step] {
        match self {
            Pattern::Long | Pattern::LongPip => LONG,
            Pattern::Short => SHORT,
            Pattern::Double => DOUBLE,
            Pattern::Triple => TRIPLE,
            Pattern::Quad => QUAD,
            Pattern::Cuckoo => CUCKOO,
            Pattern::Pip => PIP,
            Pattern::Count(_) => COUNT,
            Pattern::Bell => BELL,
            Pattern::HalfBell => HALF_BELL,
        }
    }

    fn repeats(self) -> u8 {
        match self {
            Pattern::Count(n) => n.max(1),
            _ => 1,
        }
    }
}

/// How a signal sounds, looked up from the options of its source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Voice {
    pub route: Route,
    pub hz: u16,
    pub pattern: Pattern,
}

const A4_OCTAVE: [u16; 12] = [440, 466, 494, 523, 554, 587, 622, 659, 698, 740, 784, 831];

/// Frequency of a piano key number, 49 (A4) to 88 (C8).
pub fn note_hz(note: u16) -> u16 {
    let n = note.clamp(49, 88) - 49;
    A4_OCTAVE[(n % 12) as usize] << (n / 12)
}

/// Has `now` reached `deadline`, allowing for the counter wrapping?
pub(crate) fn reached(now: u32, deadline: u32) -> bool {
    now.wrapping_sub(deadline) < u32::MAX / 2
}

/// Plays a pattern without blocking.
struct Player {
    steps: &'static [Step],
    idx: usize,
    repeats: u8,
    next_at: u32,
    /// Overrides the length of sounding steps, for the pulse output.
    on_ms: Option<u16>,
}

impl Player {
    const IDLE: Player = Player {
        steps: &[],
        idx: 0,
        repeats: 0,
        next_at: 0,
        on_ms: None,
    };

    fn start(&mut self, pattern: Pattern, on_ms: Option<u16>, now: u32) {
        self.steps = pattern.steps();
        self.idx = 0;
        self.repeats = pattern.repeats();
        self.next_at = now;
        self.on_ms = on_ms;
    }

    fn is_playing(&self) -> bool {
        self.repeats > 0
    }

    fn stop(&mut self) {
        *self = Player::IDLE;
    }

    /// The tone to switch to, if a step boundary has been reached.
    fn service(&mut self, now: u32) -> Option<Tone> {
        if !self.is_playing() || !reached(now, self.next_at) {
            return None;
        }
        if self.idx >= self.steps.len() {
            self.repeats -= 1;
            self.idx = 0;
            if self.repeats == 0 {
                return Some(Tone::Off);
            }
        }
        let Step(tone, ms) = self.steps[self.idx];
        let ms = match (tone, self.on_ms) {
            (Tone::Off, _) | (_, None) => ms,
            (_, Some(on)) => on,
        };
        self.idx += 1;
        self.next_at = now.wrapping_add(ms as u32);
        Some(tone)
    }
}

pub struct Signal {
    source: Option<Source>,
    voice: Voice,
    /// Seconds left of a sustained signal.
    remain: u16,
    snooze_remain: u16,
    /// Deadline of a single pulse on the pulse output.
    pulse_until: Option<u32>,
    player: Player,
    /// Switch output held on by a signal.
    latched: bool,
    /// Switch output held on by the soft power switch or a sleep timer.
    power: bool,
    pulse_ms: u16,
}

impl Signal {
    pub const fn new(pulse_ms: u16) -> Self {
        Signal {
            source: None,
            voice: Voice {
                route: Route::Piezo,
                hz: 440,
                pattern: Pattern::Long,
            },
            remain: 0,
            snooze_remain: 0,
            pulse_until: None,
            player: Player::IDLE,
            latched: false,
            power: false,
            pulse_ms,
        }
    }

    /// Source of the sustained signal that is sounding, if any.
    pub fn source(&self) -> Option<Source> {
        self.source
    }

    pub fn is_sounding(&self) -> bool {
        self.source.is_some()
    }

    pub fn remain(&self) -> u16 {
        self.remain
    }

    pub fn is_snoozing(&self) -> bool {
        self.snooze_remain > 0
    }

    pub fn switch_on(&self) -> bool {
        self.latched || self.power
    }

    /// Start a signal, stopping any that's already going.
    ///
    /// `secs == 0` gives a single beep or pulse and leaves nothing
    /// sounding.  Otherwise the switch route is held on for `secs`, and
    /// the piezo and pulse routes beep now and once per second.
    pub fn start<O: Outputs>(&mut self, out: &mut O, source: Source, voice: Voice, secs: u16, now: u32) {
        self.stop(out);
        self.voice = voice;
        if secs == 0 {
            self.beep(out, now);
            return;
        }
        self.source = Some(source);
        self.remain = secs;
        match voice.route {
            Route::Switch => {
                if !self.switch_on() {
                    out.set_switch(true);
                }
                self.latched = true;
            }
            Route::Piezo | Route::Pulse => self.beep(out, now),
        }
    }

    /// Return every output to rest and forget the signal.  A snooze in
    /// progress is kept.
    pub fn stop<O: Outputs>(&mut self, out: &mut O) {
        if self.player.is_playing() {
            self.player.stop();
            match self.voice.route {
                Route::Piezo => out.no_tone(),
                Route::Pulse => {
                    self.pulse_until = None;
                    out.set_pulse(false);
                }
                Route::Switch => {}
            }
        }
        if self.pulse_until.take().is_some() {
            out.set_pulse(false);
        }
        if self.latched {
            self.latched = false;
            if !self.power {
                out.set_switch(false);
            }
        }
        self.source = None;
        self.remain = 0;
    }

    /// Silence an alarm and come back in `secs`.
    pub fn snooze<O: Outputs>(&mut self, out: &mut O, secs: u16) {
        self.stop(out);
        self.snooze_remain = secs;
    }

    pub fn cancel_snooze(&mut self) {
        self.snooze_remain = 0;
    }

    /// One beep in the current voice.
    fn beep<O: Outputs>(&mut self, out: &mut O, now: u32) {
        let pattern = self.voice.pattern;
        match self.voice.route {
            Route::Piezo => {
                self.player.start(pattern, None, now);
                self.service(out, now);
            }
            Route::Pulse if pattern.steps().len() == 1 && pattern.repeats() == 1 => {
                self.pulse(out, now, self.pulse_ms);
            }
            Route::Pulse => {
                self.player.start(pattern, Some(self.pulse_ms), now);
                self.service(out, now);
            }
            // A switched appliance can't beep.
            Route::Switch => {}
        }
    }

    /// Single pulse on the pulse output, ended by `expire`.
    fn pulse<O: Outputs>(&mut self, out: &mut O, now: u32, ms: u16) {
        if self.pulse_until.is_none() {
            out.set_pulse(true);
        }
        self.pulse_until = Some(now.wrapping_add(ms as u32));
    }

    /// End a single pulse whose deadline has passed.
    pub fn expire<O: Outputs>(&mut self, out: &mut O, now: u32) {
        if let Some(t) = self.pulse_until {
            if reached(now, t) {
                self.pulse_until = None;
                out.set_pulse(false);
            }
        }
    }

    /// Advance pattern playback and pulse deadlines.  Call every loop pass.
    pub fn service<O: Outputs>(&mut self, out: &mut O, now: u32) {
        self.expire(out, now);
        let Some(tone) = self.player.service(now) else {
            return;
        };
        match self.voice.route {
            Route::Piezo => match tone {
                Tone::Off => out.no_tone(),
                Tone::High => out.tone(self.voice.hz),
                Tone::Low => out.tone((self.voice.hz as u32 * 4 / 5) as u16),
            },
            Route::Pulse => out.set_pulse(tone != Tone::Off),
            Route::Switch => {}
        }
    }

    /// Count down a second of the sustained signal, beeping again if it is
    /// still going.  Returns true when the signal ran out.
    pub fn tick_second<O: Outputs>(&mut self, out: &mut O, now: u32) -> bool {
        if self.source.is_none() {
            return false;
        }
        self.remain = self.remain.saturating_sub(1);
        if self.remain == 0 {
            self.stop(out);
            return true;
        }
        if self.voice.route != Route::Switch {
            self.beep(out, now);
        }
        false
    }

    /// Count down a second of snooze.  Returns true when it runs out.
    pub fn tick_snooze(&mut self) -> bool {
        if self.snooze_remain == 0 {
            return false;
        }
        self.snooze_remain -= 1;
        self.snooze_remain == 0
    }

    /// The soft power switch, also used by the sleep timer.
    pub fn set_power<O: Outputs>(&mut self, out: &mut O, on: bool) {
        if on != self.power && !self.latched {
            out.set_switch(on);
        }
        self.power = on;
    }

    pub fn toggle_power<O: Outputs>(&mut self, out: &mut O) {
        // Turning the switch off also ends a switched alarm.
        if self.switch_on() {
            if self.latched {
                self.stop(out);
            }
            self.set_power(out, false);
        } else {
            self.set_power(out, true);
        }
    }
}
