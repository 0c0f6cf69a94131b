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
//! EEPROM settings.
//!
//! Every persisted value lives at a fixed address with a fixed width and
//! valid range, so firmware upgrades never need the store wiped: fields
//! that are out of range at boot are put back to their defaults and the
//! rest are kept.
//!
//! Layout (byte addresses, words are little-endian):
//!
//! | addr | field                | width | range     | default |
//! |------|----------------------|-------|-----------|---------|
//! | 0    | alarm time (minutes) | word  | 0-1439    | 420     |
//! | 2    | alarm on             | byte  | 0-1       | 0       |
//! | 3    | day counter year     | word  | 2000-2099 | 2000    |
//! | 5    | day counter month    | byte  | 1-12      | 1       |
//! | 6    | day counter day      | byte  | 1-31      | 1       |
//! | 7    | DST applied          | byte  | 0-1       | 0       |
//! | 16.. | menu options         |       | see `Key::field` |  |

use crate::hardware::Hardware;
use crate::signal::Route;

/// Byte addressed non-volatile storage.
pub trait ConfigStore {
    fn read_byte(&self, addr: u16) -> u8;
    fn write_byte(&mut self, addr: u16, value: u8);

    fn read(&self, addr: u16, word: bool) -> u16 {
        let lo = self.read_byte(addr) as u16;
        if word {
            lo | (self.read_byte(addr + 1) as u16) << 8
        } else {
            lo
        }
    }

    /// Write a value, touching only the bytes that differ.
    ///
    /// EEPROM has a limited number of write cycles in its life.
    fn update(&mut self, addr: u16, value: u16, word: bool) {
        let lo = value as u8;
        if self.read_byte(addr) != lo {
            self.write_byte(addr, lo);
        }
        if word {
            let hi = (value >> 8) as u8;
            if self.read_byte(addr + 1) != hi {
                self.write_byte(addr + 1, hi);
            }
        }
    }
}

/// Location and valid range of one persisted field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub loc: u16,
    pub word: bool,
    pub min: u16,
    pub max: u16,
    pub default: u16,
}

const fn byte(loc: u16, min: u16, max: u16, default: u16) -> Field {
    Field { loc, word: false, min, max, default }
}

const fn word(loc: u16, min: u16, max: u16, default: u16) -> Field {
    Field { loc, word: true, min, max, default }
}

/// Every persisted field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    AlarmTime,
    AlarmOn,
    DayCountYear,
    DayCountMonth,
    DayCountDay,
    DstOn,

    /// 1 = 12 hour, 2 = 24 hour
    TimeFormat,
    /// 1 m/d/weekday, 2 d/m/weekday, 3 m/d/yy, 4 d/m/yy, 5 yy/m/d
    DateFormat,
    /// 0 never, 1 date instead of seconds, 2 date page at :30, 3 same, scrolled
    AutoDate,
    LeadingZero,
    /// Crossfade duration, tens of ms.  0 = no fade.
    DigitFade,
    /// 0 off, 1 single, 2 pips, 3 hour count, 4 bell
    Strike,
    StrikeSignal,
    StrikePitch,
    /// See `dst::Region`.
    AutoDst,
    /// 0 every day, 1 work days only, 2 days off only
    AlarmDays,
    /// Minutes, 0 = no snooze
    AlarmSnooze,
    AlarmSignal,
    AlarmPitch,
    AlarmPattern,
    /// 0 stop, 1 repeat
    TimerRunout,
    TimerSignal,
    TimerPitch,
    TimerPattern,
    /// 0 normal, 1 dim, 2 off
    NightMode,
    NightStart,
    NightEnd,
    /// 0 none, 1 off on days off, 2 off during work hours
    AwayMode,
    WorkWeekStart,
    WorkWeekEnd,
    WorkStart,
    WorkEnd,
    Clean,
    CleanTime,
    /// 0 off, 1 signal active, 2 switch on, 3 display lit
    Indicator,
    /// 0 Celsius, 1 Fahrenheit
    TempUnit,
}

/// Piano key numbers: 49 is A4 (440 Hz), 88 is C8.
const PITCH_MIN: u16 = 49;
const PITCH_MAX: u16 = 88;

impl Key {
    pub const fn field(self) -> Field {
        match self {
            Key::AlarmTime => word(0, 0, 1439, 420),
            Key::AlarmOn => byte(2, 0, 1, 0),
            Key::DayCountYear => word(3, 2000, 2099, 2000),
            Key::DayCountMonth => byte(5, 1, 12, 1),
            Key::DayCountDay => byte(6, 1, 31, 1),
            Key::DstOn => byte(7, 0, 1, 0),

            Key::TimeFormat => byte(16, 1, 2, 2),
            Key::DateFormat => byte(17, 1, 5, 1),
            Key::AutoDate => byte(18, 0, 3, 0),
            Key::LeadingZero => byte(19, 0, 1, 0),
            Key::DigitFade => byte(20, 0, 20, 5),
            Key::Strike => byte(21, 0, 4, 0),
            Key::StrikeSignal => byte(22, 0, 2, 0),
            Key::StrikePitch => byte(23, PITCH_MIN, PITCH_MAX, 76),
            Key::AutoDst => byte(24, 0, 5, 0),
            Key::AlarmDays => byte(25, 0, 2, 0),
            Key::AlarmSnooze => byte(26, 0, 60, 9),
            Key::AlarmSignal => byte(27, 0, 2, 0),
            Key::AlarmPitch => byte(28, PITCH_MIN, PITCH_MAX, 76),
            Key::AlarmPattern => byte(29, 0, 5, 2),
            Key::TimerRunout => byte(30, 0, 1, 0),
            Key::TimerSignal => byte(31, 0, 2, 0),
            Key::TimerPitch => byte(32, PITCH_MIN, PITCH_MAX, 76),
            Key::TimerPattern => byte(33, 0, 5, 3),
            Key::NightMode => byte(34, 0, 2, 0),
            Key::NightStart => word(35, 0, 1439, 1320),
            Key::NightEnd => word(37, 0, 1439, 420),
            Key::AwayMode => byte(39, 0, 2, 0),
            Key::WorkWeekStart => byte(40, 0, 6, 1),
            Key::WorkWeekEnd => byte(41, 0, 6, 5),
            Key::WorkStart => word(42, 0, 1439, 480),
            Key::WorkEnd => word(44, 0, 1439, 1020),
            Key::Clean => byte(46, 0, 1, 1),
            Key::CleanTime => word(47, 0, 1439, 180),
            Key::Indicator => byte(49, 0, 3, 1),
            Key::TempUnit => byte(50, 0, 1, 0),
        }
    }

    /// Option values that are minutes of the day, shown as a time.
    pub fn is_time(self) -> bool {
        matches!(
            self,
            Key::NightStart | Key::NightEnd | Key::WorkStart | Key::WorkEnd | Key::CleanTime
        )
    }

    /// Option values that play a preview beep while being edited.
    pub fn preview_source(self) -> Option<Key> {
        match self {
            Key::StrikePitch => Some(Key::StrikeSignal),
            Key::AlarmPitch | Key::AlarmPattern => Some(Key::AlarmSignal),
            Key::TimerPitch | Key::TimerPattern => Some(Key::TimerSignal),
            _ => None,
        }
    }
}

/// Fields that aren't in the menu.
const FIXED: [Key; 6] = [
    Key::AlarmTime,
    Key::AlarmOn,
    Key::DayCountYear,
    Key::DayCountMonth,
    Key::DayCountDay,
    Key::DstOn,
];

/// The settings menu, in order.  The option number shown on the display is
/// the index plus one, whether or not earlier options are hidden.
pub const OPTIONS: [Key; 30] = [
    Key::TimeFormat,
    Key::DateFormat,
    Key::AutoDate,
    Key::LeadingZero,
    Key::DigitFade,
    Key::Strike,
    Key::StrikeSignal,
    Key::StrikePitch,
    Key::AutoDst,
    Key::AlarmDays,
    Key::AlarmSnooze,
    Key::AlarmSignal,
    Key::AlarmPitch,
    Key::AlarmPattern,
    Key::TimerRunout,
    Key::TimerSignal,
    Key::TimerPitch,
    Key::TimerPattern,
    Key::NightMode,
    Key::NightStart,
    Key::NightEnd,
    Key::AwayMode,
    Key::WorkWeekStart,
    Key::WorkWeekEnd,
    Key::WorkStart,
    Key::WorkEnd,
    Key::Clean,
    Key::CleanTime,
    Key::Indicator,
    Key::TempUnit,
];

/// Is this option meaningful on the given hardware?
pub fn applies(key: Key, hw: &Hardware) -> bool {
    use crate::clock::Function;

    let alarm = hw.has_function(Function::Alarm);
    let timer = hw.has_function(Function::Timer);
    let choice = hw.routes().count() > 1;
    match key {
        Key::LeadingZero | Key::TimeFormat | Key::DigitFade | Key::AutoDst => true,
        Key::DateFormat | Key::AutoDate => hw.has_function(Function::Date),
        Key::Strike => hw.has_piezo || hw.has_pulse,
        // Strikes can't use the switch, so there is only a choice with both
        // piezo and pulse.
        Key::StrikeSignal => hw.has_piezo && hw.has_pulse,
        Key::StrikePitch => hw.has_piezo,
        Key::AlarmDays => alarm,
        Key::AlarmSnooze => alarm && hw.has_signal(),
        Key::AlarmSignal => alarm && choice,
        Key::AlarmPitch | Key::AlarmPattern => alarm && hw.has_piezo,
        Key::TimerRunout => timer && hw.has_signal(),
        Key::TimerSignal => timer && choice,
        Key::TimerPitch | Key::TimerPattern => timer && hw.has_piezo,
        Key::NightMode | Key::NightStart | Key::NightEnd => true,
        Key::AwayMode | Key::WorkWeekStart | Key::WorkWeekEnd => true,
        Key::WorkStart | Key::WorkEnd => true,
        Key::Clean | Key::CleanTime => true,
        Key::Indicator => hw.has_indicator,
        Key::TempUnit => hw.has_function(Function::Thermometer),
        Key::AlarmTime
        | Key::AlarmOn
        | Key::DayCountYear
        | Key::DayCountMonth
        | Key::DayCountDay
        | Key::DstOn => false,
    }
}

pub fn get<S: ConfigStore>(store: &S, key: Key) -> u16 {
    let f = key.field();
    store.read(f.loc, f.word)
}

pub fn set<S: ConfigStore>(store: &mut S, key: Key, value: u16) {
    let f = key.field();
    store.update(f.loc, value.clamp(f.min, f.max), f.word);
}

/// The output a signal selector option picks.
pub fn route<S: ConfigStore>(store: &S, key: Key) -> Route {
    Route::from(get(store, key))
}

/// Make the stored settings usable.
///
/// `hard` puts every field back to its default.  Otherwise only fields
/// outside their range are repaired.  Either way, options that contradict
/// the hardware (a signal routed to an output that isn't fitted) are then
/// forced to something that works.
///
/// Returns the number of fields changed.
pub fn init<S: ConfigStore>(store: &mut S, hw: &Hardware, hard: bool) -> u8 {
    let mut changed = 0;
    for &key in FIXED.iter().chain(OPTIONS.iter()) {
        let f = key.field();
        let v = store.read(f.loc, f.word);
        if hard || v < f.min || v > f.max {
            if v != f.default {
                changed += 1;
            }
            store.update(f.loc, f.default, f.word);
        }
    }

    let mut force = |store: &mut S, key: Key, value: u16| {
        if get(store, key) != value {
            set(store, key, value);
            changed += 1;
        }
    };

    if let Some(first) = hw.first_route() {
        for key in [Key::AlarmSignal, Key::TimerSignal] {
            if !hw.has_route(route(store, key)) {
                force(store, key, first as u16);
            }
        }
        let strike = route(store, Key::StrikeSignal);
        if strike == Route::Switch || !hw.has_route(strike) {
            let r = if hw.has_piezo { Route::Piezo } else { Route::Pulse };
            force(store, Key::StrikeSignal, r as u16);
        }
    }
    if !hw.soft_alarm_switch {
        force(store, Key::AlarmOn, 1);
    }
    changed
}
