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
//! Hardware capability descriptor.
//!
//! Everything that differs between clock builds (how many tubes, which
//! signal outputs are wired up, which functions are offered) is described
//! by one `Hardware` value chosen by the board.  The settings table, the
//! scheduler and the state machine consult it instead of being compiled
//! differently for each build.

use crate::clock::Function;
use crate::signal::Route;

/// The most digits any supported display has.
pub const MAX_DIGITS: usize = 6;

/// Number of digit decoders sharing the anode channels.
pub const DRIVERS: usize = 2;

pub struct Hardware {
    /// Number of digits fitted, 4 or 6.
    pub display_size: usize,

    /// Functions offered, in the order Sel cycles through them.  Must
    /// start with `Function::Time`.
    pub functions: &'static [Function],

    /// Function Alt jumps to when it isn't acting as a power switch.
    pub alt_function: Option<Function>,

    pub has_piezo: bool,
    pub has_switch: bool,
    pub has_pulse: bool,

    /// Indicator lamp (e.g. a backlight or an alarm LED).
    pub has_indicator: bool,

    pub has_alt: bool,

    /// Up/Down come from a rotary encoder rather than buttons.
    pub rotary: bool,

    /// Alarm can be switched on and off from the alarm display.  If not,
    /// the alarm is permanently on.
    pub soft_alarm_switch: bool,

    /// Alt toggles the switch output, like the power button of a clock
    /// radio.
    pub soft_power_switch: bool,

    pub timing: Timing,
}

/// All timing constants, in milliseconds unless named otherwise.
pub struct Timing {
    pub debounce_ms: u16,
    pub hold_short_ms: u16,
    pub hold_long_ms: u16,
    /// Encoder detents closer together than this count as fast turning.
    pub velocity_ms: u16,
    /// Step interval while an adjust control is held.
    pub repeat_ms: u16,
    pub setting_timeout_secs: u16,
    pub temp_timeout_secs: u16,
    /// How long an automatic page (e.g. the date at :30) stays up.
    pub page_secs: u8,
    /// When the display is off, how long a press lights it up.
    pub unoff_secs: u16,
    pub scroll_ms: u16,
    pub clean_ms: u16,
    /// Piezo/pulse signals are repeated once a second for this long.
    pub signal_secs: u16,
    /// A switched signal stays on for this long.
    pub switch_secs: u16,
    pub pulse_ms: u16,
}

impl Hardware {
    /// Universal Nixie Driver Board: six IN-12 tubes multiplexed over three
    /// anode channels, four buttons, a piezo and a switched relay output.
    pub const UNDB: Hardware = Hardware {
        display_size: 6,
        functions: &[
            Function::Time,
            Function::Date,
            Function::DayCount,
            Function::Alarm,
            Function::Timer,
        ],
        alt_function: None,
        has_piezo: true,
        has_switch: true,
        has_pulse: false,
        has_indicator: true,
        has_alt: true,
        rotary: false,
        soft_alarm_switch: true,
        soft_power_switch: true,
        timing: Timing::DEFAULT,
    };

    /// Number of anode channels, each lighting one digit per driver.
    pub fn channels(&self) -> usize {
        self.display_size / DRIVERS
    }

    pub fn has_route(&self, route: Route) -> bool {
        match route {
            Route::Piezo => self.has_piezo,
            Route::Switch => self.has_switch,
            Route::Pulse => self.has_pulse,
        }
    }

    /// Fitted routes, in preference order.
    pub fn routes(&self) -> impl Iterator<Item = Route> + '_ {
        [Route::Piezo, Route::Switch, Route::Pulse]
            .into_iter()
            .filter(move |r| self.has_route(*r))
    }

    pub fn first_route(&self) -> Option<Route> {
        self.routes().next()
    }

    pub fn has_signal(&self) -> bool {
        self.first_route().is_some()
    }

    pub fn has_function(&self, f: Function) -> bool {
        self.functions.contains(&f)
    }
}

impl Timing {
    pub const DEFAULT: Timing = Timing {
        debounce_ms: 50,
        hold_short_ms: 1000,
        hold_long_ms: 3000,
        velocity_ms: 80,
        repeat_ms: 250,
        setting_timeout_secs: 300,
        temp_timeout_secs: 5,
        page_secs: 3,
        unoff_secs: 10,
        scroll_ms: 100,
        clean_ms: 200,
        signal_secs: 180,
        switch_secs: 7200,
        pulse_ms: 200,
    };
}
