// Flag-to-light-sequence table.
//
// Every flag maps to a fixed, ordered list of steps. Pulses communicate
// the transient hazard/ceremony; the final steady state communicates the
// persistent flag, so a light that misses later updates still reflects
// current track status.

use std::time::Duration;

use pitlight_api::{Color, LightState, Power, PulseEffect};

use crate::flag::FlagEffect;

/// Hue angles for the flag palette (degrees).
const GREEN_HUE: f64 = 120.0;
const YELLOW_HUE: f64 = 60.0;
const RED_HUE: f64 = 0.0;

/// Color temperature for the standard flag hues.
const FLAG_KELVIN: u32 = 3500;
/// Cool white for the checkered strobe's bright phase.
const COOL_KELVIN: u32 = 9000;
/// Warm dim for the checkered strobe's dark phase.
const WARM_KELVIN: u32 = 2500;

/// Settle time between a pulse effect and its steady follow-up state.
const PULSE_SETTLE: Duration = Duration::from_secs(3);
/// Hold on the full-brightness stage of the initial green sequence.
const GREEN_STAGE_HOLD: Duration = Duration::from_secs(3);

/// One command issued against a selector.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetState(LightState),
    Pulse(PulseEffect),
}

/// A sequence step: a command, then an optional hold before the next step.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub command: Command,
    pub hold_after: Duration,
}

impl Step {
    fn set(state: LightState) -> Self {
        Self {
            command: Command::SetState(state),
            hold_after: Duration::ZERO,
        }
    }

    fn set_then_hold(state: LightState, hold_after: Duration) -> Self {
        Self {
            command: Command::SetState(state),
            hold_after,
        }
    }

    fn pulse_then_settle(effect: PulseEffect) -> Self {
        Self {
            command: Command::Pulse(effect),
            hold_after: PULSE_SETTLE,
        }
    }
}

fn steady(hue: f64, brightness: f64, duration: f64) -> LightState {
    LightState {
        power: Power::On,
        color: Color::hue_deg(hue),
        brightness,
        duration: Some(duration),
    }
}

/// A pulse between dim and full brightness of one flag hue.
fn hazard_pulse(hue: f64) -> PulseEffect {
    PulseEffect {
        color: Color::hue_deg(hue).with_brightness(1.0),
        from_color: Color::hue_deg(hue).with_brightness(0.3),
        period: 0.5,
        cycles: 6,
        power_on: true,
    }
}

/// The ordered step sequence for `flag`.
///
/// `initial` selects the two-stage green "go" sequence used once per
/// session; it is ignored for every other flag.
pub fn steps(flag: FlagEffect, initial: bool) -> Vec<Step> {
    match flag {
        FlagEffect::Green if initial => vec![
            Step::set_then_hold(steady(GREEN_HUE, 1.0, 0.1), GREEN_STAGE_HOLD),
            Step::set(steady(GREEN_HUE, 0.5, 2.0)),
        ],
        FlagEffect::Green => vec![Step::set(steady(GREEN_HUE, 0.5, 1.0))],
        FlagEffect::Yellow => vec![Step::set(steady(YELLOW_HUE, 1.0, 0.1))],
        FlagEffect::Red => vec![
            Step::pulse_then_settle(hazard_pulse(RED_HUE)),
            Step::set(steady(RED_HUE, 1.0, 0.1)),
        ],
        FlagEffect::SafetyCar => vec![
            Step::pulse_then_settle(hazard_pulse(YELLOW_HUE)),
            Step::set(steady(YELLOW_HUE, 1.0, 0.1)),
        ],
        FlagEffect::Checkered => vec![
            Step::pulse_then_settle(PulseEffect {
                color: Color {
                    hue: 0.0,
                    saturation: 0.0,
                    kelvin: COOL_KELVIN,
                    brightness: Some(1.0),
                },
                from_color: Color {
                    hue: 0.0,
                    saturation: 0.0,
                    kelvin: WARM_KELVIN,
                    brightness: Some(0.0),
                },
                period: 0.3,
                cycles: 10,
                power_on: true,
            }),
            // Session over -- revert to the track-clear signal.
            Step::set(steady(GREEN_HUE, 1.0, 0.1)),
        ],
    }
}
