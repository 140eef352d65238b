// Wire types for the lighting API.
//
// Request bodies serialize exactly the fields the API expects
// (`skip_serializing_if` on the optional ones); response types tolerate
// missing fields with `#[serde(default)]` since firmware revisions vary.

use serde::{Deserialize, Serialize};

/// Power state of a light, `"on"`/`"off"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Power {
    On,
    Off,
}

/// An HSBK color value.
///
/// `brightness` is carried inside the color only for pulse effects; steady
/// states put brightness at the top level of [`LightState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub hue: f64,
    pub saturation: f64,
    pub kelvin: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
}

impl Color {
    /// A fully saturated hue at the standard flag color temperature.
    pub fn hue_deg(hue: f64) -> Self {
        Self {
            hue,
            saturation: 1.0,
            kelvin: 3500,
            brightness: None,
        }
    }

    pub fn with_brightness(mut self, brightness: f64) -> Self {
        self.brightness = Some(brightness);
        self
    }
}

/// Capability flags reported per product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub has_color: bool,
    #[serde(default)]
    pub has_variable_color_temp: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub capabilities: Capabilities,
}

/// A controllable light as reported by `GET /lights/all`.
///
/// Immutable snapshot -- the client references lights by `id` only and
/// never mutates these fields locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Light {
    pub id: String,
    pub label: String,
    pub power: Power,
    pub connected: bool,
    #[serde(default)]
    pub brightness: f64,
    pub color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
}

/// A single target state for the lights addressed by a selector.
///
/// Body of `PUT /lights/{selector}/state`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightState {
    pub power: Power,
    pub color: Color,
    pub brightness: f64,
    /// Fade time in seconds. Omitted for an instant transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// A pulse (waveform) effect oscillating between two colors.
///
/// Body of `POST /lights/{selector}/effects/pulse`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PulseEffect {
    pub color: Color,
    pub from_color: Color,
    /// Seconds per cycle.
    pub period: f64,
    pub cycles: u32,
    pub power_on: bool,
}
