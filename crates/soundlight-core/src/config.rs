//! Visualizer configuration snapshot and mapper tuning knobs.
//!
//! Hosts construct a [`VisualizerConfig`] once and hand updated snapshots to
//! the visualizer on change notifications; there is no ambient settings
//! lookup anywhere in the pipeline.

use crate::color::Rgb;
use serde::{Deserialize, Serialize};

/// Configuration snapshot for the sound visualizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Capture device id; `-1` selects the host default input device
    pub device: i32,
    /// Color emitted at zero spectral energy (static mode)
    pub min_color: Rgb,
    /// Color emitted at full spectral energy (static mode)
    pub max_color: Rgb,
    /// Use the liquid color generator for the "to" endpoint
    pub liquid_mode: bool,
    /// Liquid generator speed, forwarded as-is
    pub liquid_speed: i32,
    /// Emit a frame only when at least one LED color changed
    pub send_only_if_changed: bool,
    /// Number of LEDs to drive
    pub num_leds: usize,
    /// Per-LED enable flags; missing entries default to enabled
    pub enabled_leds: Vec<bool>,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            device: -1,
            min_color: Rgb::BLACK,
            max_color: Rgb::WHITE,
            liquid_mode: false,
            liquid_speed: 50,
            send_only_if_changed: false,
            num_leds: 10,
            enabled_leds: Vec::new(),
        }
    }
}

impl VisualizerConfig {
    /// Whether LED `index` is administratively enabled.
    pub fn is_led_enabled(&self, index: usize) -> bool {
        self.enabled_leds.get(index).copied().unwrap_or(true)
    }
}

/// Empirical calibration constants of the spectrum-to-LED mapping.
///
/// The defaults reproduce the tuning the mapping was calibrated with and
/// should not be changed casually; the output formula is sensitive to every
/// one of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapperTuning {
    /// Exponent scale of the logarithmic frequency-to-LED spread
    pub spectral_spread: f64,
    /// Display-scale ceiling of the per-LED value
    pub spec_height: i32,
    /// Visual calibration offset subtracted from the scaled magnitude
    pub magnitude_offset: i32,
    /// Peak decay period in frames
    pub decay_interval: u64,
    /// How far below the held peak a value must fall before peak rescaling
    pub rescale_threshold: i32,
}

impl Default for MapperTuning {
    fn default() -> Self {
        Self {
            spectral_spread: 9.0,
            spec_height: 1000,
            magnitude_offset: 4,
            decay_interval: 5,
            rescale_threshold: 5,
        }
    }
}
