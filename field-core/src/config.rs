use serde::{Deserialize, Serialize};

use crate::types::Color;

/// Interaction policy of the field, chosen at (re)initialization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Free-roaming particles that bounce off the walls and dodge the pointer.
    Repulsion,
    /// Particles held on springs at their rest position, linked by a fixed
    /// neighbor graph along which pulses travel.
    #[default]
    Pulse,
}

/// Tunables of the particle field.
///
/// Every value has a default matching the original page animation, and
/// `#[serde(default)]` lets a config file name only the values it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,

    /// Viewport area (px²) per particle.
    pub density_divisor: f32,
    /// Maximum distance between two connected particles.
    pub connect_distance: f32,
    /// Pointer influence radius.
    pub interaction_radius: f32,

    pub size_min: f32,
    pub size_max: f32,
    pub density_min: f32,
    pub density_max: f32,
    /// Repulsion mode: each velocity component is sampled in `[-max_velocity, max_velocity]`.
    pub max_velocity: f32,
    /// Repulsion mode: per-axis pointer nudge per frame.
    pub repel_step: f32,
    /// Pulse mode: fraction of the offset from rest removed per frame.
    pub return_fraction: f32,

    pub pulse_speed: f32,
    pub propagation_probability: f32,
    pub touch_pulse_probability: f32,
    pub spontaneous_probability: f32,
    pub max_pulses: usize,

    pub palette: [Color; 2],
    pub background: Color,
    pub connection_color: Color,
    /// Pulse mode edge opacity.
    pub connection_alpha: f32,
    /// Repulsion mode edge opacity at zero distance.
    pub connection_alpha_max: f32,
    pub connection_width: f32,
    pub pulse_color: Color,
    pub pulse_radius: f32,
    pub pulse_glow: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            density_divisor: 8000.0,
            connect_distance: 150.0,
            interaction_radius: 150.0,
            size_min: 1.0,
            size_max: 3.0,
            density_min: 1.0,
            density_max: 31.0,
            max_velocity: 1.0,
            repel_step: 1.0,
            return_fraction: 1.0 / 30.0,
            pulse_speed: 0.05,
            propagation_probability: 0.3,
            touch_pulse_probability: 0.02,
            spontaneous_probability: 0.05,
            max_pulses: 512,
            palette: [Color::rgb(0x2d, 0xd4, 0xbf), Color::rgb(0x81, 0x8c, 0xf8)],
            background: Color::rgb(0x0b, 0x11, 0x20),
            connection_color: Color::WHITE,
            connection_alpha: 0.05,
            connection_alpha_max: 0.4,
            connection_width: 1.0,
            pulse_color: Color::WHITE,
            pulse_radius: 2.0,
            pulse_glow: 10.0,
        }
    }
}

impl Config {
    /// Checks the values the simulation relies on.
    ///
    /// ### Returns
    /// One human-readable message per problem; an empty vector means the
    /// config is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if !(self.density_divisor.is_finite() && self.density_divisor >= MIN_DENSITY_DIVISOR) {
            problems.push(format!(
                "density_divisor must be a finite value >= {MIN_DENSITY_DIVISOR} (got {})",
                self.density_divisor
            ));
        }
        if !(positive(self.size_min) && sampleable(self.size_min, self.size_max)) {
            problems.push(format!(
                "size range must satisfy 0 < size_min <= size_max, both finite (got {}..{})",
                self.size_min, self.size_max
            ));
        }
        if !sampleable(self.density_min, self.density_max) {
            problems.push(format!(
                "density range must satisfy density_min <= density_max, both finite (got {}..{})",
                self.density_min, self.density_max
            ));
        }
        if !sampleable(-self.max_velocity, self.max_velocity) {
            problems.push(format!(
                "max_velocity must be finite and not negative (got {})",
                self.max_velocity
            ));
        }
        if !(positive(self.pulse_speed) && self.pulse_speed.is_finite()) {
            problems.push(format!("pulse_speed must be positive (got {})", self.pulse_speed));
        }
        if !(0.0..=1.0).contains(&self.return_fraction) {
            problems.push(format!(
                "return_fraction must lie in [0, 1] (got {})",
                self.return_fraction
            ));
        }
        for (name, p) in [
            ("propagation_probability", self.propagation_probability),
            ("touch_pulse_probability", self.touch_pulse_probability),
            ("spontaneous_probability", self.spontaneous_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                problems.push(format!("{name} must lie in [0, 1] (got {p})"));
            }
        }
        for (name, v) in [
            ("connect_distance", self.connect_distance),
            ("interaction_radius", self.interaction_radius),
            ("repel_step", self.repel_step),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                problems.push(format!("{name} must be finite and not negative (got {v})"));
            }
        }

        problems
    }
}

/// Smallest accepted [`Config::density_divisor`]: one particle per pixel.
pub const MIN_DENSITY_DIVISOR: f32 = 1.0;

fn positive(x: f32) -> bool {
    x > 0.0
}

/// `true` if `lo..hi` can be sampled uniformly: ordered, with a finite span.
fn sampleable(lo: f32, hi: f32) -> bool {
    lo <= hi && (hi - lo).is_finite()
}
