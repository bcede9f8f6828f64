use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Identifier for a particle in a [`crate::field::Field`].
///
/// This is an index into `Field::particles`, and is only meaningful within
/// the lifetime of a given initialization of the field.
pub type ParticleId = usize;

/// Straight (non-premultiplied) RGBA color, 8 bits per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Returns the same color with its alpha scaled by `factor` (clamped to `[0, 1]`).
    pub fn with_alpha(self, factor: f32) -> Self {
        let a = (self.a as f32 * factor.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }
}

/// Last known pointer position in canvas coordinates.
///
/// Owned by the host and handed to every frame update; `None` means the
/// pointer has never entered the canvas or has left it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pointer(pub Option<Vec2>);

impl Pointer {
    pub const ABSENT: Pointer = Pointer(None);

    pub fn at(x: f32, y: f32) -> Self {
        Self(Some(Vec2::new(x, y)))
    }

    pub fn pos(&self) -> Option<Vec2> {
        self.0
    }
}
