use crate::{particle::Particle, types::ParticleId};
use glam::Vec2;

/// Slack for deciding that accumulated progress has reached the end node.
///
/// `speed` is summed in `f32`, so twenty steps of `0.05` can land a hair
/// below `1.0`.
const PROGRESS_EPSILON: f32 = 1e-4;

/// A signal travelling along the edge `start -> end`.
#[derive(Clone, Debug, PartialEq)]
pub struct Pulse {
    pub start: ParticleId,
    pub end: ParticleId,
    /// Fraction of the edge travelled, in `[0, 1]`.
    pub progress: f32,
    /// Progress gained per frame.
    pub speed: f32,
    pub dead: bool,
}

impl Pulse {
    pub fn new(start: ParticleId, end: ParticleId, speed: f32) -> Self {
        Self {
            start,
            end,
            progress: 0.0,
            speed,
            dead: false,
        }
    }

    /// Advances the pulse by one frame.
    ///
    /// ### Returns
    /// `true` exactly once, on the frame the pulse reaches its end node.
    /// The pulse is then marked dead and its progress pinned to `1.0`.
    pub fn advance(&mut self) -> bool {
        if self.dead {
            return false;
        }
        self.progress += self.speed.max(0.0);
        if self.progress + PROGRESS_EPSILON >= 1.0 {
            self.progress = 1.0;
            self.dead = true;
            return true;
        }
        false
    }

    /// Current position: linear interpolation between the current positions
    /// of the two endpoints. `None` if either endpoint no longer exists.
    pub fn position(&self, particles: &[Particle]) -> Option<Vec2> {
        let a = particles.get(self.start)?.pos;
        let b = particles.get(self.end)?.pos;
        Some(a.lerp(b, self.progress))
    }
}
