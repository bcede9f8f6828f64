//! Per-frame simulation phases for the particle field.
//!
//! One animation frame runs, in order:
//! 1. [`motion_phase`] — every particle reacts to the pointer and moves
//!    (wall bounce in repulsion mode, spring return in pulse mode).
//! 2. [`pulse_phase`] — live pulses advance; finished ones may propagate
//!    to a neighbor of their end node and are purged.
//! 3. [`spontaneous_phase`] — occasionally fires a pulse from a random
//!    particle so the network keeps flickering without input.
//!
//! [`step`] runs all three and is what the host calls once per frame,
//! before rendering.

use crate::{
    config::{Config, Mode},
    field::Field,
    particle::Particle,
    types::{ParticleId, Pointer},
};
use rand::Rng;

/// Counters describing what happened during one [`step`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Particles inside the pointer's interaction radius.
    pub touched: usize,
    /// Pulses created this frame (pointer, propagation and spontaneous).
    pub fired: usize,
    /// Pulses that reached their end node and were purged.
    pub completed: usize,
}

/// Advances the whole field by one frame.
///
/// ### Parameters
/// - `field` - The field to mutate.
/// - `pointer` - Pointer position for this frame.
/// - `rng` - Source of randomness for pulse emission and propagation.
///
/// ### Returns
/// Per-frame [`StepStats`].
pub fn step(field: &mut Field, pointer: Pointer, rng: &mut impl Rng) -> StepStats {
    let mut stats = motion_phase(field, pointer, rng);

    if field.cfg.mode == Mode::Pulse {
        let (completed, propagated) = pulse_phase(field, rng);
        stats.completed = completed;
        stats.fired += propagated;
        if spontaneous_phase(field, rng) {
            stats.fired += 1;
        }
    }

    stats
}

/// Moves every particle according to the field's [`Mode`].
///
/// In [`Mode::Pulse`], each particle inside the interaction radius rolls
/// [`Config::touch_pulse_probability`] and, on success, fires a pulse to a
/// random neighbor via [`Field::fire_pulse`].
///
/// ### Returns
/// [`StepStats`] with `touched` and `fired` filled in.
pub fn motion_phase(field: &mut Field, pointer: Pointer, rng: &mut impl Rng) -> StepStats {
    let mut stats = StepStats::default();
    let (w, h) = (field.width, field.height);
    let mut emitters: Vec<ParticleId> = Vec::new();

    for (id, p) in field.particles.iter_mut().enumerate() {
        let touched = match field.cfg.mode {
            Mode::Repulsion => repel_and_bounce(p, pointer, &field.cfg, w, h),
            Mode::Pulse => spring(p, pointer, &field.cfg),
        };

        if touched {
            stats.touched += 1;
            if field.cfg.mode == Mode::Pulse
                && rng.random::<f32>() < field.cfg.touch_pulse_probability
            {
                emitters.push(id);
            }
        }
    }

    for id in emitters {
        if field.fire_pulse(id, rng) {
            stats.fired += 1;
        }
    }

    stats
}

/// Advances all live pulses and removes the finished ones.
///
/// A pulse that reaches its end node rolls
/// [`Config::propagation_probability`]; on success a new pulse is fired
/// from that end node. Propagated pulses are created after the purge, so
/// they start this frame at progress `0`.
///
/// ### Returns
/// `(completed, propagated)` pulse counts.
pub fn pulse_phase(field: &mut Field, rng: &mut impl Rng) -> (usize, usize) {
    let mut arrived: Vec<ParticleId> = Vec::new();
    let mut completed = 0;

    for pulse in &mut field.pulses {
        if pulse.advance() {
            completed += 1;
            if rng.random::<f32>() < field.cfg.propagation_probability {
                arrived.push(pulse.end);
            }
        }
    }

    field.pulses.retain(|p| !p.dead);

    let mut propagated = 0;
    for node in arrived {
        if field.fire_pulse(node, rng) {
            propagated += 1;
        }
    }

    if completed > 0 {
        log::debug!(
            "pulses: {completed} completed, {propagated} propagated, {} live",
            field.pulses.len()
        );
    }
    (completed, propagated)
}

/// With probability [`Config::spontaneous_probability`], fires a pulse from
/// a uniformly random particle.
///
/// ### Returns
/// `true` if a pulse was created.
pub fn spontaneous_phase(field: &mut Field, rng: &mut impl Rng) -> bool {
    if rng.random::<f32>() < field.cfg.spontaneous_probability {
        return field.fire_random_pulse(rng);
    }
    false
}

/// Repulsion-mode update for a single particle.
///
/// Nudges the particle away from a nearby pointer, one axis at a time and
/// only while it keeps `size * 10` of clearance from that wall, then applies
/// its velocity and bounces it off the canvas edges.
///
/// ### Returns
/// `true` if the pointer was within reach.
fn repel_and_bounce(p: &mut Particle, pointer: Pointer, cfg: &Config, w: f32, h: f32) -> bool {
    let mut touched = false;

    if let Some(m) = pointer.pos() {
        let d = m.distance(p.pos);
        if d < cfg.interaction_radius + p.size {
            touched = true;
            let margin = p.size * 10.0;
            if m.x < p.pos.x && p.pos.x < w - margin {
                p.pos.x += cfg.repel_step;
            }
            if m.x > p.pos.x && p.pos.x > margin {
                p.pos.x -= cfg.repel_step;
            }
            if m.y < p.pos.y && p.pos.y < h - margin {
                p.pos.y += cfg.repel_step;
            }
            if m.y > p.pos.y && p.pos.y > margin {
                p.pos.y -= cfg.repel_step;
            }
        }
    }

    p.pos += p.velocity;
    bounce(&mut p.pos.x, &mut p.velocity.x, w);
    bounce(&mut p.pos.y, &mut p.velocity.y, h);

    touched
}

/// Reflects a coordinate that left `[0, extent]` back inside and points the
/// velocity component inward.
fn bounce(x: &mut f32, v: &mut f32, extent: f32) {
    if *x < 0.0 {
        *x = -*x;
        *v = v.abs();
    } else if *x > extent {
        *x = 2.0 * extent - *x;
        *v = -v.abs();
    }
    *x = x.clamp(0.0, extent.max(0.0));
}

/// Pulse-mode update for a single particle.
///
/// Inside the interaction radius the particle is pushed away from the
/// pointer by `(radius - d) / radius * density`. A pointer sitting exactly
/// on the particle has no direction and pushes nothing. Outside the radius
/// (or with no pointer) the particle eases back toward its rest position by
/// [`Config::return_fraction`] of the remaining offset.
///
/// ### Returns
/// `true` if the pointer was within the interaction radius.
fn spring(p: &mut Particle, pointer: Pointer, cfg: &Config) -> bool {
    let radius = cfg.interaction_radius;

    if let Some(m) = pointer.pos() {
        let d = m.distance(p.pos);
        if d < radius {
            let force = (radius - d) / radius;
            let dir = (m - p.pos).normalize_or_zero();
            p.pos -= dir * force * p.density;
            return true;
        }
    }

    p.pos -= (p.pos - p.base) * cfg.return_fraction;
    false
}
