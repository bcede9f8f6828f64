use crate::{
    config::{Config, MIN_DENSITY_DIVISOR, Mode},
    particle::{Particle, build_neighbor_graph},
    pulse::Pulse,
    types::ParticleId,
};
use glam::Vec2;
use rand::Rng;

/// Number of particles for a viewport of `width × height` pixels.
///
/// One particle per `divisor` px², rounded up. A non-positive, infinite or
/// NaN divisor yields zero particles; positive divisors below
/// [`MIN_DENSITY_DIVISOR`] are raised to it, so there is never more than
/// one particle per pixel.
pub fn particle_count(width: u32, height: u32, divisor: f32) -> usize {
    if divisor.is_nan() || divisor <= 0.0 || divisor.is_infinite() {
        return 0;
    }
    let divisor = divisor.max(MIN_DENSITY_DIVISOR) as f64;
    let area = width as f64 * height as f64;
    (area / divisor).ceil() as usize
}

/// The complete simulated system for one viewport configuration.
#[derive(Clone, Debug)]
pub struct Field {
    pub cfg: Config,
    pub width: f32,
    pub height: f32,
    pub particles: Vec<Particle>,
    pub pulses: Vec<Pulse>,
    /// Number of undirected edges in the neighbor graph (pulse mode only).
    pub edges: usize,
}

impl Field {
    /// Creates an empty field of the given size, with no particles.
    pub fn empty(width: u32, height: u32, cfg: Config) -> Self {
        Self {
            cfg,
            width: width as f32,
            height: height as f32,
            particles: Vec::new(),
            pulses: Vec::new(),
            edges: 0,
        }
    }

    /// Builds a populated field for a `width × height` viewport.
    ///
    /// Particle placement, size, color and (depending on [`Config::mode`])
    /// velocity or density are sampled from `rng`. In [`Mode::Pulse`] the
    /// neighbor graph is computed with [`build_neighbor_graph`].
    pub fn new(width: u32, height: u32, cfg: Config, rng: &mut impl Rng) -> Self {
        let mut field = Self::empty(width, height, cfg);
        let count = particle_count(width, height, field.cfg.density_divisor);
        let particles: Vec<Particle> = (0..count).map(|_| field.spawn_particle(rng)).collect();
        field.particles = particles;

        if field.cfg.mode == Mode::Pulse {
            field.edges = build_neighbor_graph(&mut field.particles, field.cfg.connect_distance);
        }

        log::info!(
            "field initialized: {}x{} {:?}, {} particles, {} edges",
            width,
            height,
            field.cfg.mode,
            field.particles.len(),
            field.edges
        );
        field
    }

    /// Builds a field from explicit particles, linking them in pulse mode.
    pub fn from_particles(width: u32, height: u32, cfg: Config, particles: Vec<Particle>) -> Self {
        let mut field = Self::empty(width, height, cfg);
        field.particles = particles;
        if field.cfg.mode == Mode::Pulse {
            field.edges = build_neighbor_graph(&mut field.particles, field.cfg.connect_distance);
        }
        field
    }

    /// Rebuilds the field for a new viewport size.
    ///
    /// The replacement is built in full before it is swapped in, so the old
    /// particles, graph and pulses are discarded at once.
    pub fn resize(&mut self, width: u32, height: u32, rng: &mut impl Rng) {
        *self = Self::new(width, height, self.cfg.clone(), rng);
    }

    /// Rebuilds the field with a new configuration at the current size.
    pub fn reconfigure(&mut self, cfg: Config, rng: &mut impl Rng) {
        *self = Self::new(self.width as u32, self.height as u32, cfg, rng);
    }

    fn spawn_particle(&self, rng: &mut impl Rng) -> Particle {
        let cfg = &self.cfg;
        let size = sample(rng, cfg.size_min, cfg.size_max);
        let color = cfg.palette[rng.random_range(0..cfg.palette.len())];

        match cfg.mode {
            Mode::Repulsion => {
                let inset = size * 2.0;
                let x = sample_inset(rng, self.width, inset);
                let y = sample_inset(rng, self.height, inset);
                let v = cfg.max_velocity;
                let velocity = Vec2::new(sample(rng, -v, v), sample(rng, -v, v));
                Particle::new(Vec2::new(x, y), size, color).with_velocity(velocity)
            }
            Mode::Pulse => {
                let x = sample(rng, 0.0, self.width);
                let y = sample(rng, 0.0, self.height);
                let density = sample(rng, cfg.density_min, cfg.density_max);
                Particle::new(Vec2::new(x, y), size, color).with_density(density)
            }
        }
    }

    /// Fires a pulse from `node` toward one of its neighbors, chosen uniformly.
    ///
    /// No-op if `node` does not exist, has no neighbors, or the live pulse
    /// count is already at [`Config::max_pulses`].
    ///
    /// ### Returns
    /// `true` if a pulse was created.
    pub fn fire_pulse(&mut self, node: ParticleId, rng: &mut impl Rng) -> bool {
        if self.pulses.len() >= self.cfg.max_pulses {
            return false;
        }
        let Some(p) = self.particles.get(node) else {
            return false;
        };
        if p.neighbors.is_empty() {
            return false;
        }
        let target = p.neighbors[rng.random_range(0..p.neighbors.len())];
        self.pulses.push(Pulse::new(node, target, self.cfg.pulse_speed));
        true
    }

    /// Fires a pulse from a uniformly random particle. No-op on an empty field.
    pub fn fire_random_pulse(&mut self, rng: &mut impl Rng) -> bool {
        if self.particles.is_empty() {
            return false;
        }
        let node = rng.random_range(0..self.particles.len());
        self.fire_pulse(node, rng)
    }

    /// Finds the particle closest to `pos`, if any lies within `max_dist`.
    pub fn nearest_particle(&self, pos: Vec2, max_dist: f32) -> Option<ParticleId> {
        let mut best = None;
        let mut best_d2 = max_dist * max_dist;
        for (id, p) in self.particles.iter().enumerate() {
            let d2 = p.pos.distance_squared(pos);
            if d2 <= best_d2 {
                best_d2 = d2;
                best = Some(id);
            }
        }
        best
    }
}

/// Uniform sample in `[lo, hi)`, or `lo` when the range is empty or its
/// span is not finite.
fn sample(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi > lo && (hi - lo).is_finite() {
        rng.random_range(lo..hi)
    } else {
        lo
    }
}

/// Uniform sample in `[inset, extent - inset)`, falling back to the full
/// extent when the viewport is too small for the inset.
fn sample_inset(rng: &mut impl Rng, extent: f32, inset: f32) -> f32 {
    if extent - inset > inset {
        sample(rng, inset, extent - inset)
    } else {
        sample(rng, 0.0, extent)
    }
}
