use crate::types::{Color, ParticleId};
use glam::Vec2;

#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Vec2,
    /// Rest position the spring pulls back to in pulse mode.
    pub base: Vec2,
    pub size: f32,
    pub color: Color,
    pub velocity: Vec2,
    /// Strength of the pointer repulsion in pulse mode.
    pub density: f32,
    pub neighbors: Vec<ParticleId>,
}

impl Particle {
    /// Creates a particle at rest at `pos` with no velocity and no neighbors.
    pub fn new(pos: Vec2, size: f32, color: Color) -> Self {
        Self {
            pos,
            base: pos,
            size,
            color,
            velocity: Vec2::ZERO,
            density: 1.0,
            neighbors: Vec::new(),
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }
}

/// Rebuilds the neighbor lists of `particles` from scratch.
///
/// Every unordered pair of distinct particles whose squared distance is
/// below `threshold²` is linked in both directions, so the resulting graph
/// is symmetric and free of self-loops.
///
/// ### Returns
/// The number of undirected edges.
pub fn build_neighbor_graph(particles: &mut [Particle], threshold: f32) -> usize {
    let t2 = threshold * threshold;
    let mut lists: Vec<Vec<ParticleId>> = vec![Vec::new(); particles.len()];
    let mut edges = 0;

    for a in 0..particles.len() {
        for b in (a + 1)..particles.len() {
            if particles[a].pos.distance_squared(particles[b].pos) < t2 {
                lists[a].push(b);
                lists[b].push(a);
                edges += 1;
            }
        }
    }

    for (p, list) in particles.iter_mut().zip(lists) {
        p.neighbors = list;
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, y: f32) -> Particle {
        Particle::new(Vec2::new(x, y), 1.0, Color::WHITE)
    }

    #[test]
    fn links_only_pairs_within_threshold() {
        let mut ps = vec![at(0.0, 0.0), at(10.0, 0.0), at(100.0, 0.0)];

        let edges = build_neighbor_graph(&mut ps, 20.0);

        assert_eq!(edges, 1);
        assert_eq!(ps[0].neighbors, vec![1]);
        assert_eq!(ps[1].neighbors, vec![0]);
        assert!(ps[2].neighbors.is_empty());
    }

    #[test]
    fn threshold_is_exclusive() {
        let mut ps = vec![at(0.0, 0.0), at(3.0, 4.0)];
        assert_eq!(build_neighbor_graph(&mut ps, 5.0), 0);
        assert_eq!(build_neighbor_graph(&mut ps, 5.01), 1);
    }

    #[test]
    fn rebuild_replaces_old_lists() {
        let mut ps = vec![at(0.0, 0.0), at(1.0, 0.0)];
        build_neighbor_graph(&mut ps, 10.0);
        ps[1].pos = Vec2::new(500.0, 0.0);

        build_neighbor_graph(&mut ps, 10.0);

        assert!(ps.iter().all(|p| p.neighbors.is_empty()));
    }

    #[test]
    fn coincident_particles_never_link_to_themselves() {
        let mut ps = vec![at(5.0, 5.0), at(5.0, 5.0)];
        build_neighbor_graph(&mut ps, 1.0);
        assert_eq!(ps[0].neighbors, vec![1]);
        assert_eq!(ps[1].neighbors, vec![0]);
    }
}
