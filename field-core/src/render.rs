//! Drawing the field onto an abstract 2D raster surface.
//!
//! The simulation never talks to a concrete canvas. Hosts implement
//! [`Surface`] (the desktop viewer wraps an `egui::Painter`), and
//! [`render`] issues the primitive calls in a fixed order:
//! connections, then particles, then pulses on top.

use crate::{
    config::Mode,
    field::Field,
    particle::Particle,
    types::{Color, ParticleId},
};
use glam::Vec2;

/// Minimal drawing context the renderer needs.
pub trait Surface {
    /// Fills the whole surface with `color`.
    fn clear(&mut self, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);
}

/// Draws one frame of `field`.
///
/// ### Returns
/// The number of connection lines drawn.
pub fn render(field: &Field, surface: &mut impl Surface) -> usize {
    let cfg = &field.cfg;
    let mut lines = 0;
    surface.clear(cfg.background);

    match cfg.mode {
        Mode::Pulse => {
            let color = cfg.connection_color.with_alpha(cfg.connection_alpha);
            for_each_edge(&field.particles, |a, b| {
                surface.stroke_line(a.pos, b.pos, cfg.connection_width, color);
                lines += 1;
            });
        }
        Mode::Repulsion => {
            let max = cfg.connect_distance;
            for_each_close_pair(&field.particles, max, |a, b, d| {
                let alpha = cfg.connection_alpha_max * (1.0 - d / max);
                let color = cfg.connection_color.with_alpha(alpha);
                surface.stroke_line(a.pos, b.pos, cfg.connection_width, color);
                lines += 1;
            });
        }
    }

    for p in &field.particles {
        surface.fill_circle(p.pos, p.size, p.color);
    }

    for pulse in field.pulses.iter().filter(|p| !p.dead) {
        let Some(pos) = pulse.position(&field.particles) else {
            continue;
        };
        if cfg.pulse_glow > 0.0 {
            let halo = cfg.pulse_color.with_alpha(0.25);
            surface.fill_circle(pos, cfg.pulse_radius + cfg.pulse_glow * 0.5, halo);
        }
        surface.fill_circle(pos, cfg.pulse_radius, cfg.pulse_color);
    }

    lines
}

/// `true` if `a` is the canonical drawing endpoint of the edge `a - b`:
/// the one with the lower x, ties broken by the lower index.
fn owns_edge(particles: &[Particle], a: ParticleId, b: ParticleId) -> bool {
    let (pa, pb) = (particles[a].pos, particles[b].pos);
    pa.x < pb.x || (pa.x == pb.x && a < b)
}

/// Visits every neighbor-graph edge exactly once, from its canonical endpoint.
pub fn for_each_edge<'a>(particles: &'a [Particle], mut f: impl FnMut(&'a Particle, &'a Particle)) {
    for (a, p) in particles.iter().enumerate() {
        for &b in &p.neighbors {
            if b < particles.len() && owns_edge(particles, a, b) {
                f(p, &particles[b]);
            }
        }
    }
}

/// Visits every pair of particles closer than `max_dist`, once per pair,
/// passing their distance. Quadratic in the particle count.
pub fn for_each_close_pair<'a>(
    particles: &'a [Particle],
    max_dist: f32,
    mut f: impl FnMut(&'a Particle, &'a Particle, f32),
) {
    let m2 = max_dist * max_dist;
    for (a, p) in particles.iter().enumerate() {
        for (b, q) in particles.iter().enumerate().skip(a + 1) {
            let d2 = p.pos.distance_squared(q.pos);
            if d2 < m2 {
                let (first, second) = if owns_edge(particles, a, b) { (p, q) } else { (q, p) };
                f(first, second, d2.sqrt());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, pulse::Pulse};

    #[derive(Debug, PartialEq)]
    enum Op {
        Clear,
        Circle(Vec2, f32, Color),
        Line(Vec2, Vec2, Color),
    }

    #[derive(Default)]
    struct Recorder {
        ops: Vec<Op>,
    }

    impl Surface for Recorder {
        fn clear(&mut self, _color: Color) {
            self.ops.push(Op::Clear);
        }
        fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
            self.ops.push(Op::Circle(center, radius, color));
        }
        fn stroke_line(&mut self, from: Vec2, to: Vec2, _width: f32, color: Color) {
            self.ops.push(Op::Line(from, to, color));
        }
    }

    fn triangle(cfg: Config) -> Field {
        let red = Color::rgb(255, 0, 0);
        let ps = vec![
            Particle::new(Vec2::new(50.0, 0.0), 1.0, red),
            Particle::new(Vec2::new(0.0, 0.0), 2.0, red),
            Particle::new(Vec2::new(0.0, 30.0), 3.0, red),
        ];
        Field::from_particles(100, 100, cfg, ps)
    }

    #[test]
    fn each_edge_is_drawn_once_from_the_lower_x() {
        let field = triangle(Config::default());
        assert_eq!(field.edges, 3);

        let mut rec = Recorder::default();
        assert_eq!(render(&field, &mut rec), 3);

        let lines: Vec<_> = rec
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Line(a, b, _) => Some((*a, *b)),
                _ => None,
            })
            .collect();

        assert_eq!(lines.len(), 3);
        for (a, b) in &lines {
            assert!(a.x <= b.x);
        }
        // Particles 1 and 2 share x = 0; the lower index draws.
        assert!(lines.contains(&(Vec2::new(0.0, 0.0), Vec2::new(0.0, 30.0))));
    }

    #[test]
    fn draws_connections_then_particles_then_pulses() {
        let mut field = triangle(Config::default());
        field.pulses.push(Pulse::new(1, 0, 0.5));
        field.pulses[0].advance();

        let mut rec = Recorder::default();
        render(&field, &mut rec);

        assert_eq!(rec.ops[0], Op::Clear);
        let first_circle = rec.ops.iter().position(|op| matches!(op, Op::Circle(..))).unwrap();
        let last_line = rec.ops.iter().rposition(|op| matches!(op, Op::Line(..))).unwrap();
        assert!(last_line < first_circle);

        // 3 particles, then halo + core for the pulse at the edge midpoint.
        let circles: Vec<_> = rec.ops.iter().filter(|op| matches!(op, Op::Circle(..))).collect();
        assert_eq!(circles.len(), 5);
        let cfg = &field.cfg;
        assert_eq!(
            *circles[4],
            Op::Circle(Vec2::new(25.0, 0.0), cfg.pulse_radius, cfg.pulse_color)
        );
    }

    #[test]
    fn dead_pulses_are_not_drawn() {
        let mut field = triangle(Config::default());
        let mut pulse = Pulse::new(0, 1, 1.0);
        pulse.advance();
        field.pulses.push(pulse);

        let mut rec = Recorder::default();
        render(&field, &mut rec);

        let circles = rec.ops.iter().filter(|op| matches!(op, Op::Circle(..))).count();
        assert_eq!(circles, 3);
    }

    #[test]
    fn pulse_mode_edges_use_fixed_opacity() {
        let field = triangle(Config::default());
        let expected = Color::WHITE.with_alpha(0.05);

        let mut rec = Recorder::default();
        render(&field, &mut rec);

        for op in &rec.ops {
            if let Op::Line(_, _, c) = op {
                assert_eq!(*c, expected);
            }
        }
    }

    #[test]
    fn repulsion_mode_fades_edges_with_distance() {
        let cfg = Config {
            mode: crate::config::Mode::Repulsion,
            connect_distance: 40.0,
            ..Config::default()
        };
        let field = triangle(cfg);
        assert_eq!(field.edges, 0);

        let mut rec = Recorder::default();
        assert_eq!(render(&field, &mut rec), 1);

        // Only the 30px pair (1, 2) is closer than 40px; 50px and ~58px are not.
        let lines: Vec<_> = rec
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Line(a, b, c) => Some((*a, *b, *c)),
                _ => None,
            })
            .collect();
        assert_eq!(lines.len(), 1);
        let (_, _, c) = lines[0];
        assert_eq!(c, Color::WHITE.with_alpha(0.4 * (1.0 - 30.0 / 40.0)));
    }
}
