//! Core 2-D "neural pulse" particle field library.
//!
//! Main components:
//! - [`config`] — tunables and the interaction [`config::Mode`].
//! - [`particle`] — particles and the neighbor graph.
//! - [`pulse`] — signals travelling along graph edges.
//! - [`field`] — the field itself: initialization, resize, pulse firing.
//! - [`phases`] — per-frame simulation pipeline.
//! - [`render`] — drawing onto an abstract [`render::Surface`].
//! - [`types`] — shared ids, colors and pointer input.

pub mod config;
pub mod field;
pub mod particle;
pub mod phases;
pub mod pulse;
pub mod render;
pub mod types;
