//! Interactive neural pulse viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the particle field, the
//! pointer state and the editable configuration, and implements
//! [`eframe::App`] to drive the simulation once per frame and draw it
//! through an egui painter.

use std::path::PathBuf;

use eframe::App;
use field_core::{
    config::{Config, Mode},
    field::Field,
    phases::{self, StepStats},
    render::{self, Surface},
    types::{Color, Pointer},
};
use glam::Vec2;

/// Radius (px) around a click within which a particle is picked to fire a pulse.
const PICK_RADIUS: f32 = 30.0;

/// [`Surface`] backed by an [`egui::Painter`], with the field origin at `rect.min`.
struct PainterSurface<'a> {
    painter: &'a egui::Painter,
    rect: egui::Rect,
}

impl PainterSurface<'_> {
    fn to_screen(&self, p: Vec2) -> egui::Pos2 {
        self.rect.min + egui::vec2(p.x, p.y)
    }
}

fn color32(c: Color) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

impl Surface for PainterSurface<'_> {
    fn clear(&mut self, color: Color) {
        self.painter
            .rect_filled(self.rect, egui::CornerRadius::ZERO, color32(color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.painter
            .circle_filled(self.to_screen(center), radius, color32(color));
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.painter.line_segment(
            [self.to_screen(from), self.to_screen(to)],
            egui::Stroke::new(width, color32(color)),
        );
    }
}

/// Main application state for the interactive viewer.
///
/// ### Fields
/// - `field` - The simulated particle field, sized to the central panel.
/// - `cfg` - Editable configuration; applied to the field on request.
/// - `pointer` - Last pointer position in field coordinates.
/// - `rng` - Random number generator for initialization and pulses.
///
/// - `running` - Whether the simulation advances every frame.
/// - `last_stats` - Counters from the most recent step.
/// - `totals` - Pulse counters accumulated since the field was last rebuilt.
/// - `lines_drawn` - Connection lines drawn in the last frame.
/// - `last_frame_time` / `last_frame_dt` - egui timestamps for the status bar.
///
/// - `config_path` - Where "Save" writes the config.
/// - `message` - Last config load/save/validation message, shown in the panel.
pub struct Viewer {
    field: Field,
    cfg: Config,
    pointer: Pointer,
    rng: rand::rngs::ThreadRng,

    running: bool,
    last_stats: StepStats,
    totals: StepStats,
    lines_drawn: usize,
    last_frame_time: f64,
    last_frame_dt: f64,

    config_path: Option<PathBuf>,
    message: Option<String>,
}

impl Viewer {
    /// Creates a viewer with an empty field.
    ///
    /// The field is populated on the first frame, once the size of the
    /// drawing area is known (see [`Viewer::ensure_size`]).
    pub fn new(cfg: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            field: Field::empty(0, 0, cfg.clone()),
            cfg,
            pointer: Pointer::ABSENT,
            rng: rand::rng(),
            running: true,
            last_stats: StepStats::default(),
            totals: StepStats::default(),
            lines_drawn: 0,
            last_frame_time: 0.0,
            last_frame_dt: 0.0,
            config_path,
            message: None,
        }
    }

    /// Rebuilds the field if the drawing area changed size.
    ///
    /// ### Returns
    /// `true` if the field was rebuilt.
    fn ensure_size(&mut self, width: u32, height: u32) -> bool {
        if self.field.width as u32 == width && self.field.height as u32 == height {
            return false;
        }
        log::info!("viewport resized to {width}x{height}");
        self.field.resize(width, height, &mut self.rng);
        self.totals = StepStats::default();
        true
    }

    /// Validates `cfg` and, if it is usable, rebuilds the field with it.
    ///
    /// ### Returns
    /// `true` if the field was rebuilt.
    fn apply_config(&mut self) -> bool {
        let problems = self.cfg.validate();
        if !problems.is_empty() {
            log::warn!("config rejected: {}", problems.join("; "));
            self.message = Some(problems.join("\n"));
            return false;
        }
        self.field.reconfigure(self.cfg.clone(), &mut self.rng);
        self.totals = StepStats::default();
        self.message = None;
        true
    }

    fn save_config(&mut self) {
        let path = self
            .config_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("neural_pulse.json"));
        self.message = Some(match crate::config_file::save(&self.cfg, &path) {
            Ok(()) => {
                log::info!("config saved to {}", path.display());
                format!("saved to {}", path.display())
            }
            Err(err) => {
                log::warn!("{err:#}");
                format!("{err:#}")
            }
        });
    }

    /// Advances the simulation by a single frame.
    fn step_once(&mut self) {
        let stats = phases::step(&mut self.field, self.pointer, &mut self.rng);
        self.totals.fired += stats.fired;
        self.totals.completed += stats.completed;
        self.last_stats = stats;
    }

    /// Switches the interaction mode, rebuilding the field.
    ///
    /// If the rest of the edited config is rejected, the previous mode is
    /// kept so the selector keeps matching the running field.
    fn switch_mode(&mut self, mode: Mode) {
        if mode == self.field.cfg.mode && mode == self.cfg.mode {
            return;
        }
        let before = self.cfg.mode;
        self.cfg.mode = mode;
        if !self.apply_config() {
            self.cfg.mode = before;
        }
    }

    /// Fires a pulse from the particle nearest to `pos`, if one is close enough.
    fn fire_at(&mut self, pos: Vec2) -> bool {
        match self.field.nearest_particle(pos, PICK_RADIUS) {
            Some(id) => self.field.fire_pulse(id, &mut self.rng),
            None => false,
        }
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (run controls, stepping, mode).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                if ui.button("Step").clicked() {
                    self.step_once();
                }

                if ui.button("Reinitialize").clicked() {
                    self.apply_config();
                }

                ui.separator();
                ui.label("Mode:");
                let mut mode = self.field.cfg.mode;
                ui.selectable_value(&mut mode, Mode::Pulse, "Pulse");
                ui.selectable_value(&mut mode, Mode::Repulsion, "Repulsion");
                if mode != self.field.cfg.mode {
                    self.switch_mode(mode);
                }
            });
        });
    }

    /// Builds the bottom status bar (frame time, counts).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt = {:.3} s", self.last_frame_dt));
                ui.separator();
                ui.label(format!("particles = {}", self.field.particles.len()));
                ui.label(format!("edges = {}", self.lines_drawn));
                ui.label(format!("pulses = {}", self.field.pulses.len()));
                ui.label(format!("touched = {}", self.last_stats.touched));
                ui.separator();
                ui.label(format!("completed = {}", self.totals.completed));
                ui.label(format!("fired = {}", self.totals.fired));
            });
        });
    }

    /// Builds the right-hand configuration panel.
    ///
    /// Values that only affect motion and pulses are copied into the live
    /// field immediately; those that shape initialization take effect on
    /// "Apply".
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                ui.separator();
                ui.label("Layout (apply to rebuild)");
                Self::labeled_drag_f32(
                    ui,
                    "density_divisor:",
                    &mut self.cfg.density_divisor,
                    500.0..=50000.0,
                    100.0,
                );
                Self::labeled_drag_f32(
                    ui,
                    "connect_distance:",
                    &mut self.cfg.connect_distance,
                    0.0..=400.0,
                    1.0,
                );
                Self::labeled_drag_f32(ui, "size_min:", &mut self.cfg.size_min, 0.1..=10.0, 0.1);
                Self::labeled_drag_f32(ui, "size_max:", &mut self.cfg.size_max, 0.1..=10.0, 0.1);
                Self::labeled_drag_f32(
                    ui,
                    "max_velocity:",
                    &mut self.cfg.max_velocity,
                    0.0..=10.0,
                    0.05,
                );

                ui.separator();
                ui.label("Interaction");
                Self::labeled_drag_f32(
                    ui,
                    "interaction_radius:",
                    &mut self.cfg.interaction_radius,
                    0.0..=500.0,
                    1.0,
                );
                Self::labeled_drag_f32(
                    ui,
                    "return_fraction:",
                    &mut self.cfg.return_fraction,
                    0.0..=1.0,
                    0.005,
                );
                Self::labeled_drag_f32(
                    ui,
                    "repel_step:",
                    &mut self.cfg.repel_step,
                    0.0..=20.0,
                    0.1,
                );

                ui.separator();
                ui.label("Pulses");
                Self::labeled_drag_f32(
                    ui,
                    "pulse_speed:",
                    &mut self.cfg.pulse_speed,
                    0.001..=1.0,
                    0.005,
                );
                Self::labeled_drag_f32(
                    ui,
                    "propagation:",
                    &mut self.cfg.propagation_probability,
                    0.0..=1.0,
                    0.01,
                );
                Self::labeled_drag_f32(
                    ui,
                    "touch:",
                    &mut self.cfg.touch_pulse_probability,
                    0.0..=1.0,
                    0.005,
                );
                Self::labeled_drag_f32(
                    ui,
                    "spontaneous:",
                    &mut self.cfg.spontaneous_probability,
                    0.0..=1.0,
                    0.005,
                );

                self.sync_live_settings();

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Apply").clicked() {
                        self.apply_config();
                    }
                    if ui.button("Defaults").clicked() {
                        self.cfg = Config {
                            mode: self.cfg.mode,
                            ..Config::default()
                        };
                        self.apply_config();
                    }
                    if ui.button("Save").clicked() {
                        self.save_config();
                    }
                });

                if let Some(msg) = &self.message {
                    ui.separator();
                    ui.label(msg.as_str());
                }
            });
    }

    /// Copies the settings that do not require a rebuild into the live field.
    fn sync_live_settings(&mut self) {
        let live = &mut self.field.cfg;
        live.interaction_radius = self.cfg.interaction_radius;
        live.return_fraction = self.cfg.return_fraction;
        live.repel_step = self.cfg.repel_step;
        live.pulse_speed = self.cfg.pulse_speed;
        live.propagation_probability = self.cfg.propagation_probability;
        live.touch_pulse_probability = self.cfg.touch_pulse_probability;
        live.spontaneous_probability = self.cfg.spontaneous_probability;
    }

    /// Builds the central panel: resizes, steps and draws the field.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let response = ui.allocate_response(ui.available_size(), egui::Sense::click());
                let rect = response.rect;

                self.ensure_size(rect.width().round() as u32, rect.height().round() as u32);

                self.pointer = Pointer(
                    response
                        .hover_pos()
                        .map(|p| Vec2::new(p.x - rect.min.x, p.y - rect.min.y)),
                );

                if response.clicked() {
                    if let Some(pos) = self.pointer.pos() {
                        self.fire_at(pos);
                    }
                }

                if self.running {
                    let now = ctx.input(|i| i.time);
                    if self.last_frame_time > 0.0 {
                        self.last_frame_dt = now - self.last_frame_time;
                    }
                    self.last_frame_time = now;

                    self.step_once();
                    ctx.request_repaint();
                }

                let painter = ui.painter_at(rect);
                let mut surface = PainterSurface {
                    painter: &painter,
                    rect,
                };
                self.lines_drawn = render::render(&self.field, &mut surface);
            });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_size_populates_the_field() {
        let mut viewer = Viewer::new(Config::default(), None);
        assert!(viewer.field.particles.is_empty());

        assert!(viewer.ensure_size(800, 600));

        assert_eq!(viewer.field.particles.len(), 60);
        assert!(viewer.field.pulses.is_empty());
    }

    #[test]
    fn same_size_does_not_rebuild() {
        let mut viewer = Viewer::new(Config::default(), None);
        viewer.ensure_size(800, 600);
        let before: Vec<Vec2> = viewer.field.particles.iter().map(|p| p.base).collect();

        assert!(!viewer.ensure_size(800, 600));

        let after: Vec<Vec2> = viewer.field.particles.iter().map(|p| p.base).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn resize_clears_pulses() {
        let mut viewer = Viewer::new(Config::default(), None);
        viewer.ensure_size(800, 600);
        while viewer.field.pulses.is_empty() {
            viewer.field.fire_random_pulse(&mut viewer.rng);
        }

        assert!(viewer.ensure_size(1024, 768));

        assert!(viewer.field.pulses.is_empty());
        assert_eq!(viewer.field.particles.len(), 99);
    }

    #[test]
    fn invalid_config_keeps_current_field() {
        let mut viewer = Viewer::new(Config::default(), None);
        viewer.ensure_size(800, 600);

        viewer.cfg.density_divisor = 0.0;
        viewer.apply_config();

        assert!(viewer.message.is_some());
        assert_eq!(viewer.field.particles.len(), 60);
        assert_eq!(viewer.field.cfg.density_divisor, 8000.0);
    }

    #[test]
    fn switching_mode_rebuilds_without_graph() {
        let mut viewer = Viewer::new(Config::default(), None);
        viewer.ensure_size(800, 600);

        viewer.cfg.mode = Mode::Repulsion;
        viewer.apply_config();

        assert_eq!(viewer.field.cfg.mode, Mode::Repulsion);
        assert_eq!(viewer.field.edges, 0);
        assert_eq!(viewer.field.particles.len(), 60);
    }

    #[test]
    fn live_settings_reach_the_field_without_rebuild() {
        let mut viewer = Viewer::new(Config::default(), None);
        viewer.ensure_size(800, 600);
        let first = viewer.field.particles[0].base;

        viewer.cfg.pulse_speed = 0.2;
        viewer.cfg.density_divisor = 4000.0;
        viewer.sync_live_settings();

        assert_eq!(viewer.field.cfg.pulse_speed, 0.2);
        assert_eq!(viewer.field.cfg.density_divisor, 8000.0);
        assert_eq!(viewer.field.particles[0].base, first);
    }

    #[test]
    fn rejected_mode_switch_keeps_both_modes_in_sync() {
        let mut viewer = Viewer::new(Config::default(), None);
        viewer.ensure_size(800, 600);
        viewer.cfg.density_divisor = 0.0;

        viewer.switch_mode(Mode::Repulsion);

        assert!(viewer.message.is_some());
        assert_eq!(viewer.cfg.mode, Mode::Pulse);
        assert_eq!(viewer.field.cfg.mode, Mode::Pulse);

        viewer.cfg.density_divisor = 8000.0;
        viewer.switch_mode(Mode::Repulsion);

        assert_eq!(viewer.cfg.mode, Mode::Repulsion);
        assert_eq!(viewer.field.cfg.mode, Mode::Repulsion);
    }

    #[test]
    fn step_once_accumulates_pulse_totals() {
        let mut viewer = Viewer::new(
            Config {
                spontaneous_probability: 1.0,
                propagation_probability: 0.0,
                touch_pulse_probability: 0.0,
                ..Config::default()
            },
            None,
        );
        viewer.ensure_size(800, 600);

        for _ in 0..40 {
            viewer.step_once();
        }

        assert!(viewer.totals.fired > 0);
        assert!(viewer.totals.completed > 0);
        assert!(viewer.totals.completed <= viewer.totals.fired);

        viewer.ensure_size(640, 480);
        assert_eq!(viewer.totals, StepStats::default());
    }

    #[test]
    fn step_once_with_absent_pointer_touches_nothing() {
        let mut viewer = Viewer::new(Config::default(), None);
        viewer.ensure_size(800, 600);

        viewer.step_once();

        assert_eq!(viewer.last_stats.touched, 0);
    }
}
