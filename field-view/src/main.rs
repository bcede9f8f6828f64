//! Application entry point for the neural pulse viewer.
//!
//! This binary sets up logging and eframe/egui and delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer` module.

mod config_file;
mod viewer;

use std::path::PathBuf;

use field_core::config::Config;
use viewer::Viewer;

/// Starts the native eframe application.
///
/// An optional first argument names a JSON config file. If it cannot be
/// loaded the viewer logs the reason and starts with [`Config::default`].
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = match &config_path {
        Some(path) => config_file::load(path).unwrap_or_else(|err| {
            log::warn!("{err:#}; using default config");
            Config::default()
        }),
        None => Config::default(),
    };
    log::info!("Starting neural pulse viewer ({:?} mode)", cfg.mode);

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Neural Pulse",
        options,
        Box::new(move |_cc| Ok(Box::new(Viewer::new(cfg, config_path)))),
    )
}
