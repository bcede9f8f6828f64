//! Loading and saving [`Config`] as JSON.

use std::{fs, path::Path};

use anyhow::{Context, bail};
use field_core::config::Config;

/// Reads a config file. Missing keys fall back to their defaults.
///
/// ### Returns
/// - `Ok(cfg)` if the file parses and passes [`Config::validate`].
/// - `Err` on I/O, parse, or validation failure.
pub fn load(path: &Path) -> anyhow::Result<Config> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: Config = serde_json::from_str(&json)
        .with_context(|| format!("parsing config {}", path.display()))?;

    let problems = cfg.validate();
    if !problems.is_empty() {
        bail!("invalid config {}: {}", path.display(), problems.join("; "));
    }
    Ok(cfg)
}

pub fn save(cfg: &Config, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(cfg)?;
    fs::write(path, json).with_context(|| format!("writing config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use field_core::config::Mode;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("neural_pulse_{}_{name}.json", std::process::id()))
    }

    #[test]
    fn save_then_load_preserves_values() {
        let path = temp_path("roundtrip");
        let cfg = Config {
            mode: Mode::Repulsion,
            pulse_speed: 0.1,
            ..Config::default()
        };

        save(&cfg, &path).unwrap();
        let loaded = load(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let path = temp_path("partial");
        fs::write(&path, r#"{ "mode": "Repulsion", "density_divisor": 9000.0 }"#).unwrap();

        let loaded = load(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded.mode, Mode::Repulsion);
        assert_eq!(loaded.density_divisor, 9000.0);
        assert_eq!(loaded.pulse_speed, Config::default().pulse_speed);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let path = temp_path("invalid");
        fs::write(&path, r#"{ "density_divisor": 0.0 }"#).unwrap();

        let err = load(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert!(err.to_string().contains("density_divisor"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load(Path::new("/definitely/not/here.json")).is_err());
    }
}
