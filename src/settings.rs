use crate::dots::model::{
    SpawnRanges, DEFAULT_DOT_COUNT, DEFAULT_OPACITY_RANGE, DEFAULT_RADIUS_RANGE,
    DEFAULT_SPEED_RANGE,
};
use crate::hotkey::{parse_hotkey, Hotkey, DEFAULT_EXIT_HOTKEY};
use anyhow::{bail, Context};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that points at an explicit settings file.
pub const SETTINGS_ENV: &str = "MOVING_DOTS_SETTINGS";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OverlaySettings {
    /// Number of dots; fixed for the lifetime of the overlay.
    #[serde(default = "default_dot_count")]
    pub dot_count: usize,
    /// Inclusive speed range in points per second.
    #[serde(default = "default_speed_range")]
    pub speed_range: (f32, f32),
    #[serde(default = "default_radius_range")]
    pub radius_range: (f32, f32),
    #[serde(default = "default_opacity_range")]
    pub opacity_range: (f32, f32),
    /// Target interval between ticks. Best effort.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_exit_hotkey")]
    pub exit_hotkey: String,
    /// Seed for the dot layout. When `None` the OS entropy source is used.
    #[serde(default)]
    pub seed: Option<u64>,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Mirror log output into this file.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_dot_count() -> usize {
    DEFAULT_DOT_COUNT
}

fn default_speed_range() -> (f32, f32) {
    DEFAULT_SPEED_RANGE
}

fn default_radius_range() -> (f32, f32) {
    DEFAULT_RADIUS_RANGE
}

fn default_opacity_range() -> (f32, f32) {
    DEFAULT_OPACITY_RANGE
}

fn default_tick_interval_ms() -> u64 {
    16
}

fn default_exit_hotkey() -> String {
    DEFAULT_EXIT_HOTKEY.to_string()
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            dot_count: default_dot_count(),
            speed_range: default_speed_range(),
            radius_range: default_radius_range(),
            opacity_range: default_opacity_range(),
            tick_interval_ms: default_tick_interval_ms(),
            exit_hotkey: default_exit_hotkey(),
            seed: None,
            debug_logging: false,
            log_file: None,
        }
    }
}

impl OverlaySettings {
    /// Read settings from `path`. A missing or empty file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("cannot read settings file {}", path.display()))
            }
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_json::from_str(&content)
            .with_context(|| format!("invalid settings file {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load_default() -> anyhow::Result<Self> {
        match default_settings_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        check_range("speed_range", self.speed_range)?;
        check_range("radius_range", self.radius_range)?;
        check_range("opacity_range", self.opacity_range)?;
        if self.opacity_range.1 > 1.0 {
            bail!("opacity_range must not exceed 1.0");
        }
        if self.tick_interval_ms == 0 {
            bail!("tick_interval_ms must be at least 1");
        }
        Ok(())
    }

    pub fn spawn_ranges(&self) -> SpawnRanges {
        SpawnRanges {
            speed: self.speed_range,
            radius: self.radius_range,
            opacity: self.opacity_range,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn exit_hotkey(&self) -> Hotkey {
        match parse_hotkey(&self.exit_hotkey) {
            Some(k) => k,
            None => {
                tracing::warn!(
                    "provided hotkey string '{}' is invalid; using default {}",
                    self.exit_hotkey,
                    DEFAULT_EXIT_HOTKEY
                );
                Hotkey::default()
            }
        }
    }
}

fn check_range(name: &str, (min, max): (f32, f32)) -> anyhow::Result<()> {
    if !min.is_finite() || !max.is_finite() {
        bail!("{name} must be finite");
    }
    if min < 0.0 {
        bail!("{name} must not be negative");
    }
    if min > max {
        bail!("{name} minimum {min} exceeds maximum {max}");
    }
    Ok(())
}

/// `$MOVING_DOTS_SETTINGS`, otherwise `<config dir>/moving_dots/settings.json`.
pub fn default_settings_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(SETTINGS_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs_next::config_dir().map(|dir| dir.join("moving_dots").join("settings.json"))
}
