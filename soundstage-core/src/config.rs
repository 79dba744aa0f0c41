use std::path::{Path, PathBuf};

use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    limits: LimitsConfig,
    #[serde(default)]
    trajectory: TrajectoryConfig,
    #[serde(default)]
    live_input: LiveInputConfig,
    #[serde(default)]
    gesture: GestureConfig,
}

#[derive(Deserialize, Default)]
struct LimitsConfig {
    max_asset_kb: Option<u64>,
    undo_depth: Option<usize>,
}

#[derive(Deserialize, Default)]
struct TrajectoryConfig {
    default_movement_speed: Option<f32>,
}

#[derive(Deserialize, Default)]
struct LiveInputConfig {
    sample_rate: Option<u32>,
    reduced_constraints: Option<bool>,
}

#[derive(Deserialize, Default)]
struct GestureConfig {
    drag_pixels_per_unit: Option<f32>,
}

pub struct Config {
    limits: LimitsConfig,
    trajectory: TrajectoryConfig,
    live_input: LiveInputConfig,
    gesture: GestureConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::load_with_user_file(None)
    }
}

impl Config {
    /// Embedded defaults overlaid with `~/.config/soundstage/config.toml`.
    pub fn load() -> Self {
        Self::load_with_user_file(user_config_path().as_deref())
    }

    pub fn load_with_user_file(path: Option<&Path>) -> Self {
        let mut base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");

        if let Some(path) = path {
            if path.exists() {
                match std::fs::read_to_string(path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => merge(&mut base, user),
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        Config {
            limits: base.limits,
            trajectory: base.trajectory,
            live_input: base.live_input,
            gesture: base.gesture,
        }
    }

    /// Asset size ceiling in (rounded) kilobytes.
    pub fn max_asset_kb(&self) -> u64 {
        self.limits.max_asset_kb.unwrap_or(51_200)
    }

    /// Undo stack depth, at least 1.
    pub fn undo_depth(&self) -> usize {
        self.limits.undo_depth.unwrap_or(64).max(1)
    }

    pub fn default_movement_speed(&self) -> f32 {
        self.trajectory
            .default_movement_speed
            .unwrap_or(0.5)
            .clamp(soundstage_types::bounds::SPEED_MIN, soundstage_types::bounds::SPEED_MAX)
    }

    pub fn sample_rate(&self) -> u32 {
        self.live_input.sample_rate.unwrap_or(44_100)
    }

    /// `Some(true)` forces the reduced constraint set, `Some(false)` forbids
    /// it, `None` leaves it to user-agent detection.
    pub fn reduced_constraints(&self) -> Option<bool> {
        self.live_input.reduced_constraints
    }

    pub fn drag_pixels_per_unit(&self) -> f32 {
        let v = self.gesture.drag_pixels_per_unit.unwrap_or(1.0);
        if v.is_finite() && v > 0.0 {
            v
        } else {
            1.0
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("soundstage").join("config.toml"))
}

fn merge(base: &mut ConfigFile, user: ConfigFile) {
    if user.limits.max_asset_kb.is_some() {
        base.limits.max_asset_kb = user.limits.max_asset_kb;
    }
    if user.limits.undo_depth.is_some() {
        base.limits.undo_depth = user.limits.undo_depth;
    }
    if user.trajectory.default_movement_speed.is_some() {
        base.trajectory.default_movement_speed = user.trajectory.default_movement_speed;
    }
    if user.live_input.sample_rate.is_some() {
        base.live_input.sample_rate = user.live_input.sample_rate;
    }
    if user.live_input.reduced_constraints.is_some() {
        base.live_input.reduced_constraints = user.live_input.reduced_constraints;
    }
    if user.gesture.drag_pixels_per_unit.is_some() {
        base.gesture.drag_pixels_per_unit = user.gesture.drag_pixels_per_unit;
    }
}
