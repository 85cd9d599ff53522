//! Tuning for every controller, loaded from one JSON file.
//!
//! Any section or field left out of the file keeps its default value, so an
//! empty object `{}` is a complete configuration.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::camera::CameraConfig;
use crate::player::PlayerConfig;
use crate::walker::WalkerConfig;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub player: PlayerConfig,
    pub walker: WalkerConfig,
    pub camera: CameraConfig,
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
    parse_config(&raw).map_err(|e| format!("{e} ({})", path.display()))
}

pub fn parse_config(raw: &str) -> Result<GameConfig, String> {
    let config: GameConfig =
        serde_json::from_str(raw).map_err(|e| format!("Failed to parse config JSON: {e}"))?;
    config.player.validate()?;
    config.walker.validate()?;
    config.camera.validate()?;
    Ok(config)
}
