//! Level files and the bootstrap that fits the camera to the playable area.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::Deserialize;

use crate::camera::CameraController;
use crate::collision::{validate_layer_file, CollisionGrid, TileLayer, TileLayerFile};

#[derive(Debug, Deserialize, Clone)]
pub struct LevelFile {
    pub version: String,
    pub level_id: String,
    #[serde(default = "default_ground_layer")]
    pub ground_layer: String,
    pub spawn: Vec2,
    #[serde(default = "default_body_half_extents")]
    pub body_half_extents: Vec2,
    pub layers: Vec<TileLayerFile>,
}

/// Ordered set of tile layers making up a level.
#[derive(Debug, Clone, Default)]
pub struct TileMap {
    layers: Vec<CollisionGrid>,
}

impl TileMap {
    pub fn new(layers: Vec<CollisionGrid>) -> Self {
        Self { layers }
    }

    pub fn layer(&self, name: &str) -> Option<&CollisionGrid> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// The named layer, or the first layer when no layer has that name.
    pub fn main_layer(&self, name: &str) -> Option<&CollisionGrid> {
        self.layer(name).or_else(|| {
            let fallback = self.layers.first();
            if let Some(layer) = fallback {
                log::warn!(
                    "Tile layer '{}' not found; falling back to '{}'",
                    name,
                    layer.name
                );
            }
            fallback
        })
    }

    pub fn layers(&self) -> &[CollisionGrid] {
        &self.layers
    }
}

#[derive(Debug, Clone)]
pub struct Level {
    pub id: String,
    pub ground_layer: String,
    pub spawn: Vec2,
    pub body_half_extents: Vec2,
    pub map: TileMap,
}

impl Level {
    pub fn from_file(file: LevelFile) -> Self {
        Self {
            id: file.level_id,
            ground_layer: file.ground_layer,
            spawn: file.spawn,
            body_half_extents: file.body_half_extents,
            map: TileMap::new(file.layers.into_iter().map(CollisionGrid::from_file).collect()),
        }
    }

    pub fn ground(&self) -> Option<&CollisionGrid> {
        self.map.main_layer(&self.ground_layer)
    }
}

/// Camera limits in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraLimits {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl CameraLimits {
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.left as f32, self.top as f32)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.right as f32, self.bottom as f32)
    }
}

/// Limits covering the layer's used cells minus a one-cell border.
///
/// Returns `None` when the layer is too small to leave anything after the
/// border is removed.
pub fn camera_limits(layer: &impl TileLayer) -> Option<CameraLimits> {
    let rect = layer.used_rect().grow(-1);
    if rect.is_empty() {
        return None;
    }
    let cell = layer.cell_size();
    let origin = layer.origin();
    let top_left = origin + Vec2::new(rect.x as f32, rect.y as f32) * cell;
    let bottom_right = origin + Vec2::new(rect.end_x() as f32, rect.end_y() as f32) * cell;
    Some(CameraLimits {
        left: top_left.x as i32,
        top: top_left.y as i32,
        right: bottom_right.x as i32,
        bottom: bottom_right.y as i32,
    })
}

/// Fit `camera` to the level's ground layer and snap it onto `focus`.
///
/// When the ground layer is missing or too small the camera is left
/// unbounded; it is still snapped so the first frame does not swoop in.
pub fn bootstrap_camera(
    camera: &mut CameraController,
    level: &Level,
    focus: Vec2,
) -> Option<CameraLimits> {
    let limits = level.ground().and_then(|layer| camera_limits(layer));
    match limits {
        Some(limits) => {
            camera.set_level_bounds(limits.min(), limits.max());
            camera.config.enable_boundary_limit = true;
            log::info!(
                "Camera limits for '{}': left={} top={} right={} bottom={}",
                level.id,
                limits.left,
                limits.top,
                limits.right,
                limits.bottom
            );
        }
        None => log::warn!("Level '{}' has no usable ground layer for camera limits", level.id),
    }
    camera.reset_smoothing(focus);
    limits
}

pub fn load_level_from_path(path: &Path) -> Result<Level, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read level file {}: {e}", path.display()))?;
    let file: LevelFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse level JSON {}: {e}", path.display()))?;
    validate_level(&file)?;
    Ok(Level::from_file(file))
}

fn validate_level(file: &LevelFile) -> Result<(), String> {
    if file.version != "0.1" {
        return Err(format!(
            "Level validation failed: unsupported version '{}'",
            file.version
        ));
    }
    if file.layers.is_empty() {
        return Err("Level validation failed: layers array is empty".to_string());
    }
    if file.body_half_extents.x <= 0.0 || file.body_half_extents.y <= 0.0 {
        return Err("Level validation failed: body_half_extents must be > 0".to_string());
    }

    let mut names = HashSet::new();
    for layer in &file.layers {
        if !names.insert(layer.name.as_str()) {
            return Err(format!(
                "Level validation failed: duplicate layer name '{}'",
                layer.name
            ));
        }
        validate_layer_file(layer)?;
    }
    Ok(())
}

fn default_ground_layer() -> String {
    "Ground".to_string()
}

fn default_body_half_extents() -> Vec2 {
    Vec2::new(6.0, 12.0)
}
