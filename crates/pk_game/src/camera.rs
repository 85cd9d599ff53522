//! Follow camera with look-ahead, level bounds, eased zoom and screen shake.
//!
//! Per rendered frame, `update` runs in this order:
//!
//!   1. zoom tween
//!   2. shake decay (writes `offset`, which is applied on top of `position`)
//!   3. smooth follow toward the target plus the look-ahead offset
//!   4. look-ahead easing toward the held direction
//!   5. optional clamp of `position` to the level bounds
//!
//! There is no global camera. Code that wants to trigger camera effects is
//! handed an [`ActiveCamera`], which owns at most one camera at a time.

use std::collections::HashMap;

use glam::Vec2;
use serde::Deserialize;

use pk_core::input::{Action, InputState};
use pk_core::math::{ease_out_quad, smooth_damp, smooth_damp_vec2};
use pk_core::noise::ValueNoise;

use crate::collision::TileLayer;
use crate::level::TileMap;

pub const MIN_ZOOM: f32 = 0.01;

/// Handle for anything the camera can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u32);

/// Position lookup for follow targets.
pub trait TargetPositions {
    fn position_of(&self, id: EntityId) -> Option<Vec2>;
}

impl TargetPositions for HashMap<EntityId, Vec2> {
    fn position_of(&self, id: EntityId) -> Option<Vec2> {
        self.get(&id).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub viewport: Vec2,
    pub smooth_time: f32,
    pub lock_y_axis: bool,
    /// Vertical distance the target must move before the camera follows in Y.
    pub y_follow_threshold: f32,

    pub enable_look_ahead: bool,
    pub max_look_ahead: f32,
    pub look_ahead_smooth_time: f32,

    pub enable_boundary_limit: bool,
    pub level_min_bounds: Vec2,
    pub level_max_bounds: Vec2,
    pub main_layer_name: String,

    pub default_shake_strength: f32,
    pub default_shake_duration: f32,
    pub shake_frequency: f32,
    pub shake_seed: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            viewport: Vec2::new(1280.0, 720.0),
            smooth_time: 0.12,
            lock_y_axis: true,
            y_follow_threshold: 200.0,
            enable_look_ahead: true,
            max_look_ahead: 120.0,
            look_ahead_smooth_time: 0.2,
            enable_boundary_limit: false,
            level_min_bounds: Vec2::ZERO,
            level_max_bounds: Vec2::ZERO,
            main_layer_name: "Ground".to_string(),
            default_shake_strength: 8.0,
            default_shake_duration: 0.2,
            shake_frequency: 35.0,
            shake_seed: 1337,
        }
    }
}

impl CameraConfig {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return Err("Camera config validation failed: viewport must be positive".to_string());
        }
        if self.default_shake_duration <= 0.0 {
            return Err(
                "Camera config validation failed: default_shake_duration must be > 0".to_string(),
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShakePreset {
    Light,
    Medium,
    Heavy,
}

impl ShakePreset {
    /// `(strength, duration)` in pixels and seconds.
    pub fn params(self) -> (f32, f32) {
        match self {
            Self::Light => (4.0, 0.1),
            Self::Medium => (12.0, 0.25),
            Self::Heavy => (25.0, 0.4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ZoomTween {
    from: Vec2,
    to: Vec2,
    elapsed: f32,
    duration: f32,
}

/// Clamp a camera center so the viewport stays inside the level.
///
/// Bounds may be given in either order. When the viewport is larger than the
/// level on an axis, the inverted range is re-ordered instead of rejected.
pub fn clamp_to_bounds(position: Vec2, min: Vec2, max: Vec2, viewport_half: Vec2) -> Vec2 {
    let safe_min = min.min(max);
    let safe_max = min.max(max);

    let lo = safe_min + viewport_half;
    let hi = safe_max - viewport_half;

    position.clamp(lo.min(hi), lo.max(hi))
}

#[derive(Debug, Clone)]
pub struct CameraController {
    pub config: CameraConfig,
    pub follow_target: Option<EntityId>,

    pub position: Vec2,
    /// Shake offset, applied on top of `position`.
    pub offset: Vec2,
    pub zoom: Vec2,

    follow_velocity: Vec2,
    look_ahead: Vec2,
    look_ahead_velocity: f32,

    shake_timer: f32,
    shake_duration: f32,
    shake_strength: f32,
    noise_time: f32,
    noise_x: ValueNoise,
    noise_y: ValueNoise,

    zoom_tween: Option<ZoomTween>,
}

impl CameraController {
    pub fn new(config: CameraConfig) -> Self {
        let noise_x = ValueNoise::new(config.shake_seed, config.shake_frequency);
        let noise_y = ValueNoise::new(config.shake_seed.wrapping_add(1), config.shake_frequency);
        Self {
            config,
            follow_target: None,
            position: Vec2::ZERO,
            offset: Vec2::ZERO,
            zoom: Vec2::ONE,
            follow_velocity: Vec2::ZERO,
            look_ahead: Vec2::ZERO,
            look_ahead_velocity: 0.0,
            shake_timer: 0.0,
            shake_duration: 0.0,
            shake_strength: 0.0,
            noise_time: 0.0,
            noise_x,
            noise_y,
            zoom_tween: None,
        }
    }

    pub fn update(&mut self, dt: f32, input: &InputState, targets: &impl TargetPositions) {
        self.process_zoom(dt);
        self.process_shake(dt);

        let target = self.follow_target.and_then(|id| targets.position_of(id));
        if let Some(target) = target {
            self.process_follow(dt, target);
            self.process_look_ahead(dt, input);
        }

        if self.config.enable_boundary_limit {
            self.position = clamp_to_bounds(
                self.position,
                self.config.level_min_bounds,
                self.config.level_max_bounds,
                self.viewport_half(),
            );
        }
    }

    /// Where the view is centered this frame, shake included.
    pub fn view_center(&self) -> Vec2 {
        self.position + self.offset
    }

    /// Half of the visible world area at the current zoom.
    pub fn viewport_half(&self) -> Vec2 {
        self.config.viewport / self.zoom.max(Vec2::splat(MIN_ZOOM)) / 2.0
    }

    pub fn look_ahead(&self) -> Vec2 {
        self.look_ahead
    }

    pub fn shake_strength(&self) -> f32 {
        self.shake_strength
    }

    pub fn is_shaking(&self) -> bool {
        self.shake_timer > 0.0
    }

    fn process_follow(&mut self, dt: f32, target: Vec2) {
        let mut target = target;
        if self.config.lock_y_axis
            || (target.y - self.position.y).abs() < self.config.y_follow_threshold
        {
            target.y = self.position.y;
        }

        self.position = smooth_damp_vec2(
            self.position,
            target + self.look_ahead,
            &mut self.follow_velocity,
            self.config.smooth_time,
            f32::MAX,
            dt,
        );
    }

    fn process_look_ahead(&mut self, dt: f32, input: &InputState) {
        if !self.config.enable_look_ahead {
            return;
        }

        let target_x = if input.is_held(Action::MoveRight) {
            self.config.max_look_ahead
        } else if input.is_held(Action::MoveLeft) {
            -self.config.max_look_ahead
        } else {
            0.0
        };

        self.look_ahead.x = smooth_damp(
            self.look_ahead.x,
            target_x,
            &mut self.look_ahead_velocity,
            self.config.look_ahead_smooth_time,
            f32::MAX,
            dt,
        );
    }

    fn process_shake(&mut self, dt: f32) {
        if self.shake_timer <= 0.0 {
            self.offset = Vec2::ZERO;
            return;
        }

        self.shake_timer -= dt;
        self.noise_time += dt * 60.0;

        let remaining = (self.shake_timer / self.shake_duration).max(0.0);
        let strength = self.shake_strength * remaining;
        self.offset = Vec2::new(
            self.noise_x.sample(self.noise_time),
            self.noise_y.sample(self.noise_time),
        ) * strength;

        if self.shake_timer <= 0.0 {
            self.offset = Vec2::ZERO;
            self.shake_strength = 0.0;
        }
    }

    fn process_zoom(&mut self, dt: f32) {
        let Some(tween) = self.zoom_tween.as_mut() else {
            return;
        };
        tween.elapsed += dt.max(0.0);
        let t = tween.elapsed / tween.duration;
        if t >= 1.0 {
            self.zoom = tween.to;
            self.zoom_tween = None;
        } else {
            self.zoom = tween.from + (tween.to - tween.from) * ease_out_quad(t);
        }
    }

    /// Start a shake; `None` falls back to the configured defaults.
    pub fn trigger_shake(&mut self, strength: Option<f32>, duration: Option<f32>) {
        self.shake_strength = strength.unwrap_or(self.config.default_shake_strength);
        self.shake_timer = duration.unwrap_or(self.config.default_shake_duration);
        self.shake_duration = self.shake_timer;
        self.noise_time = 0.0;
    }

    pub fn trigger_preset(&mut self, preset: ShakePreset) {
        let (strength, duration) = preset.params();
        self.trigger_shake(Some(strength), Some(duration));
    }

    pub fn trigger_light_shake(&mut self) {
        self.trigger_preset(ShakePreset::Light);
    }

    pub fn trigger_medium_shake(&mut self) {
        self.trigger_preset(ShakePreset::Medium);
    }

    pub fn trigger_heavy_shake(&mut self) {
        self.trigger_preset(ShakePreset::Heavy);
    }

    /// Ease toward `target` zoom over `duration` seconds (quadratic ease-out).
    pub fn set_zoom(&mut self, target: Vec2, duration: f32) {
        let target = target.max(Vec2::splat(MIN_ZOOM));
        if duration <= 0.0 {
            self.zoom = target;
            self.zoom_tween = None;
            return;
        }
        self.zoom_tween = Some(ZoomTween {
            from: self.zoom,
            to: target,
            elapsed: 0.0,
            duration,
        });
    }

    pub fn set_follow_target(&mut self, target: Option<EntityId>) {
        self.follow_target = target;
    }

    pub fn set_level_bounds(&mut self, min: Vec2, max: Vec2) {
        self.config.level_min_bounds = min;
        self.config.level_max_bounds = max;
    }

    /// Jump straight to `position` and forget any smoothing momentum.
    pub fn reset_smoothing(&mut self, position: Vec2) {
        self.position = position;
        self.follow_velocity = Vec2::ZERO;
        self.look_ahead = Vec2::ZERO;
        self.look_ahead_velocity = 0.0;
    }

    /// Derive level bounds from the main tile layer's used cells.
    ///
    /// Falls back to the map's first layer when the named one is missing.
    /// Returns false (and leaves the bounds alone) when there is nothing usable.
    pub fn try_auto_bounds(&mut self, map: Option<&TileMap>) -> bool {
        let Some(map) = map else {
            log::warn!("Auto bounds skipped: no tile map available");
            return false;
        };
        let Some(layer) = map.main_layer(&self.config.main_layer_name) else {
            log::warn!("Auto bounds skipped: tile map has no layers");
            return false;
        };

        let rect = layer.used_rect();
        if rect.is_empty() {
            log::warn!("Auto bounds skipped: layer '{}' has no tiles", layer.name);
            return false;
        }

        let cell = layer.cell_size();
        let origin = layer.origin();
        let top_left = origin + Vec2::new(rect.x as f32, rect.y as f32) * cell;
        let bottom_right = origin + Vec2::new(rect.end_x() as f32, rect.end_y() as f32) * cell;

        self.config.level_min_bounds = top_left.min(bottom_right);
        self.config.level_max_bounds = top_left.max(bottom_right);
        log::info!(
            "Auto bounds set from layer '{}': min={:?} max={:?}",
            layer.name,
            self.config.level_min_bounds,
            self.config.level_max_bounds
        );
        true
    }
}

/// Owner of the one camera currently driving the view.
///
/// Installing a camera displaces the previous one, which is handed back to the
/// caller. Effect triggers on an empty handle do nothing.
#[derive(Debug, Default)]
pub struct ActiveCamera {
    current: Option<CameraController>,
}

impl ActiveCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&mut self, camera: CameraController) -> Option<CameraController> {
        let previous = self.current.replace(camera);
        if previous.is_some() {
            log::info!("Active camera replaced");
        } else {
            log::info!("Active camera installed");
        }
        previous
    }

    pub fn release(&mut self) -> Option<CameraController> {
        self.current.take()
    }

    pub fn get(&self) -> Option<&CameraController> {
        self.current.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut CameraController> {
        self.current.as_mut()
    }

    pub fn trigger_shake(&mut self, strength: Option<f32>, duration: Option<f32>) {
        match self.current.as_mut() {
            Some(camera) => camera.trigger_shake(strength, duration),
            None => log::debug!("Shake requested with no active camera"),
        }
    }

    pub fn shake(&mut self, preset: ShakePreset) {
        match self.current.as_mut() {
            Some(camera) => camera.trigger_preset(preset),
            None => log::debug!("Shake {:?} requested with no active camera", preset),
        }
    }
}
