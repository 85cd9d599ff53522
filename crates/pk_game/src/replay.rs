//! Scripted input replays and the headless session that plays them back.
//!
//! A replay is a list of frames, each holding a set of actions for `repeat`
//! fixed ticks. Playback drives the same fixed-step loop a game would: the
//! controller steps on every fixed tick, the camera once per render frame.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::Deserialize;

use pk_core::animation::{AnimationFile, SpritePlayer};
use pk_core::input::{Action, InputState};
use pk_core::time::TimeState;

use crate::camera::{ActiveCamera, CameraController, EntityId, ShakePreset};
use crate::collision::{Aabb, GridBody, MotionBody};
use crate::config::GameConfig;
use crate::level::{bootstrap_camera, Level};
use crate::player::PlayerController;
use crate::walker::{walker_clip_name, WalkerController};

const PLAYER_ENTITY: EntityId = EntityId(1);

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    #[default]
    Platformer,
    Walker,
}

/// Camera effect fired on the first tick of a frame.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(tag = "cue", rename_all = "snake_case")]
pub enum CameraCue {
    Shake { preset: ShakePreset },
    Zoom { level: f32, duration: f32 },
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFile {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    /// Render frame delta; defaults to `fixed_dt` (one tick per frame).
    #[serde(default)]
    pub render_dt: Option<f32>,
    #[serde(default)]
    pub controller: ControllerKind,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub hold: Vec<Action>,
    /// Analog horizontal axis; negative drives `move_left`, positive `move_right`.
    #[serde(default)]
    pub move_x: f32,
    #[serde(default)]
    pub camera: Option<CameraCue>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

/// Action strengths for a single fixed tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickInput {
    pub strengths: HashMap<Action, f32>,
    pub camera: Option<CameraCue>,
}

impl TickInput {
    /// Bring `input` in line with this tick: newly held actions are pressed,
    /// dropped ones released, so edge queries fire only on transitions.
    pub fn apply_to(&self, input: &mut InputState) {
        for &action in Action::ALL {
            match self.strengths.get(&action) {
                Some(&strength) => input.press_with_strength(action, strength),
                None => input.release(action),
            }
        }
    }
}

impl ReplayFile {
    pub fn expanded_inputs(&self) -> Vec<TickInput> {
        let mut out = Vec::new();
        for frame in &self.frames {
            let mut strengths = HashMap::new();
            for &action in &frame.hold {
                strengths.insert(action, 1.0);
            }
            let move_x = frame.move_x.clamp(-1.0, 1.0);
            if move_x > 0.0 {
                strengths.insert(Action::MoveRight, move_x);
            } else if move_x < 0.0 {
                strengths.insert(Action::MoveLeft, -move_x);
            }

            for i in 0..frame.repeat.max(1) {
                out.push(TickInput {
                    strengths: strengths.clone(),
                    camera: if i == 0 { frame.camera } else { None },
                });
            }
        }
        out
    }

    pub fn render_dt(&self) -> f32 {
        self.render_dt.unwrap_or(self.fixed_dt)
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplayFile, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read replay file {}: {e}", path.display()))?;
    let replay: ReplayFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplayFile) -> Result<(), String> {
    if replay.fixed_dt <= 0.0 {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.render_dt.is_some_and(|dt| dt <= 0.0) {
        return Err("Replay validation failed: render_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}

enum Actor {
    Platformer(PlayerController),
    Walker(WalkerController),
}

impl Actor {
    fn new(kind: ControllerKind, config: &GameConfig, animator: &SpritePlayer) -> Self {
        match kind {
            ControllerKind::Platformer => {
                Self::Platformer(PlayerController::new(config.player, animator))
            }
            ControllerKind::Walker => Self::Walker(WalkerController::new(config.walker, animator)),
        }
    }

    /// Step one tick; returns the state label and whether the actor is airborne.
    fn step(
        &mut self,
        input: &InputState,
        dt: f32,
        body: &mut impl MotionBody,
        animator: &mut SpritePlayer,
    ) -> (String, bool) {
        match self {
            Self::Platformer(player) => {
                let state = player.step(input, dt, body, animator);
                (state.animation_name().to_string(), state.is_airborne())
            }
            Self::Walker(walker) => {
                let motion = walker.step(input, dt, body, animator);
                (walker_clip_name(motion, walker.weapon), false)
            }
        }
    }
}

/// Summary of a finished playback.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    pub fixed_steps: u64,
    pub render_frames: u64,
    /// Simulated seconds, `fixed_steps * fixed_dt`.
    pub simulated_time: f64,
    pub airborne_steps: u64,
    pub final_position: Vec2,
    pub camera_center: Vec2,
    pub camera_zoom: Vec2,
    /// State labels in the order they were entered.
    pub states: Vec<String>,
}

/// Play `replay` on `level` with a fresh controller and camera.
pub fn run_replay(
    replay: &ReplayFile,
    config: &GameConfig,
    level: &Level,
    animations: &AnimationFile,
) -> Result<ReplayOutcome, String> {
    let ground = level
        .ground()
        .ok_or_else(|| format!("Replay failed: level '{}' has no tile layers", level.id))?;

    let mut body = GridBody::new(
        ground,
        Aabb {
            center_x: level.spawn.x,
            center_y: level.spawn.y,
            half_w: level.body_half_extents.x,
            half_h: level.body_half_extents.y,
        },
    );
    let mut animator = SpritePlayer::new(animations.clone());
    let mut actor = Actor::new(replay.controller, config, &animator);

    let mut camera = CameraController::new(config.camera.clone());
    camera.set_follow_target(Some(PLAYER_ENTITY));
    bootstrap_camera(&mut camera, level, body.position());
    let mut active = ActiveCamera::new();
    active.install(camera);

    let ticks = replay.expanded_inputs();
    let fixed_dt = replay.fixed_dt;
    let render_dt = replay.render_dt();
    let tick_us = (f64::from(fixed_dt) * 1_000_000.0).round() as u64;

    let mut time = TimeState::new(f64::from(fixed_dt));
    let mut input = InputState::new();
    let mut targets = HashMap::new();
    let mut states: Vec<String> = Vec::new();
    let mut airborne_steps = 0;
    let mut next = 0;

    log::info!(
        "Replaying {} ticks ({:?}) on level '{}'",
        ticks.len(),
        replay.controller,
        level.id
    );

    while next < ticks.len() {
        time.begin_frame(f64::from(render_dt));
        while next < ticks.len() && time.should_step() {
            let tick = &ticks[next];
            tick.apply_to(&mut input);
            match tick.camera {
                Some(CameraCue::Shake { preset }) => active.shake(preset),
                Some(CameraCue::Zoom { level: zoom, duration }) => {
                    if let Some(camera) = active.get_mut() {
                        camera.set_zoom(Vec2::splat(zoom), duration);
                    }
                }
                None => {}
            }

            let (label, airborne) = actor.step(&input, fixed_dt, &mut body, &mut animator);
            animator.tick(tick_us);
            if airborne {
                airborne_steps += 1;
            }
            if states.last() != Some(&label) {
                log::trace!("tick {}: {}", time.fixed_step_count, label);
                states.push(label);
            }

            input.end_frame();
            next += 1;
        }
        time.end_frame();

        targets.insert(PLAYER_ENTITY, body.position());
        if let Some(camera) = active.get_mut() {
            camera.update(render_dt, &input, &targets);
        }
    }

    let camera = active
        .release()
        .ok_or_else(|| "Replay failed: camera was released during playback".to_string())?;

    Ok(ReplayOutcome {
        fixed_steps: time.fixed_step_count,
        render_frames: time.frame_count,
        simulated_time: time.total_time,
        airborne_steps,
        final_position: body.position(),
        camera_center: camera.view_center(),
        camera_zoom: camera.zoom,
        states,
    })
}
