//! Frame-based sprite animation types, deterministic tick logic, and a sprite
//! animator that plays named clips.
//!
//! All timing uses integer microseconds (`u64`) so frame advancement is
//! identical across platforms under the fixed-timestep model. The JSON format
//! stores `duration_ms` for readability; on load it becomes `duration_us`.
//!
//! Gameplay code never touches clips directly. It talks to the
//! [`SpriteAnimator`] trait: play a clip by name, ask which clip is current,
//! which frame it is on, and whether a one-shot clip is still playing.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// A single frame in an animation clip.
#[derive(Debug, Clone)]
pub struct AnimationFrame {
    pub sprite_id: String,
    pub duration_us: u64,
}

/// A named sequence of frames that can loop or play once.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub frames: Vec<AnimationFrame>,
    pub looping: bool,
}

impl AnimationClip {
    /// Total duration of one full cycle in microseconds.
    pub fn total_duration_us(&self) -> u64 {
        self.frames.iter().map(|f| f.duration_us).sum()
    }
}

/// Top-level animation definition file (deserialized from JSON).
#[derive(Debug, Clone)]
pub struct AnimationFile {
    pub version: String,
    pub animation_id: String,
    pub animations: HashMap<String, AnimationClip>,
}

impl AnimationFile {
    pub fn has_clip(&self, name: &str) -> bool {
        self.animations.contains_key(name)
    }
}

/// Runtime state for one active animation instance.
#[derive(Debug, Clone)]
pub struct AnimationState {
    pub clip_name: String,
    pub frame_index: usize,
    pub elapsed_us: u64,
    pub finished: bool,
}

impl AnimationState {
    pub fn new(clip_name: &str) -> Self {
        Self {
            clip_name: clip_name.to_string(),
            frame_index: 0,
            elapsed_us: 0,
            finished: false,
        }
    }

    /// Advance the animation by `dt_us` microseconds. Returns the current frame's
    /// `sprite_id`. Uses integer arithmetic only for determinism.
    pub fn tick<'a>(&mut self, dt_us: u64, clip: &'a AnimationClip) -> &'a str {
        if clip.frames.is_empty() || self.finished {
            return if let Some(frame) = clip.frames.get(self.frame_index) {
                &frame.sprite_id
            } else if let Some(frame) = clip.frames.last() {
                &frame.sprite_id
            } else {
                ""
            };
        }

        self.elapsed_us += dt_us;

        loop {
            let current_frame = &clip.frames[self.frame_index];
            if self.elapsed_us < current_frame.duration_us {
                break;
            }

            self.elapsed_us -= current_frame.duration_us;
            self.frame_index += 1;

            if self.frame_index >= clip.frames.len() {
                if clip.looping {
                    self.frame_index = 0;
                } else {
                    self.frame_index = clip.frames.len() - 1;
                    self.elapsed_us = 0;
                    self.finished = true;
                    break;
                }
            }
        }

        &clip.frames[self.frame_index].sprite_id
    }
}

/// Render-side animation collaborator used by the movement controllers.
pub trait SpriteAnimator {
    /// Start the named clip from its first frame.
    fn play(&mut self, name: &str);
    /// Name of the clip most recently started, if any.
    fn current_animation(&self) -> Option<&str>;
    fn set_flip_h(&mut self, flip: bool);
    fn flip_h(&self) -> bool;
    /// Frame index within the current clip.
    fn frame(&self) -> usize;
    /// False once a non-looping clip has shown its last frame.
    fn is_playing(&self) -> bool;
    fn has_animation(&self, name: &str) -> bool;
}

/// [`SpriteAnimator`] backed by an [`AnimationFile`].
#[derive(Debug, Clone)]
pub struct SpritePlayer {
    file: AnimationFile,
    state: Option<AnimationState>,
    flip_h: bool,
}

impl SpritePlayer {
    pub fn new(file: AnimationFile) -> Self {
        Self {
            file,
            state: None,
            flip_h: false,
        }
    }

    pub fn file(&self) -> &AnimationFile {
        &self.file
    }

    /// Advance the current clip. Returns the sprite id now on screen.
    pub fn tick(&mut self, dt_us: u64) -> Option<&str> {
        let state = self.state.as_mut()?;
        let clip = self.file.animations.get(&state.clip_name)?;
        Some(state.tick(dt_us, clip))
    }
}

impl SpriteAnimator for SpritePlayer {
    fn play(&mut self, name: &str) {
        if !self.file.has_clip(name) {
            log::warn!(
                "Animation '{}' has no clip named '{}'",
                self.file.animation_id,
                name
            );
            return;
        }
        self.state = Some(AnimationState::new(name));
    }

    fn current_animation(&self) -> Option<&str> {
        self.state.as_ref().map(|s| s.clip_name.as_str())
    }

    fn set_flip_h(&mut self, flip: bool) {
        self.flip_h = flip;
    }

    fn flip_h(&self) -> bool {
        self.flip_h
    }

    fn frame(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.frame_index)
    }

    fn is_playing(&self) -> bool {
        self.state.as_ref().is_some_and(|s| !s.finished)
    }

    fn has_animation(&self, name: &str) -> bool {
        self.file.has_clip(name)
    }
}

// --- JSON deserialization types (private) ---

#[derive(Debug, Deserialize)]
struct AnimationFileJson {
    version: String,
    animation_id: String,
    animations: HashMap<String, AnimationClipJson>,
}

#[derive(Debug, Deserialize)]
struct AnimationClipJson {
    frames: Vec<AnimationFrameJson>,
    #[serde(default)]
    looping: bool,
}

#[derive(Debug, Deserialize)]
struct AnimationFrameJson {
    sprite_id: String,
    duration_ms: u64,
}

/// Load an animation definition file from disk.
pub fn load_animation_file(path: &Path) -> Result<AnimationFile, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read animation file {}: {e}", path.display()))?;
    parse_animation_file(&raw)
        .map_err(|e| format!("Failed to load animation file {}: {e}", path.display()))
}

/// Parse and validate an animation definition from a JSON string.
pub fn parse_animation_file(raw: &str) -> Result<AnimationFile, String> {
    let json: AnimationFileJson =
        serde_json::from_str(raw).map_err(|e| format!("parse error: {e}"))?;
    validate_animation_json(&json)?;

    let mut animations = HashMap::new();
    for (name, clip_json) in json.animations {
        let frames = clip_json
            .frames
            .into_iter()
            .map(|f| AnimationFrame {
                sprite_id: f.sprite_id,
                duration_us: f.duration_ms * 1000,
            })
            .collect();
        animations.insert(
            name,
            AnimationClip {
                frames,
                looping: clip_json.looping,
            },
        );
    }

    Ok(AnimationFile {
        version: json.version,
        animation_id: json.animation_id,
        animations,
    })
}

fn validate_animation_json(json: &AnimationFileJson) -> Result<(), String> {
    if json.version != "0.1" {
        return Err(format!(
            "Animation validation failed: unsupported version '{}'",
            json.version
        ));
    }
    if json.animation_id.is_empty() {
        return Err("Animation validation failed: animation_id is empty".to_string());
    }
    for (name, clip) in &json.animations {
        if clip.frames.is_empty() {
            return Err(format!(
                "Animation validation failed: clip '{}' has no frames",
                name
            ));
        }
        for (i, frame) in clip.frames.iter().enumerate() {
            if frame.sprite_id.is_empty() {
                return Err(format!(
                    "Animation validation failed: clip '{}' frame {} has empty sprite_id",
                    name, i
                ));
            }
            if frame.duration_ms == 0 {
                return Err(format!(
                    "Animation validation failed: clip '{}' frame {} has zero duration",
                    name, i
                ));
            }
        }
    }
    Ok(())
}
