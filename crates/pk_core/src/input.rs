//! Action-based input state with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(action)` is true every frame the action
//!   is down, and `strength(action)` reports its analog value (1.0 for digital
//!   presses). Used for continuous movement.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only during the
//!   frame the transition happened. They are cleared by `end_frame()`, which the
//!   runner calls only after at least one fixed simulation step has consumed
//!   them, so a press is never lost on a frame with zero simulation steps.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use serde::Deserialize;

/// Logical game actions. Bindings to physical devices live outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    MoveLeft,
    MoveRight,
    MoveUp,
    /// Also the crouch action for the platformer controller.
    MoveDown,
    #[serde(alias = "move_jump")]
    Jump,
    Sheathe,
}

impl Action {
    pub const ALL: &'static [Action] = &[
        Action::MoveLeft,
        Action::MoveRight,
        Action::MoveUp,
        Action::MoveDown,
        Action::Jump,
        Action::Sheathe,
    ];
}

pub struct InputState {
    held: HashMap<Action, f32>,
    just_pressed: HashSet<Action>,
    just_released: HashSet<Action>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashMap::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    pub fn press(&mut self, action: Action) {
        self.press_with_strength(action, 1.0);
    }

    /// Press (or update) an analog action. Strength is clamped to `[0, 1]`;
    /// a strength of zero releases the action.
    pub fn press_with_strength(&mut self, action: Action, strength: f32) {
        let strength = strength.clamp(0.0, 1.0);
        if strength == 0.0 {
            self.release(action);
            return;
        }
        if self.held.insert(action, strength).is_none() {
            self.just_pressed.insert(action);
        }
    }

    pub fn release(&mut self, action: Action) {
        if self.held.remove(&action).is_some() {
            self.just_released.insert(action);
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains_key(&action)
    }

    pub fn is_just_pressed(&self, action: Action) -> bool {
        self.just_pressed.contains(&action)
    }

    pub fn is_just_released(&self, action: Action) -> bool {
        self.just_released.contains(&action)
    }

    pub fn strength(&self, action: Action) -> f32 {
        self.held.get(&action).copied().unwrap_or(0.0)
    }

    /// `strength(positive) - strength(negative)`, in `[-1, 1]`.
    pub fn axis(&self, negative: Action, positive: Action) -> f32 {
        self.strength(positive) - self.strength(negative)
    }

    /// Combined 2D movement vector, limited to unit length.
    pub fn vector(&self, left: Action, right: Action, up: Action, down: Action) -> Vec2 {
        Vec2::new(self.axis(left, right), self.axis(up, down)).clamp_length_max(1.0)
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
