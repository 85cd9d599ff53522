//! Platformer player motion state machine.
//!
//! Each physics tick runs in a fixed order:
//!
//!   1. take the velocity the body ended the previous tick with
//!   2. horizontal policy (input, roll burst, crouch stop, sticky facing)
//!   3. gravity, landing reset, wall-slide clamp
//!   4. jump policy (ground jump, air jump, wall kick)
//!   5. `move_and_slide` through the physics collaborator
//!   6. recompute the discrete state: grounded from the pre-move floor flag,
//!      jump/fall from the *post-resolution* velocity
//!   7. issue the state's animation if it changed
//!
//! The discrete state is never mutated on its own; it is recomputed from
//! contact flags and input every tick by [`compute_state`]. The only render
//! state fed back in is whether the roll clip is still playing.
//!
//! Coordinates are screen-style (+Y down): jump force is negative, gravity
//! positive.

use glam::Vec2;
use serde::Deserialize;

use pk_core::animation::SpriteAnimator;
use pk_core::input::{Action, InputState};

use crate::animation::{play_if_changed, AnimationTable};
use crate::collision::{MotionBody, PhysicsResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlayerState {
    #[default]
    Idle,
    Running,
    Jump,
    Fall,
    Rolling,
    CrouchingIdle,
    WallSlide,
}

impl PlayerState {
    pub const ALL: &'static [PlayerState] = &[
        PlayerState::Idle,
        PlayerState::Running,
        PlayerState::Jump,
        PlayerState::Fall,
        PlayerState::Rolling,
        PlayerState::CrouchingIdle,
        PlayerState::WallSlide,
    ];

    pub fn animation_name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Jump => "jump",
            Self::Fall => "fall",
            Self::Rolling => "roll",
            Self::CrouchingIdle => "crouch_idle",
            Self::WallSlide => "wall_slide",
        }
    }

    pub fn is_airborne(self) -> bool {
        matches!(self, Self::Jump | Self::Fall | Self::WallSlide)
    }
}

/// Feature switches; the earlier controller versions are subsets of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Abilities {
    pub double_jump: bool,
    pub roll: bool,
    pub wall_slide: bool,
}

impl Default for Abilities {
    fn default() -> Self {
        Self {
            double_jump: true,
            roll: true,
            wall_slide: true,
        }
    }
}

impl Abilities {
    /// Run / jump / double jump only.
    pub fn basic() -> Self {
        Self {
            double_jump: true,
            roll: false,
            wall_slide: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub move_speed: f32,
    pub gravity: f32,
    pub jump_force: f32,
    pub max_jumps: u32,
    pub deadzone: f32,
    pub roll_fast_multiplier: f32,
    pub roll_slow_multiplier: f32,
    pub roll_fast_frames: usize,
    /// Maximum downward speed while sliding on a wall.
    pub wall_slide_speed: f32,
    pub wall_kick_speed: f32,
    /// Seconds after a wall kick during which horizontal input is ignored.
    pub wall_kick_lock_time: f32,
    pub abilities: Abilities,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 280.0,
            gravity: 1300.0,
            jump_force: -480.0,
            max_jumps: 2,
            deadzone: 0.2,
            roll_fast_multiplier: 2.0,
            roll_slow_multiplier: 1.2,
            roll_fast_frames: 4,
            wall_slide_speed: 100.0,
            wall_kick_speed: 450.0,
            wall_kick_lock_time: 0.0,
            abilities: Abilities::default(),
        }
    }
}

impl PlayerConfig {
    /// Number of jumps available between landings.
    pub fn jump_budget(&self) -> u32 {
        if self.abilities.double_jump {
            self.max_jumps
        } else {
            self.max_jumps.min(1)
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.move_speed < 0.0 {
            return Err("Player config validation failed: move_speed must be >= 0".to_string());
        }
        if self.jump_force > 0.0 {
            return Err(
                "Player config validation failed: jump_force must be <= 0 (+Y is down)".to_string(),
            );
        }
        if !(0.0..1.0).contains(&self.deadzone) {
            return Err("Player config validation failed: deadzone must be in [0, 1)".to_string());
        }
        if self.max_jumps == 0 {
            return Err("Player config validation failed: max_jumps must be > 0".to_string());
        }
        Ok(())
    }
}

/// One tick's worth of input plus the contact flags the body reported last tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionInputs {
    pub axis_x: f32,
    pub jump_just_pressed: bool,
    pub crouch_pressed: bool,
    pub crouch_just_pressed: bool,
    pub horizontal_just_pressed: bool,
    pub on_floor: bool,
    pub on_wall: bool,
    pub wall_normal: Vec2,
}

impl MotionInputs {
    pub fn sample(input: &InputState, contacts: &PhysicsResult) -> Self {
        Self {
            axis_x: input.axis(Action::MoveLeft, Action::MoveRight),
            jump_just_pressed: input.is_just_pressed(Action::Jump),
            crouch_pressed: input.is_held(Action::MoveDown),
            crouch_just_pressed: input.is_just_pressed(Action::MoveDown),
            horizontal_just_pressed: input.is_just_pressed(Action::MoveLeft)
                || input.is_just_pressed(Action::MoveRight),
            on_floor: contacts.on_floor,
            on_wall: contacts.on_wall,
            wall_normal: contacts.wall_normal,
        }
    }
}

/// State carried between ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionState {
    pub velocity: Vec2,
    /// +1 facing right, -1 facing left.
    pub face_direction: f32,
    pub jump_count: u32,
    /// Normal of the wall last kicked off; zero once grounded.
    pub last_wall_normal: Vec2,
    pub state: PlayerState,
    pub current_animation: Option<String>,
    /// Contacts reported by the last `move_and_slide`.
    pub contacts: PhysicsResult,
    pub wall_kick_lock: f32,
}

impl Default for MotionState {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            face_direction: 1.0,
            jump_count: 0,
            last_wall_normal: Vec2::ZERO,
            state: PlayerState::Idle,
            current_animation: None,
            contacts: PhysicsResult::default(),
            wall_kick_lock: 0.0,
        }
    }
}

/// Airborne, touching a wall, and not the wall most recently kicked off.
pub fn is_wall_sliding(
    on_floor: bool,
    on_wall: bool,
    wall_normal: Vec2,
    last_wall_normal: Vec2,
    abilities: Abilities,
) -> bool {
    abilities.wall_slide && !on_floor && on_wall && wall_normal != last_wall_normal
}

/// Grounded roll trigger.
pub fn roll_triggered(
    prev_state: PlayerState,
    roll_playing: bool,
    inputs: &MotionInputs,
    deadzone: f32,
) -> bool {
    let horizontal_held = inputs.axis_x.abs() > deadzone;
    (prev_state == PlayerState::Rolling && roll_playing)
        || (inputs.crouch_just_pressed && horizontal_held)
        || (inputs.crouch_pressed && inputs.horizontal_just_pressed)
}

/// Burst-then-coast speed multiplier for the roll, keyed by animation frame.
pub fn roll_multiplier(frame: usize, config: &PlayerConfig) -> f32 {
    if frame < config.roll_fast_frames {
        config.roll_fast_multiplier
    } else {
        config.roll_slow_multiplier
    }
}

/// Discrete state for this tick.
///
/// Grounded vs airborne comes from the floor flag sampled before the move
/// (`inputs.on_floor`). `physics` is the result of this tick's move: jump/fall
/// uses the velocity after collision response and wall slide uses this
/// tick's wall contact.
pub fn compute_state(
    prev_state: PlayerState,
    inputs: &MotionInputs,
    physics: &PhysicsResult,
    roll_playing: bool,
    last_wall_normal: Vec2,
    config: &PlayerConfig,
) -> PlayerState {
    if !inputs.on_floor {
        if is_wall_sliding(
            inputs.on_floor,
            physics.on_wall,
            physics.wall_normal,
            last_wall_normal,
            config.abilities,
        ) {
            return PlayerState::WallSlide;
        }
        return if physics.velocity.y < 0.0 {
            PlayerState::Jump
        } else {
            PlayerState::Fall
        };
    }

    if config.abilities.roll && roll_triggered(prev_state, roll_playing, inputs, config.deadzone)
    {
        PlayerState::Rolling
    } else if config.abilities.roll && inputs.crouch_pressed {
        PlayerState::CrouchingIdle
    } else if inputs.axis_x.abs() > config.deadzone {
        PlayerState::Running
    } else {
        PlayerState::Idle
    }
}

pub struct PlayerController {
    pub config: PlayerConfig,
    pub motion: MotionState,
    animations: AnimationTable<PlayerState>,
}

impl PlayerController {
    /// Build a controller whose state→clip table is checked against `animator`.
    pub fn new(config: PlayerConfig, animator: &impl SpriteAnimator) -> Self {
        let animations = AnimationTable::validated(
            PlayerState::ALL
                .iter()
                .map(|&state| (state, state.animation_name())),
            animator,
        );
        Self {
            config,
            motion: MotionState::default(),
            animations,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.motion.state
    }

    /// Sample `input` and run one physics tick.
    pub fn step(
        &mut self,
        input: &InputState,
        dt: f32,
        body: &mut impl MotionBody,
        animator: &mut impl SpriteAnimator,
    ) -> PlayerState {
        let inputs = MotionInputs::sample(input, &self.motion.contacts);
        self.tick(&inputs, dt, body, animator)
    }

    pub fn tick(
        &mut self,
        inputs: &MotionInputs,
        dt: f32,
        body: &mut impl MotionBody,
        animator: &mut impl SpriteAnimator,
    ) -> PlayerState {
        let mut velocity = self.motion.velocity;

        self.apply_horizontal(&mut velocity, inputs, dt, animator);
        self.apply_gravity(&mut velocity, inputs, dt);
        self.apply_jump(&mut velocity, inputs, animator);

        let result = body.move_and_slide(velocity, dt);
        self.motion.velocity = result.velocity;
        self.motion.contacts = result;

        let roll_clip = self.animations.clip(PlayerState::Rolling);
        let roll_playing = roll_clip.is_some()
            && animator.current_animation() == roll_clip
            && animator.is_playing();

        let prev = self.motion.state;
        let next = compute_state(
            prev,
            inputs,
            &result,
            roll_playing,
            self.motion.last_wall_normal,
            &self.config,
        );
        if next != prev {
            log::debug!("player state {:?} -> {:?}", prev, next);
        }
        self.motion.state = next;

        play_if_changed(
            animator,
            &mut self.motion.current_animation,
            self.animations.clip(next),
        );
        next
    }

    fn apply_horizontal(
        &mut self,
        velocity: &mut Vec2,
        inputs: &MotionInputs,
        dt: f32,
        animator: &mut impl SpriteAnimator,
    ) {
        if self.motion.wall_kick_lock > 0.0 {
            self.motion.wall_kick_lock = (self.motion.wall_kick_lock - dt).max(0.0);
            return;
        }

        match self.motion.state {
            PlayerState::Rolling => {
                velocity.x = self.motion.face_direction
                    * self.config.move_speed
                    * roll_multiplier(animator.frame(), &self.config);
                // Facing is committed for the whole roll.
                return;
            }
            PlayerState::CrouchingIdle => velocity.x = 0.0,
            _ => velocity.x = inputs.axis_x * self.config.move_speed,
        }

        if inputs.axis_x.abs() > self.config.deadzone {
            self.set_facing(inputs.axis_x.signum(), animator);
        }
    }

    fn apply_gravity(&mut self, velocity: &mut Vec2, inputs: &MotionInputs, dt: f32) {
        if inputs.on_floor {
            velocity.y = 0.0;
            self.motion.jump_count = 0;
            self.motion.last_wall_normal = Vec2::ZERO;
            return;
        }

        velocity.y += self.config.gravity * dt;
        if is_wall_sliding(
            inputs.on_floor,
            inputs.on_wall,
            inputs.wall_normal,
            self.motion.last_wall_normal,
            self.config.abilities,
        ) {
            velocity.y = velocity.y.min(self.config.wall_slide_speed);
        }
    }

    fn apply_jump(
        &mut self,
        velocity: &mut Vec2,
        inputs: &MotionInputs,
        animator: &mut impl SpriteAnimator,
    ) {
        if !inputs.jump_just_pressed {
            return;
        }

        if is_wall_sliding(
            inputs.on_floor,
            inputs.on_wall,
            inputs.wall_normal,
            self.motion.last_wall_normal,
            self.config.abilities,
        ) {
            let away = if inputs.wall_normal.x != 0.0 {
                inputs.wall_normal.x.signum()
            } else {
                -self.motion.face_direction
            };
            velocity.x = away * self.config.wall_kick_speed;
            velocity.y = self.config.jump_force;
            self.motion.jump_count = self.config.jump_budget();
            self.motion.last_wall_normal = inputs.wall_normal;
            self.motion.wall_kick_lock = self.config.wall_kick_lock_time;
            self.set_facing(away, animator);
            log::debug!("wall kick off normal {:?}", inputs.wall_normal);
            return;
        }

        if self.motion.jump_count < self.config.jump_budget() {
            velocity.y = self.config.jump_force;
            self.motion.jump_count += 1;
        }
    }

    fn set_facing(&mut self, direction: f32, animator: &mut impl SpriteAnimator) {
        self.motion.face_direction = direction;
        animator.set_flip_h(direction < 0.0);
    }
}
