//! Weapon-draw walker: plain directional movement with two extra machines.
//!
//! - `WeaponState` toggles between sheathed and drawn on the `sheathe` action.
//! - A double-press detector upgrades walking to running when the same
//!   horizontal direction is tapped twice within a short window. Running ends
//!   once both horizontal directions are released, and only applies while the
//!   weapon is sheathed.
//!
//! Clip names are the motion's base name followed by the weapon ordinal, so a
//! drawn-weapon walk plays `walk1`.

use glam::Vec2;
use serde::Deserialize;

use pk_core::animation::SpriteAnimator;
use pk_core::input::{Action, InputState};

use crate::animation::{play_if_changed, AnimationTable};
use crate::collision::MotionBody;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WeaponState {
    #[default]
    Sheathed,
    Drawn,
}

impl WeaponState {
    pub const ALL: &'static [WeaponState] = &[WeaponState::Sheathed, WeaponState::Drawn];

    pub fn ordinal(self) -> u8 {
        match self {
            Self::Sheathed => 0,
            Self::Drawn => 1,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Sheathed => Self::Drawn,
            Self::Drawn => Self::Sheathed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WalkerMotion {
    #[default]
    Idle,
    Walk,
    Run,
}

impl WalkerMotion {
    pub const ALL: &'static [WalkerMotion] =
        &[WalkerMotion::Idle, WalkerMotion::Walk, WalkerMotion::Run];

    pub fn base_name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Walk => "walk",
            Self::Run => "run",
        }
    }
}

pub fn walker_clip_name(motion: WalkerMotion, weapon: WeaponState) -> String {
    format!("{}{}", motion.base_name(), weapon.ordinal())
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct WalkerConfig {
    pub walk_speed: f32,
    pub run_speed: f32,
    /// Seconds within which a second press of the same direction counts as a double press.
    pub double_press_window: f32,
    pub deadzone: f32,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            walk_speed: 120.0,
            run_speed: 240.0,
            double_press_window: 0.3,
            deadzone: 0.2,
        }
    }
}

impl WalkerConfig {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.walk_speed < 0.0 || self.run_speed < 0.0 {
            return Err("Walker config validation failed: speeds must be >= 0".to_string());
        }
        if self.double_press_window <= 0.0 {
            return Err(
                "Walker config validation failed: double_press_window must be > 0".to_string(),
            );
        }
        Ok(())
    }
}

/// Detects a second press of the same action within a time window.
#[derive(Debug, Clone, Default)]
pub struct DoublePressDetector {
    window: f32,
    clock: f32,
    last: Option<(Action, f32)>,
}

impl DoublePressDetector {
    pub fn new(window: f32) -> Self {
        Self {
            window,
            clock: 0.0,
            last: None,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.clock += dt.max(0.0);
    }

    /// Record a press. Returns true if it completes a double press.
    pub fn register(&mut self, action: Action) -> bool {
        let double = matches!(
            self.last,
            Some((prev, at)) if prev == action && self.clock - at <= self.window
        );
        self.last = Some((action, self.clock));
        double
    }
}

pub struct WalkerController {
    pub config: WalkerConfig,
    pub weapon: WeaponState,
    pub running: bool,
    pub motion: WalkerMotion,
    pub velocity: Vec2,
    pub face_direction: f32,
    pub current_animation: Option<String>,
    detector: DoublePressDetector,
    animations: AnimationTable<(WalkerMotion, WeaponState)>,
}

impl WalkerController {
    pub fn new(config: WalkerConfig, animator: &impl SpriteAnimator) -> Self {
        let entries = WalkerMotion::ALL.iter().flat_map(|&motion| {
            WeaponState::ALL
                .iter()
                .map(move |&weapon| ((motion, weapon), walker_clip_name(motion, weapon)))
        });
        Self {
            config,
            weapon: WeaponState::Sheathed,
            running: false,
            motion: WalkerMotion::Idle,
            velocity: Vec2::ZERO,
            face_direction: 1.0,
            current_animation: None,
            detector: DoublePressDetector::new(config.double_press_window),
            animations: AnimationTable::validated(entries, animator),
        }
    }

    pub fn step(
        &mut self,
        input: &InputState,
        dt: f32,
        body: &mut impl MotionBody,
        animator: &mut impl SpriteAnimator,
    ) -> WalkerMotion {
        if input.is_just_pressed(Action::Sheathe) {
            self.weapon = self.weapon.toggled();
            log::debug!("weapon {:?}", self.weapon);
        }

        self.detector.advance(dt);
        for action in [Action::MoveLeft, Action::MoveRight] {
            if input.is_just_pressed(action) && self.detector.register(action) {
                self.running = true;
            }
        }
        if !input.is_held(Action::MoveLeft) && !input.is_held(Action::MoveRight) {
            self.running = false;
        }

        let direction = input.vector(
            Action::MoveLeft,
            Action::MoveRight,
            Action::MoveUp,
            Action::MoveDown,
        );
        let moving = direction.length() > self.config.deadzone;
        let run = self.running && self.weapon == WeaponState::Sheathed;
        let speed = if run {
            self.config.run_speed
        } else {
            self.config.walk_speed
        };

        let desired = if moving { direction * speed } else { Vec2::ZERO };
        let result = body.move_and_slide(desired, dt);
        self.velocity = result.velocity;

        if direction.x.abs() > self.config.deadzone {
            self.face_direction = direction.x.signum();
            animator.set_flip_h(self.face_direction < 0.0);
        }

        self.motion = match (moving, run) {
            (false, _) => WalkerMotion::Idle,
            (true, true) => WalkerMotion::Run,
            (true, false) => WalkerMotion::Walk,
        };
        play_if_changed(
            animator,
            &mut self.current_animation,
            self.animations.clip((self.motion, self.weapon)),
        );
        self.motion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::test_support::StubAnimator;
    use crate::collision::PhysicsResult;

    const DT: f32 = 1.0 / 60.0;

    struct FreeBody {
        position: Vec2,
    }

    impl MotionBody for FreeBody {
        fn move_and_slide(&mut self, velocity: Vec2, dt: f32) -> PhysicsResult {
            self.position += velocity * dt;
            PhysicsResult {
                velocity,
                ..Default::default()
            }
        }

        fn position(&self) -> Vec2 {
            self.position
        }
    }

    fn all_clips() -> StubAnimator {
        let mut names = Vec::new();
        for &motion in WalkerMotion::ALL {
            for &weapon in WeaponState::ALL {
                names.push(walker_clip_name(motion, weapon));
            }
        }
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        StubAnimator::with_clips(&refs)
    }

    fn setup() -> (WalkerController, StubAnimator, FreeBody, InputState) {
        let animator = all_clips();
        let walker = WalkerController::new(WalkerConfig::default(), &animator);
        (walker, animator, FreeBody { position: Vec2::ZERO }, InputState::new())
    }

    /// Advance `ticks` frames with the current input, clearing edges each frame.
    fn run(
        walker: &mut WalkerController,
        animator: &mut StubAnimator,
        body: &mut FreeBody,
        input: &mut InputState,
        ticks: usize,
    ) -> WalkerMotion {
        let mut motion = walker.motion;
        for _ in 0..ticks {
            motion = walker.step(input, DT, body, animator);
            input.end_frame();
        }
        motion
    }

    #[test]
    fn clip_names_append_weapon_ordinal() {
        assert_eq!(walker_clip_name(WalkerMotion::Idle, WeaponState::Sheathed), "idle0");
        assert_eq!(walker_clip_name(WalkerMotion::Run, WeaponState::Drawn), "run1");
    }

    #[test]
    fn detector_requires_same_action_within_window() {
        let mut detector = DoublePressDetector::new(0.3);
        assert!(!detector.register(Action::MoveRight));
        detector.advance(0.1);
        assert!(detector.register(Action::MoveRight));

        detector.advance(0.1);
        assert!(!detector.register(Action::MoveLeft));
        detector.advance(0.5);
        assert!(!detector.register(Action::MoveLeft));
    }

    #[test]
    fn single_press_walks() {
        let (mut walker, mut animator, mut body, mut input) = setup();
        input.press(Action::MoveRight);
        let motion = run(&mut walker, &mut animator, &mut body, &mut input, 3);
        assert_eq!(motion, WalkerMotion::Walk);
        assert_eq!(walker.velocity.x, 120.0);
        assert_eq!(animator.current.as_deref(), Some("walk0"));
    }

    #[test]
    fn double_tap_runs_until_both_directions_released() {
        let (mut walker, mut animator, mut body, mut input) = setup();
        input.press(Action::MoveRight);
        run(&mut walker, &mut animator, &mut body, &mut input, 2);
        input.release(Action::MoveRight);
        run(&mut walker, &mut animator, &mut body, &mut input, 3);
        input.press(Action::MoveRight);
        let motion = run(&mut walker, &mut animator, &mut body, &mut input, 5);
        assert_eq!(motion, WalkerMotion::Run);
        assert_eq!(walker.velocity.x, 240.0);

        // Switching to the other direction while right is still held keeps running.
        input.press(Action::MoveLeft);
        input.release(Action::MoveRight);
        let motion = run(&mut walker, &mut animator, &mut body, &mut input, 2);
        assert_eq!(motion, WalkerMotion::Run);

        input.release(Action::MoveLeft);
        run(&mut walker, &mut animator, &mut body, &mut input, 1);
        assert!(!walker.running);
        assert_eq!(walker.motion, WalkerMotion::Idle);

        // Left was tapped two frames ago, so tapping it again is a double press.
        input.press(Action::MoveLeft);
        let motion = run(&mut walker, &mut animator, &mut body, &mut input, 1);
        assert_eq!(motion, WalkerMotion::Run);
    }

    #[test]
    fn slow_second_tap_only_walks() {
        let (mut walker, mut animator, mut body, mut input) = setup();
        input.press(Action::MoveRight);
        run(&mut walker, &mut animator, &mut body, &mut input, 1);
        input.release(Action::MoveRight);
        run(&mut walker, &mut animator, &mut body, &mut input, 30);
        input.press(Action::MoveRight);
        let motion = run(&mut walker, &mut animator, &mut body, &mut input, 1);
        assert_eq!(motion, WalkerMotion::Walk);
    }

    #[test]
    fn drawn_weapon_forces_walk_speed_and_suffix() {
        let (mut walker, mut animator, mut body, mut input) = setup();
        input.press(Action::Sheathe);
        run(&mut walker, &mut animator, &mut body, &mut input, 1);
        input.release(Action::Sheathe);
        assert_eq!(walker.weapon, WeaponState::Drawn);
        assert_eq!(animator.current.as_deref(), Some("idle1"));

        input.press(Action::MoveLeft);
        run(&mut walker, &mut animator, &mut body, &mut input, 1);
        input.release(Action::MoveLeft);
        run(&mut walker, &mut animator, &mut body, &mut input, 1);
        input.press(Action::MoveLeft);
        let motion = run(&mut walker, &mut animator, &mut body, &mut input, 1);
        assert!(walker.running);
        assert_eq!(motion, WalkerMotion::Walk);
        assert_eq!(walker.velocity.x, -120.0);
        assert_eq!(animator.current.as_deref(), Some("walk1"));
        assert!(animator.flip);

        // Sheathing mid-run restores the run speed.
        input.press(Action::Sheathe);
        let motion = run(&mut walker, &mut animator, &mut body, &mut input, 1);
        assert_eq!(walker.weapon, WeaponState::Sheathed);
        assert_eq!(motion, WalkerMotion::Run);
        assert_eq!(animator.current.as_deref(), Some("run0"));
    }

    #[test]
    fn vertical_movement_walks_without_turning() {
        let (mut walker, mut animator, mut body, mut input) = setup();
        input.press(Action::MoveUp);
        let motion = run(&mut walker, &mut animator, &mut body, &mut input, 2);
        assert_eq!(motion, WalkerMotion::Walk);
        assert_eq!(walker.velocity, Vec2::new(0.0, -120.0));
        assert_eq!(walker.face_direction, 1.0);
    }
}
