pub mod animation;
pub mod input;
pub mod math;
pub mod noise;
pub mod time;

pub use animation::{AnimationFile, SpriteAnimator, SpritePlayer};
pub use input::{Action, InputState};
pub use math::{ease_out_quad, smooth_damp, smooth_damp_vec2};
pub use noise::ValueNoise;
pub use time::TimeState;
