//! Platformer gameplay: movement controllers, follow camera, level loading
//! and input replays, built on the `pk_core` primitives.

pub mod animation;
pub mod camera;
pub mod collision;
pub mod config;
pub mod level;
pub mod player;
pub mod replay;
pub mod walker;

pub use camera::{ActiveCamera, CameraConfig, CameraController, EntityId, ShakePreset};
pub use config::GameConfig;
pub use level::{bootstrap_camera, Level, TileMap};
pub use player::{PlayerConfig, PlayerController, PlayerState};
pub use walker::{WalkerConfig, WalkerController};
