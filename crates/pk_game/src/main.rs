//! Headless runner for the platformer kit.
//!
//! Loads a game config, a level, an animation set and an input replay, then
//! plays the replay through the fixed-step loop (see `replay::run_replay`):
//!
//!   1. `begin_frame()` with the replay's render delta
//!   2. `while should_step()` -- apply the next replay tick, step the controller
//!   3. update the active camera once per render frame
//!
//! Usage: `pk_game [config.json] [level.json] [animations.json] [replay.json]`.
//! Any argument left out falls back to the bundled demo asset.

use std::path::PathBuf;
use std::process::ExitCode;

use pk_core::animation::load_animation_file;
use pk_game::config::load_config_from_path;
use pk_game::level::load_level_from_path;
use pk_game::replay::{load_replay_from_path, run_replay};

const CONFIG_PATH: &str = "assets/config/game.json";
const LEVEL_PATH: &str = "assets/levels/demo_level.json";
const ANIMATION_PATH: &str = "assets/animations/player.json";
const REPLAY_PATH: &str = "assets/replays/demo_run.json";

struct RunPaths {
    config: PathBuf,
    level: PathBuf,
    animations: PathBuf,
    replay: PathBuf,
}

impl RunPaths {
    fn from_args(mut args: impl Iterator<Item = String>) -> Self {
        let mut next =
            |fallback: &str| PathBuf::from(args.next().unwrap_or_else(|| fallback.to_string()));
        Self {
            config: next(CONFIG_PATH),
            level: next(LEVEL_PATH),
            animations: next(ANIMATION_PATH),
            replay: next(REPLAY_PATH),
        }
    }
}

fn run(paths: &RunPaths) -> Result<(), String> {
    let config = load_config_from_path(&paths.config)?;
    let level = load_level_from_path(&paths.level)?;
    let animations = load_animation_file(&paths.animations)?;
    let replay = load_replay_from_path(&paths.replay)?;

    log::info!(
        "Loaded level '{}' ({} layers), animation set '{}' ({} clips)",
        level.id,
        level.map.layers().len(),
        animations.animation_id,
        animations.animations.len()
    );

    let outcome = run_replay(&replay, &config, &level, &animations)?;

    log::info!(
        "Replay finished: {} fixed steps ({:.2}s) over {} frames, {} airborne",
        outcome.fixed_steps,
        outcome.simulated_time,
        outcome.render_frames,
        outcome.airborne_steps
    );
    log::info!(
        "Final position ({:.1}, {:.1}); camera at ({:.1}, {:.1}) zoom {:.2}",
        outcome.final_position.x,
        outcome.final_position.y,
        outcome.camera_center.x,
        outcome.camera_center.y,
        outcome.camera_zoom.x
    );
    log::info!("States: {}", outcome.states.join(" -> "));
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Platformer kit runner starting...");

    let paths = RunPaths::from_args(std::env::args().skip(1));
    match run(&paths) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
