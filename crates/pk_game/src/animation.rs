//! Static mapping from controller states to animation clip names.
//!
//! Controllers select clips by state, never by name lookup at runtime. The
//! mapping is checked once against the animator's clip set when a controller
//! is built: clips that do not exist are dropped from the table (with a
//! warning), and states without a clip simply skip playback.

use std::collections::HashMap;
use std::hash::Hash;

use pk_core::animation::SpriteAnimator;

#[derive(Debug, Clone)]
pub struct AnimationTable<K> {
    clips: HashMap<K, String>,
}

impl<K: Copy + Eq + Hash + std::fmt::Debug> AnimationTable<K> {
    /// Keep only the `(key, clip)` pairs whose clip the animator can play.
    pub fn validated<I, S>(entries: I, animator: &impl SpriteAnimator) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        S: Into<String>,
    {
        let mut clips = HashMap::new();
        for (key, name) in entries {
            let name = name.into();
            if animator.has_animation(&name) {
                clips.insert(key, name);
            } else {
                log::warn!("No animation clip '{}' for {:?}; playback skipped", name, key);
            }
        }
        Self { clips }
    }

    pub fn clip(&self, key: K) -> Option<&str> {
        self.clips.get(&key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

/// Play `target` unless it is already the clip recorded in `current`.
///
/// Returns true when a new clip was started. Re-issuing the playing clip
/// would restart it, so in-progress one-shots are never interrupted.
pub fn play_if_changed(
    animator: &mut impl SpriteAnimator,
    current: &mut Option<String>,
    target: Option<&str>,
) -> bool {
    let Some(target) = target else {
        return false;
    };
    if current.as_deref() == Some(target) {
        return false;
    }
    animator.play(target);
    *current = Some(target.to_string());
    true
}
