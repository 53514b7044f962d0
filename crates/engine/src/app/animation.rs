use std::collections::{HashMap, HashSet};

use tracing::warn;

use super::world::Sprite;

/// Immutable description of a named animation: an ordered, non-empty list
/// of texture keys, the per-frame delay in milliseconds, and the footprint
/// size applied to sprites spawned with it.
#[derive(Debug, Clone)]
pub struct AnimationDef {
    pub name: String,
    pub frames: Vec<String>,
    pub frame_delay_ms: f32,
    pub foot_size: (i32, i32),
}

impl AnimationDef {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnimationLibrary {
    by_name: HashMap<String, AnimationDef>,
}

impl AnimationLibrary {
    pub fn insert(&mut self, def: AnimationDef) {
        let name = def.name.clone();
        if self.by_name.insert(name.clone(), def).is_some() {
            warn!(animation = %name, "duplicate animation definition replaced");
        }
    }

    pub fn get(&self, name: &str) -> Option<&AnimationDef> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Drives per-sprite frame cycling. A lookup miss is reported once per
/// animation name; the affected sprite simply stops advancing.
#[derive(Debug, Default)]
pub struct Animator {
    warned_missing: HashSet<String>,
}

impl Animator {
    /// Switches the sprite to `name`. A no-op when the name is unchanged;
    /// otherwise the frame cursor resets and the texture snaps to frame 0
    /// immediately, so a switch never shows a partial-frame delay.
    pub fn set_animation(&mut self, sprite: &mut Sprite, library: &AnimationLibrary, name: &str) {
        if sprite.animation.as_deref() == Some(name) {
            return;
        }
        let Some(def) = library.get(name) else {
            self.warn_missing(name);
            return;
        };
        sprite.animation = Some(name.to_string());
        sprite.frame = 0;
        sprite.anim_elapsed_ms = 0.0;
        sprite.texture_key = def.frames[0].clone();
    }

    /// Accumulates elapsed time and steps frames. The frame delay is
    /// subtracted rather than the accumulator being reset, so overshoot
    /// carries into the next frame; a large delta advances several frames.
    pub fn advance(&mut self, sprite: &mut Sprite, library: &AnimationLibrary, elapsed_ms: f32) {
        let def = match sprite.animation.as_deref() {
            None => return,
            Some(name) => match library.get(name) {
                Some(def) => def,
                None => {
                    let name = name.to_string();
                    self.warn_missing(&name);
                    return;
                }
            },
        };
        if def.frames.is_empty() || !(def.frame_delay_ms > 0.0) {
            return;
        }

        sprite.anim_elapsed_ms += elapsed_ms;
        while sprite.anim_elapsed_ms >= def.frame_delay_ms {
            sprite.anim_elapsed_ms -= def.frame_delay_ms;
            sprite.frame = (sprite.frame + 1) % def.frames.len();
            sprite.texture_key = def.frames[sprite.frame].clone();
        }
    }

    fn warn_missing(&mut self, name: &str) {
        if self.warned_missing.insert(name.to_string()) {
            warn!(animation = name, "animation not found; sprite stalls");
        }
    }
}
