use std::collections::HashMap;
use std::f32::consts::TAU;

use engine::{
    camera_origin, clamp_to_world, load_level, AnimationLibrary, Animator, AppPaths, InputAction,
    InputSnapshot, LevelError, Scene, SpawnConventions, SpriteWorld, BACKGROUND_NAME,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

const LEVEL_NAME: &str = "meadow";
const PLAYER_KIND: &str = "aster";
const PLAYER_SPEED_DEFAULT: f32 = 33.0;
const PLAYER_SPEED_STEP: f32 = 1.0;
const PLAYER_SPEED_MIN: f32 = 1.0;
const PLAYER_SPEED_MAX: f32 = 200.0;
const NPC_SPEED: f32 = 55.0;
const DETECTION_RADIUS: f32 = 60.0;
const FOLLOW_MIN_DISTANCE: f32 = 5.0;
const FOLLOW_SLOWDOWN_DISTANCE: f32 = 50.0;
const FOLLOW_SLOWDOWN_SCALE: f32 = 0.5;
const WANDER_CHANGE_SECONDS: f32 = 2.0;
const WANDER_SPEED_SCALE: f32 = 0.5;
const MIRROR_DEADZONE: f32 = 0.1;
const STATIONARY_KINDS: [&str; 1] = ["maren"];

include!("types.rs");
include!("player.rs");
include!("npc.rs");
include!("scene_impl.rs");

pub(crate) fn build_scene() -> Box<dyn Scene> {
    Box::new(WorldScene::new(LEVEL_NAME))
}
