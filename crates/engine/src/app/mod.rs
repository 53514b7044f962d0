mod animation;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod world;

pub use animation::{AnimationDef, AnimationLibrary, Animator};
pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{run_app, AppError, LoopConfig, Scene};
pub use metrics::FrameStats;
pub use rendering::{screen_to_world, world_to_screen_rect, Renderer};
pub use world::{
    camera_origin, clamp_to_world, depth_cmp, Camera, Rect, Sprite, SpriteId, SpriteSpec,
    SpriteWorld, Vec2, BACKGROUND_NAME, CURSOR_NAME, ZOOM_DEFAULT, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP,
};
