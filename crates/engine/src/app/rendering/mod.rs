mod renderer;
mod transform;

pub use renderer::Renderer;
pub use transform::{screen_to_world, world_to_screen_rect};
