use std::collections::HashSet;
use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::app::world::{Rect, SpriteWorld, Vec2};
use crate::content::{Texture, CURSOR_TEXTURE_KEY};

use super::transform::world_to_screen_rect;

const CLEAR_COLOR: [u8; 4] = [14, 16, 22, 255];

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
    draw_order_scratch: Vec<usize>,
    warned_missing_texture_keys: HashSet<String>,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            width: size.width,
            height: size.height,
            draw_order_scratch: Vec::new(),
            warned_missing_texture_keys: HashSet::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    /// Draws the world back-to-front in depth order with the camera offset
    /// and zoom applied, then the cursor sprite unscaled on top.
    pub fn render_world(
        &mut self,
        world: &SpriteWorld,
        cursor_px: Option<Vec2>,
    ) -> Result<(), Error> {
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }

        let frame = self.pixels.frame_mut();
        for chunk in frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&CLEAR_COLOR);
        }

        let Some(textures) = world.textures() else {
            return self.pixels.render();
        };

        world.collect_draw_order(&mut self.draw_order_scratch);
        for &index in &self.draw_order_scratch {
            let sprite = &world.sprites()[index];
            let Some(texture) = textures.get(&sprite.texture_key) else {
                if self
                    .warned_missing_texture_keys
                    .insert(sprite.texture_key.clone())
                {
                    warn!(
                        texture_key = %sprite.texture_key,
                        sprite = %sprite.name,
                        "texture key not loaded; sprite skipped"
                    );
                }
                continue;
            };
            let dest = world_to_screen_rect(world.camera(), sprite.bounds);
            blit_scaled(frame, self.width, self.height, texture, dest, sprite.mirrored);
        }

        if let Some(cursor) = cursor_px {
            if let Some(texture) = textures.get(CURSOR_TEXTURE_KEY) {
                let dest = Rect::new(
                    cursor.x.round() as i32,
                    cursor.y.round() as i32,
                    texture.width as i32,
                    texture.height as i32,
                );
                blit_scaled(frame, self.width, self.height, texture, dest, false);
            }
        }

        self.pixels.render()
    }
}

/// Nearest-neighbor blit of `texture` into `dest`, clipped to the frame.
/// Fully transparent source pixels are skipped; `mirrored` samples the
/// source right-to-left.
fn blit_scaled(
    frame: &mut [u8],
    frame_width: u32,
    frame_height: u32,
    texture: &Texture,
    dest: Rect,
    mirrored: bool,
) {
    if dest.w <= 0 || dest.h <= 0 || texture.width == 0 || texture.height == 0 {
        return;
    }

    for dy in 0..dest.h {
        let py = dest.y + dy;
        if py < 0 || py >= frame_height as i32 {
            continue;
        }
        let sy = (dy as i64 * texture.height as i64 / dest.h as i64) as u32;
        for dx in 0..dest.w {
            let px = dest.x + dx;
            if px < 0 || px >= frame_width as i32 {
                continue;
            }
            let mut sx = (dx as i64 * texture.width as i64 / dest.w as i64) as u32;
            if mirrored {
                sx = texture.width - 1 - sx;
            }
            let src = ((sy * texture.width + sx) * 4) as usize;
            if texture.rgba[src + 3] == 0 {
                continue;
            }
            let dst = ((py as u32 * frame_width + px as u32) * 4) as usize;
            frame[dst..dst + 4].copy_from_slice(&texture.rgba[src..src + 4]);
        }
    }
}
