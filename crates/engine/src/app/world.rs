use std::cmp::Ordering;

use crate::content::TextureStore;

use super::rendering::world_to_screen_rect;

/// Identity of the backdrop sprite. It sorts before everything else and is
/// never a picking target.
pub const BACKGROUND_NAME: &str = "background";
/// Identity reserved for a pointer sprite; excluded from picking.
pub const CURSOR_NAME: &str = "cursor";

pub const ZOOM_DEFAULT: f32 = 3.0;
pub const ZOOM_MIN: f32 = 0.1;
pub const ZOOM_MAX: f32 = 5.0;
pub const ZOOM_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.x as f32 + self.w as f32 * 0.5,
            y: self.y as f32 + self.h as f32 * 0.5,
        }
    }
}

/// Clamps a sprite origin so the whole rect stays inside the world.
/// Idempotent; a sprite larger than the world pins to the origin.
pub fn clamp_to_world(origin: (i32, i32), size: (i32, i32), world_size: (i32, i32)) -> (i32, i32) {
    let max_x = (world_size.0 - size.0).max(0);
    let max_y = (world_size.1 - size.1).max(0);
    (origin.0.clamp(0, max_x), origin.1.clamp(0, max_y))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteId(pub u64);

#[derive(Debug, Default)]
struct SpriteIdAllocator {
    next: u64,
}

impl SpriteIdAllocator {
    fn allocate(&mut self) -> SpriteId {
        let id = SpriteId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Everything needed to introduce a sprite into the world. The world fills
/// in the id, the spawn point, and the runtime flags.
#[derive(Debug, Clone)]
pub struct SpriteSpec {
    pub name: String,
    pub bounds: Rect,
    pub foot_size: (i32, i32),
    pub texture_key: String,
    pub animation: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Sprite {
    pub id: SpriteId,
    pub name: String,
    /// Visual rectangle used for drawing and world clamping.
    pub bounds: Rect,
    /// Footprint dimensions, fixed at spawn; the rect itself is derived.
    pub foot_size: (i32, i32),
    /// Where the sprite entered the world; part of the behavior-table key.
    pub spawn_point: (i32, i32),
    pub texture_key: String,
    pub animation: Option<String>,
    pub frame: usize,
    pub anim_elapsed_ms: f32,
    pub animated: bool,
    pub moving: bool,
    pub mirrored: bool,
}

impl Sprite {
    /// Ground-contact rectangle: centered under the visual bounds, flush
    /// with its bottom edge. Tracks `bounds` because it is derived on use.
    pub fn foot_rect(&self) -> Rect {
        Rect {
            x: self.bounds.x + (self.bounds.w - self.foot_size.0) / 2,
            y: self.bounds.y + self.bounds.h - self.foot_size.1,
            w: self.foot_size.0,
            h: self.foot_size.1,
        }
    }

    pub fn foot_center(&self) -> Vec2 {
        self.foot_rect().center()
    }
}

/// Total order for rendering and picking: background first, then footprint
/// bottom edge, then footprint left edge, then name. Sprites of the same
/// kind at the same spot compare equal and keep their relative order.
pub fn depth_cmp(a: &Sprite, b: &Sprite) -> Ordering {
    let a_background = a.name == BACKGROUND_NAME;
    let b_background = b.name == BACKGROUND_NAME;
    if a_background != b_background {
        return if a_background {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }

    let a_foot = a.foot_rect();
    let b_foot = b.foot_rect();
    a_foot
        .bottom()
        .cmp(&b_foot.bottom())
        .then(a_foot.x.cmp(&b_foot.x))
        .then_with(|| a.name.cmp(&b.name))
}

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    /// World position of the top-left visible corner.
    pub origin: (i32, i32),
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            origin: (0, 0),
            zoom: ZOOM_DEFAULT,
        }
    }
}

impl Camera {
    pub fn effective_zoom(&self) -> f32 {
        clamp_camera_zoom(self.zoom)
    }

    pub fn set_zoom_clamped(&mut self, zoom: f32) {
        self.zoom = clamp_camera_zoom(zoom);
    }

    pub fn apply_zoom_steps(&mut self, steps: i32) {
        if steps == 0 {
            return;
        }
        let target_zoom = self.zoom + steps as f32 * ZOOM_STEP;
        self.set_zoom_clamped(target_zoom);
    }
}

fn clamp_camera_zoom(zoom: f32) -> f32 {
    if !zoom.is_finite() {
        return ZOOM_DEFAULT;
    }
    zoom.clamp(ZOOM_MIN, ZOOM_MAX)
}

/// Derives the camera origin for a target rect: the visible window
/// (`viewport / zoom`) is centered on the target and clamped so it never
/// leaves world bounds.
pub fn camera_origin(
    target: Rect,
    world_size: (i32, i32),
    viewport: (u32, u32),
    zoom: f32,
) -> (i32, i32) {
    let zoom = clamp_camera_zoom(zoom);
    let visible_w = (viewport.0 as f32 / zoom).round() as i32;
    let visible_h = (viewport.1 as f32 / zoom).round() as i32;
    let x = target.x + target.w / 2 - visible_w / 2;
    let y = target.y + target.h / 2 - visible_h / 2;
    clamp_to_world((x, y), (visible_w, visible_h), world_size)
}

#[derive(Debug, Default)]
pub struct SpriteWorld {
    allocator: SpriteIdAllocator,
    sprites: Vec<Sprite>,
    world_size: (i32, i32),
    camera: Camera,
    textures: Option<TextureStore>,
}

impl SpriteWorld {
    pub fn new(world_size: (i32, i32)) -> Self {
        Self {
            world_size,
            camera: Camera::default(),
            ..Self::default()
        }
    }

    pub fn world_size(&self) -> (i32, i32) {
        self.world_size
    }

    pub fn spawn(&mut self, spec: SpriteSpec) -> SpriteId {
        let id = self.allocator.allocate();
        let animated = spec.animation.is_some();
        self.sprites.push(Sprite {
            id,
            name: spec.name,
            bounds: spec.bounds,
            foot_size: spec.foot_size,
            spawn_point: (spec.bounds.x, spec.bounds.y),
            texture_key: spec.texture_key,
            animation: spec.animation,
            frame: 0,
            anim_elapsed_ms: 0.0,
            animated,
            moving: false,
            mirrored: false,
        });
        id
    }

    pub fn remove(&mut self, id: SpriteId) -> bool {
        let before = self.sprites.len();
        self.sprites.retain(|sprite| sprite.id != id);
        self.sprites.len() != before
    }

    pub fn clear(&mut self) {
        self.sprites.clear();
        self.camera = Camera::default();
        self.textures = None;
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn sprites_mut(&mut self) -> &mut [Sprite] {
        &mut self.sprites
    }

    pub fn find(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.iter().find(|sprite| sprite.id == id)
    }

    pub fn find_mut(&mut self, id: SpriteId) -> Option<&mut Sprite> {
        self.sprites.iter_mut().find(|sprite| sprite.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Sprite> {
        self.sprites.iter().find(|sprite| sprite.name == name)
    }

    pub fn find_by_name_mut(&mut self, name: &str) -> Option<&mut Sprite> {
        self.sprites.iter_mut().find(|sprite| sprite.name == name)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn set_textures(&mut self, textures: TextureStore) {
        self.textures = Some(textures);
    }

    pub fn textures(&self) -> Option<&TextureStore> {
        self.textures.as_ref()
    }

    /// Fills `out` with sprite indices in back-to-front draw order. The
    /// order is a per-tick view; sprites themselves stay unsorted.
    pub fn collect_draw_order(&self, out: &mut Vec<usize>) {
        out.clear();
        out.extend(0..self.sprites.len());
        let sprites = &self.sprites;
        out.sort_by(|&a, &b| depth_cmp(&sprites[a], &sprites[b]));
    }

    /// Front-to-back hit test at a screen-space cursor position. Walks the
    /// draw order in reverse and returns the first sprite whose scaled,
    /// camera-offset rect contains the cursor, skipping the background and
    /// any cursor sprite.
    pub fn pick_topmost_at(&self, cursor_px: Vec2) -> Option<SpriteId> {
        let cursor_x = cursor_px.x.round() as i32;
        let cursor_y = cursor_px.y.round() as i32;
        let mut order = Vec::with_capacity(self.sprites.len());
        self.collect_draw_order(&mut order);

        for &index in order.iter().rev() {
            let sprite = &self.sprites[index];
            if sprite.name == BACKGROUND_NAME || sprite.name == CURSOR_NAME {
                continue;
            }
            let screen = world_to_screen_rect(&self.camera, sprite.bounds);
            if screen.contains(cursor_x, cursor_y) {
                return Some(sprite.id);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, bounds: Rect, foot_size: (i32, i32)) -> SpriteSpec {
        SpriteSpec {
            name: name.to_string(),
            bounds,
            foot_size,
            texture_key: name.to_string(),
            animation: None,
        }
    }

    fn sprite(name: &str, bounds: Rect, foot_size: (i32, i32)) -> Sprite {
        let mut world = SpriteWorld::new((1600, 1200));
        let id = world.spawn(spec(name, bounds, foot_size));
        world.find(id).expect("just spawned").clone()
    }

    #[test]
    fn allocator_never_reuses_ids() {
        let mut world = SpriteWorld::new((100, 100));
        let first = world.spawn(spec("a", Rect::new(0, 0, 4, 4), (4, 4)));
        world.remove(first);
        let second = world.spawn(spec("b", Rect::new(0, 0, 4, 4), (4, 4)));
        assert_ne!(first, second);
    }

    #[test]
    fn foot_rect_is_centered_and_flush_with_bottom() {
        let s = sprite("walker", Rect::new(100, 200, 32, 48), (16, 8));
        let foot = s.foot_rect();
        assert_eq!(foot, Rect::new(108, 240, 16, 8));
        assert_eq!(foot.bottom(), s.bounds.bottom());
    }

    #[test]
    fn foot_rect_tracks_bounds_after_movement() {
        let mut world = SpriteWorld::new((1600, 1200));
        let id = world.spawn(spec("walker", Rect::new(0, 0, 32, 48), (16, 8)));
        let s = world.find_mut(id).expect("walker");
        s.bounds.x = 50;
        s.bounds.y = 60;
        assert_eq!(s.foot_rect(), Rect::new(58, 100, 16, 8));
    }

    #[test]
    fn background_sorts_first_regardless_of_footprint() {
        let background = sprite(BACKGROUND_NAME, Rect::new(0, 0, 1600, 1200), (1600, 1200));
        let tiny = sprite("tiny", Rect::new(0, 0, 2, 2), (2, 2));
        assert_eq!(depth_cmp(&background, &tiny), Ordering::Less);
        assert_eq!(depth_cmp(&tiny, &background), Ordering::Greater);
    }

    #[test]
    fn lower_foot_bottom_sorts_earlier() {
        let high = sprite("high", Rect::new(0, 10, 8, 8), (8, 4));
        let low = sprite("low", Rect::new(0, 50, 8, 8), (8, 4));
        assert_eq!(depth_cmp(&high, &low), Ordering::Less);
    }

    #[test]
    fn equal_bottom_breaks_tie_on_foot_left_then_name() {
        let left = sprite("zed", Rect::new(0, 10, 8, 8), (8, 4));
        let right = sprite("abe", Rect::new(40, 10, 8, 8), (8, 4));
        assert_eq!(depth_cmp(&left, &right), Ordering::Less);

        let a = sprite("abe", Rect::new(0, 10, 8, 8), (8, 4));
        let z = sprite("zed", Rect::new(0, 10, 8, 8), (8, 4));
        assert_eq!(depth_cmp(&a, &z), Ordering::Less);
    }

    #[test]
    fn depth_cmp_is_antisymmetric_over_sample_pairs() {
        let sprites = [
            sprite(BACKGROUND_NAME, Rect::new(0, 0, 1600, 1200), (1600, 1200)),
            sprite("a", Rect::new(5, 5, 8, 8), (4, 2)),
            sprite("b", Rect::new(5, 5, 8, 8), (4, 2)),
            sprite("a", Rect::new(9, 70, 8, 8), (4, 2)),
            sprite("c", Rect::new(200, 70, 16, 16), (8, 4)),
        ];
        for x in &sprites {
            for y in &sprites {
                assert_eq!(depth_cmp(x, y), depth_cmp(y, x).reverse());
            }
        }
    }

    #[test]
    fn draw_order_places_background_first_and_sorts_by_bottom() {
        let mut world = SpriteWorld::new((1600, 1200));
        let low = world.spawn(spec("low", Rect::new(0, 100, 8, 8), (8, 4)));
        let background = world.spawn(spec(
            BACKGROUND_NAME,
            Rect::new(0, 0, 1600, 1200),
            (1600, 1200),
        ));
        let high = world.spawn(spec("high", Rect::new(0, 10, 8, 8), (8, 4)));

        let mut order = Vec::new();
        world.collect_draw_order(&mut order);
        let ids: Vec<SpriteId> = order.iter().map(|&i| world.sprites()[i].id).collect();
        assert_eq!(ids, vec![background, high, low]);
    }

    #[test]
    fn clamp_inside_world_is_a_no_op_and_idempotent() {
        let inside = clamp_to_world((100, 200), (32, 48), (1600, 1200));
        assert_eq!(inside, (100, 200));

        let clamped = clamp_to_world((2000, -50), (32, 48), (1600, 1200));
        assert_eq!(clamped, (1568, 0));
        assert_eq!(clamp_to_world(clamped, (32, 48), (1600, 1200)), clamped);
    }

    #[test]
    fn clamp_pins_oversized_sprite_to_origin() {
        assert_eq!(clamp_to_world((300, 400), (2000, 2000), (1600, 1200)), (0, 0));
    }

    #[test]
    fn camera_centers_on_target_inside_world() {
        let target = Rect::new(784, 584, 32, 32);
        let origin = camera_origin(target, (1600, 1200), (800, 600), 1.0);
        assert_eq!(origin, (400, 300));
    }

    #[test]
    fn camera_clamps_at_world_corner() {
        let target = Rect::new(-16, -16, 32, 32);
        let origin = camera_origin(target, (1600, 1200), (800, 600), 1.0);
        assert_eq!(origin, (0, 0));
    }

    #[test]
    fn camera_visible_window_shrinks_with_zoom() {
        let target = Rect::new(1584, 1184, 32, 32);
        let origin = camera_origin(target, (1600, 1200), (800, 600), 2.0);
        assert_eq!(origin, (1200, 900));
    }

    #[test]
    fn camera_zoom_steps_clamp_at_bounds() {
        let mut camera = Camera::default();
        camera.apply_zoom_steps(200);
        assert!((camera.zoom - ZOOM_MAX).abs() < 0.0001);

        camera.apply_zoom_steps(-400);
        assert!((camera.zoom - ZOOM_MIN).abs() < 0.0001);
    }

    #[test]
    fn camera_rejects_non_finite_zoom() {
        let mut camera = Camera::default();
        camera.set_zoom_clamped(f32::NAN);
        assert!((camera.zoom - ZOOM_DEFAULT).abs() < 0.0001);
    }

    #[test]
    fn pick_returns_topmost_by_depth_order() {
        let mut world = SpriteWorld::new((1600, 1200));
        world.camera_mut().set_zoom_clamped(1.0);
        let back = world.spawn(spec("back", Rect::new(10, 10, 20, 20), (20, 4)));
        let front = world.spawn(spec("front", Rect::new(10, 20, 20, 20), (20, 4)));

        let picked = world.pick_topmost_at(Vec2 { x: 15.0, y: 25.0 });
        assert_eq!(picked, Some(front));
        assert_ne!(picked, Some(back));
    }

    #[test]
    fn pick_skips_background_and_cursor() {
        let mut world = SpriteWorld::new((1600, 1200));
        world.camera_mut().set_zoom_clamped(1.0);
        world.spawn(spec(
            BACKGROUND_NAME,
            Rect::new(0, 0, 1600, 1200),
            (1600, 1200),
        ));
        world.spawn(spec(CURSOR_NAME, Rect::new(0, 0, 1600, 1200), (16, 16)));

        assert_eq!(world.pick_topmost_at(Vec2 { x: 100.0, y: 100.0 }), None);
    }

    #[test]
    fn pick_respects_camera_offset_and_zoom() {
        let mut world = SpriteWorld::new((1600, 1200));
        world.camera_mut().set_zoom_clamped(2.0);
        world.camera_mut().origin = (100, 100);
        let id = world.spawn(spec("rock", Rect::new(110, 110, 10, 10), (10, 4)));

        // World (110,110) maps to screen (20,20); the rect spans 20px.
        assert_eq!(world.pick_topmost_at(Vec2 { x: 30.0, y: 30.0 }), Some(id));
        assert_eq!(world.pick_topmost_at(Vec2 { x: 10.0, y: 10.0 }), None);
    }

    #[test]
    fn find_by_name_returns_spawned_sprite() {
        let mut world = SpriteWorld::new((1600, 1200));
        let id = world.spawn(spec("hero", Rect::new(5, 6, 7, 8), (7, 8)));
        let found = world.find_by_name("hero").expect("hero");
        assert_eq!(found.id, id);
        assert_eq!(found.spawn_point, (5, 6));
        assert!(world.find_by_name("nobody").is_none());
    }

    #[test]
    fn spawn_with_animation_marks_sprite_animated() {
        let mut world = SpriteWorld::new((1600, 1200));
        let id = world.spawn(SpriteSpec {
            name: "bat".to_string(),
            bounds: Rect::new(0, 0, 8, 8),
            foot_size: (4, 2),
            texture_key: "batFlapS1".to_string(),
            animation: Some("batFlapS".to_string()),
        });
        let bat = world.find(id).expect("bat");
        assert!(bat.animated);
        assert_eq!(bat.frame, 0);
        assert_eq!(bat.anim_elapsed_ms, 0.0);
    }
}
