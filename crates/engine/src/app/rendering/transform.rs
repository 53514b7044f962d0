use crate::app::world::{Camera, Rect, Vec2};

/// Maps a world rect to its on-screen rect: camera offset first, then the
/// zoom scale. Sizes scale with zoom too.
pub fn world_to_screen_rect(camera: &Camera, rect: Rect) -> Rect {
    let zoom = camera.effective_zoom();
    Rect {
        x: ((rect.x - camera.origin.0) as f32 * zoom).round() as i32,
        y: ((rect.y - camera.origin.1) as f32 * zoom).round() as i32,
        w: (rect.w as f32 * zoom).round() as i32,
        h: (rect.h as f32 * zoom).round() as i32,
    }
}

/// Inverse of the screen transform: unscale, then add the camera origin.
pub fn screen_to_world(camera: &Camera, point: Vec2) -> Vec2 {
    let zoom = camera.effective_zoom();
    Vec2 {
        x: point.x / zoom + camera.origin.0 as f32,
        y: point.y / zoom + camera.origin.1 as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(origin: (i32, i32), zoom: f32) -> Camera {
        let mut camera = Camera::default();
        camera.origin = origin;
        camera.set_zoom_clamped(zoom);
        camera
    }

    #[test]
    fn identity_camera_maps_world_to_screen_unchanged() {
        let rect = Rect::new(10, 20, 30, 40);
        let mapped = world_to_screen_rect(&camera((0, 0), 1.0), rect);
        assert_eq!(mapped, rect);
    }

    #[test]
    fn camera_offset_shifts_before_scaling() {
        let mapped = world_to_screen_rect(&camera((100, 50), 2.0), Rect::new(110, 60, 10, 5));
        assert_eq!(mapped, Rect::new(20, 20, 20, 10));
    }

    #[test]
    fn screen_to_world_inverts_offset_and_zoom() {
        let cam = camera((100, 50), 2.0);
        let world = screen_to_world(&cam, Vec2 { x: 20.0, y: 20.0 });
        assert!((world.x - 110.0).abs() < 0.0001);
        assert!((world.y - 60.0).abs() < 0.0001);
    }

    #[test]
    fn round_trip_through_both_transforms() {
        let cam = camera((37, -12), 1.5);
        let original = Vec2 { x: 300.0, y: 200.0 };
        let screen = Vec2 {
            x: (original.x - 37.0) * 1.5,
            y: (original.y + 12.0) * 1.5,
        };
        let back = screen_to_world(&cam, screen);
        assert!((back.x - original.x).abs() < 0.001);
        assert!((back.y - original.y).abs() < 0.001);
    }
}
