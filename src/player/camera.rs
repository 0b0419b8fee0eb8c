use bevy::prelude::*;
use crate::shared::*;

/// Isometric projection of a tile-space position onto the screen plane.
/// Screen `y` grows downwards, matching window cursor coordinates.
pub fn world_to_screen(world: Vec2) -> Vec2 {
    Vec2::new(
        (world.x - world.y) * (TILE_W / 2.0),
        (world.x + world.y) * (TILE_H / 2.0),
    )
}

/// Inverse of [`world_to_screen`].
pub fn screen_to_world(screen: Vec2) -> Vec2 {
    let a = screen.x / (TILE_W / 2.0);
    let b = screen.y / (TILE_H / 2.0);
    Vec2::new((a + b) / 2.0, (b - a) / 2.0)
}

/// Where the view is looking, in tile space.
///
/// The camera chases the avatar plus a pan offset accumulated from drags,
/// so a drag shifts the view without the avatar pulling it straight back.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct CameraRig {
    pub position: Vec2,
    pub offset: Vec2,
    pub zoom: f32,
    pub smoothing: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            position: Vec2::new(MAP_WIDTH as f32 / 2.0, MAP_HEIGHT as f32 / 2.0),
            offset: Vec2::ZERO,
            zoom: ZOOM_START,
            smoothing: CAMERA_SMOOTHING,
        }
    }
}

impl CameraRig {
    /// Frame-rate independent exponential approach towards `target + offset`.
    pub fn update(&mut self, target: Vec2, dt: f32) {
        let desired = target + self.offset;
        let t = 1.0 - (-self.smoothing * dt).exp();
        self.position += (desired - self.position) * t;
    }

    pub fn pan_by_world(&mut self, delta: Vec2) {
        self.offset += delta;
        self.position += delta;
    }

    /// Multiplies the zoom, clamped to the allowed range.
    pub fn apply_zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.zoom = (self.zoom * factor).clamp(ZOOM_MIN, ZOOM_MAX);
        }
    }

    /// A screen-space drag converted to the tile-space distance it covers.
    pub fn screen_delta_to_world(&self, delta: Vec2) -> Vec2 {
        screen_to_world(delta / self.zoom)
    }

    /// Tile-space point under a cursor position in a viewport of `viewport` px.
    pub fn viewport_to_world(&self, cursor: Vec2, viewport: Vec2) -> Vec2 {
        let center = viewport / 2.0;
        let camera_screen = world_to_screen(self.position);
        screen_to_world((cursor - center) / self.zoom + camera_screen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_round_trips() {
        let world = Vec2::new(7.25, 3.5);
        let back = screen_to_world(world_to_screen(world));
        assert!(back.distance(world) < 1e-4);
        assert_eq!(world_to_screen(Vec2::new(1.0, 1.0)), Vec2::new(0.0, TILE_H));
    }

    #[test]
    fn test_follow_converges_without_overshoot() {
        let mut rig = CameraRig {
            position: Vec2::ZERO,
            ..default()
        };
        let target = Vec2::new(10.0, 0.0);
        let mut last = 0.0;
        for _ in 0..120 {
            rig.update(target, 1.0 / 60.0);
            assert!(rig.position.x >= last && rig.position.x <= target.x);
            last = rig.position.x;
        }
        assert!((rig.position.x - target.x).abs() < 0.01);
    }

    #[test]
    fn test_pan_offset_survives_follow() {
        let mut rig = CameraRig::default();
        let target = rig.position;
        rig.pan_by_world(Vec2::new(2.0, -1.0));
        for _ in 0..10 {
            rig.update(target, 0.05);
        }
        assert!(rig.position.distance(target + Vec2::new(2.0, -1.0)) < 1e-4);
    }

    #[test]
    fn test_zoom_is_clamped_and_ignores_bad_factors() {
        let mut rig = CameraRig::default();
        rig.apply_zoom(10.0);
        assert_eq!(rig.zoom, ZOOM_MAX);
        rig.apply_zoom(0.01);
        assert_eq!(rig.zoom, ZOOM_MIN);
        rig.apply_zoom(f32::NAN);
        rig.apply_zoom(0.0);
        assert_eq!(rig.zoom, ZOOM_MIN);
    }

    #[test]
    fn test_viewport_centre_maps_to_camera() {
        let rig = CameraRig::default();
        let viewport = Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT);
        let hit = rig.viewport_to_world(viewport / 2.0, viewport);
        assert!(hit.distance(rig.position) < 1e-4);
    }
}
