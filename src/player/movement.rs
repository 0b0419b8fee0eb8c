//! Avatar stepping: keyboard vectors, greedy tile-by-tile walks to a
//! target, and axis-separated collision against blocked tiles.

use bevy::prelude::*;
use crate::shared::*;
use crate::world::TileWorld;
use super::PlayerMotion;

impl PlayerMotion {
    pub fn new(start: Vec2) -> Self {
        Self {
            position: start,
            move_vector: Vec2::ZERO,
            target_tile: None,
            step_tile: None,
            speed_multiplier: 1.0,
        }
    }

    pub fn set_move_vector(&mut self, vector: Vec2) {
        self.move_vector = vector;
    }

    /// Replaces the walk target and forgets the step in progress.
    pub fn set_target_tile(&mut self, tile: Option<TilePos>) {
        self.target_tile = tile;
        self.step_tile = None;
    }

    /// Drops every movement intent. The avatar stays where it is.
    pub fn stop(&mut self) {
        self.set_move_vector(Vec2::ZERO);
        self.set_target_tile(None);
    }

    /// Floored so exhausted characters still crawl.
    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.speed_multiplier = multiplier.max(MIN_SPEED_MULTIPLIER);
    }

    pub fn tile(&self) -> TilePos {
        TilePos::containing(self.position)
    }

    /// Advances the avatar by `dt` real seconds.
    ///
    /// Walking to a target proceeds one neighbouring tile at a time, picking
    /// the axis with the larger remaining delta. The walk is abandoned when
    /// the next step is blocked or the avatar made no progress this frame.
    pub fn update(&mut self, dt: f32, world: &TileWorld) {
        let previous = self.position;
        let mut velocity = None;

        if self.move_vector != Vec2::ZERO {
            self.step_tile = None;
            velocity = Some(self.move_vector.normalize_or_zero());
        } else if let Some(target) = self.target_tile {
            let target_center = target.center();
            if self.position.distance(target_center) <= TARGET_EPSILON {
                self.position = target_center;
                self.set_target_tile(None);
            } else {
                let needs_step = self
                    .step_tile
                    .map_or(true, |step| self.position.distance(step.center()) <= TARGET_EPSILON);
                if needs_step {
                    let current = self.tile();
                    if current == target {
                        self.step_tile = Some(current);
                    } else {
                        match greedy_step(current, target) {
                            Some(next) if !world.is_blocked(next.x, next.y) => {
                                self.step_tile = Some(next);
                            }
                            _ => self.set_target_tile(None),
                        }
                    }
                }
                if let Some(step) = self.step_tile {
                    velocity = Some((step.center() - self.position).normalize_or_zero());
                }
            }
        }

        if let Some(direction) = velocity {
            self.move_with_collision(direction, dt, world);
        }

        let max_x = (world.width() as f32 - 0.001).max(0.0);
        let max_y = (world.height() as f32 - 0.001).max(0.0);
        self.position.x = self.position.x.clamp(0.0, max_x);
        self.position.y = self.position.y.clamp(0.0, max_y);

        if self.target_tile.is_some() && self.position == previous {
            self.set_target_tile(None);
        }
    }

    /// Axis-separated so the avatar slides along walls instead of sticking.
    fn move_with_collision(&mut self, direction: Vec2, dt: f32, world: &TileWorld) {
        let delta = direction * PLAYER_SPEED * self.speed_multiplier * dt;

        if delta.x != 0.0 {
            let next_x = self.position.x + delta.x;
            if !world.is_blocked(next_x.floor() as i32, self.position.y.floor() as i32) {
                self.position.x = next_x;
            }
        }
        if delta.y != 0.0 {
            let next_y = self.position.y + delta.y;
            if !world.is_blocked(self.position.x.floor() as i32, next_y.floor() as i32) {
                self.position.y = next_y;
            }
        }
    }
}

/// One tile closer to `target` along the dominant axis; ties go to x.
pub fn greedy_step(current: TilePos, target: TilePos) -> Option<TilePos> {
    let dx = target.x - current.x;
    let dy = target.y - current.y;
    if dx == 0 && dy == 0 {
        return None;
    }
    if dx.abs() >= dy.abs() {
        Some(TilePos::new(current.x + dx.signum(), current.y))
    } else {
        Some(TilePos::new(current.x, current.y + dy.signum()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> TileWorld {
        TileWorld::generate(MAP_WIDTH, MAP_HEIGHT, WORLD_SEED)
    }

    /// An open tile with open neighbours on every side, found by scanning.
    fn open_spot(world: &TileWorld) -> TilePos {
        for y in 2..world.height() - 2 {
            for x in 2..world.width() - 2 {
                let clear = (-2..=2).all(|dy| (-2..=2).all(|dx| !world.is_blocked(x + dx, y + dy)));
                if clear {
                    return TilePos::new(x, y);
                }
            }
        }
        panic!("no open 5x5 area");
    }

    #[test]
    fn test_greedy_step_prefers_larger_axis() {
        let origin = TilePos::new(5, 5);
        assert_eq!(greedy_step(origin, TilePos::new(9, 7)), Some(TilePos::new(6, 5)));
        assert_eq!(greedy_step(origin, TilePos::new(4, 1)), Some(TilePos::new(5, 4)));
        assert_eq!(greedy_step(origin, TilePos::new(3, 7)), Some(TilePos::new(4, 5)));
        assert_eq!(greedy_step(origin, origin), None);
    }

    #[test]
    fn test_speed_multiplier_is_floored() {
        let mut motion = PlayerMotion::default();
        motion.set_speed_multiplier(0.02);
        assert_eq!(motion.speed_multiplier, MIN_SPEED_MULTIPLIER);
        motion.set_speed_multiplier(0.48);
        assert_eq!(motion.speed_multiplier, 0.48);
    }

    #[test]
    fn test_keyboard_vector_is_normalised() {
        let world = world();
        let spot = open_spot(&world);
        let mut motion = PlayerMotion::new(spot.center());
        motion.set_move_vector(Vec2::new(1.0, 1.0));
        motion.update(0.1, &world);
        let travelled = motion.position.distance(spot.center());
        assert!((travelled - PLAYER_SPEED * 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_walks_to_target_and_snaps_to_centre() {
        let world = world();
        let spot = open_spot(&world);
        let target = TilePos::new(spot.x + 2, spot.y + 1);
        let mut motion = PlayerMotion::new(spot.center());
        motion.set_target_tile(Some(target));
        for _ in 0..200 {
            motion.update(0.016, &world);
            if motion.target_tile.is_none() {
                break;
            }
        }
        assert_eq!(motion.target_tile, None);
        assert_eq!(motion.tile(), target);
        assert!(motion.position.distance(target.center()) <= TARGET_EPSILON);
    }

    #[test]
    fn test_blocked_step_cancels_walk() {
        let world = world();
        // The pond centre is water on this seed.
        let pond = TilePos::new((MAP_WIDTH as f32 * 0.28) as i32, (MAP_HEIGHT as f32 * 0.32) as i32);
        assert!(world.is_blocked(pond.x, pond.y));
        let start = pond.center() + Vec2::new(-6.0, 0.0);
        let mut motion = PlayerMotion::new(start);
        motion.set_target_tile(Some(pond));
        for _ in 0..400 {
            motion.update(0.016, &world);
        }
        assert_eq!(motion.target_tile, None);
        assert!(!world.is_blocked(motion.tile().x, motion.tile().y));
        assert!(motion.position.x >= start.x);
    }

    #[test]
    fn test_position_stays_inside_map() {
        let world = world();
        let mut motion = PlayerMotion::new(Vec2::new(0.2, 0.2));
        motion.set_move_vector(Vec2::new(-1.0, -1.0));
        motion.update(1.0, &world);
        assert!(motion.position.x >= 0.0 && motion.position.y >= 0.0);
    }

    #[test]
    fn test_stop_clears_intents() {
        let mut motion = PlayerMotion::default();
        motion.set_move_vector(Vec2::X);
        motion.set_target_tile(Some(TilePos::new(1, 1)));
        motion.step_tile = Some(TilePos::new(2, 2));
        motion.stop();
        assert_eq!(motion.move_vector, Vec2::ZERO);
        assert_eq!(motion.target_tile, None);
        assert_eq!(motion.step_tile, None);
    }
}
