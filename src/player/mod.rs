mod camera;
mod movement;

use bevy::prelude::*;
use crate::shared::*;
use crate::world::TileWorld;

pub use camera::{screen_to_world, world_to_screen, CameraRig};
pub use movement::greedy_step;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerMotion>();
        app.init_resource::<CameraRig>();

        // Intents are written during Resolve; the avatar and camera catch up
        // here with the same clamped frame delta the simulation used.
        app.add_systems(
            Update,
            (move_player, follow_player).chain().in_set(FrameSet::Motion),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Local resources (player-domain only)
// ═══════════════════════════════════════════════════════════════════════════

/// The avatar's continuous position and the intents steering it.
///
/// Positions are in tile units: `(3.5, 7.5)` is the centre of tile `(3, 7)`.
/// A keyboard vector always wins over a move-to-tile target; setting one
/// clears the greedy step in progress.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PlayerMotion {
    pub position: Vec2,
    pub move_vector: Vec2,
    pub target_tile: Option<TilePos>,
    /// Neighbouring tile currently being walked to on the way to `target_tile`.
    pub step_tile: Option<TilePos>,
    pub speed_multiplier: f32,
}

impl Default for PlayerMotion {
    fn default() -> Self {
        Self::new(Vec2::new(MAP_WIDTH as f32 / 2.0, MAP_HEIGHT as f32 / 2.0))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Systems
// ═══════════════════════════════════════════════════════════════════════════

fn move_player(frame: Res<FrameClock>, world: Res<TileWorld>, mut motion: ResMut<PlayerMotion>) {
    motion.update(frame.dt, &world);
}

fn follow_player(frame: Res<FrameClock>, motion: Res<PlayerMotion>, mut rig: ResMut<CameraRig>) {
    rig.update(motion.position, frame.dt);
}
