use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use tinyacre::shared::*;
use tinyacre::{
    actions, calendar, controller, data, economy, farming, input, needs, player, view, world,
};

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Tiny Acre".into(),
                        resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        // Game state
        .init_state::<GameState>()
        // Domain plugins
        .add_plugins(calendar::CalendarPlugin)
        .add_plugins(world::WorldPlugin)
        .add_plugins(needs::NeedsPlugin)
        .add_plugins(actions::ActionsPlugin)
        .add_plugins(farming::FarmingPlugin)
        .add_plugins(economy::EconomyPlugin)
        .add_plugins(player::PlayerPlugin)
        .add_plugins(input::InputPlugin)
        .add_plugins(controller::ControllerPlugin)
        // Data loading
        .add_plugins(data::DataPlugin)
        // Rendering
        .add_plugins(view::ViewPlugin)
        .run();
}
