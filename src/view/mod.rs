//! View domain: placeholder isometric rendering.
//!
//! Terrain and plots are flat rhombus meshes, actors are upright sprites.
//! Every system here reads simulation resources or the published
//! [`HudSnapshot`]; the only write back is the shop grid, which follows the
//! window width.

use bevy::math::primitives::Rhombus;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::controller::HudSnapshot;
use crate::farming::{growth_stage, is_harvestable};
use crate::player::{world_to_screen, CameraRig, PlayerMotion};
use crate::shared::*;
use crate::world::layout::SHOPKEEPER_TILE;
use crate::world::{TileVariant, TileWorld};

mod panels;

pub struct ViewPlugin;

impl Plugin for ViewPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            .add_systems(
                OnEnter(GameState::Playing),
                (spawn_terrain, spawn_plots, spawn_actors, panels::spawn_hud),
            )
            .add_systems(
                Update,
                fit_shop_grid
                    .before(FrameSet::Resolve)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                (
                    sync_camera,
                    sync_actors,
                    sync_plots,
                    sync_markers,
                    panels::sync_status,
                    panels::sync_action_buttons,
                    panels::sync_shop_panel,
                )
                    .after(FrameSet::Present)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// LAYERS
// ═══════════════════════════════════════════════════════════════════════

const LAYER_TERRAIN: f32 = 0.0;
const LAYER_PLOT: f32 = 1.0;
const LAYER_CROP: f32 = 2.0;
const LAYER_MARKER: f32 = 3.0;
const LAYER_ACTOR: f32 = 10.0;
/// Depth added per tile of `x + y`, so nearer things draw on top.
const DEPTH_PER_TILE: f32 = 0.01;

const ACTOR_SIZE: Vec2 = Vec2::new(28.0, 56.0);

/// Bevy translation for a tile-space point. Screen `y` is flipped because
/// Bevy's world grows upwards.
pub fn iso_translation(world: Vec2, layer: f32) -> Vec3 {
    let screen = world_to_screen(world);
    Vec3::new(
        screen.x,
        -screen.y,
        layer + (world.x + world.y) * DEPTH_PER_TILE,
    )
}

fn variant_color(variant: TileVariant) -> Color {
    match variant {
        TileVariant::GrassA => Color::srgb(0.42, 0.68, 0.35),
        TileVariant::GrassB => Color::srgb(0.38, 0.64, 0.32),
        TileVariant::GrassC => Color::srgb(0.46, 0.71, 0.38),
        TileVariant::Soil => Color::srgb(0.55, 0.40, 0.26),
        TileVariant::Path => Color::srgb(0.78, 0.70, 0.52),
        TileVariant::ShopFloor => Color::srgb(0.72, 0.58, 0.44),
        TileVariant::Water => Color::srgb(0.27, 0.52, 0.80),
        TileVariant::Rock => Color::srgb(0.50, 0.50, 0.52),
    }
}

fn shaded(color: Color, shade: f32) -> Color {
    let c = color.to_srgba();
    Color::srgb(
        (c.red * shade).clamp(0.0, 1.0),
        (c.green * shade).clamp(0.0, 1.0),
        (c.blue * shade).clamp(0.0, 1.0),
    )
}

fn soil_color(soil: SoilState) -> Color {
    match soil {
        SoilState::Empty => Color::srgba(0.0, 0.0, 0.0, 0.0),
        SoilState::Tilled => Color::srgb(0.45, 0.30, 0.18),
        SoilState::Watered => Color::srgb(0.30, 0.20, 0.12),
    }
}

fn crop_color(stage: u8, ready: bool) -> Color {
    if ready {
        return Color::srgb(0.95, 0.62, 0.20);
    }
    match stage {
        0 => Color::srgb(0.55, 0.78, 0.40),
        1 => Color::srgb(0.40, 0.72, 0.30),
        _ => Color::srgb(0.28, 0.62, 0.22),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
struct PlotTile {
    tile: TilePos,
    material: Handle<ColorMaterial>,
}

#[derive(Component)]
struct CropSprite(TilePos);

#[derive(Component)]
struct PlayerSprite;

#[derive(Component)]
struct HighlightMarker;

#[derive(Component)]
struct TargetMarker;

// ═══════════════════════════════════════════════════════════════════════
// SPAWN
// ═══════════════════════════════════════════════════════════════════════

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

fn spawn_terrain(
    mut commands: Commands,
    world: Res<TileWorld>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let diamond = meshes.add(Rhombus::new(TILE_W, TILE_H));
    for y in 0..world.height() {
        for x in 0..world.width() {
            let Some(tile) = world.get(x, y) else {
                continue;
            };
            let color = shaded(variant_color(tile.variant), tile.shade);
            let center = TilePos::new(x, y).center();
            commands.spawn((
                Name::new(tile.variant.asset_id()),
                Mesh2d(diamond.clone()),
                MeshMaterial2d(materials.add(ColorMaterial::from(color))),
                Transform::from_translation(iso_translation(center, LAYER_TERRAIN)),
            ));
        }
    }
    debug!(
        "[World] Spawned {} terrain tiles",
        world.width() * world.height()
    );
}

fn spawn_plots(
    mut commands: Commands,
    farm: Res<FarmState>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let diamond = meshes.add(Rhombus::new(TILE_W * 0.9, TILE_H * 0.9));
    for (&tile, plot) in &farm.plots {
        let material = materials.add(ColorMaterial::from(soil_color(plot.soil)));
        commands.spawn((
            PlotTile {
                tile,
                material: material.clone(),
            },
            Mesh2d(diamond.clone()),
            MeshMaterial2d(material),
            Transform::from_translation(iso_translation(tile.center(), LAYER_PLOT)),
        ));
        commands.spawn((
            CropSprite(tile),
            Sprite {
                custom_size: Some(Vec2::splat(12.0)),
                ..default()
            },
            Transform::from_translation(iso_translation(tile.center(), LAYER_CROP)),
            Visibility::Hidden,
        ));
    }
}

fn spawn_actors(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    commands.spawn((
        PlayerSprite,
        Sprite {
            color: Color::srgb(0.25, 0.45, 0.85),
            custom_size: Some(ACTOR_SIZE),
            anchor: bevy::sprite::Anchor::BottomCenter,
            ..default()
        },
        Transform::default(),
    ));

    commands.spawn((
        Sprite {
            color: Color::srgb(0.80, 0.35, 0.55),
            custom_size: Some(ACTOR_SIZE),
            anchor: bevy::sprite::Anchor::BottomCenter,
            ..default()
        },
        Transform::from_translation(iso_translation(SHOPKEEPER_TILE.center(), LAYER_ACTOR)),
    ));

    let outline = meshes.add(Rhombus::new(TILE_W, TILE_H));
    commands.spawn((
        HighlightMarker,
        Mesh2d(outline),
        MeshMaterial2d(materials.add(ColorMaterial::from(Color::srgba(
            1.0, 1.0, 1.0, 0.25,
        )))),
        Transform::default(),
        Visibility::Hidden,
    ));
    commands.spawn((
        TargetMarker,
        Mesh2d(meshes.add(Rhombus::new(TILE_W * 0.35, TILE_H * 0.35))),
        MeshMaterial2d(materials.add(ColorMaterial::from(Color::srgba(
            1.0, 0.9, 0.3, 0.8,
        )))),
        Transform::default(),
        Visibility::Hidden,
    ));
}

// ═══════════════════════════════════════════════════════════════════════
// SYNC
// ═══════════════════════════════════════════════════════════════════════

fn fit_shop_grid(windows: Query<&Window, With<PrimaryWindow>>, mut grid: ResMut<ShopGrid>) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    grid.set_if_neq(ShopGrid::for_viewport_width(window.width()));
}

fn sync_camera(
    rig: Res<CameraRig>,
    mut cameras: Query<(&mut Transform, &mut OrthographicProjection), With<Camera2d>>,
) {
    for (mut transform, mut projection) in &mut cameras {
        let at = iso_translation(rig.position, 0.0);
        transform.translation.x = at.x;
        transform.translation.y = at.y;
        projection.scale = 1.0 / rig.zoom;
    }
}

fn sync_actors(motion: Res<PlayerMotion>, mut players: Query<&mut Transform, With<PlayerSprite>>) {
    for mut transform in &mut players {
        transform.translation = iso_translation(motion.position, LAYER_ACTOR);
    }
}

fn sync_plots(
    farm: Res<FarmState>,
    crops: Res<CropCatalog>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    plots: Query<&PlotTile>,
    mut crop_sprites: Query<(&CropSprite, &mut Sprite, &mut Visibility)>,
) {
    if !farm.is_changed() {
        return;
    }
    for plot_tile in &plots {
        let (Some(plot), Some(material)) = (
            farm.plot(plot_tile.tile),
            materials.get_mut(&plot_tile.material),
        ) else {
            continue;
        };
        material.color = soil_color(plot.soil);
    }
    for (CropSprite(tile), mut sprite, mut visibility) in &mut crop_sprites {
        let Some(plot) = farm.plot(*tile).filter(|plot| plot.crop.is_some()) else {
            *visibility = Visibility::Hidden;
            continue;
        };
        let stage = growth_stage(plot, &crops);
        sprite.color = crop_color(stage, is_harvestable(plot, &crops));
        sprite.custom_size = Some(Vec2::splat(10.0 + stage as f32 * 6.0));
        *visibility = Visibility::Inherited;
    }
}

fn sync_markers(
    hud: Res<HudSnapshot>,
    mut highlight: Query<
        (&mut Transform, &mut Visibility),
        (With<HighlightMarker>, Without<TargetMarker>),
    >,
    mut target: Query<(&mut Transform, &mut Visibility), With<TargetMarker>>,
) {
    if !hud.is_changed() {
        return;
    }
    place_marker(&mut highlight, hud.highlight_tile);
    place_marker(&mut target, hud.target_tile);
}

fn place_marker<F: bevy::ecs::query::QueryFilter>(
    markers: &mut Query<(&mut Transform, &mut Visibility), F>,
    tile: Option<TilePos>,
) {
    for (mut transform, mut visibility) in markers.iter_mut() {
        match tile {
            Some(tile) => {
                transform.translation = iso_translation(tile.center(), LAYER_MARKER);
                *visibility = Visibility::Inherited;
            }
            None => *visibility = Visibility::Hidden,
        }
    }
}
