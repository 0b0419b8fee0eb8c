//! World domain plugin for Tiny Acre.
//!
//! Responsible for:
//! - Generating the tile grid once from the world seed
//! - Answering tile and blocking queries (fail closed out of bounds)
//! - Knowing where the farm patch, shop floor, and shopkeeper are

use bevy::prelude::*;

use crate::shared::*;

pub mod generation;
pub mod layout;

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        let world = TileWorld::generate(MAP_WIDTH, MAP_HEIGHT, WORLD_SEED);
        info!(
            "[World] Generated {}x{} map from seed {} ({} blocked tiles)",
            world.width(),
            world.height(),
            world.seed(),
            world.blocked_count()
        );
        app.insert_resource(world);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TILES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    Grass,
    Soil,
    Path,
    Water,
    Rock,
    Farm,
    Shop,
}

impl TileKind {
    pub fn is_blocking(self) -> bool {
        matches!(self, TileKind::Water | TileKind::Rock)
    }

    pub fn is_soil_like(self) -> bool {
        matches!(self, TileKind::Soil | TileKind::Farm)
    }
}

/// Base sprite chosen for a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileVariant {
    GrassA,
    GrassB,
    GrassC,
    Soil,
    Path,
    ShopFloor,
    Water,
    Rock,
}

impl TileVariant {
    pub fn asset_id(self) -> &'static str {
        match self {
            TileVariant::GrassA => "tile.grass_a",
            TileVariant::GrassB => "tile.grass_b",
            TileVariant::GrassC => "tile.grass_c",
            TileVariant::Soil => "tile.soil",
            TileVariant::Path => "tile.path",
            TileVariant::ShopFloor => "tile.shop.floor",
            TileVariant::Water => "tile.water",
            TileVariant::Rock => "tile.rock",
        }
    }
}

/// Cosmetic edge decoration. No gameplay effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeOverlay {
    GrassToPathEdge,
    PathCorner,
    GrassToSoilEdge,
    SoilEdge,
}

impl EdgeOverlay {
    pub fn asset_id(self) -> &'static str {
        match self {
            EdgeOverlay::GrassToPathEdge => "tile.trans.grass_to_path_edge",
            EdgeOverlay::PathCorner => "tile.trans.path_corner",
            EdgeOverlay::GrassToSoilEdge => "tile.trans.grass_to_soil_edge",
            EdgeOverlay::SoilEdge => "tile.trans.soil_edge",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub kind: TileKind,
    pub variant: TileVariant,
    pub overlays: Vec<EdgeOverlay>,
    pub blocked: bool,
    /// Brightness factor for the renderer, around 1.0.
    pub shade: f32,
}

impl Tile {
    fn new(kind: TileKind, variant: TileVariant, shade: f32) -> Self {
        Self {
            kind,
            variant,
            overlays: Vec::new(),
            blocked: kind.is_blocking(),
            shade,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// RESOURCES
// ═══════════════════════════════════════════════════════════════════════

/// The generated map. Tile kinds and blocking never change after generation.
#[derive(Resource, Debug, Clone)]
pub struct TileWorld {
    width: i32,
    height: i32,
    seed: u64,
    tiles: Vec<Tile>,
}

impl TileWorld {
    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    /// `None` outside the grid.
    pub fn get(&self, x: i32, y: i32) -> Option<&Tile> {
        self.index(x, y).and_then(|i| self.tiles.get(i))
    }

    pub fn tile(&self, pos: TilePos) -> Option<&Tile> {
        self.get(pos.x, pos.y)
    }

    /// `true` outside the grid.
    pub fn is_blocked(&self, x: i32, y: i32) -> bool {
        self.get(x, y).map_or(true, |tile| tile.blocked)
    }

    /// In bounds and not blocked.
    pub fn is_walkable(&self, pos: TilePos) -> bool {
        !self.is_blocked(pos.x, pos.y)
    }

    pub fn blocked_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.blocked).count()
    }
}
