//! Procedural terrain generation.
//!
//! The grid is built in fixed passes: base terrain from a seeded roll biased
//! toward the map centre, a pond, two rock clusters, the farm and shop
//! layout, then decorative edge overlays computed from each tile's
//! 4-neighbourhood. Everything random draws from one `StdRng` seeded by the
//! world seed, except grass variants which come from a positional hash so
//! they do not depend on draw order.

use bevy::math::Vec2;
use rand::prelude::*;
use rand::rngs::StdRng;

use super::layout::{is_farm_tile, is_shop_tile};
use super::{EdgeOverlay, Tile, TileKind, TileVariant, TileWorld};
use crate::shared::*;

const SOIL_THRESHOLD: f32 = 0.92;
const PATH_THRESHOLD: f32 = 0.85;
const CENTER_BIAS_WEIGHT: f32 = 0.15;

const POND_RADIUS_X: f32 = 5.0;
const POND_RADIUS_Y: f32 = 3.0;

impl TileWorld {
    /// Builds a world from `seed`. Identical inputs always yield identical
    /// tiles. Non-positive dimensions produce an empty world whose every
    /// query reports out of bounds.
    pub fn generate(width: i32, height: i32, seed: u64) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut world = TileWorld {
            width,
            height,
            seed,
            tiles: Vec::with_capacity(tile_count(width, height)),
        };

        world.fill_base_terrain(&mut rng);

        let pond_center = Vec2::new(
            (width as f32 * 0.28).floor(),
            (height as f32 * 0.32).floor(),
        );
        world.carve_pond(pond_center, POND_RADIUS_X, POND_RADIUS_Y);

        let large_cluster = TilePos::new(
            (width as f32 * 0.72).floor() as i32,
            (height as f32 * 0.64).floor() as i32,
        );
        let small_cluster = TilePos::new(
            (width as f32 * 0.18).floor() as i32,
            (height as f32 * 0.72).floor() as i32,
        );
        world.scatter_rocks(large_cluster, 5, &mut rng);
        world.scatter_rocks(small_cluster, 3, &mut rng);

        world.apply_layout(&mut rng);
        world.compute_overlays();
        world
    }

    fn fill_base_terrain(&mut self, rng: &mut StdRng) {
        let half_w = self.width as f32 / 2.0;
        let half_h = self.height as f32 / 2.0;

        for y in 0..self.height {
            for x in 0..self.width {
                let center_pull = (x as f32 - half_w).abs() + (y as f32 - half_h).abs();
                let bias = (1.0 - center_pull / (self.width as f32 * 0.6)).max(0.0);
                let roll: f32 = rng.gen();

                let kind = if roll + bias * CENTER_BIAS_WEIGHT > SOIL_THRESHOLD {
                    TileKind::Soil
                } else if roll > PATH_THRESHOLD {
                    TileKind::Path
                } else {
                    TileKind::Grass
                };
                let variant = match kind {
                    TileKind::Soil => TileVariant::Soil,
                    TileKind::Path => TileVariant::Path,
                    _ => grass_variant(x, y, self.seed),
                };
                let shade = 0.85 + rng.gen::<f32>() * 0.3;
                self.tiles.push(Tile::new(kind, variant, shade));
            }
        }
    }

    fn carve_pond(&mut self, center: Vec2, radius_x: f32, radius_y: f32) {
        for y in 0..self.height {
            for x in 0..self.width {
                let dx = (x as f32 + 0.5 - center.x) / radius_x;
                let dy = (y as f32 + 0.5 - center.y) / radius_y;
                if dx * dx + dy * dy <= 1.0 {
                    let shade = 0.9 + (dx.abs() + dy.abs()) * 0.05;
                    self.replace(x, y, Tile::new(TileKind::Water, TileVariant::Water, shade));
                }
            }
        }
    }

    /// Cells within `radius` turn to rock with a probability that falls off
    /// linearly with distance from `center`.
    fn scatter_rocks(&mut self, center: TilePos, radius: i32, rng: &mut StdRng) {
        let r = radius as f32;
        for y in center.y - radius..=center.y + radius {
            for x in center.x - radius..=center.x + radius {
                if !self.in_bounds(x, y) {
                    continue;
                }
                let dx = x as f32 + 0.5 - center.x as f32;
                let dy = y as f32 + 0.5 - center.y as f32;
                let distance = dx.hypot(dy);
                if distance > r {
                    continue;
                }
                if rng.gen::<f32>() > 0.25 + distance / (r * 2.0) {
                    let shade = 0.85 + rng.gen::<f32>() * 0.2;
                    self.replace(x, y, Tile::new(TileKind::Rock, TileVariant::Rock, shade));
                }
            }
        }
    }

    fn apply_layout(&mut self, rng: &mut StdRng) {
        for y in 0..self.height {
            for x in 0..self.width {
                let tile = TilePos::new(x, y);
                if is_farm_tile(tile) {
                    let shade = 0.9 + rng.gen::<f32>() * 0.15;
                    self.replace(x, y, Tile::new(TileKind::Farm, TileVariant::Soil, shade));
                } else if is_shop_tile(tile) {
                    let shade = 0.9 + rng.gen::<f32>() * 0.12;
                    self.replace(x, y, Tile::new(TileKind::Shop, TileVariant::ShopFloor, shade));
                }
            }
        }
    }

    fn compute_overlays(&mut self) {
        let mut overlays = Vec::with_capacity(self.tiles.len());
        for y in 0..self.height {
            for x in 0..self.width {
                overlays.push(self.edge_overlays_at(x, y));
            }
        }
        for (tile, computed) in self.tiles.iter_mut().zip(overlays) {
            tile.overlays = computed;
        }
    }

    fn edge_overlays_at(&self, x: i32, y: i32) -> Vec<EdgeOverlay> {
        let mut overlays = Vec::new();
        let Some(kind) = self.kind_at(x, y) else {
            return overlays;
        };
        let north = self.kind_at(x, y - 1);
        let east = self.kind_at(x + 1, y);
        let south = self.kind_at(x, y + 1);
        let west = self.kind_at(x - 1, y);
        let neighbours = [north, east, south, west];

        if kind == TileKind::Path {
            let is_grass = |k: Option<TileKind>| k == Some(TileKind::Grass);
            if neighbours.iter().any(|&n| is_grass(n)) {
                overlays.push(EdgeOverlay::GrassToPathEdge);
            }
            let (n, e, s, w) = (is_grass(north), is_grass(east), is_grass(south), is_grass(west));
            if (n && e) || (e && s) || (s && w) || (w && n) {
                overlays.push(EdgeOverlay::PathCorner);
            }
        }

        if kind.is_soil_like() {
            let grass_edge = neighbours.contains(&Some(TileKind::Grass));
            let other_edge = neighbours
                .iter()
                .flatten()
                .any(|n| *n != TileKind::Grass && !n.is_soil_like());
            if grass_edge {
                overlays.push(EdgeOverlay::GrassToSoilEdge);
            } else if other_edge {
                overlays.push(EdgeOverlay::SoilEdge);
            }
        }

        overlays
    }

    fn kind_at(&self, x: i32, y: i32) -> Option<TileKind> {
        self.get(x, y).map(|tile| tile.kind)
    }

    fn replace(&mut self, x: i32, y: i32, tile: Tile) {
        if let Some(index) = self.index(x, y) {
            self.tiles[index] = tile;
        }
    }
}

/// Cells in a `width` x `height` grid, counted without `i32` overflow.
/// Negative dimensions count as zero.
pub fn tile_count(width: i32, height: i32) -> usize {
    width.max(0) as usize * height.max(0) as usize
}

/// Pure positional hash mapped into `[0, 1]`.
pub fn hash01(x: i32, y: i32, seed: u64) -> f32 {
    let mut n = (x as u32)
        .wrapping_mul(374_761_393)
        .wrapping_add((y as u32).wrapping_mul(668_265_263))
        .wrapping_add((seed as u32).wrapping_mul(1_442_695_041));
    n = (n ^ (n >> 13)).wrapping_mul(1_274_126_177);
    n ^= n >> 16;
    n as f32 / u32::MAX as f32
}

fn grass_variant(x: i32, y: i32, seed: u64) -> TileVariant {
    let roll = hash01(x, y, seed);
    if roll < 0.7 {
        TileVariant::GrassA
    } else if roll < 0.9 {
        TileVariant::GrassB
    } else {
        TileVariant::GrassC
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::layout::{FARM_PATCH, SHOP_AREA};

    #[test]
    fn test_same_seed_same_world() {
        let a = TileWorld::generate(30, 30, 42);
        let b = TileWorld::generate(30, 30, 42);
        for y in 0..30 {
            for x in 0..30 {
                assert_eq!(a.get(x, y), b.get(x, y), "tile ({x},{y}) differs");
            }
        }
    }

    #[test]
    fn test_different_seed_changes_terrain() {
        let a = TileWorld::generate(30, 30, 1);
        let b = TileWorld::generate(30, 30, 2);
        let differing = (0..30)
            .flat_map(|y| (0..30).map(move |x| (x, y)))
            .filter(|&(x, y)| a.get(x, y).map(|t| t.variant) != b.get(x, y).map(|t| t.variant))
            .count();
        assert!(differing > 0);
    }

    #[test]
    fn test_hash_is_stable_and_bounded() {
        for y in -5..5 {
            for x in -5..5 {
                let h = hash01(x, y, 1337);
                assert_eq!(h, hash01(x, y, 1337));
                assert!((0.0..=1.0).contains(&h));
            }
        }
    }

    #[test]
    fn test_pond_centre_is_water_and_blocked() {
        let world = TileWorld::generate(30, 30, 42);
        // Centre (8, 9) lies outside both rock clusters and the layout rects.
        let tile = world.get(8, 9).expect("in bounds");
        assert_eq!(tile.kind, TileKind::Water);
        assert!(tile.blocked);
        assert!(world.is_blocked(8, 9));
    }

    #[test]
    fn test_layout_overrides_terrain_and_clears_blocking() {
        for seed in 0..8 {
            let world = TileWorld::generate(30, 30, seed);
            for tile in FARM_PATCH.tiles() {
                let t = world.get(tile.x, tile.y).expect("farm in bounds");
                assert_eq!(t.kind, TileKind::Farm);
                assert_eq!(t.variant, TileVariant::Soil);
                assert!(!world.is_blocked(tile.x, tile.y));
            }
            for tile in SHOP_AREA.tiles() {
                let t = world.get(tile.x, tile.y).expect("shop in bounds");
                assert_eq!(t.kind, TileKind::Shop);
                assert!(!world.is_blocked(tile.x, tile.y));
            }
        }
    }

    #[test]
    fn test_blocking_follows_tile_kind() {
        let world = TileWorld::generate(30, 30, 7);
        for y in 0..30 {
            for x in 0..30 {
                let tile = world.get(x, y).expect("in bounds");
                assert_eq!(tile.blocked, tile.kind.is_blocking());
                assert_eq!(world.is_blocked(x, y), tile.blocked);
            }
        }
    }

    #[test]
    fn test_grass_variants_come_from_hash() {
        let world = TileWorld::generate(30, 30, 99);
        for y in 0..30 {
            for x in 0..30 {
                let tile = world.get(x, y).expect("in bounds");
                if tile.kind == TileKind::Grass {
                    assert_eq!(tile.variant, grass_variant(x, y, 99));
                }
            }
        }
    }

    #[test]
    fn test_path_overlays_match_neighbourhood() {
        let world = TileWorld::generate(30, 30, 42);
        for y in 0..30 {
            for x in 0..30 {
                let tile = world.get(x, y).expect("in bounds");
                let grass = |dx: i32, dy: i32| {
                    world.get(x + dx, y + dy).map(|t| t.kind) == Some(TileKind::Grass)
                };
                let any_grass = grass(0, -1) || grass(1, 0) || grass(0, 1) || grass(-1, 0);
                let has_edge = tile.overlays.contains(&EdgeOverlay::GrassToPathEdge);
                if tile.kind == TileKind::Path {
                    assert_eq!(has_edge, any_grass, "path at ({x},{y})");
                } else {
                    assert!(!has_edge);
                    assert!(!tile.overlays.contains(&EdgeOverlay::PathCorner));
                }
            }
        }
    }

    #[test]
    fn test_tile_count_does_not_overflow() {
        assert_eq!(tile_count(30, 30), 900);
        assert_eq!(tile_count(-4, 10), 0);
        assert_eq!(tile_count(100_000, 100_000) as u64, 10_000_000_000);
        assert_eq!(tile_count(i32::MAX, 2) as u64, i32::MAX as u64 * 2);
    }

    #[test]
    fn test_tiny_world_does_not_panic() {
        let world = TileWorld::generate(1, 1, 3);
        assert!(world.get(0, 0).is_some());
        assert!(world.get(1, 0).is_none());
        assert!(world.is_blocked(-1, 0));
    }
}
