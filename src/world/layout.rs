//! Fixed regions stamped over the generated terrain.

use crate::shared::*;

/// The farmable rectangle. One plot exists per tile inside it.
pub const FARM_PATCH: TileRect = TileRect {
    x: 10,
    y: 22,
    w: 6,
    h: 4,
};

/// Shop floor. Always walkable.
pub const SHOP_AREA: TileRect = TileRect {
    x: 20,
    y: 6,
    w: 6,
    h: 4,
};

pub const SHOPKEEPER_TILE: TilePos = TilePos::new(22, 7);

pub fn is_farm_tile(tile: TilePos) -> bool {
    FARM_PATCH.contains(tile)
}

pub fn is_shop_tile(tile: TilePos) -> bool {
    SHOP_AREA.contains(tile)
}

pub fn is_shopkeeper_tile(tile: TilePos) -> bool {
    tile == SHOPKEEPER_TILE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_farm_patch_bounds_are_half_open() {
        assert!(is_farm_tile(TilePos::new(10, 22)));
        assert!(is_farm_tile(TilePos::new(15, 25)));
        assert!(!is_farm_tile(TilePos::new(16, 25)));
        assert!(!is_farm_tile(TilePos::new(15, 26)));
        assert_eq!(FARM_PATCH.tiles().count(), 24);
    }

    #[test]
    fn test_shopkeeper_stands_inside_shop_area() {
        assert!(is_shop_tile(SHOPKEEPER_TILE));
        assert!(is_shopkeeper_tile(TilePos::new(22, 7)));
        assert!(!is_shopkeeper_tile(TilePos::new(22, 8)));
    }
}
