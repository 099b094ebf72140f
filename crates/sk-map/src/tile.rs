use sk_entity::Position;

/// Terrain bits, fixed for the lifetime of the tile (loaded from `MapData`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileType {
    pub penetrable: bool,
    pub wall: bool,
    pub concealable: bool,
}

/// Mutable per-tile state that changes during play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileFlags {
    pub closed: bool,
    pub item_placed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileCell {
    pub ty: TileType,
    pub flags: TileFlags,
    pub district_id: Option<u32>,
    /// Precomputed distance-to-safe-zone-center in tile units, refreshed
    /// whenever the zone's center moves.
    pub safe_zone_distance: f32,
}

impl TileCell {
    pub fn is_traversable(&self) -> bool {
        !self.ty.wall && !self.flags.closed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan_distance(self, other: TileCoord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Tile edge length in world units, used by the isometric conversion below.
pub const TILE_SIZE: f32 = 32.0;

/// Converts a tile coordinate to its world-space center, using a fixed
/// isometric mapping. The exact projection is this implementation's
/// choice, recorded in DESIGN.md.
pub fn tile_to_world(coord: TileCoord) -> Position {
    let half = TILE_SIZE / 2.0;
    Position::new(
        (coord.x - coord.y) as f32 * half,
        (coord.x + coord.y) as f32 * half / 2.0,
    )
}

pub fn world_to_tile(pos: Position) -> TileCoord {
    let half = TILE_SIZE / 2.0;
    let a = pos.x / half;
    let b = pos.y * 2.0 / half;
    let x = (a + b) / 2.0;
    let y = (b - a) / 2.0;
    TileCoord::new(x.round() as i32, y.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_world_roundtrip() {
        for (x, y) in [(0, 0), (3, 4), (-2, 5), (10, -10)] {
            let coord = TileCoord::new(x, y);
            let world = tile_to_world(coord);
            assert_eq!(world_to_tile(world), coord);
        }
    }
}
