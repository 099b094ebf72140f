use rustc_hash::FxHashMap;
use sk_entity::{ObjectGuid, Position};

use crate::tile::TILE_SIZE;

/// Coarser than a tile — one grid cell spans roughly one visible range.
pub const GRID_SIZE: f32 = TILE_SIZE * 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub fn from_position(pos: Position) -> Self {
        Self {
            x: (pos.x / GRID_SIZE).floor() as i32,
            y: (pos.y / GRID_SIZE).floor() as i32,
        }
    }

    /// The 3x3 neighborhood centered on this cell, used for interest queries
    /// that need everything within one grid's worth of slack.
    pub fn neighborhood(self) -> impl Iterator<Item = GridCoord> {
        (-1..=1).flat_map(move |dy| (-1..=1).map(move |dx| GridCoord { x: self.x + dx, y: self.y + dy }))
    }
}

/// Object grid: each live object lives in exactly one bucket, the bucket
/// its current position maps to under [`GridCoord::from_position`].
#[derive(Debug, Default)]
pub struct ObjectGrid {
    buckets: FxHashMap<GridCoord, Vec<ObjectGuid>>,
    locations: FxHashMap<ObjectGuid, GridCoord>,
}

impl ObjectGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, guid: ObjectGuid, position: Position) {
        let coord = GridCoord::from_position(position);
        self.buckets.entry(coord).or_default().push(guid);
        self.locations.insert(guid, coord);
    }

    pub fn remove(&mut self, guid: ObjectGuid) {
        if let Some(coord) = self.locations.remove(&guid) {
            if let Some(bucket) = self.buckets.get_mut(&coord) {
                bucket.retain(|g| *g != guid);
                if bucket.is_empty() {
                    self.buckets.remove(&coord);
                }
            }
        }
    }

    /// Re-buckets `guid` if its new position maps to a different cell.
    /// No-op (and no bucket churn) if the cell is unchanged.
    pub fn relocate(&mut self, guid: ObjectGuid, new_position: Position) {
        let new_coord = GridCoord::from_position(new_position);
        if self.locations.get(&guid) == Some(&new_coord) {
            return;
        }
        self.remove(guid);
        self.insert(guid, new_position);
    }

    pub fn bucket(&self, coord: GridCoord) -> &[ObjectGuid] {
        self.buckets.get(&coord).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn coord_of(&self, guid: ObjectGuid) -> Option<GridCoord> {
        self.locations.get(&guid).copied()
    }

    pub fn neighbors_of(&self, position: Position) -> impl Iterator<Item = ObjectGuid> + '_ {
        GridCoord::from_position(position)
            .neighborhood()
            .flat_map(move |coord| self.bucket(coord).iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_entity::ObjectType;

    #[test]
    fn relocate_moves_between_buckets() {
        let mut grid = ObjectGrid::new();
        let guid = ObjectGuid::new(ObjectType::Robot, 0);
        grid.insert(guid, Position::new(0.0, 0.0));
        let far = Position::new(GRID_SIZE * 5.0, GRID_SIZE * 5.0);
        grid.relocate(guid, far);
        assert_eq!(grid.coord_of(guid), Some(GridCoord::from_position(far)));
        assert!(grid.bucket(GridCoord::from_position(Position::new(0.0, 0.0))).is_empty());
    }

    #[test]
    fn relocate_within_same_cell_is_noop() {
        let mut grid = ObjectGrid::new();
        let guid = ObjectGuid::new(ObjectType::Robot, 0);
        grid.insert(guid, Position::new(1.0, 1.0));
        grid.relocate(guid, Position::new(2.0, 2.0));
        assert_eq!(grid.bucket(GridCoord::from_position(Position::new(1.0, 1.0))).len(), 1);
    }
}
