use crate::geometry::Position;
use crate::guid::ObjectGuid;

/// A lightweight marker object spawned to keep an out-of-sight unit tracked
/// on a player's radar (`in_tracker_range`) without replicating the full
/// unit.
#[derive(Debug, Clone)]
pub struct UnitLocator {
    pub guid: ObjectGuid,
    pub position: Position,
    pub display_id: u32,
    pub move_speed: f32,
    pub alive: bool,
}

impl UnitLocator {
    pub fn new(guid: ObjectGuid, position: Position, display_id: u32, move_speed: f32) -> Self {
        Self { guid, position, display_id, move_speed, alive: true }
    }
}
