use rustc_hash::FxHashSet;

use crate::geometry::Position;
use crate::guid::ObjectGuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Activating,
    Active,
    Inactive,
}

/// A world-ground item drop, distinct from the `ItemStack` carried in a
/// unit's slots. An item is its own spawned object while it sits on the
/// ground, with pickup contested among nearby units.
#[derive(Debug, Clone)]
pub struct Item {
    pub guid: ObjectGuid,
    pub template_id: u32,
    pub count: u32,
    pub holder: Option<ObjectGuid>,
    pub launch_origin: Position,
    pub drop_elapsed_ms: u32,
    pub drop_duration_ms: u32,
    pub state: ItemState,
    /// Units that have initiated a pickup attempt and are contesting it.
    pub pickers: FxHashSet<ObjectGuid>,
}

impl Item {
    pub fn new(guid: ObjectGuid, template_id: u32, count: u32, launch_origin: Position) -> Self {
        Self {
            guid,
            template_id,
            count,
            holder: None,
            launch_origin,
            drop_elapsed_ms: 0,
            drop_duration_ms: 0,
            state: ItemState::Activating,
            pickers: FxHashSet::default(),
        }
    }

    pub fn is_drop_complete(&self) -> bool {
        self.drop_elapsed_ms >= self.drop_duration_ms
    }
}
