use rustc_hash::FxHashSet;

use crate::geometry::Position;
use crate::guid::ObjectGuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenState {
    Locked,
    Opened,
}

/// A lootable container. Unlike [`crate::Item`], an item box stays in place
/// and takes damage to open rather than being picked up directly.
#[derive(Debug, Clone)]
pub struct ItemBox {
    pub guid: ObjectGuid,
    pub template_id: u32,
    pub loot_id: u32,
    pub position: Position,
    pub max_health: f32,
    pub health: f32,
    pub direction: f32,
    pub state: OpenState,
    /// Units that have contributed damage toward unlocking this box.
    pub unlockers: FxHashSet<ObjectGuid>,
}

impl ItemBox {
    pub fn new(guid: ObjectGuid, template_id: u32, loot_id: u32, position: Position, max_health: f32) -> Self {
        Self {
            guid,
            template_id,
            loot_id,
            position,
            max_health,
            health: max_health,
            direction: 0.0,
            state: OpenState::Locked,
            unlockers: FxHashSet::default(),
        }
    }

    /// Applies damage toward unlocking; returns `true` if this call opened
    /// the box.
    pub fn apply_damage(&mut self, amount: f32, source: ObjectGuid) -> bool {
        if self.state == OpenState::Opened {
            return false;
        }
        self.unlockers.insert(source);
        self.health = (self.health - amount).max(0.0);
        if self.health <= 0.0 {
            self.state = OpenState::Opened;
            return true;
        }
        false
    }
}
