use arrayvec::ArrayVec;
use bitflags::bitflags;
use rustc_hash::FxHashSet;

use crate::geometry::Position;
use crate::guid::ObjectGuid;

bitflags! {
    /// Movement flags replicated to clients alongside position updates.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MovementFlags: u8 {
        const MOVING       = 0b0000_0001;
        const RUNNING       = 0b0000_0010;
        const STRAFING      = 0b0000_0100;
        const BACKPEDALING  = 0b0000_1000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcealmentState {
    Exposed,
    Concealing,
    Concealed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DangerState {
    Released,
    Entering,
    Entered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathState {
    Alive,
    Dead,
}

/// Withdrawal covers a dead player's post-death grace period before they
/// leave the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalState {
    None,
    Withdrawing,
    Withdrawn,
}

/// Equipment and consumable slots are both drawn from the same fixed
/// budget of 10; the 4/6 split is this implementation's choice (see
/// DESIGN.md).
pub const EQUIPMENT_SLOTS: usize = 4;
pub const CONSUMABLE_SLOTS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemStack {
    pub template_id: u32,
    pub count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ItemSlots {
    pub equipment: ArrayVec<Option<ItemStack>, EQUIPMENT_SLOTS>,
    pub consumables: ArrayVec<Option<ItemStack>, CONSUMABLE_SLOTS>,
}

impl ItemSlots {
    pub fn empty() -> Self {
        let mut equipment = ArrayVec::new();
        equipment.extend(std::iter::repeat(None).take(EQUIPMENT_SLOTS));
        let mut consumables = ArrayVec::new();
        consumables.extend(std::iter::repeat(None).take(CONSUMABLE_SLOTS));
        Self { equipment, consumables }
    }
}

/// Base state shared by [`crate::Player`] and [`crate::Robot`]. Not a
/// standalone world object — always embedded in one of those two variants.
/// The split between them is behavioral, not structural.
#[derive(Debug, Clone)]
pub struct Unit {
    pub guid: ObjectGuid,
    pub position: Position,
    pub orientation: f32,
    pub movement_flags: MovementFlags,

    pub health: f32,
    pub max_health: f32,
    pub stamina: f32,
    pub max_stamina: f32,
    pub health_regen_per_sec: f32,
    pub stamina_regen_per_sec: f32,

    pub attack_range: f32,
    pub damage: f32,
    pub defense: f32,

    pub level: u32,
    pub experience: u64,
    pub combat_power: f32,

    pub slots: ItemSlots,
    pub magic_bean_count: u32,
    pub money: u64,

    /// Raw per-candidate threat, keyed by the candidate's guid. Populated by
    /// `sk-ai`'s threat managers; kept here so combat code (`sk-combat`) can
    /// read it without a dependency on `sk-ai`.
    pub threat_list: Vec<(ObjectGuid, f32)>,
    pub attacker_set: FxHashSet<ObjectGuid>,
    pub enemy_set: FxHashSet<ObjectGuid>,

    pub pickup_target: Option<ObjectGuid>,
    pub unlock_target: Option<ObjectGuid>,

    pub concealment: ConcealmentState,
    pub danger: DangerState,
    pub death: DeathState,
    pub withdrawal: WithdrawalState,
}

impl Unit {
    pub fn new(guid: ObjectGuid, position: Position, max_health: f32, max_stamina: f32) -> Self {
        Self {
            guid,
            position,
            orientation: 0.0,
            movement_flags: MovementFlags::empty(),
            health: max_health,
            max_health,
            stamina: max_stamina,
            max_stamina,
            health_regen_per_sec: 0.0,
            stamina_regen_per_sec: 0.0,
            attack_range: 0.0,
            damage: 0.0,
            defense: 0.0,
            level: 1,
            experience: 0,
            combat_power: 0.0,
            slots: ItemSlots::empty(),
            magic_bean_count: 0,
            money: 0,
            threat_list: Vec::new(),
            attacker_set: FxHashSet::default(),
            enemy_set: FxHashSet::default(),
            pickup_target: None,
            unlock_target: None,
            concealment: ConcealmentState::Exposed,
            danger: DangerState::Released,
            death: DeathState::Alive,
            withdrawal: WithdrawalState::None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.death == DeathState::Alive
    }

    /// I2: a unit `in combat` always has a non-null combating target whose
    /// enemy-set contains it back. `combating` is whichever guid a caller
    /// currently treats as this unit's active target (e.g. the top threat
    /// entry); this just checks the reciprocity half of the invariant.
    pub fn is_reciprocally_enemies_with(&self, other: &Unit) -> bool {
        self.enemy_set.contains(&other.guid) && other.enemy_set.contains(&self.guid)
    }

    /// Applies regeneration for `elapsed_secs` of simulated time, clamped to
    /// the unit's maxima.
    pub fn regen(&mut self, elapsed_secs: f32) {
        self.health = (self.health + self.health_regen_per_sec * elapsed_secs).min(self.max_health);
        self.stamina = (self.stamina + self.stamina_regen_per_sec * elapsed_secs).min(self.max_stamina);
    }

    /// Applies damage, clamping at zero and flipping to [`DeathState::Dead`]
    /// on lethal damage. Returns `true` if this hit killed the unit.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        self.health = (self.health - amount).max(0.0);
        if self.health <= 0.0 && self.death == DeathState::Alive {
            self.death = DeathState::Dead;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guid::ObjectType;

    #[test]
    fn damage_floor_and_death_transition() {
        let mut unit = Unit::new(ObjectGuid::new(ObjectType::Robot, 0), Position::default(), 10.0, 5.0);
        assert!(!unit.apply_damage(4.0));
        assert_eq!(unit.health, 6.0);
        assert!(unit.apply_damage(100.0));
        assert_eq!(unit.health, 0.0);
        assert_eq!(unit.death, DeathState::Dead);
    }

    #[test]
    fn regen_clamps_to_max() {
        let mut unit = Unit::new(ObjectGuid::new(ObjectType::Robot, 0), Position::default(), 10.0, 5.0);
        unit.health = 9.5;
        unit.health_regen_per_sec = 10.0;
        unit.regen(1.0);
        assert_eq!(unit.health, 10.0);
    }
}
