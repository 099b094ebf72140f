use rustc_hash::FxHashSet;

use crate::guid::ObjectGuid;
use crate::unit::Unit;

/// One stat bound to the unit being persistent (added to an accumulator)
/// rather than instantaneous. `final = base * (1 + sum_percent/100) +
/// sum_value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stat {
    Damage,
    Defense,
    AttackRange,
    MoveSpeed,
    MaxHealth,
    MaxStamina,
}

#[derive(Debug, Clone, Copy)]
pub struct StatStage {
    pub stat: Stat,
    pub value: f32,
    pub percent: f32,
    pub remaining_ms: u32,
}

/// Opaque session identifier; `sk-entity` doesn't depend on `sk-session`, so
/// this is a newtype over the same 32-bit value sessions are keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u32);

#[derive(Debug, Clone)]
pub struct Player {
    pub unit: Unit,
    /// `None` once the owning session disconnects without restoring within
    /// the timeout window.
    pub session_id: Option<SessionId>,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Objects currently rendered on this player's client.
    pub in_sight: FxHashSet<ObjectGuid>,
    /// Objects out of sight but tracked via a [`crate::UnitLocator`].
    pub in_tracker_range: FxHashSet<ObjectGuid>,
    pub attack_counter: u32,
    pub consumed_stamina_total: f32,
    pub stat_stages: Vec<StatStage>,
    pub is_gm: bool,
}

impl Player {
    pub fn new(unit: Unit, session_id: SessionId) -> Self {
        Self {
            unit,
            session_id: Some(session_id),
            viewport_width: 0,
            viewport_height: 0,
            in_sight: FxHashSet::default(),
            in_tracker_range: FxHashSet::default(),
            attack_counter: 0,
            consumed_stamina_total: 0.0,
            stat_stages: Vec::new(),
            is_gm: false,
        }
    }
}
