use rustc_hash::FxHashMap;
use sk_entity::{NatureType, ObjectGuid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatSubState {
    Chase,
    Escape,
}

/// Per-contributor weights for a (nature, sub-state) pair. The spec names
/// the four contributors and says they're "nature-weighted" without fixing
/// values; these are this implementation's choice (see DESIGN.md).
#[derive(Debug, Clone, Copy)]
struct Coefficients {
    distance: f32,
    health_missing: f32,
    damage_received: f32,
    charged_power: f32,
}

fn coefficients(nature: NatureType, sub_state: CombatSubState) -> Coefficients {
    match (nature, sub_state) {
        (NatureType::Aggressive, CombatSubState::Chase) => {
            Coefficients { distance: 0.2, health_missing: 0.4, damage_received: 0.2, charged_power: 0.2 }
        }
        (NatureType::Aggressive, CombatSubState::Escape) => {
            Coefficients { distance: 0.4, health_missing: 0.1, damage_received: 0.3, charged_power: 0.2 }
        }
        (NatureType::Balanced, CombatSubState::Chase) => {
            Coefficients { distance: 0.3, health_missing: 0.3, damage_received: 0.2, charged_power: 0.2 }
        }
        (NatureType::Balanced, CombatSubState::Escape) => {
            Coefficients { distance: 0.3, health_missing: 0.2, damage_received: 0.3, charged_power: 0.2 }
        }
        (NatureType::Cautious, CombatSubState::Chase) => {
            Coefficients { distance: 0.35, health_missing: 0.2, damage_received: 0.15, charged_power: 0.3 }
        }
        (NatureType::Cautious, CombatSubState::Escape) => {
            Coefficients { distance: 0.2, health_missing: 0.1, damage_received: 0.2, charged_power: 0.5 }
        }
    }
}

/// Inputs feeding one candidate's threat value.
#[derive(Debug, Clone, Copy)]
pub struct ThreatInputs {
    pub distance: f32,
    pub critical_distance: f32,
    pub enemy_health_missing_fraction: f32,
    pub damage_received: f32,
    pub enemy_charged_power: f32,
}

pub fn candidate_threat(inputs: ThreatInputs, nature: NatureType, sub_state: CombatSubState) -> f32 {
    let c = coefficients(nature, sub_state);
    let distance_term = (1.0 - inputs.distance / inputs.critical_distance.max(1.0)).max(0.0);
    c.distance * distance_term
        + c.health_missing * inputs.enemy_health_missing_fraction
        + c.damage_received * inputs.damage_received
        + c.charged_power * inputs.enemy_charged_power
}

/// Maintains per-candidate threat values for one robot.
#[derive(Debug, Clone, Default)]
pub struct UnitThreatManager {
    threat: FxHashMap<ObjectGuid, f32>,
}

impl UnitThreatManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, candidate: ObjectGuid, inputs: ThreatInputs, nature: NatureType, sub_state: CombatSubState) {
        self.threat.insert(candidate, candidate_threat(inputs, nature, sub_state));
    }

    pub fn remove(&mut self, candidate: ObjectGuid) {
        self.threat.remove(&candidate);
    }

    pub fn highest(&self) -> Option<ObjectGuid> {
        self.threat.iter().max_by(|a, b| a.1.partial_cmp(b.1).unwrap()).map(|(guid, _)| *guid)
    }
}

/// Tracks incoming projectiles whose predicted path intersects this robot.
#[derive(Debug, Clone, Default)]
pub struct ProjectileThreatManager {
    incoming: FxHashMap<ObjectGuid, f32>,
}

impl ProjectileThreatManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, projectile: ObjectGuid, time_to_impact_ms: f32) {
        self.incoming.insert(projectile, time_to_impact_ms);
    }

    pub fn clear(&mut self, projectile: ObjectGuid) {
        self.incoming.remove(&projectile);
    }

    pub fn most_urgent(&self) -> Option<ObjectGuid> {
        self.incoming.iter().min_by(|a, b| a.1.partial_cmp(b.1).unwrap()).map(|(guid, _)| *guid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_entity::ObjectType;

    #[test]
    fn highest_threat_candidate_wins() {
        let mut manager = UnitThreatManager::new();
        let near = ObjectGuid::new(ObjectType::Player, 1);
        let far = ObjectGuid::new(ObjectType::Player, 2);
        manager.update(
            near,
            ThreatInputs { distance: 1.0, critical_distance: 10.0, enemy_health_missing_fraction: 0.0, damage_received: 0.0, enemy_charged_power: 0.0 },
            NatureType::Balanced,
            CombatSubState::Chase,
        );
        manager.update(
            far,
            ThreatInputs { distance: 9.0, critical_distance: 10.0, enemy_health_missing_fraction: 0.0, damage_received: 0.0, enemy_charged_power: 0.0 },
            NatureType::Balanced,
            CombatSubState::Chase,
        );
        assert_eq!(manager.highest(), Some(near));
    }
}
