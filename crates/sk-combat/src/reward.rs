use rustc_hash::FxHashMap;
use sk_entity::ObjectGuid;

/// Tracks aggregate damage dealt to one victim, keyed by attacker, so a
/// kill can split XP proportionally.
#[derive(Debug, Clone, Default)]
pub struct RewardManager {
    damage_by_attacker: FxHashMap<ObjectGuid, f32>,
}

impl RewardManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_damage(&mut self, attacker: ObjectGuid, amount: u32) {
        *self.damage_by_attacker.entry(attacker).or_insert(0.0) += amount as f32;
    }

    /// Total damage `attacker` has dealt so far, for threat-model inputs
    /// that weigh by damage received from a specific candidate.
    pub fn damage_from(&self, attacker: ObjectGuid) -> f32 {
        self.damage_by_attacker.get(&attacker).copied().unwrap_or(0.0)
    }

    /// `damage_i/total × min(1, total/max_health) × base_xp_on_kill`, one
    /// entry per awardee.
    pub fn split_xp_on_kill(&self, max_health: f32, base_xp_on_kill: u64) -> Vec<(ObjectGuid, u64)> {
        let total: f32 = self.damage_by_attacker.values().sum();
        if total <= 0.0 {
            return Vec::new();
        }
        let participation = (total / max_health).min(1.0);
        self.damage_by_attacker
            .iter()
            .map(|(guid, damage)| {
                let share = (damage / total) * participation * base_xp_on_kill as f32;
                (*guid, share.floor() as u64)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_entity::ObjectType;

    #[test]
    fn splits_xp_proportionally_to_damage_share() {
        let mut manager = RewardManager::new();
        let a = ObjectGuid::new(ObjectType::Player, 1);
        let b = ObjectGuid::new(ObjectType::Player, 2);
        manager.record_damage(a, 75);
        manager.record_damage(b, 25);

        let split = manager.split_xp_on_kill(100.0, 1000);
        let a_xp = split.iter().find(|(g, _)| *g == a).unwrap().1;
        let b_xp = split.iter().find(|(g, _)| *g == b).unwrap().1;
        assert_eq!(a_xp, 750);
        assert_eq!(b_xp, 250);
    }

    #[test]
    fn partial_kill_participation_scales_total_xp_down() {
        let mut manager = RewardManager::new();
        let a = ObjectGuid::new(ObjectType::Player, 1);
        manager.record_damage(a, 50);

        let split = manager.split_xp_on_kill(100.0, 1000);
        assert_eq!(split[0].1, 500);
    }
}
