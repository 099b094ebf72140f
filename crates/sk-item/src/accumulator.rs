use rustc_hash::FxHashMap;
use sk_entity::Stat;

/// Per-stat (value, percent) accumulator.
/// `final = base*(1+sum_percent/100)+sum_value`.
#[derive(Debug, Clone, Default)]
pub struct StatAccumulator {
    sums: FxHashMap<u8, (f32, f32)>,
}

// `Stat` has no explicit discriminants upstream; this mirrors sk-entity's
// declaration order so the accumulator can key on a plain integer.
trait StatIndex {
    fn index(self) -> u8;
}

impl StatIndex for Stat {
    fn index(self) -> u8 {
        match self {
            Stat::Damage => 0,
            Stat::Defense => 1,
            Stat::AttackRange => 2,
            Stat::MoveSpeed => 3,
            Stat::MaxHealth => 4,
            Stat::MaxStamina => 5,
        }
    }
}

impl StatAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, stat: Stat, value: f32, percent: f32) {
        let entry = self.sums.entry(stat.index()).or_insert((0.0, 0.0));
        entry.0 += value;
        entry.1 += percent;
    }

    pub fn remove(&mut self, stat: Stat, value: f32, percent: f32) {
        if let Some(entry) = self.sums.get_mut(&stat.index()) {
            entry.0 -= value;
            entry.1 -= percent;
        }
    }

    pub fn compute_final(&self, stat: Stat, base: f32) -> f32 {
        let (sum_value, sum_percent) = self.sums.get(&stat.index()).copied().unwrap_or((0.0, 0.0));
        base * (1.0 + sum_percent / 100.0) + sum_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_value_matches_formula() {
        let mut acc = StatAccumulator::new();
        acc.apply(Stat::Damage, 5.0, 10.0);
        acc.apply(Stat::Damage, 0.0, 10.0);
        assert_eq!(acc.compute_final(Stat::Damage, 100.0), 100.0 * 1.2 + 5.0);
    }

    #[test]
    fn remove_reverses_apply() {
        let mut acc = StatAccumulator::new();
        acc.apply(Stat::Defense, 3.0, 5.0);
        acc.remove(Stat::Defense, 3.0, 5.0);
        assert_eq!(acc.compute_final(Stat::Defense, 50.0), 50.0);
    }
}
