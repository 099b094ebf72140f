use rand::Rng;
use sk_entity::ObjectGuid;

/// Strict priority ordering for sparring-robot action selection. The set is
/// given without a fixed order; this ranks immediate survival/combat
/// actions above opportunistic ones (see DESIGN.md). Declared low-to-high
/// priority so `>` compares correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AIActionType {
    ExploreArea,
    CollectItem,
    UnlockItemBox,
    UseCarriedItem,
    SeekEnemySpot,
    HideAtSpot,
    EngageInCombat,
}

#[derive(Debug, Clone, Copy)]
pub struct PendingAction {
    pub action: AIActionType,
    pub target: Option<ObjectGuid>,
}

/// Reaction-delay gate: a sparring robot only re-evaluates its action once
/// per reaction. Per this implementation's reading of the proficiency
/// reaction-time window, preempting the current action re-rolls a fresh
/// delay from `[min_ms, max_ms]` rather than resuming the old countdown, so
/// a robot that's just been preempted doesn't react unnaturally fast.
#[derive(Debug, Clone, Copy)]
pub struct ReactionGate {
    remaining_ms: u32,
    min_ms: u32,
    max_ms: u32,
}

impl ReactionGate {
    pub fn new(min_ms: u32, max_ms: u32, rng: &mut impl Rng) -> Self {
        let mut gate = Self { remaining_ms: 0, min_ms, max_ms };
        gate.reroll(rng);
        gate
    }

    pub fn reroll(&mut self, rng: &mut impl Rng) {
        self.remaining_ms = if self.max_ms > self.min_ms { rng.gen_range(self.min_ms..=self.max_ms) } else { self.min_ms };
    }

    /// Advances the gate; returns `true` exactly once the delay elapses.
    pub fn tick(&mut self, delta_ms: u32) -> bool {
        self.remaining_ms = self.remaining_ms.saturating_sub(delta_ms);
        self.remaining_ms == 0
    }
}

/// Picks the highest-priority action from `pending`, preempting
/// `current` only if the new candidate outranks it.
pub fn select_action(current: Option<AIActionType>, pending: &[PendingAction]) -> Option<PendingAction> {
    let best = pending.iter().max_by_key(|p| p.action)?;
    match current {
        Some(current_action) if current_action >= best.action => None,
        _ => Some(*best),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn combat_preempts_exploration() {
        let pending = vec![
            PendingAction { action: AIActionType::ExploreArea, target: None },
            PendingAction { action: AIActionType::EngageInCombat, target: Some(ObjectGuid::new(sk_entity::ObjectType::Player, 1)) },
        ];
        let selected = select_action(Some(AIActionType::ExploreArea), &pending).unwrap();
        assert_eq!(selected.action, AIActionType::EngageInCombat);
    }

    #[test]
    fn lower_priority_does_not_preempt() {
        let pending = vec![PendingAction { action: AIActionType::CollectItem, target: None }];
        assert!(select_action(Some(AIActionType::EngageInCombat), &pending).is_none());
    }

    #[test]
    fn reroll_draws_within_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut gate = ReactionGate::new(100, 300, &mut rng);
        assert!(gate.remaining_ms >= 100 && gate.remaining_ms <= 300);
        gate.reroll(&mut rng);
        assert!(gate.remaining_ms >= 100 && gate.remaining_ms <= 300);
    }
}
