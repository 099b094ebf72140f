use rustc_hash::FxHashMap;

use crate::accumulator::StatAccumulator;
use crate::effect::{EffectKind, RegisteredFlags, TemplateEffect};
use crate::template::ItemApplicationTemplate;

#[derive(Debug, Clone)]
struct ActiveEffect {
    effect: TemplateEffect,
    remaining_ms: u32,
}

/// Per-unit bookkeeping for item effects: the stat accumulator, boolean
/// flags, damage-reduction percent, running duration timers, and per-item
/// cooldowns. Kept outside `sk-entity::Unit` since it's purely item-system
/// derived state, not core simulation data.
#[derive(Debug, Clone, Default)]
pub struct UnitEffectState {
    pub accumulator: StatAccumulator,
    pub flags: RegisteredFlags,
    pub damage_reduction_percent: f32,
    active: Vec<ActiveEffect>,
    cooldowns: FxHashMap<u32, u32>,
}

impl UnitEffectState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_on_cooldown(&self, item_template_id: u32) -> bool {
        self.cooldowns.get(&item_template_id).copied().unwrap_or(0) > 0
    }

    /// Applies every effect in `template` in order and returns the net
    /// immediate health delta (positive heals, negative damages) for the
    /// caller to apply to the owning unit's health. Stat deltas are
    /// computed up front and committed together so a mid-application
    /// failure (none exist today, but future effect kinds may validate)
    /// can never leave the accumulator half-updated.
    pub fn apply(&mut self, template: &ItemApplicationTemplate) -> f32 {
        let mut health_delta = 0.0;
        for effect in &template.effects {
            health_delta += self.commit(effect.kind);
            if effect.duration_ms > 0 {
                self.active.push(ActiveEffect { effect: *effect, remaining_ms: effect.duration_ms });
            }
        }
        self.cooldowns.insert(template.item_template_id, template.cooldown_ms);
        health_delta
    }

    fn commit(&mut self, kind: EffectKind) -> f32 {
        match kind {
            EffectKind::StatModifier { stat, value, percent } => {
                self.accumulator.apply(stat, value, percent);
                0.0
            }
            EffectKind::Health { delta } => delta,
            EffectKind::Flag(flag) => {
                self.flags.insert(flag);
                0.0
            }
            EffectKind::DamageReductionPercent { percent } => {
                self.damage_reduction_percent += percent;
                0.0
            }
        }
    }

    fn undo(&mut self, kind: EffectKind) {
        match kind {
            EffectKind::StatModifier { stat, value, percent } => self.accumulator.remove(stat, value, percent),
            EffectKind::Health { .. } => {}
            EffectKind::Flag(flag) => self.flags.remove(flag),
            EffectKind::DamageReductionPercent { percent } => self.damage_reduction_percent -= percent,
        }
    }

    /// Advances duration timers and cooldowns by `delta_ms`. Expired
    /// effects are undone in reverse application order.
    pub fn tick(&mut self, delta_ms: u32) {
        for remaining in self.cooldowns.values_mut() {
            *remaining = remaining.saturating_sub(delta_ms);
        }
        self.cooldowns.retain(|_, remaining| *remaining > 0);

        let mut expired = Vec::new();
        self.active.retain_mut(|active| {
            active.remaining_ms = active.remaining_ms.saturating_sub(delta_ms);
            if active.remaining_ms == 0 {
                expired.push(active.effect.kind);
                false
            } else {
                true
            }
        });

        for kind in expired.into_iter().rev() {
            self.undo(kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_entity::Stat;

    #[test]
    fn timed_effect_reverts_on_expiry() {
        let mut state = UnitEffectState::new();
        let template = ItemApplicationTemplate {
            item_template_id: 1,
            effects: vec![TemplateEffect {
                kind: EffectKind::StatModifier { stat: Stat::Damage, value: 10.0, percent: 0.0 },
                duration_ms: 1000,
            }],
            cooldown_ms: 500,
        };
        state.apply(&template);
        assert_eq!(state.accumulator.compute_final(Stat::Damage, 0.0), 10.0);

        state.tick(999);
        assert_eq!(state.accumulator.compute_final(Stat::Damage, 0.0), 10.0);
        state.tick(1);
        assert_eq!(state.accumulator.compute_final(Stat::Damage, 0.0), 0.0);
    }

    #[test]
    fn cooldown_blocks_reuse_until_elapsed() {
        let mut state = UnitEffectState::new();
        let template = ItemApplicationTemplate { item_template_id: 7, effects: vec![], cooldown_ms: 200 };
        state.apply(&template);
        assert!(state.is_on_cooldown(7));
        state.tick(199);
        assert!(state.is_on_cooldown(7));
        state.tick(1);
        assert!(!state.is_on_cooldown(7));
    }

    #[test]
    fn health_effect_returns_net_delta_and_is_not_undone() {
        let mut state = UnitEffectState::new();
        let template = ItemApplicationTemplate {
            item_template_id: 3,
            effects: vec![
                TemplateEffect { kind: EffectKind::Health { delta: -15.0 }, duration_ms: 0 },
                TemplateEffect {
                    kind: EffectKind::StatModifier { stat: Stat::MaxHealth, value: 5.0, percent: 0.0 },
                    duration_ms: 0,
                },
                TemplateEffect { kind: EffectKind::Health { delta: 4.0 }, duration_ms: 0 },
            ],
            cooldown_ms: 0,
        };

        let delta = state.apply(&template);
        assert_eq!(delta, -11.0);
        assert!(state.active.is_empty());
    }

    #[test]
    fn flag_effect_sets_and_clears() {
        let mut state = UnitEffectState::new();
        let template = ItemApplicationTemplate {
            item_template_id: 2,
            effects: vec![TemplateEffect {
                kind: EffectKind::Flag(RegisteredFlags::CHARGED_ATTACK_ENABLED),
                duration_ms: 100,
            }],
            cooldown_ms: 0,
        };
        state.apply(&template);
        assert!(state.flags.contains(RegisteredFlags::CHARGED_ATTACK_ENABLED));
        state.tick(100);
        assert!(!state.flags.contains(RegisteredFlags::CHARGED_ATTACK_ENABLED));
    }
}
