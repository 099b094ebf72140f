use bitflags::bitflags;
use sk_entity::Stat;

bitflags! {
    /// Boolean effects toggled by item use, consulted elsewhere (combat's
    /// charged-attack gate, interest's concealment discovery check).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RegisteredFlags: u8 {
        const CHARGED_ATTACK_ENABLED = 0b0000_0001;
        const DISCOVER_CONCEALED_UNIT = 0b0000_0010;
    }
}

/// One effect within an [`crate::ItemApplicationTemplate`], applied in
/// template order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectKind {
    /// Persistent, accumulator-based: `final = base*(1+sum_percent/100)+sum_value`.
    StatModifier { stat: Stat, value: f32, percent: f32 },
    /// Immediate, one-shot health change (positive heals, negative damages).
    Health { delta: f32 },
    Flag(RegisteredFlags),
    /// Multiplicative reduction applied to incoming damage
    /// (`DAMAGE_REDUCTION_PERCENT`). Accumulates additively like a stat
    /// modifier's percent term.
    DamageReductionPercent { percent: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateEffect {
    pub kind: EffectKind,
    /// Zero means immediate/permanent; non-zero schedules an undo.
    pub duration_ms: u32,
}
