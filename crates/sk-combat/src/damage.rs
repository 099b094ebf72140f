use sk_entity::ProjectileKind;

/// Parameters of the charged-multiplier curve. `stamina_at_charge_start` is
/// `s`, `max_stamina` is `m`, `attack_takes_stamina` is `a`.
#[derive(Debug, Clone, Copy)]
pub struct ChargeParams {
    pub stamina_at_charge_start: f32,
    pub max_stamina: f32,
    pub attack_takes_stamina: f32,
    pub bonus_ratio: f32,
    pub precision: f32,
}

/// `P9`: at `s == a`, returns exactly `1.0`; at `s == m` with `bonusRatio ==
/// 0, precision == 1`, returns exactly `m / a`.
pub fn charged_multiplier(p: ChargeParams) -> f32 {
    let (s, m, a) = (p.stamina_at_charge_start, p.max_stamina, p.attack_takes_stamina);
    if s > a {
        let tan = ((p.bonus_ratio * p.precision + 1.0) * m - a) / (m - a);
        let y = tan * (s - a);
        (y + a) / a
    } else {
        1.0
    }
}

pub fn damage_multiplier(kind: ProjectileKind, bonus_ratio: f32, charge: Option<ChargeParams>) -> f32 {
    match kind {
        ProjectileKind::Normal => 1.0,
        ProjectileKind::Charged => charge.map(charged_multiplier).unwrap_or(1.0),
        ProjectileKind::Intensified => 1.0 + bonus_ratio,
    }
}

/// Applies the defense reduction multiplier and the `DAMAGE_REDUCTION_PERCENT`
/// item effect, floors the result, and enforces the damage floor of 1
/// (`P8`) for any positive input.
pub fn resolve_damage(raw_damage: f32, defense: f32, damage_reduction_percent: f32) -> u32 {
    if raw_damage <= 0.0 {
        return 0;
    }
    let defense_multiplier = raw_damage / (raw_damage + defense.max(0.0));
    let reduction = (1.0 - damage_reduction_percent / 100.0).max(0.0);
    let reduced = (raw_damage * defense_multiplier * reduction).floor();
    reduced.max(1.0) as u32
}

pub fn compute_attack_damage(
    kind: ProjectileKind,
    bonus_ratio: f32,
    launcher_damage: f32,
    charge: Option<ChargeParams>,
    defense: f32,
    damage_reduction_percent: f32,
) -> u32 {
    let multiplier = damage_multiplier(kind, bonus_ratio, charge);
    let raw = (multiplier * launcher_damage).floor();
    resolve_damage(raw, defense, damage_reduction_percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charged_multiplier_boundary_at_equal_stamina() {
        let p = ChargeParams {
            stamina_at_charge_start: 50.0,
            max_stamina: 100.0,
            attack_takes_stamina: 50.0,
            bonus_ratio: 0.3,
            precision: 0.8,
        };
        assert_eq!(charged_multiplier(p), 1.0);
    }

    #[test]
    fn charged_multiplier_boundary_at_full_stamina() {
        let p = ChargeParams {
            stamina_at_charge_start: 100.0,
            max_stamina: 100.0,
            attack_takes_stamina: 50.0,
            bonus_ratio: 0.0,
            precision: 1.0,
        };
        assert_eq!(charged_multiplier(p), 100.0 / 50.0);
    }

    #[test]
    fn damage_floor_is_never_below_one_for_positive_input() {
        assert_eq!(resolve_damage(1.0, 10_000.0, 0.0), 1);
        assert_eq!(resolve_damage(0.5, 0.0, 0.0), 1);
    }

    #[test]
    fn damage_reduction_percent_lowers_result() {
        let full = resolve_damage(100.0, 0.0, 0.0);
        let reduced = resolve_damage(100.0, 0.0, 50.0);
        assert!(reduced < full);
    }
}
