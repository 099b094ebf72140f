use sk_entity::{BezierCurve, Position, ProjectileKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackRejection {
    MovementCounterMismatch,
    InsufficientStamina,
}

/// Client-reported attack input.
#[derive(Debug, Clone, Copy)]
pub struct AttackInfo {
    pub facing: f32,
    pub movement_counter: u32,
    pub charged: bool,
}

/// Validates an attack request against server-side state: the movement
/// counter must match, and stamina must cover `attack_takes_stamina`.
pub fn validate_attack(info: &AttackInfo, server_movement_counter: u32, stamina: f32, attack_takes_stamina: f32) -> Result<(), AttackRejection> {
    if info.movement_counter != server_movement_counter {
        return Err(AttackRejection::MovementCounterMismatch);
    }
    if stamina < attack_takes_stamina {
        return Err(AttackRejection::InsufficientStamina);
    }
    Ok(())
}

pub fn classify_projectile(info: &AttackInfo, banked_stamina: f32, charge_threshold: f32) -> ProjectileKind {
    if info.charged && banked_stamina >= charge_threshold {
        ProjectileKind::Charged
    } else {
        ProjectileKind::Normal
    }
}

/// Builds the launcher-to-landing-point bezier: a straight line along the
/// facing direction out to `attack_range`, with control points a third and
/// two-thirds of the way along.
pub fn attack_trajectory(origin: Position, facing: f32, attack_range: f32) -> BezierCurve {
    let landing = Position::new(origin.x + facing.cos() * attack_range, origin.y + facing.sin() * attack_range);
    BezierCurve {
        p0: origin,
        p1: origin.lerp(landing, 1.0 / 3.0),
        p2: origin.lerp(landing, 2.0 / 3.0),
        p3: landing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_on_counter_mismatch() {
        let info = AttackInfo { facing: 0.0, movement_counter: 5, charged: false };
        assert_eq!(validate_attack(&info, 4, 100.0, 10.0), Err(AttackRejection::MovementCounterMismatch));
    }

    #[test]
    fn rejects_on_insufficient_stamina() {
        let info = AttackInfo { facing: 0.0, movement_counter: 5, charged: false };
        assert_eq!(validate_attack(&info, 5, 5.0, 10.0), Err(AttackRejection::InsufficientStamina));
    }

    #[test]
    fn trajectory_lands_at_attack_range_along_facing() {
        let curve = attack_trajectory(Position::new(0.0, 0.0), 0.0, 10.0);
        let landing = curve.eval(1.0);
        assert!((landing.x - 10.0).abs() < 1e-4);
        assert!(landing.y.abs() < 1e-4);
    }
}
