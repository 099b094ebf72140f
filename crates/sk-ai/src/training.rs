use sk_entity::Position;

/// A training robot's entire policy: chase the threat manager's top
/// candidate, attack once in range. A "straight chaser" with no other
/// behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingDecision {
    Chase,
    Attack,
    Idle,
}

pub fn decide(self_position: Position, target_position: Option<Position>, attack_range: f32) -> TrainingDecision {
    match target_position {
        None => TrainingDecision::Idle,
        Some(target) if self_position.distance(target) <= attack_range => TrainingDecision::Attack,
        Some(_) => TrainingDecision::Chase,
    }
}
