use crate::geometry::Position;
use crate::unit::Unit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiVariant {
    Training,
    Sparring,
}

/// Drives the nature-weighted coefficients in the sparring threat model.
/// "Nature type" is named without enumerating values elsewhere; these
/// three cover the aggressive/defensive spectrum the combat sub-state
/// thresholds imply (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NatureType {
    Aggressive,
    Balanced,
    Cautious,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExploreAreaState {
    None,
    Exploring,
    GotoUnexplored,
    GotoWaypoint,
    GotoLinkedWaypoint,
    Patrolling,
    NoAreas,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveSpline {
    pub from: Position,
    pub to: Position,
    pub elapsed_ms: u32,
    pub duration_ms: u32,
}

impl MoveSpline {
    pub fn progress(&self) -> f32 {
        if self.duration_ms == 0 {
            1.0
        } else {
            (self.elapsed_ms as f32 / self.duration_ms as f32).min(1.0)
        }
    }

    pub fn current_position(&self) -> Position {
        self.from.lerp(self.to, self.progress())
    }

    pub fn is_done(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }
}

#[derive(Debug, Clone)]
pub struct Robot {
    pub unit: Unit,
    pub ai_variant: AiVariant,
    pub nature: NatureType,
    pub proficiency_level: u32,
    pub move_spline: Option<MoveSpline>,
    pub explore_state: ExploreAreaState,
    /// Item templates the sparring AI intends to collect before
    /// re-evaluating combat.
    pub wish_list: Vec<u32>,
}

impl Robot {
    pub fn new(unit: Unit, ai_variant: AiVariant, nature: NatureType, proficiency_level: u32) -> Self {
        Self {
            unit,
            ai_variant,
            nature,
            proficiency_level,
            move_spline: None,
            explore_state: ExploreAreaState::None,
            wish_list: Vec::new(),
        }
    }
}
