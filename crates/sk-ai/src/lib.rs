pub mod action;
pub mod explore;
pub mod pathing;
pub mod threat;
pub mod training;

pub use action::{select_action, AIActionType, PendingAction, ReactionGate};
pub use explore::{area_of, next_explore_state, ExploreAreaId, ExplorationMemory, EXCLUSION_EXPIRY_MS};
pub use pathing::{next_step, step_duration_ms};
pub use threat::{candidate_threat, CombatSubState, ProjectileThreatManager, ThreatInputs, UnitThreatManager};
pub use training::{decide as training_decide, TrainingDecision};
