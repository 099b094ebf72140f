pub mod accumulator;
pub mod effect;
pub mod state;
pub mod template;

pub use accumulator::StatAccumulator;
pub use effect::{EffectKind, RegisteredFlags, TemplateEffect};
pub use state::UnitEffectState;
pub use template::ItemApplicationTemplate;
