pub mod batch;
pub mod broadcast;
pub mod visibility;

pub use batch::{InterestTracker, UpdateObjectBatch};
pub use broadcast::players_observing;
pub use visibility::{is_tracked, is_visible_to, Rect, ViewerContext};
