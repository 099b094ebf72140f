pub mod manager;
pub mod selection;
pub mod theater;

pub use manager::{AdmissionOutcome, PendingAdmission, TheaterManager};
pub use selection::{select_map, select_theater, theater_weight, MapCatalogEntry, TheaterWeightInputs, TRAINING_GROUND_MAP_ID};
pub use theater::{accepts, AcceptContext, Theater, TheaterState};
