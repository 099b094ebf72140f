/// Spawn managers decide where/when robots, item boxes, and pickups enter a
/// map. The baseline core doesn't drive this in the per-tick path — it's
/// left blank in the default implementation; the trait exists as the seam
/// a theater-specific spawn table would implement.
pub trait SpawnManager: Send + Sync {
    fn advance(&mut self, delta_ms: u64);
}

/// No-op manager matching the baseline's blank spawn step.
#[derive(Debug, Default)]
pub struct NullSpawnManager;

impl SpawnManager for NullSpawnManager {
    fn advance(&mut self, _delta_ms: u64) {}
}
