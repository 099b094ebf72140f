pub mod district;
pub mod grid;
pub mod map;
pub mod pool;
pub mod safezone;
pub mod spawn;
pub mod tile;

pub use district::{assign_district_ids, District, DistrictGraph, Extent, Waypoint};
pub use grid::{GridCoord, ObjectGrid, GRID_SIZE};
pub use map::{AttackOutcome, Map, MapError};
pub use pool::{Pool, ReusablePools};
pub use safezone::{DangerTracker, SafeZone, ShrinkKeyframe};
pub use spawn::{NullSpawnManager, SpawnManager};
pub use tile::{tile_to_world, world_to_tile, TileCell, TileCoord, TileFlags, TileType, TILE_SIZE};
