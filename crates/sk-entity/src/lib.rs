pub mod geometry;
pub mod guid;
pub mod item;
pub mod item_box;
pub mod locator;
pub mod object;
pub mod player;
pub mod projectile;
pub mod robot;
pub mod unit;

pub use geometry::{BezierCurve, Position};
pub use guid::{GuidGenerator, ObjectGuid, ObjectType, SpawnCounter};
pub use item::{Item, ItemState};
pub use item_box::{ItemBox, OpenState};
pub use locator::UnitLocator;
pub use object::WorldObject;
pub use player::{Player, SessionId, Stat, StatStage};
pub use projectile::{Projectile, ProjectileKind, ProjectileState};
pub use robot::{AiVariant, ExploreAreaState, MoveSpline, NatureType, Robot};
pub use unit::{
    ConcealmentState, DangerState, DeathState, ItemSlots, ItemStack, MovementFlags, Unit,
    WithdrawalState, CONSUMABLE_SLOTS, EQUIPMENT_SLOTS,
};
