use crate::guid::ObjectGuid;
use crate::item::Item;
use crate::item_box::ItemBox;
use crate::locator::UnitLocator;
use crate::player::Player;
use crate::projectile::Projectile;
use crate::robot::Robot;
use crate::unit::Unit;

/// Tagged-variant world object, owned by the map's arena. Cross-object
/// references are [`ObjectGuid`]s resolved through that arena rather than
/// pointers.
#[derive(Debug, Clone)]
pub enum WorldObject {
    Player(Player),
    Robot(Robot),
    Projectile(Projectile),
    Item(Item),
    ItemBox(ItemBox),
    UnitLocator(UnitLocator),
}

impl WorldObject {
    pub fn guid(&self) -> ObjectGuid {
        match self {
            WorldObject::Player(p) => p.unit.guid,
            WorldObject::Robot(r) => r.unit.guid,
            WorldObject::Projectile(p) => p.guid,
            WorldObject::Item(i) => i.guid,
            WorldObject::ItemBox(b) => b.guid,
            WorldObject::UnitLocator(l) => l.guid,
        }
    }

    pub fn as_unit(&self) -> Option<&Unit> {
        match self {
            WorldObject::Player(p) => Some(&p.unit),
            WorldObject::Robot(r) => Some(&r.unit),
            _ => None,
        }
    }

    pub fn as_unit_mut(&mut self) -> Option<&mut Unit> {
        match self {
            WorldObject::Player(p) => Some(&mut p.unit),
            WorldObject::Robot(r) => Some(&mut r.unit),
            _ => None,
        }
    }

    pub fn as_player(&self) -> Option<&Player> {
        match self {
            WorldObject::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut Player> {
        match self {
            WorldObject::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_robot(&self) -> Option<&Robot> {
        match self {
            WorldObject::Robot(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_robot_mut(&mut self) -> Option<&mut Robot> {
        match self {
            WorldObject::Robot(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_projectile(&self) -> Option<&Projectile> {
        match self {
            WorldObject::Projectile(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_projectile_mut(&mut self) -> Option<&mut Projectile> {
        match self {
            WorldObject::Projectile(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_item_box_mut(&mut self) -> Option<&mut ItemBox> {
        match self {
            WorldObject::ItemBox(b) => Some(b),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Position;
    use crate::guid::ObjectType;
    use crate::player::SessionId;

    #[test]
    fn guid_dispatches_across_variants() {
        let guid = ObjectGuid::new(ObjectType::Player, 1);
        let unit = Unit::new(guid, Position::default(), 100.0, 50.0);
        let obj = WorldObject::Player(Player::new(unit, SessionId(1)));
        assert_eq!(obj.guid(), guid);
        assert!(obj.as_unit().is_some());
        assert!(obj.as_robot().is_none());
    }
}
