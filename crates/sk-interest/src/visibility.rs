use sk_entity::{ConcealmentState, Position, WorldObject};

/// A player's viewport, centered on its own position each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub center: Position,
    pub half_width: f32,
    pub half_height: f32,
}

impl Rect {
    pub fn contains(&self, point: Position) -> bool {
        (point.x - self.center.x).abs() <= self.half_width && (point.y - self.center.y).abs() <= self.half_height
    }
}

/// Extra context `is_visible_to` needs beyond the candidate object itself.
#[derive(Debug, Clone, Copy)]
pub struct ViewerContext {
    pub viewport: Rect,
    pub is_gm: bool,
    pub discover_concealed_unit_distance: f32,
    pub carries_discover_concealed_item: bool,
}

/// A player sees `candidate` iff it reports visible, sits inside the
/// viewer's viewport, and passes the per-variant filter (concealment,
/// GM-only).
pub fn is_visible_to(viewer: &ViewerContext, candidate: &WorldObject, candidate_position: Position) -> bool {
    if !viewer.viewport.contains(candidate_position) {
        return false;
    }

    match candidate {
        WorldObject::Player(p) if p.is_gm && !viewer.is_gm => false,
        WorldObject::Robot(r) => concealment_allows(viewer, r.unit.concealment, candidate_position),
        WorldObject::Player(p) => concealment_allows(viewer, p.unit.concealment, candidate_position),
        _ => true,
    }
}

fn concealment_allows(viewer: &ViewerContext, state: ConcealmentState, candidate_position: Position) -> bool {
    if state != ConcealmentState::Concealed {
        return true;
    }
    viewer.carries_discover_concealed_item
        || viewer.viewport.center.distance(candidate_position) <= viewer.discover_concealed_unit_distance
}

/// A player tracks `candidate` (out-of-sight but radar-visible) iff it
/// carries a locator and sits within `tracking_radius` but outside the
/// viewport.
pub fn is_tracked(viewer: &ViewerContext, candidate: &WorldObject, candidate_position: Position, tracking_radius: f32) -> bool {
    if !matches!(candidate, WorldObject::UnitLocator(_)) {
        return false;
    }
    if viewer.viewport.contains(candidate_position) {
        return false;
    }
    viewer.viewport.center.distance(candidate_position) <= tracking_radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_entity::{ObjectGuid, ObjectType, Player, SessionId, Unit};

    fn ctx(center: Position) -> ViewerContext {
        ViewerContext {
            viewport: Rect { center, half_width: 50.0, half_height: 50.0 },
            is_gm: false,
            discover_concealed_unit_distance: 10.0,
            carries_discover_concealed_item: false,
        }
    }

    #[test]
    fn outside_viewport_is_not_visible() {
        let viewer = ctx(Position::new(0.0, 0.0));
        let unit = Unit::new(ObjectGuid::new(ObjectType::Player, 1), Position::new(500.0, 500.0), 100.0, 50.0);
        let obj = WorldObject::Player(Player::new(unit, SessionId(1)));
        assert!(!is_visible_to(&viewer, &obj, Position::new(500.0, 500.0)));
    }

    #[test]
    fn concealed_unit_requires_proximity_or_item() {
        let viewer = ctx(Position::new(0.0, 0.0));
        let mut unit = Unit::new(ObjectGuid::new(ObjectType::Robot, 1), Position::new(20.0, 0.0), 100.0, 50.0);
        unit.concealment = ConcealmentState::Concealed;
        let obj = WorldObject::Robot(sk_entity::Robot::new(unit, sk_entity::AiVariant::Training, sk_entity::NatureType::Balanced, 1));
        assert!(!is_visible_to(&viewer, &obj, Position::new(20.0, 0.0)));

        let mut close_ctx = viewer;
        close_ctx.carries_discover_concealed_item = true;
        assert!(is_visible_to(&close_ctx, &obj, Position::new(20.0, 0.0)));
    }

    #[test]
    fn gm_object_hidden_from_non_gm() {
        let viewer = ctx(Position::new(0.0, 0.0));
        let mut unit = Unit::new(ObjectGuid::new(ObjectType::Player, 2), Position::new(0.0, 0.0), 100.0, 50.0);
        unit.concealment = ConcealmentState::Exposed;
        let mut player = Player::new(unit, SessionId(2));
        player.is_gm = true;
        assert!(!is_visible_to(&viewer, &WorldObject::Player(player), Position::new(0.0, 0.0)));
    }
}
