use rustc_hash::FxHashMap;
use sk_entity::ObjectGuid;

use crate::batch::InterestTracker;

/// "For each player with this object in their client set" — used by
/// movement sync, stamina sync, and chat smileys. `trackers` maps player
/// guid to that player's interest tracker.
pub fn players_observing<'a>(
    trackers: &'a FxHashMap<ObjectGuid, InterestTracker>,
    object: ObjectGuid,
) -> impl Iterator<Item = ObjectGuid> + 'a {
    trackers
        .iter()
        .filter(move |(_, tracker)| tracker.in_sight.contains(&object))
        .map(|(player_guid, _)| *player_guid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_entity::ObjectType;

    #[test]
    fn finds_only_players_with_object_in_sight() {
        let mut trackers = FxHashMap::default();
        let mut watching = InterestTracker::new();
        watching.in_sight.insert(ObjectGuid::new(ObjectType::Robot, 9));
        trackers.insert(ObjectGuid::new(ObjectType::Player, 1), watching);
        trackers.insert(ObjectGuid::new(ObjectType::Player, 2), InterestTracker::new());

        let observers: Vec<_> = players_observing(&trackers, ObjectGuid::new(ObjectType::Robot, 9)).collect();
        assert_eq!(observers, vec![ObjectGuid::new(ObjectType::Player, 1)]);
    }
}
