use sk_map::{Map, TileCoord};

/// Produces the next tile-aligned step toward `goal`, preferring the
/// neighbor that most reduces Manhattan distance while respecting walls
/// and closed tiles, with a same-district tiebreak preference.
pub fn next_step(map: &Map, from: TileCoord, goal: TileCoord, preferred_district: Option<u32>) -> Option<TileCoord> {
    if from == goal {
        return None;
    }

    let neighbors = [
        TileCoord::new(from.x + 1, from.y),
        TileCoord::new(from.x - 1, from.y),
        TileCoord::new(from.x, from.y + 1),
        TileCoord::new(from.x, from.y - 1),
    ];

    neighbors
        .into_iter()
        .filter(|&coord| map.tile(coord).map(|t| t.is_traversable()).unwrap_or(false))
        .min_by_key(|&coord| {
            let distance = coord.manhattan_distance(goal);
            let district = map.tile(coord).ok().and_then(|t| t.district_id);
            let same_district = preferred_district.is_some() && district == preferred_district;
            (distance, !same_district)
        })
}

/// Move-spline duration for a single tile step, in milliseconds:
/// `tile-step distance / move_speed`, with `move_speed` in world units
/// per second.
pub fn step_duration_ms(step_world_distance: f32, move_speed: f32) -> u32 {
    if move_speed <= 0.0 {
        return 0;
    }
    ((step_world_distance / move_speed) * 1000.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_map::SafeZone;
    use sk_entity::Position;

    #[test]
    fn picks_neighbor_that_reduces_distance() {
        let map = Map::new(10, 10, SafeZone::new(Position::default(), vec![]));
        let step = next_step(&map, TileCoord::new(0, 0), TileCoord::new(3, 0), None).unwrap();
        assert_eq!(step, TileCoord::new(1, 0));
    }

    #[test]
    fn returns_none_when_already_at_goal() {
        let map = Map::new(10, 10, SafeZone::new(Position::default(), vec![]));
        assert!(next_step(&map, TileCoord::new(2, 2), TileCoord::new(2, 2), None).is_none());
    }
}
