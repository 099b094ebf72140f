use rustc_hash::FxHashSet;
use sk_entity::ExploreAreaState;
use sk_map::TileCoord;

/// Identifies one `ExplorArea` bucket: a fixed-size rectangle sized
/// `2 x sight_distance` tiles, addressed by its floor-divided grid
/// coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExploreAreaId {
    pub x: i32,
    pub y: i32,
}

pub fn area_of(coord: TileCoord, sight_distance: i32) -> ExploreAreaId {
    let span = (2 * sight_distance).max(1);
    ExploreAreaId { x: coord.x.div_euclid(span), y: coord.y.div_euclid(span) }
}

/// One robot's exploration memory. Excluded areas (tried and abandoned)
/// expire after 30s.
#[derive(Debug, Clone, Default)]
pub struct ExplorationMemory {
    pub explored: FxHashSet<ExploreAreaId>,
    excluded: Vec<(ExploreAreaId, u32)>,
}

pub const EXCLUSION_EXPIRY_MS: u32 = 30_000;

impl ExplorationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude(&mut self, area: ExploreAreaId) {
        self.excluded.push((area, EXCLUSION_EXPIRY_MS));
    }

    pub fn tick(&mut self, delta_ms: u32) {
        for (_, remaining) in &mut self.excluded {
            *remaining = remaining.saturating_sub(delta_ms);
        }
        self.excluded.retain(|(_, remaining)| *remaining > 0);
    }

    pub fn is_excluded(&self, area: ExploreAreaId) -> bool {
        self.excluded.iter().any(|(a, _)| *a == area)
    }

    /// Chooses the next unexplored, non-excluded, safe-distance-respecting
    /// neighbor of `current`, nearest by Euclidean distance between area
    /// centers; `None` if every same-district neighbor is exhausted.
    pub fn choose_adjacent<'a>(
        &self,
        current: ExploreAreaId,
        same_district_neighbors: impl IntoIterator<Item = &'a ExploreAreaId>,
        min_safe_distance: f32,
    ) -> Option<ExploreAreaId> {
        same_district_neighbors
            .into_iter()
            .filter(|area| !self.explored.contains(*area) && !self.is_excluded(**area))
            .filter(|area| distance(current, **area) >= min_safe_distance)
            .min_by(|a, b| distance(current, **a).partial_cmp(&distance(current, **b)).unwrap())
            .copied()
    }

    pub fn mark_explored(&mut self, area: ExploreAreaId) {
        self.explored.insert(area);
    }

    pub fn reset(&mut self) {
        self.explored.clear();
    }
}

fn distance(a: ExploreAreaId, b: ExploreAreaId) -> f32 {
    (((a.x - b.x).pow(2) + (a.y - b.y).pow(2)) as f32).sqrt()
}

/// Advances the explore-area state machine by one reaction: from
/// `EXPLORING`, try an adjacent unexplored area; failing that, fall back
/// to a waypoint route; if the whole map is explored, reset and start a
/// new sweep.
pub fn next_explore_state(
    current: ExploreAreaState,
    has_adjacent_candidate: bool,
    has_waypoint_route: bool,
    all_districts_explored: bool,
) -> ExploreAreaState {
    match current {
        ExploreAreaState::None => ExploreAreaState::Exploring,
        ExploreAreaState::Exploring | ExploreAreaState::GotoUnexplored => {
            if has_adjacent_candidate {
                ExploreAreaState::GotoUnexplored
            } else if has_waypoint_route {
                ExploreAreaState::GotoWaypoint
            } else if all_districts_explored {
                ExploreAreaState::NoAreas
            } else {
                ExploreAreaState::GotoLinkedWaypoint
            }
        }
        ExploreAreaState::GotoWaypoint => ExploreAreaState::GotoLinkedWaypoint,
        ExploreAreaState::GotoLinkedWaypoint => ExploreAreaState::Exploring,
        ExploreAreaState::Patrolling | ExploreAreaState::NoAreas => {
            if all_districts_explored {
                ExploreAreaState::Patrolling
            } else {
                ExploreAreaState::Exploring
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusion_expires_after_30s() {
        let mut memory = ExplorationMemory::new();
        let area = ExploreAreaId { x: 0, y: 0 };
        memory.exclude(area);
        assert!(memory.is_excluded(area));
        memory.tick(29_999);
        assert!(memory.is_excluded(area));
        memory.tick(1);
        assert!(!memory.is_excluded(area));
    }

    #[test]
    fn chooses_nearest_unexplored_non_excluded() {
        let memory = ExplorationMemory::new();
        let current = ExploreAreaId { x: 0, y: 0 };
        let neighbors = vec![ExploreAreaId { x: 2, y: 0 }, ExploreAreaId { x: 1, y: 0 }];
        let chosen = memory.choose_adjacent(current, &neighbors, 0.0);
        assert_eq!(chosen, Some(ExploreAreaId { x: 1, y: 0 }));
    }

    #[test]
    fn exhausted_districts_triggers_reset_sweep() {
        let next = next_explore_state(ExploreAreaState::Exploring, false, false, true);
        assert_eq!(next, ExploreAreaState::NoAreas);
    }
}
