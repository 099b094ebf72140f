use crate::tile::TileCoord;

/// Half-span rectangle a waypoint claims, expressed in tile coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub min: TileCoord,
    pub max: TileCoord,
}

impl Extent {
    pub fn contains(&self, coord: TileCoord) -> bool {
        coord.x >= self.min.x && coord.x <= self.max.x && coord.y >= self.min.y && coord.y <= self.max.y
    }
}

/// A TMX-defined seed tile with a directed link to one other waypoint.
/// Waypoints seed district flood-fill and anchor robot route navigation.
#[derive(Debug, Clone)]
pub struct Waypoint {
    pub id: u32,
    pub position: TileCoord,
    pub district_id: u32,
    pub linked_to: Option<u32>,
    pub extent: Extent,
}

#[derive(Debug, Clone)]
pub struct District {
    pub id: u32,
    pub waypoint_ids: Vec<u32>,
}

/// Static once built: connected components of traversable tiles, seeded
/// from waypoints and assigned to tiles by flood fill.
#[derive(Debug, Default)]
pub struct DistrictGraph {
    pub districts: Vec<District>,
    pub waypoints: Vec<Waypoint>,
}

impl DistrictGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waypoint(&self, id: u32) -> Option<&Waypoint> {
        self.waypoints.iter().find(|w| w.id == id)
    }

    pub fn linked_waypoint(&self, id: u32) -> Option<&Waypoint> {
        self.waypoint(id).and_then(|w| w.linked_to).and_then(|to| self.waypoint(to))
    }

    pub fn waypoints_in_district(&self, district_id: u32) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter().filter(move |w| w.district_id == district_id)
    }
}

/// Flood-fills tile district ids in place from the graph's waypoints,
/// treating `is_traversable` as the connectivity predicate.
pub fn assign_district_ids<F, G>(width: i32, height: i32, is_traversable: F, mut set_district: G, waypoints: &[Waypoint])
where
    F: Fn(TileCoord) -> bool,
    G: FnMut(TileCoord, u32),
{
    let mut visited = vec![false; (width * height) as usize];
    let index = |c: TileCoord| (c.y * width + c.x) as usize;
    let in_bounds = |c: TileCoord| c.x >= 0 && c.x < width && c.y >= 0 && c.y < height;

    for waypoint in waypoints {
        if !in_bounds(waypoint.position) || visited[index(waypoint.position)] {
            continue;
        }
        let mut stack = vec![waypoint.position];
        while let Some(coord) = stack.pop() {
            if !in_bounds(coord) || visited[index(coord)] || !is_traversable(coord) {
                continue;
            }
            visited[index(coord)] = true;
            set_district(coord, waypoint.district_id);
            for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                stack.push(TileCoord::new(coord.x + dx, coord.y + dy));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn flood_fill_stops_at_walls() {
        let width = 5;
        let height = 1;
        let traversable = |c: TileCoord| c.x != 2;
        let assigned = RefCell::new(vec![None; width as usize]);
        let waypoints = vec![Waypoint {
            id: 0,
            position: TileCoord::new(0, 0),
            district_id: 1,
            linked_to: None,
            extent: Extent { min: TileCoord::new(0, 0), max: TileCoord::new(1, 0) },
        }];
        assign_district_ids(
            width,
            height,
            traversable,
            |c, d| assigned.borrow_mut()[c.x as usize] = Some(d),
            &waypoints,
        );
        let assigned = assigned.into_inner();
        assert_eq!(assigned[0], Some(1));
        assert_eq!(assigned[1], Some(1));
        assert_eq!(assigned[2], None);
        assert_eq!(assigned[3], None);
    }
}
