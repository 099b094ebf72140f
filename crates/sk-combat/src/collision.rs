use sk_entity::Position;

/// Axis-aligned bounding box around a unit or item box for swept-segment
/// collision tests.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub center: Position,
    pub half_extent: f32,
}

impl Aabb {
    pub fn intersects_segment(&self, from: Position, to: Position) -> bool {
        perpendicular_distance(self.center, from, to) <= self.half_extent && segment_bounds_overlap(self, from, to)
    }
}

fn segment_bounds_overlap(aabb: &Aabb, from: Position, to: Position) -> bool {
    let min_x = from.x.min(to.x) - aabb.half_extent;
    let max_x = from.x.max(to.x) + aabb.half_extent;
    let min_y = from.y.min(to.y) - aabb.half_extent;
    let max_y = from.y.max(to.y) + aabb.half_extent;
    aabb.center.x >= min_x && aabb.center.x <= max_x && aabb.center.y >= min_y && aabb.center.y <= max_y
}

fn perpendicular_distance(point: Position, from: Position, to: Position) -> f32 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq < f32::EPSILON {
        return point.distance(from);
    }
    ((point.y - from.y) * dx - (point.x - from.x) * dy).abs() / len_sq.sqrt()
}

/// `1` at zero perpendicular distance, falling off linearly to `0` at
/// `half_extent`. Biases precision by perpendicular distance to the line.
pub fn precision_bias(point: Position, from: Position, to: Position, half_extent: f32) -> f32 {
    if half_extent <= 0.0 {
        return 0.0;
    }
    (1.0 - perpendicular_distance(point, from, to) / half_extent).clamp(0.0, 1.0)
}

/// Returns the first target (by iteration order) whose AABB the swept
/// segment `from -> to` intersects, along with its precision bias.
pub fn first_hit<'a, I>(from: Position, to: Position, candidates: I) -> Option<(usize, f32)>
where
    I: IntoIterator<Item = &'a Aabb>,
{
    candidates.into_iter().enumerate().find_map(|(i, aabb)| {
        if aabb.intersects_segment(from, to) {
            Some((i, precision_bias(aabb.center, from, to, aabb.half_extent)))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_through_center_hits() {
        let aabb = Aabb { center: Position::new(5.0, 0.0), half_extent: 1.0 };
        assert!(aabb.intersects_segment(Position::new(0.0, 0.0), Position::new(10.0, 0.0)));
    }

    #[test]
    fn segment_far_from_target_misses() {
        let aabb = Aabb { center: Position::new(5.0, 100.0), half_extent: 1.0 };
        assert!(!aabb.intersects_segment(Position::new(0.0, 0.0), Position::new(10.0, 0.0)));
    }

    #[test]
    fn precision_bias_is_highest_on_the_line() {
        let on_line = precision_bias(Position::new(5.0, 0.0), Position::new(0.0, 0.0), Position::new(10.0, 0.0), 2.0);
        let off_line = precision_bias(Position::new(5.0, 1.0), Position::new(0.0, 0.0), Position::new(10.0, 0.0), 2.0);
        assert_eq!(on_line, 1.0);
        assert!(off_line < on_line);
    }
}
