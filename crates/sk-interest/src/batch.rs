use rustc_hash::FxHashSet;
use sk_entity::ObjectGuid;

/// One player's coalesced UPDATE_OBJECT contents for a tick: objects newly
/// in view, objects that left view, and objects that stayed in view but
/// changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateObjectBatch {
    pub create: Vec<ObjectGuid>,
    pub out_of_range: Vec<ObjectGuid>,
    pub values_update: Vec<ObjectGuid>,
}

impl UpdateObjectBatch {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.out_of_range.is_empty() && self.values_update.is_empty()
    }
}

/// Tracks one player's client-side guid sets and diffs them each tick.
#[derive(Debug, Clone, Default)]
pub struct InterestTracker {
    pub in_sight: FxHashSet<ObjectGuid>,
    pub in_tracker_range: FxHashSet<ObjectGuid>,
}

impl InterestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the in-sight set with `visible_now` and returns the batch
    /// describing the transition. `dirty` names objects that remained
    /// visible but changed and should be carried as VALUES_UPDATE.
    pub fn update_in_sight(&mut self, visible_now: &FxHashSet<ObjectGuid>, dirty: &FxHashSet<ObjectGuid>) -> UpdateObjectBatch {
        let create: Vec<ObjectGuid> = visible_now.difference(&self.in_sight).copied().collect();
        let out_of_range: Vec<ObjectGuid> = self.in_sight.difference(visible_now).copied().collect();
        let values_update: Vec<ObjectGuid> = visible_now
            .intersection(&self.in_sight)
            .filter(|g| dirty.contains(*g))
            .copied()
            .collect();

        self.in_sight = visible_now.clone();

        UpdateObjectBatch { create, out_of_range, values_update }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_entity::ObjectType;

    fn guid(n: u32) -> ObjectGuid {
        ObjectGuid::new(ObjectType::Robot, n)
    }

    #[test]
    fn diff_produces_create_and_out_of_range() {
        let mut tracker = InterestTracker::new();
        tracker.in_sight.insert(guid(1));

        let visible_now: FxHashSet<_> = [guid(1), guid(2)].into_iter().collect();
        let dirty = FxHashSet::default();
        let batch = tracker.update_in_sight(&visible_now, &dirty);

        assert_eq!(batch.create, vec![guid(2)]);
        assert!(batch.out_of_range.is_empty());
        assert_eq!(tracker.in_sight, visible_now);
    }

    #[test]
    fn remaining_visible_and_dirty_becomes_values_update() {
        let mut tracker = InterestTracker::new();
        tracker.in_sight.insert(guid(1));

        let visible_now: FxHashSet<_> = [guid(1)].into_iter().collect();
        let dirty: FxHashSet<_> = [guid(1)].into_iter().collect();
        let batch = tracker.update_in_sight(&visible_now, &dirty);

        assert!(batch.create.is_empty());
        assert_eq!(batch.values_update, vec![guid(1)]);
    }
}
