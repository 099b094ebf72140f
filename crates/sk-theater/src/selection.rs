use rand::Rng;

/// Inputs to one theater's selection weight.
#[derive(Debug, Clone, Copy)]
pub struct TheaterWeightInputs {
    pub map_matches_selected: bool,
    pub combatants: u32,
    pub cap: u32,
    pub can_join_battle: bool,
    pub sleeping: bool,
    pub trainee_training_grade_predicate: bool,
}

pub fn theater_weight(inputs: TheaterWeightInputs) -> f32 {
    let mut weight = 0.0;
    if inputs.map_matches_selected {
        weight += 1.0;
    }
    if inputs.combatants < inputs.cap {
        weight += 1.0 + inputs.combatants as f32 / inputs.cap.max(1) as f32;
    }
    if inputs.can_join_battle {
        weight += 1.0;
    }
    weight += if inputs.sleeping {
        1.0
    } else if inputs.trainee_training_grade_predicate {
        1.0
    } else {
        0.0
    };
    weight
}

/// Picks the max-weight theater; ties break by list order (first wins).
pub fn select_theater(weights: &[f32]) -> Option<usize> {
    weights
        .iter()
        .enumerate()
        .max_by(|(ai, a), (bi, b)| a.partial_cmp(b).unwrap().then(bi.cmp(ai)))
        .map(|(i, _)| i)
}

/// One entry in the map catalog filtered by the player's combat grade.
#[derive(Debug, Clone, Copy)]
pub struct MapCatalogEntry {
    pub map_id: u32,
    pub weight: f32,
}

pub const TRAINING_GROUND_MAP_ID: u32 = 0;

/// Weighted-random draw over `candidates`. Trainees are handled by the
/// caller returning [`TRAINING_GROUND_MAP_ID`] directly without
/// consulting the catalog.
pub fn select_map(candidates: &[MapCatalogEntry], rng: &mut impl Rng) -> Option<u32> {
    let total: f32 = candidates.iter().map(|c| c.weight).sum();
    if total <= 0.0 {
        return None;
    }
    let mut draw = rng.gen_range(0.0..total);
    for candidate in candidates {
        if draw < candidate.weight {
            return Some(candidate.map_id);
        }
        draw -= candidate.weight;
    }
    candidates.last().map(|c| c.map_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn ties_break_to_first_in_list() {
        assert_eq!(select_theater(&[2.0, 2.0, 1.0]), Some(0));
    }

    #[test]
    fn weight_accumulates_each_contributor() {
        let inputs = TheaterWeightInputs {
            map_matches_selected: true,
            combatants: 2,
            cap: 10,
            can_join_battle: true,
            sleeping: true,
            trainee_training_grade_predicate: false,
        };
        assert_eq!(theater_weight(inputs), 1.0 + (1.0 + 0.2) + 1.0 + 1.0);
    }

    #[test]
    fn weighted_map_draw_is_deterministic_for_seed() {
        let mut rng = StdRng::seed_from_u64(7);
        let candidates = vec![MapCatalogEntry { map_id: 1, weight: 1.0 }, MapCatalogEntry { map_id: 2, weight: 9.0 }];
        let picked = select_map(&candidates, &mut rng);
        assert!(picked.is_some());
    }
}
