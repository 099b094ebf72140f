use rustc_hash::FxHashSet;

use sk_ai::{candidate_threat, next_step, step_duration_ms, training_decide, CombatSubState, ThreatInputs, TrainingDecision};
use sk_combat::{attack_trajectory, precision_bias};
use sk_entity::{ObjectGuid, Position, Robot, WorldObject};
use sk_interest::{is_visible_to, InterestTracker, Rect, ViewerContext};
use sk_item::{EffectKind, ItemApplicationTemplate, TemplateEffect};
use sk_map::{tile_to_world, world_to_tile, Map};
use sk_theater::Theater;

/// Half-width of the attack swept-segment AABB against a single target,
/// in world units. A training robot's attacks only ever resolve against
/// its current top-threat target, so there's no candidate list to run
/// `sk_combat::first_hit` over; the bias still comes from the segment
/// math via `precision_bias`.
const ATTACK_HALF_EXTENT: f32 = 16.0;
const BASE_XP_ON_KILL: u64 = 100;
const ROBOT_MOVE_SPEED: f32 = 48.0;
const DEFAULT_HALF_VIEW: f32 = 320.0;
const CONCEALED_DISCOVERY_DISTANCE: f32 = 64.0;

const REPAIR_KIT_TEMPLATE_ID: u32 = 1;
const REPAIR_KIT_COOLDOWN_MS: u32 = 10_000;
const REPAIR_KIT_HEAL: f32 = 15.0;
const REPAIR_KIT_HEALTH_FRACTION: f32 = 0.3;

fn repair_kit_template() -> ItemApplicationTemplate {
    ItemApplicationTemplate {
        item_template_id: REPAIR_KIT_TEMPLATE_ID,
        effects: vec![TemplateEffect { kind: EffectKind::Health { delta: REPAIR_KIT_HEAL }, duration_ms: 0 }],
        cooldown_ms: REPAIR_KIT_COOLDOWN_MS,
    }
}

fn facing_towards(from: Position, to: Position) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Rebuilds `robot`'s threat list from its current attacker/enemy sets,
/// scoring each candidate against `robot`'s nature as a chaser (training
/// robots never escape).
fn update_threat(map: &Map, robot: &mut Robot) {
    robot.unit.threat_list.clear();

    for &candidate in robot.unit.enemy_set.iter().chain(robot.unit.attacker_set.iter()) {
        let Some(candidate_unit) = map.objects.get(&candidate).and_then(WorldObject::as_unit) else {
            continue;
        };

        let inputs = ThreatInputs {
            distance: robot.unit.position.distance(candidate_unit.position),
            critical_distance: robot.unit.attack_range.max(1.0),
            enemy_health_missing_fraction: 1.0 - (candidate_unit.health / candidate_unit.max_health.max(1.0)),
            damage_received: map.damage_received_from(robot.unit.guid, candidate),
            enemy_charged_power: candidate_unit.stamina / candidate_unit.max_stamina.max(1.0),
        };

        let threat = candidate_threat(inputs, robot.nature, CombatSubState::Chase);
        if let Some(entry) = robot.unit.threat_list.iter_mut().find(|(guid, _)| *guid == candidate) {
            entry.1 = threat;
        } else {
            robot.unit.threat_list.push((candidate, threat));
        }
    }
}

/// Advances `robot`'s move spline toward `target_position` by `delta_ms`,
/// starting a fresh one-tile step if none is in flight.
fn chase_towards(map: &Map, robot: &mut Robot, target_position: Position, delta_ms: u64) {
    if let Some(spline) = robot.move_spline.as_mut() {
        spline.elapsed_ms = spline.elapsed_ms.saturating_add(delta_ms as u32);
        robot.unit.position = spline.current_position();
        if spline.is_done() {
            robot.move_spline = None;
        }
        return;
    }

    let from = world_to_tile(robot.unit.position);
    let goal = world_to_tile(target_position);
    let Some(step) = next_step(map, from, goal, None) else {
        return;
    };

    let to = tile_to_world(step);
    let duration_ms = step_duration_ms(robot.unit.position.distance(to), ROBOT_MOVE_SPEED);
    robot.unit.orientation = facing_towards(robot.unit.position, to);
    robot.move_spline = Some(sk_entity::MoveSpline { from: robot.unit.position, to, elapsed_ms: 0, duration_ms });
}

/// Heals a low-health robot back up with a fixed repair kit once its own
/// cooldown allows it. Scoped to robots only; players manage their own
/// consumables through item commands, out of scope for this pass.
fn maybe_use_repair_kit(map: &mut Map, robot: &mut Robot) {
    if robot.unit.health / robot.unit.max_health.max(1.0) >= REPAIR_KIT_HEALTH_FRACTION {
        return;
    }
    if map.item_on_cooldown(robot.unit.guid, REPAIR_KIT_TEMPLATE_ID) {
        return;
    }

    let delta = map.apply_item_effect(robot.unit.guid, &repair_kit_template());
    if delta > 0.0 {
        robot.unit.health = (robot.unit.health + delta).min(robot.unit.max_health);
    } else if delta < 0.0 {
        robot.unit.apply_damage(-delta);
    }
}

/// Drives every live robot's threat scoring, chase/attack decision, and
/// combat resolution for one tick. Only `AiVariant::Training` robots act;
/// sparring robots are left to whatever their own match mode drives.
fn tick_robot_ai(map: &mut Map, delta_ms: u64) {
    let guids: Vec<ObjectGuid> = map
        .objects
        .iter()
        .filter_map(|(guid, object)| matches!(object, WorldObject::Robot(_)).then_some(*guid))
        .collect();

    for guid in guids {
        let Some(WorldObject::Robot(mut robot)) = map.objects.remove(&guid) else {
            continue;
        };

        if !robot.unit.is_alive() || robot.ai_variant != sk_entity::AiVariant::Training {
            map.objects.insert(guid, WorldObject::Robot(robot));
            continue;
        }

        maybe_use_repair_kit(map, &mut robot);
        update_threat(map, &mut robot);
        let top_threat = robot.unit.threat_list.iter().copied().max_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

        let target_position = top_threat.and_then(|(target, _)| map.objects.get(&target).and_then(WorldObject::as_unit)).map(|u| u.position);

        match training_decide(robot.unit.position, target_position, robot.unit.attack_range) {
            TrainingDecision::Idle => {}
            TrainingDecision::Chase => {
                if let Some(target_position) = target_position {
                    chase_towards(map, &mut robot, target_position, delta_ms);
                }
            }
            TrainingDecision::Attack => {
                if let (Some((target, _)), Some(target_position)) = (top_threat, target_position) {
                    robot.unit.orientation = facing_towards(robot.unit.position, target_position);
                    let curve = attack_trajectory(robot.unit.position, robot.unit.orientation, robot.unit.attack_range);
                    let bias = precision_bias(target_position, curve.p0, curve.p3, ATTACK_HALF_EXTENT);
                    if bias > 0.0 {
                        map.resolve_attack(guid, target, robot.unit.damage * bias, BASE_XP_ON_KILL);
                    }
                }
            }
        }

        map.grid.relocate(guid, robot.unit.position);
        map.objects.insert(guid, WorldObject::Robot(robot));
    }
}

/// Recomputes every player's in-sight set against every other unit on the
/// map. Item boxes, projectiles, and unit locators aren't folded into
/// visibility batching here; this pass only drives the unit-to-unit sight
/// a training match actually needs.
fn tick_player_interest(map: &mut Map) {
    let guids: Vec<ObjectGuid> = map
        .objects
        .iter()
        .filter_map(|(guid, object)| matches!(object, WorldObject::Player(_)).then_some(*guid))
        .collect();

    for guid in guids {
        let Some(WorldObject::Player(mut player)) = map.objects.remove(&guid) else {
            continue;
        };

        let half_width = if player.viewport_width > 0 { player.viewport_width as f32 / 2.0 } else { DEFAULT_HALF_VIEW };
        let half_height = if player.viewport_height > 0 { player.viewport_height as f32 / 2.0 } else { DEFAULT_HALF_VIEW };
        let viewer = ViewerContext {
            viewport: Rect { center: player.unit.position, half_width, half_height },
            is_gm: player.is_gm,
            discover_concealed_unit_distance: CONCEALED_DISCOVERY_DISTANCE,
            carries_discover_concealed_item: false,
        };

        let visible_now: FxHashSet<ObjectGuid> = map
            .objects
            .iter()
            .filter(|(candidate, _)| **candidate != guid)
            .filter_map(|(candidate, object)| {
                let position = object.as_unit()?.position;
                is_visible_to(&viewer, object, position).then_some(*candidate)
            })
            .collect();

        let mut tracker = InterestTracker { in_sight: std::mem::take(&mut player.in_sight), in_tracker_range: std::mem::take(&mut player.in_tracker_range) };
        let batch = tracker.update_in_sight(&visible_now, &FxHashSet::default());
        player.in_sight = tracker.in_sight;
        player.in_tracker_range = tracker.in_tracker_range;

        if !batch.is_empty() {
            tracing::trace!(player = ?guid, created = batch.create.len(), left = batch.out_of_range.len(), "interest batch");
        }

        map.objects.insert(guid, WorldObject::Player(player));
    }
}

/// One theater's full per-tick simulation pass: safe zone, spawning, item
/// effect timers, robot AI, then player interest, with removals drained
/// last so nothing this tick's other passes read a half-dead object.
pub fn tick_theater(delta_ms: u64, theater: &mut Theater, safe_zone_params: (u64, f32, u64)) {
    theater.map.advance_safe_zone(delta_ms, safe_zone_params);
    theater.map.advance_spawn_manager(delta_ms);
    theater.map.tick_item_effects(delta_ms as u32);
    tick_robot_ai(&mut theater.map, delta_ms);
    tick_player_interest(&mut theater.map);
    theater.map.drain_removals();
}
