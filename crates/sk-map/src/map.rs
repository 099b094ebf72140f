use rustc_hash::FxHashMap;
use sk_combat::RewardManager;
use sk_entity::{DangerState, GuidGenerator, ObjectGuid, ObjectType, Position, WorldObject};
use sk_item::{ItemApplicationTemplate, UnitEffectState};
use thiserror::Error;

use crate::district::DistrictGraph;
use crate::grid::ObjectGrid;
use crate::pool::ReusablePools;
use crate::safezone::{DangerTracker, SafeZone};
use crate::spawn::{NullSpawnManager, SpawnManager};
use crate::tile::{TileCell, TileCoord};

/// Outcome of [`Map::resolve_attack`]: the damage actually dealt (after
/// defense and item mitigation), whether it killed the target, and any XP
/// the kill splits to its damage contributors.
#[derive(Debug, Clone)]
pub struct AttackOutcome {
    pub damage: u32,
    pub killed: bool,
    pub xp_awards: Vec<(ObjectGuid, u64)>,
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("tile coordinate ({}, {}) is out of bounds", .0.x, .0.y)]
    OutOfBounds(TileCoord),
    #[error("object {0:?} is not present on this map")]
    UnknownObject(ObjectGuid),
}

/// One theater's map: tile grid, object arena and grid index, district and
/// waypoint graph, safe zone, per-map guid counters, and reusable-object
/// pools.
pub struct Map {
    pub width: i32,
    pub height: i32,
    tiles: Vec<TileCell>,
    pub objects: FxHashMap<ObjectGuid, WorldObject>,
    pub grid: ObjectGrid,
    pub districts: DistrictGraph,
    pub safe_zone: SafeZone,
    danger_trackers: FxHashMap<ObjectGuid, DangerTracker>,
    /// Per-unit item-effect bookkeeping (stat accumulator, flags, timed
    /// effects, cooldowns). Indexed the same way as `danger_trackers`;
    /// entries are created lazily on first use.
    item_effects: FxHashMap<ObjectGuid, UnitEffectState>,
    /// Per-victim damage-by-attacker ledger, consulted when a kill splits
    /// XP among its contributors.
    rewards: FxHashMap<ObjectGuid, RewardManager>,
    guids: GuidGenerator,
    pub pools: ReusablePools,
    /// Populated by a tick's combat/lifecycle passes; drained in the
    /// removal pass.
    removal_queue: Vec<ObjectGuid>,
    spawn_manager: Box<dyn SpawnManager>,
}

impl Map {
    pub fn new(width: i32, height: i32, safe_zone: SafeZone) -> Self {
        Self {
            width,
            height,
            tiles: vec![TileCell::default(); (width * height).max(0) as usize],
            objects: FxHashMap::default(),
            grid: ObjectGrid::new(),
            districts: DistrictGraph::new(),
            safe_zone,
            danger_trackers: FxHashMap::default(),
            item_effects: FxHashMap::default(),
            rewards: FxHashMap::default(),
            guids: GuidGenerator::new(),
            pools: ReusablePools::new(),
            removal_queue: Vec::new(),
            spawn_manager: Box::new(NullSpawnManager),
        }
    }

    pub fn set_spawn_manager(&mut self, manager: Box<dyn SpawnManager>) {
        self.spawn_manager = manager;
    }

    fn tile_index(&self, coord: TileCoord) -> Option<usize> {
        if coord.x < 0 || coord.y < 0 || coord.x >= self.width || coord.y >= self.height {
            return None;
        }
        Some((coord.y * self.width + coord.x) as usize)
    }

    pub fn tile(&self, coord: TileCoord) -> Result<&TileCell, MapError> {
        self.tile_index(coord).map(|i| &self.tiles[i]).ok_or(MapError::OutOfBounds(coord))
    }

    pub fn tile_mut(&mut self, coord: TileCoord) -> Result<&mut TileCell, MapError> {
        self.tile_index(coord).map(move |i| &mut self.tiles[i]).ok_or(MapError::OutOfBounds(coord))
    }

    pub fn next_guid(&mut self, object_type: ObjectType) -> ObjectGuid {
        self.guids.generate(object_type)
    }

    /// Adds an object already bucketed at `position` to the arena and grid
    /// index.
    pub fn insert_object(&mut self, object: WorldObject, position: Position) {
        let guid = object.guid();
        self.grid.insert(guid, position);
        self.objects.insert(guid, object);
    }

    pub fn queue_removal(&mut self, guid: ObjectGuid) {
        self.removal_queue.push(guid);
    }

    /// Pops and processes the deferred removal list: detach from the grid,
    /// then either delete or hand back to the per-type pool.
    pub fn drain_removals(&mut self) {
        let pending = std::mem::take(&mut self.removal_queue);
        if !pending.is_empty() {
            tracing::debug!(count = pending.len(), "draining removed objects");
        }
        for guid in pending {
            self.grid.remove(guid);
            self.danger_trackers.remove(&guid);
            self.item_effects.remove(&guid);
            self.rewards.remove(&guid);
            if let Some(object) = self.objects.remove(&guid) {
                match object {
                    WorldObject::Robot(robot) => self.pools.robots.release(robot),
                    WorldObject::Projectile(projectile) => self.pools.projectiles.release(projectile),
                    WorldObject::Item(item) => self.pools.items.release(item),
                    _ => {}
                }
            }
        }
    }

    /// Advances the safe zone's shrink timeline and re-evaluates every
    /// unit's danger state. `params` is `(entering_delay_ms, health_loss,
    /// health_loss_interval_ms)` sourced from config.
    pub fn advance_safe_zone(&mut self, delta_ms: u64, params: (u64, f32, u64)) {
        self.safe_zone.advance(delta_ms);
        let (entering_delay_ms, health_loss, health_loss_interval_ms) = params;

        let guids: Vec<ObjectGuid> = self.objects.keys().copied().collect();
        for guid in guids {
            let Some(unit) = self.objects.get(&guid).and_then(WorldObject::as_unit) else {
                continue;
            };
            let inside = self.safe_zone.is_inside(unit.position);
            let state = unit.danger;
            let tracker = self.danger_trackers.entry(guid).or_default();
            let (new_state, loss) =
                tracker.advance(state, inside, delta_ms, entering_delay_ms, health_loss, health_loss_interval_ms);

            if let Some(unit) = self.objects.get_mut(&guid).and_then(WorldObject::as_unit_mut) {
                unit.danger = new_state;
                if loss > 0.0 {
                    unit.apply_damage(loss);
                }
            }
        }
    }

    pub fn advance_spawn_manager(&mut self, delta_ms: u64) {
        self.spawn_manager.advance(delta_ms);
    }

    pub fn danger_state_of(&self, guid: ObjectGuid) -> Option<DangerState> {
        self.objects.get(&guid).and_then(WorldObject::as_unit).map(|u| u.danger)
    }

    /// Advances every live unit's item-effect timers and cooldowns,
    /// reverting timed effects that expired this tick.
    pub fn tick_item_effects(&mut self, delta_ms: u32) {
        for state in self.item_effects.values_mut() {
            state.tick(delta_ms);
        }
    }

    pub fn damage_reduction_percent_of(&self, guid: ObjectGuid) -> f32 {
        self.item_effects.get(&guid).map(|s| s.damage_reduction_percent).unwrap_or(0.0)
    }

    pub fn item_on_cooldown(&self, guid: ObjectGuid, item_template_id: u32) -> bool {
        self.item_effects.get(&guid).map(|s| s.is_on_cooldown(item_template_id)).unwrap_or(false)
    }

    /// Applies `template` to `guid`'s effect state only, without touching
    /// `self.objects` — for callers that already hold the unit detached
    /// from the arena (e.g. mid-tick AI processing) and will apply the
    /// returned health delta themselves.
    pub fn apply_item_effect(&mut self, guid: ObjectGuid, template: &ItemApplicationTemplate) -> f32 {
        self.item_effects.entry(guid).or_default().apply(template)
    }

    /// Total damage `attacker` has dealt to `victim` across the current
    /// engagement (cleared once `victim` is killed).
    pub fn damage_received_from(&self, victim: ObjectGuid, attacker: ObjectGuid) -> f32 {
        self.rewards.get(&victim).map(|r| r.damage_from(attacker)).unwrap_or(0.0)
    }

    /// Applies `template` to `guid`'s effect state and folds its net
    /// immediate health delta into the unit's health. Returns `false` if
    /// `guid` doesn't resolve to a live unit.
    pub fn apply_item_template(&mut self, guid: ObjectGuid, template: &ItemApplicationTemplate) -> bool {
        if self.objects.get(&guid).and_then(WorldObject::as_unit).is_none() {
            return false;
        }

        let delta = self.item_effects.entry(guid).or_default().apply(template);
        if let Some(unit) = self.objects.get_mut(&guid).and_then(WorldObject::as_unit_mut) {
            if delta < 0.0 {
                unit.apply_damage(-delta);
            } else if delta > 0.0 {
                unit.health = (unit.health + delta).min(unit.max_health);
            }
        }
        true
    }

    /// Resolves one attack's damage against `target`, mitigated by its
    /// defense and any active `DAMAGE_REDUCTION_PERCENT` item effect;
    /// records the hit against `target`'s reward ledger and, on a kill,
    /// splits its XP among every attacker who contributed damage and
    /// queues the victim for removal.
    pub fn resolve_attack(&mut self, attacker: ObjectGuid, target: ObjectGuid, raw_damage: f32, base_xp_on_kill: u64) -> Option<AttackOutcome> {
        let (defense, max_health) = {
            let unit = self.objects.get(&target).and_then(WorldObject::as_unit)?;
            (unit.defense, unit.max_health)
        };
        let reduction = self.damage_reduction_percent_of(target);
        let damage = sk_combat::resolve_damage(raw_damage, defense, reduction);

        let killed = self.objects.get_mut(&target).and_then(WorldObject::as_unit_mut)?.apply_damage(damage as f32);
        self.rewards.entry(target).or_default().record_damage(attacker, damage);

        let xp_awards = if killed {
            let awards = self.rewards.get(&target).map(|r| r.split_xp_on_kill(max_health, base_xp_on_kill)).unwrap_or_default();
            self.rewards.remove(&target);
            self.queue_removal(target);
            awards
        } else {
            Vec::new()
        };

        Some(AttackOutcome { damage, killed, xp_awards })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_entity::{ObjectType, Player, SessionId, Unit};

    fn test_map() -> Map {
        Map::new(10, 10, SafeZone::new(Position::new(0.0, 0.0), vec![]))
    }

    #[test]
    fn insert_and_remove_round_trip() {
        let mut map = test_map();
        let guid = map.next_guid(ObjectType::Player);
        let unit = Unit::new(guid, Position::new(1.0, 1.0), 100.0, 50.0);
        let player = WorldObject::Player(Player::new(unit, SessionId(1)));
        map.insert_object(player, Position::new(1.0, 1.0));
        assert!(map.objects.contains_key(&guid));
        assert!(map.grid.coord_of(guid).is_some());

        map.queue_removal(guid);
        map.drain_removals();
        assert!(!map.objects.contains_key(&guid));
        assert!(map.grid.coord_of(guid).is_none());
    }

    #[test]
    fn safe_zone_damages_units_outside_radius() {
        let mut map = test_map();
        map.safe_zone = SafeZone::new(Position::new(0.0, 0.0), vec![crate::safezone::ShrinkKeyframe { at_ms: 0, radius: 1.0 }]);
        let guid = map.next_guid(ObjectType::Robot);
        let unit = Unit::new(guid, Position::new(100.0, 100.0), 100.0, 50.0);
        map.insert_object(WorldObject::Robot(sk_entity::Robot::new(
            unit,
            sk_entity::AiVariant::Training,
            sk_entity::NatureType::Balanced,
            1,
        )), Position::new(100.0, 100.0));

        map.advance_safe_zone(200, (100, 5.0, 1000));
        assert_eq!(map.danger_state_of(guid), Some(DangerState::Entering));
    }

    #[test]
    fn item_template_heals_through_to_unit_health() {
        use sk_item::{EffectKind, ItemApplicationTemplate, TemplateEffect};

        let mut map = test_map();
        let guid = map.next_guid(ObjectType::Player);
        let mut unit = Unit::new(guid, Position::new(0.0, 0.0), 100.0, 50.0);
        unit.health = 50.0;
        map.insert_object(WorldObject::Player(Player::new(unit, SessionId(1))), Position::new(0.0, 0.0));

        let template = ItemApplicationTemplate {
            item_template_id: 1,
            effects: vec![TemplateEffect { kind: EffectKind::Health { delta: 20.0 }, duration_ms: 0 }],
            cooldown_ms: 0,
        };
        assert!(map.apply_item_template(guid, &template));
        assert_eq!(map.objects.get(&guid).and_then(WorldObject::as_unit).unwrap().health, 70.0);
    }

    #[test]
    fn resolve_attack_kills_and_splits_xp() {
        let mut map = test_map();
        let attacker = map.next_guid(ObjectType::Robot);
        let target = map.next_guid(ObjectType::Robot);

        let target_unit = Unit::new(target, Position::new(0.0, 0.0), 10.0, 10.0);
        map.insert_object(
            WorldObject::Robot(sk_entity::Robot::new(target_unit, sk_entity::AiVariant::Training, sk_entity::NatureType::Balanced, 1)),
            Position::new(0.0, 0.0),
        );

        let outcome = map.resolve_attack(attacker, target, 1000.0, 100).unwrap();
        assert!(outcome.killed);
        assert_eq!(outcome.xp_awards, vec![(attacker, 100)]);
        assert!(map.objects.contains_key(&target));
        map.drain_removals();
        assert!(!map.objects.contains_key(&target));
    }
}
