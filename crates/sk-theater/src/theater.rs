use std::time::Duration;

use rustc_hash::FxHashMap;
use sk_map::Map;
use sk_session::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TheaterState {
    Idle,
    WaitingForPlayers,
    PlayersInPlace,
    Active,
}

/// Parameters an accept decision and the state machine need from the
/// owning map/config; kept separate from [`Map`] itself since population
/// cap and grade band are theater-level concerns layered on top of it.
#[derive(Debug, Clone, Copy)]
pub struct AcceptContext {
    pub online_count: u32,
    pub robot_count: u32,
    pub population_cap: u32,
    pub can_join_battle: bool,
    pub is_sleeping: bool,
    pub candidate_is_trainee: bool,
    pub is_training_map: bool,
    pub candidate_combat_power_in_grade_band: bool,
}

/// A candidate is accepted into a theater only if population and
/// state-gated conditions both hold.
pub fn accepts(ctx: AcceptContext) -> bool {
    if ctx.online_count + ctx.robot_count >= ctx.population_cap {
        return false;
    }
    if !ctx.can_join_battle {
        return false;
    }
    ctx.is_sleeping || (!ctx.candidate_is_trainee && !ctx.is_training_map && ctx.candidate_combat_power_in_grade_band)
}

/// One match instance: a map, its session set, its state machine, and an
/// idle-deletion timer.
pub struct Theater {
    pub map: Map,
    pub sessions: FxHashMap<SessionId, ()>,
    pub state: TheaterState,
    pub tick_counter: u64,
    wait_for_players_elapsed_ms: u64,
    wait_for_players_timeout_ms: u64,
    idle_elapsed_ms: Option<u64>,
    pub battle_count: u64,
}

impl Theater {
    pub fn new(map: Map, wait_for_players_timeout_ms: u64) -> Self {
        Self {
            map,
            sessions: FxHashMap::default(),
            state: TheaterState::Idle,
            tick_counter: 0,
            wait_for_players_elapsed_ms: 0,
            wait_for_players_timeout_ms,
            idle_elapsed_ms: None,
            battle_count: 0,
        }
    }

    pub fn online_count(&self) -> u32 {
        self.sessions.len() as u32
    }

    pub fn is_sleeping(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Registers a just-accepted session and drives `IDLE -> WAITING_FOR_PLAYERS`
    /// on the first join.
    pub fn add_session(&mut self, id: SessionId) {
        self.sessions.insert(id, ());
        self.idle_elapsed_ms = None;
        if self.state == TheaterState::Idle {
            self.state = TheaterState::WaitingForPlayers;
            self.wait_for_players_elapsed_ms = 0;
        }
    }

    pub fn remove_session(&mut self, id: SessionId) {
        self.sessions.remove(&id);
    }

    /// Advances the state machine by `delta_ms`. `on_start` runs once when
    /// entering `ACTIVE` (`battleCount++`, `map.onStart`); `on_stop` runs
    /// once when returning to `IDLE`.
    pub fn advance(&mut self, delta_ms: u64, mut on_start: impl FnMut(&mut Map), mut on_stop: impl FnMut(&mut Map)) {
        match self.state {
            TheaterState::Idle => {}
            TheaterState::WaitingForPlayers => {
                self.wait_for_players_elapsed_ms += delta_ms;
                if self.wait_for_players_elapsed_ms >= self.wait_for_players_timeout_ms && self.online_count() >= 1 {
                    self.state = TheaterState::PlayersInPlace;
                }
            }
            TheaterState::PlayersInPlace => {
                self.battle_count += 1;
                on_start(&mut self.map);
                self.state = TheaterState::Active;
            }
            TheaterState::Active => {
                if self.online_count() == 0 {
                    on_stop(&mut self.map);
                    self.state = TheaterState::Idle;
                }
            }
        }
    }

    /// Deletion-window bookkeeping: starts a window the instant the theater
    /// goes empty, cancels it on a new join, and reports expiry once
    /// `deletion_delay` elapses.
    pub fn tick_deletion_window(&mut self, delta_ms: u64, deletion_delay: Duration) -> bool {
        if !self.sessions.is_empty() {
            self.idle_elapsed_ms = None;
            return false;
        }
        let elapsed = self.idle_elapsed_ms.get_or_insert(0);
        *elapsed += delta_ms;
        *elapsed >= deletion_delay.as_millis() as u64
    }
}
