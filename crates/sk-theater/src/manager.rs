use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use rayon::{ThreadPool, ThreadPoolBuilder};
use rustc_hash::FxHashMap;
use sk_map::Map;
use sk_session::{Session, SessionId};

use crate::theater::Theater;

pub struct PendingAdmission {
    pub session: Session,
    pub prior_session_id: Option<SessionId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionOutcome {
    Restored(SessionId),
    RestoreFailed(SessionId),
    Admitted { session_id: SessionId, theater_id: u32 },
    Queued { session_id: SessionId, position: usize },
}

struct QueuedEntry {
    session_id: SessionId,
    elapsed_ms: u32,
}

struct ExpiredEntry {
    session_id: SessionId,
    elapsed_ms: u32,
}

/// Single-threaded owner of admission, queueing, and the theater pool.
/// `sessions` is the process-wide session registry; each `Theater`'s own
/// session set is only membership bookkeeping.
pub struct TheaterManager {
    pub theaters: FxHashMap<u32, Theater>,
    next_theater_id: u32,
    sessions: FxHashMap<SessionId, Session>,
    queued: VecDeque<QueuedEntry>,
    expired: Vec<ExpiredEntry>,
    player_limit: u32,
    player_count: u32,
    queued_timeout_ms: u32,
    expired_grace_ms: u32,
    pool: ThreadPool,
}

impl TheaterManager {
    pub fn new(player_limit: u32, queued_timeout_ms: u32, expired_grace_ms: u32, theater_update_threads: usize) -> anyhow::Result<Self> {
        let pool = ThreadPoolBuilder::new().num_threads(theater_update_threads.max(1)).build()?;
        Ok(Self {
            theaters: FxHashMap::default(),
            next_theater_id: 0,
            sessions: FxHashMap::default(),
            queued: VecDeque::new(),
            expired: Vec::new(),
            player_limit,
            player_count: 0,
            queued_timeout_ms,
            expired_grace_ms,
            pool,
        })
    }

    pub fn insert_theater(&mut self, theater: Theater) -> u32 {
        let id = self.next_theater_id;
        self.next_theater_id += 1;
        self.theaters.insert(id, theater);
        id
    }

    fn admit_into(&mut self, mut session: Session, theater_id: u32) {
        let session_id = session.id;
        session.status = sk_session::SessionStatus::Authed;
        if let Some(theater) = self.theaters.get_mut(&theater_id) {
            theater.add_session(session_id);
        }
        self.sessions.insert(session_id, session);
    }

    /// Step 1: drain pending sessions, attempting restore, GM fast-path
    /// admission, capacity-gated admission, or queueing.
    pub fn drain_pending(&mut self, pending: Vec<PendingAdmission>, mut select_theater_for: impl FnMut(&Session) -> u32) -> Vec<AdmissionOutcome> {
        let mut outcomes = Vec::with_capacity(pending.len());

        for admission in pending {
            if let Some(prior_id) = admission.prior_session_id {
                let restorable = self.sessions.get(&prior_id).map(|s| s.player.is_some()).unwrap_or(false);
                if restorable {
                    if let (Some(new_socket), Some(existing)) = (admission.session.socket.clone(), self.sessions.get_mut(&prior_id)) {
                        existing.restore_socket(new_socket);
                        outcomes.push(AdmissionOutcome::Restored(prior_id));
                        continue;
                    }
                }
                outcomes.push(AdmissionOutcome::RestoreFailed(prior_id));
                continue;
            }

            let session_id = admission.session.id;
            if admission.session.is_gm() {
                let theater_id = select_theater_for(&admission.session);
                self.admit_into(admission.session, theater_id);
                outcomes.push(AdmissionOutcome::Admitted { session_id, theater_id });
            } else if self.player_count < self.player_limit {
                let theater_id = select_theater_for(&admission.session);
                self.admit_into(admission.session, theater_id);
                self.player_count += 1;
                outcomes.push(AdmissionOutcome::Admitted { session_id, theater_id });
            } else {
                self.sessions.insert(session_id, admission.session);
                self.queued.push_back(QueuedEntry { session_id, elapsed_ms: 0 });
                outcomes.push(AdmissionOutcome::Queued { session_id, position: self.queued.len() });
            }
        }

        outcomes
    }

    /// Step 2: drives every accepted session's update; sessions whose
    /// socket closed without restore eligibility are logged out.
    pub fn update_sessions(&mut self, delta_ms: u32) -> Vec<SessionId> {
        let mut to_destroy = Vec::new();
        for (id, session) in self.sessions.iter_mut() {
            if session.timeout.tick(delta_ms) {
                to_destroy.push(*id);
                continue;
            }
            if session.should_logout_on_disconnect() {
                session.logging_out = true;
                to_destroy.push(*id);
            }
        }
        for id in &to_destroy {
            self.sessions.remove(id);
        }
        to_destroy
    }

    /// Every currently accepted session, for passes that need to read or
    /// drain its socket independent of theater/map state.
    pub fn sessions_mut(&mut self) -> impl Iterator<Item = &mut Session> {
        self.sessions.values_mut()
    }

    /// Step 3: promotes the queue head if capacity has freed, else ages
    /// out sessions whose queued timeout elapsed.
    pub fn update_queued(&mut self, delta_ms: u32, mut select_theater_for: impl FnMut(&Session) -> u32) -> Vec<AdmissionOutcome> {
        let mut outcomes = Vec::new();

        if self.player_count < self.player_limit {
            if let Some(entry) = self.queued.pop_front() {
                if let Some(session) = self.sessions.remove(&entry.session_id) {
                    let theater_id = select_theater_for(&session);
                    self.admit_into(session, theater_id);
                    self.player_count += 1;
                    outcomes.push(AdmissionOutcome::Admitted { session_id: entry.session_id, theater_id });
                }
            }
        }

        let timeout = self.queued_timeout_ms;
        let mut still_queued = VecDeque::new();
        while let Some(mut entry) = self.queued.pop_front() {
            entry.elapsed_ms += delta_ms;
            if entry.elapsed_ms >= timeout {
                self.sessions.remove(&entry.session_id);
            } else {
                still_queued.push_back(entry);
            }
        }
        self.queued = still_queued;

        outcomes
    }

    /// Step 4: destroys sessions that have sat in the expired grace window
    /// long enough for the client to observe their verdict.
    pub fn update_expired(&mut self, delta_ms: u32) {
        let grace = self.expired_grace_ms;
        self.expired.retain_mut(|entry| {
            entry.elapsed_ms += delta_ms;
            entry.elapsed_ms < grace
        });
    }

    pub fn mark_expired(&mut self, session_id: SessionId) {
        self.expired.push(ExpiredEntry { session_id, elapsed_ms: 0 });
    }

    /// Step 5: serial advance pass (state transitions only touch each
    /// theater's own fields and its own map through `on_start`/`on_stop`),
    /// then a parallel tick pass across disjoint theaters — each worker
    /// only ever touches the one theater it was handed, so theaters never
    /// observe each other's in-progress mutation.
    pub fn advance_and_tick<F, G, H>(&mut self, delta_ms: u64, mut on_start: F, mut on_stop: G, tick_theater: H)
    where
        F: FnMut(u32, &mut Map),
        G: FnMut(u32, &mut Map),
        H: Fn(u32, &mut Theater) + Sync,
    {
        for (id, theater) in self.theaters.iter_mut() {
            let id = *id;
            theater.advance(delta_ms, |map| on_start(id, map), |map| on_stop(id, map));
        }

        self.pool.install(|| {
            use rayon::prelude::*;
            self.theaters.par_iter_mut().for_each(|(id, theater)| tick_theater(*id, theater));
        });
    }

    /// Step 6: purges theaters whose deletion window has elapsed.
    pub fn purge_idle_theaters(&mut self, delta_ms: u64, deletion_delay: Duration) -> Vec<u32> {
        let mut purged = Vec::new();
        self.theaters.retain(|id, theater| {
            let expired = theater.tick_deletion_window(delta_ms, deletion_delay);
            if expired {
                purged.push(*id);
            }
            !expired
        });
        purged
    }

    pub fn player_count(&self) -> u32 {
        self.player_count
    }
}

#[allow(dead_code)]
fn _assert_session_send(_: Arc<Session>) {}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_entity::Position;
    use sk_map::SafeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use sk_session::{Capabilities, SessionIdGenerator};

    fn manager() -> (TheaterManager, u32) {
        let mut mgr = TheaterManager::new(1, 5_000, 2_000, 1).unwrap();
        let theater_id = mgr.insert_theater(Theater::new(Map::new(10, 10, SafeZone::new(Position::default(), vec![])), 500));
        (mgr, theater_id)
    }

    fn id_generator() -> SessionIdGenerator {
        SessionIdGenerator::new(&mut StdRng::seed_from_u64(1))
    }

    fn pending(gen: &mut SessionIdGenerator) -> PendingAdmission {
        let id = gen.next();
        PendingAdmission { session: socketless_session(id), prior_session_id: None }
    }

    fn socketless_session(id: SessionId) -> Session {
        // Sessions constructed for these tests never touch their socket;
        // the admission pipeline only reads status/capabilities/timeout.
        Session { id, status: sk_session::SessionStatus::Pending, socket: None, latency: Default::default(), clock: sk_session::ClockSync::new(), timeout: sk_session::SessionTimeout::new(5_000), player: None, capabilities: Capabilities::empty(), logging_out: false }
    }

    #[test]
    fn first_admission_fills_capacity_then_queues() {
        let (mut mgr, theater_id) = manager();
        let mut gen = id_generator();
        let first = pending(&mut gen);
        let second = pending(&mut gen);

        let outcomes = mgr.drain_pending(vec![first, second], |_| theater_id);
        assert!(matches!(outcomes[0], AdmissionOutcome::Admitted { .. }));
        assert!(matches!(outcomes[1], AdmissionOutcome::Queued { position: 1, .. }));
        assert_eq!(mgr.player_count(), 1);
    }

    #[test]
    fn queued_session_is_promoted_once_capacity_frees() {
        let (mut mgr, theater_id) = manager();
        let mut gen = id_generator();
        let first = pending(&mut gen);
        let second = pending(&mut gen);
        mgr.drain_pending(vec![first, second], |_| theater_id);

        mgr.theaters.get_mut(&theater_id).unwrap().sessions.clear();
        mgr.player_count = 0;

        let outcomes = mgr.update_queued(100, |_| theater_id);
        assert!(matches!(outcomes[0], AdmissionOutcome::Admitted { .. }));
        assert_eq!(mgr.player_count(), 1);
    }

    #[test]
    fn queued_session_drops_after_timeout() {
        let (mut mgr, theater_id) = manager();
        let mut gen = id_generator();
        let first = pending(&mut gen);
        let second = pending(&mut gen);
        mgr.drain_pending(vec![first, second], |_| theater_id);

        mgr.update_queued(6_000, |_| theater_id);
        assert!(mgr.queued.is_empty());
    }

    #[test]
    fn gm_admits_past_full_capacity() {
        let (mut mgr, theater_id) = manager();
        let mut gen = id_generator();
        mgr.drain_pending(vec![pending(&mut gen)], |_| theater_id);

        let mut gm = pending(&mut gen);
        gm.session.capabilities = Capabilities::GM;
        let outcomes = mgr.drain_pending(vec![gm], |_| theater_id);
        assert!(matches!(outcomes[0], AdmissionOutcome::Admitted { .. }));
    }
}
