pub const SYNC_INTERVAL_MS: u64 = 10_000;

/// Server-driven clock synchronization. The server issues a `TIME_SYNC_REQ`
/// with a monotone counter every [`SYNC_INTERVAL_MS`]; the client echoes
/// its own clock; the server derives an offset so `client_now()` can be
/// reproduced locally for prediction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockSync {
    next_counter: u32,
    last_sent_counter: Option<u32>,
    offset_ms: i64,
    elapsed_since_sync_ms: u64,
}

impl ClockSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called each session update; returns the counter to send in a new
    /// `TIME_SYNC_REQ` once the interval elapses.
    pub fn tick(&mut self, delta_ms: u64) -> Option<u32> {
        self.elapsed_since_sync_ms += delta_ms;
        if self.elapsed_since_sync_ms < SYNC_INTERVAL_MS {
            return None;
        }
        self.elapsed_since_sync_ms = 0;
        let counter = self.next_counter;
        self.next_counter = self.next_counter.wrapping_add(1);
        self.last_sent_counter = Some(counter);
        Some(counter)
    }

    /// Processes a client's echo reply. Stale replies (counter mismatch)
    /// are discarded, per the monotone-counter ordering guarantee.
    pub fn handle_reply(&mut self, reply_counter: u32, server_now_ms: u64, client_time_ms: u64, one_way_latency_ms: u64) -> bool {
        if self.last_sent_counter != Some(reply_counter) {
            return false;
        }
        self.last_sent_counter = None;
        self.offset_ms = server_now_ms as i64 - (client_time_ms as i64 + one_way_latency_ms as i64);
        true
    }

    pub fn client_now(&self, server_now_ms: u64) -> i64 {
        server_now_ms as i64 - self.offset_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_reply_is_discarded() {
        let mut sync = ClockSync::new();
        let counter = sync.tick(SYNC_INTERVAL_MS).unwrap();
        assert!(!sync.handle_reply(counter.wrapping_add(1), 1000, 900, 10));
        assert_eq!(sync.offset_ms, 0);
    }

    #[test]
    fn matching_reply_computes_offset() {
        let mut sync = ClockSync::new();
        let counter = sync.tick(SYNC_INTERVAL_MS).unwrap();
        assert!(sync.handle_reply(counter, 1000, 900, 10));
        assert_eq!(sync.offset_ms, 1000 - (900 + 10));
    }
}
