use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use crate::socket::FramedSocket;

/// Reactor tick period.
pub const REACTOR_TICK: Duration = Duration::from_millis(10);

/// A handle used by the [`crate::manager::SocketManager`] to hand off newly
/// accepted sockets to a reactor and to read its current load for the
/// least-loaded accept-dispatch policy.
#[derive(Clone)]
pub struct ReactorHandle {
    pending_tx: flume::Sender<Arc<FramedSocket>>,
    active_connections: Arc<AtomicUsize>,
}

impl ReactorHandle {
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    pub fn dispatch(&self, socket: Arc<FramedSocket>) {
        // The reactor's pending queue is unbounded and only closes when the
        // reactor task itself is gone (process shutdown), so a failed send
        // here just means the socket is immediately dropped.
        let _ = self.pending_tx.send(socket);
    }
}

/// One reactor thread: owns a vector of live sockets and ticks them all
/// every [`REACTOR_TICK`]. The sole mutating operations on the owned vector
/// are "promote pending" and "evict closed", both performed on the reactor's
/// own task — no socket in `sockets` is ever touched by another reactor.
pub struct Reactor {
    sockets: Vec<Arc<FramedSocket>>,
    pending_rx: flume::Receiver<Arc<FramedSocket>>,
    active_connections: Arc<AtomicUsize>,
}

impl Reactor {
    pub fn new() -> (Self, ReactorHandle) {
        let (pending_tx, pending_rx) = flume::unbounded();
        let active_connections = Arc::new(AtomicUsize::new(0));

        let reactor = Self {
            sockets: Vec::new(),
            pending_rx,
            active_connections: active_connections.clone(),
        };

        let handle = ReactorHandle {
            pending_tx,
            active_connections,
        };

        (reactor, handle)
    }

    /// Runs the reactor's tick loop until the pending-socket channel closes
    /// (i.e. the owning [`crate::manager::SocketManager`] is dropped).
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(REACTOR_TICK);

        loop {
            ticker.tick().await;
            self.promote_pending();
            self.tick_sockets().await;
            self.evict_closed();
        }
    }

    fn promote_pending(&mut self) {
        while let Ok(socket) = self.pending_rx.try_recv() {
            self.sockets.push(socket);
        }
        self.active_connections
            .store(self.sockets.len(), Ordering::Relaxed);
    }

    async fn tick_sockets(&self) {
        for socket in &self.sockets {
            socket.update().await;
        }
    }

    fn evict_closed(&mut self) {
        let before = self.sockets.len();
        self.sockets.retain(|s| !s.is_closed());
        let evicted = before - self.sockets.len();
        if evicted > 0 {
            trace!(evicted, "reactor evicted closed sockets");
        }
        self.active_connections
            .store(self.sockets.len(), Ordering::Relaxed);
    }
}
