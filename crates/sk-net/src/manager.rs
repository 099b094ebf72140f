use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::reactor::{Reactor, ReactorHandle};
use crate::socket::FramedSocket;

/// Options read from `Config` that affect socket behavior. Distinct from the
/// full daemon `Config` so `sk-net` doesn't depend on `sk-config`.
#[derive(Debug, Clone, Copy)]
pub struct SocketOptions {
    pub num_opcodes: u16,
    pub send_queue_limit: usize,
    pub tcp_nodelay: bool,
}

/// Owns the accept loop and the fixed pool of reactor threads. New
/// connections are handed to whichever reactor currently has the fewest
/// active connections; ties go to the lowest reactor index.
pub struct SocketManager {
    reactors: Vec<ReactorHandle>,
    next_id: AtomicU64,
    options: SocketOptions,
}

impl SocketManager {
    /// Spawns `reactor_count` reactor tasks (each on the calling Tokio
    /// runtime) and returns a manager ready to accept connections.
    pub fn spawn(reactor_count: usize, options: SocketOptions) -> Arc<Self> {
        assert!(reactor_count > 0, "at least one reactor thread is required");

        let mut reactors = Vec::with_capacity(reactor_count);
        for _ in 0..reactor_count {
            let (reactor, handle) = Reactor::new();
            tokio::spawn(reactor.run());
            reactors.push(handle);
        }

        Arc::new(Self {
            reactors,
            next_id: AtomicU64::new(1),
            options,
        })
    }

    /// Binds `addr` and accepts connections until the listener errors fatally.
    /// Each accepted socket is handed to the least-loaded reactor and its
    /// [`Arc<FramedSocket>`] passed to `on_accept` for protocol-specific
    /// handling (handshake, session creation, ...).
    pub async fn accept_loop(
        self: Arc<Self>,
        addr: SocketAddr,
        on_accept: impl Fn(Arc<FramedSocket>) + Send + Sync + 'static,
    ) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "listening");

        loop {
            match listener.accept().await {
                Ok((stream, remote_addr)) => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    match FramedSocket::new(
                        id,
                        stream,
                        remote_addr,
                        self.options.num_opcodes,
                        self.options.send_queue_limit,
                        self.options.tcp_nodelay,
                    ) {
                        Ok(socket) => {
                            let reactor = self.least_loaded_reactor();
                            on_accept(socket.clone());
                            reactor.dispatch(socket);
                        }
                        Err(e) => error!(%remote_addr, error = %e, "failed to set up socket"),
                    }
                }
                Err(e) => error!(error = %e, "accept failed"),
            }
        }
    }

    fn least_loaded_reactor(&self) -> &ReactorHandle {
        self.reactors
            .iter()
            .min_by_key(|r| r.active_connections())
            .expect("at least one reactor")
    }
}
