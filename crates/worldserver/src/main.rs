mod cli;
mod logging;
mod simulate;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use sk_config::{Config, DaemonKind};
use sk_entity::Position;
use sk_ipc::{send_message, socket_path, shutdown_signal, ControlListener, IpcMessage, PidFile};
use sk_map::{Map, SafeZone};
use sk_net::{SocketManager, SocketOptions};
use sk_protocol::Frame;
use sk_session::{Capabilities, Session, SessionId, SessionIdGenerator};
use sk_theater::{PendingAdmission, Theater, TheaterManager};

const NUM_OPCODES: u16 = 4096;

/// `(entering_delay_ms, health_loss, health_loss_interval_ms)` for
/// [`sk_map::Map::advance_safe_zone`]. A fixed policy constant rather than
/// an INI-backed setting.
const SAFE_ZONE_PARAMS: (u64, f32, u64) = (1_000, 2.0, 1_000);

/// Per-opcode dispatch isn't implemented; this only keeps the inbound
/// channel drained so it can't grow without bound.
fn trace_inbound_frame(session: SessionId, frame: Frame) {
    tracing::trace!(?session, opcode = frame.opcode, len = frame.body.len(), "drained inbound frame");
}

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    if cli.version {
        println!("worldserver (Build {})", cli::BUILD);
        return Ok(());
    }

    let cfg = match Config::load(DaemonKind::World, &cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("failed to load {}: {e}", cli.config.display());
            std::process::exit(1);
        }
    };

    if cli.stop {
        return request_stop(&cfg);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(cfg.thread_pool.max(1))
        .enable_all()
        .build()?;

    runtime.block_on(run(cfg))
}

fn request_stop(cfg: &Config) -> anyhow::Result<()> {
    let pid_path = pid_file_path(cfg, DaemonKind::World);
    let pid: u32 = std::fs::read_to_string(&pid_path)?.trim().parse()?;
    let path = socket_path(DaemonKind::World.name(), pid);

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(send_message(&path, IpcMessage::Stop))
}

fn pid_file_path(cfg: &Config, kind: DaemonKind) -> String {
    if cfg.pid_file.is_empty() {
        format!("{}.pid", kind.name())
    } else {
        cfg.pid_file.clone()
    }
}

async fn run(cfg: Config) -> anyhow::Result<()> {
    logging::init(cfg.log_async_enable);

    let pid_file = PidFile::acquire(pid_file_path(&cfg, DaemonKind::World))?;
    info!(pid = std::process::id(), "worldserver starting");

    let stop_requested = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let stop_flag = stop_requested.clone();
    let control_path = socket_path(DaemonKind::World.name(), std::process::id());
    let _control = ControlListener::bind(control_path, move |msg| {
        if let IpcMessage::Stop = msg {
            stop_flag.store(true, std::sync::atomic::Ordering::SeqCst);
        }
    })
    .await?;

    let mut manager = TheaterManager::new(cfg.player_limit as u32, cfg.queued_session_timeout_ms as u32, cfg.expired_session_delay_ms as u32, cfg.theater_update_threads)?;
    let training_ground = manager.insert_theater(Theater::new(
        Map::new(256, 256, SafeZone::new(Position::default(), vec![])),
        cfg.wait_for_players_timeout_ms,
    ));

    let (pending_tx, pending_rx) = flume::unbounded::<PendingAdmission>();
    let session_ids = Arc::new(Mutex::new(SessionIdGenerator::new(&mut StdRng::from_entropy())));
    let session_timeout_ms = cfg.session_timeout_ms as u32;

    let addr: SocketAddr = (cfg.bind_ip, cfg.listen_port).into();
    let socket_options = SocketOptions { num_opcodes: NUM_OPCODES, send_queue_limit: cfg.send_queue_limit, tcp_nodelay: cfg.tcp_nodelay };
    let socket_manager = SocketManager::spawn(cfg.network_threads.max(1), socket_options);

    let accept_handle = tokio::spawn({
        let pending_tx = pending_tx.clone();
        let session_ids = session_ids.clone();
        socket_manager.accept_loop(addr, move |socket| {
            let id = session_ids.lock().next();
            let session = Session::new(id, socket, session_timeout_ms, Capabilities::empty());
            if pending_tx.send(PendingAdmission { session, prior_session_id: None }).is_err() {
                warn!("world tick loop gone, dropping accepted connection");
            }
        })
    });

    let deletion_delay = Duration::from_secs(cfg.theater_deletion_delay_s);
    let mut ticker = tokio::time::interval(Duration::from_millis(cfg.world_update_interval_ms));
    let delta_ms = cfg.world_update_interval_ms;

    loop {
        tokio::select! {
            _ = shutdown_signal() => {
                info!("shutdown signal received");
                break;
            }
            _ = ticker.tick() => {
                if stop_requested.load(std::sync::atomic::Ordering::SeqCst) {
                    info!("stop requested over control socket");
                    break;
                }

                let pending: Vec<PendingAdmission> = pending_rx.drain().collect();
                if !pending.is_empty() {
                    let outcomes = manager.drain_pending(pending, |_session| training_ground);
                    for outcome in outcomes {
                        info!(?outcome, "admission outcome");
                    }
                }

                manager.update_sessions(delta_ms as u32);
                manager.update_queued(delta_ms as u32, |_session| training_ground);
                manager.update_expired(delta_ms as u32);

                for session in manager.sessions_mut() {
                    if let Some(socket) = &session.socket {
                        while let Some(frame) = socket.try_recv() {
                            trace_inbound_frame(session.id, frame);
                        }
                    }
                }

                manager.advance_and_tick(
                    delta_ms,
                    |id, _map| info!(theater = id, "theater entered ACTIVE"),
                    |id, _map| info!(theater = id, "theater returned to IDLE"),
                    |_id, theater| simulate::tick_theater(delta_ms, theater, SAFE_ZONE_PARAMS),
                );

                for id in manager.purge_idle_theaters(delta_ms, deletion_delay) {
                    if id != training_ground {
                        info!(theater = id, "purged idle theater");
                    }
                }
            }
        }
    }

    accept_handle.abort();
    drop(pid_file);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_file_path_defaults_to_daemon_name() {
        let cfg = Config::default_for(DaemonKind::World);
        assert_eq!(pid_file_path(&cfg, DaemonKind::World), "worldserver.pid");
    }
}
