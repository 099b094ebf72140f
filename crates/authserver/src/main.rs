mod cli;
mod logging;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use sk_config::{Config, DaemonKind};
use sk_ipc::{send_message, socket_path, shutdown_signal, ControlListener, IpcMessage, PidFile};
use sk_net::{SocketCloseReason, SocketManager, SocketOptions};
use sk_session::{Capabilities, DispatchTable, RequiredStatus, Session, SessionIdGenerator, SessionStatus};

const NUM_OPCODES: u16 = 64;
const OPCODE_PING: u16 = 0;
const AUTH_TICK_INTERVAL_MS: u64 = 200;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    if cli.version {
        println!("authserver (Build {})", cli::BUILD);
        return Ok(());
    }

    let cfg = match Config::load(DaemonKind::Auth, &cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("failed to load {}: {e}", cli.config.display());
            std::process::exit(1);
        }
    };

    if cli.stop {
        return request(&cfg, IpcMessage::Stop);
    }
    if cli.reload_banned {
        return request(&cfg, IpcMessage::ReloadBanned);
    }
    if cli.reload_realm {
        return request(&cfg, IpcMessage::ReloadRealm);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread().worker_threads(cfg.thread_pool.max(1)).enable_all().build()?;
    runtime.block_on(run(cfg))
}

fn request(cfg: &Config, msg: IpcMessage) -> anyhow::Result<()> {
    let pid_path = pid_file_path(cfg);
    let pid: u32 = std::fs::read_to_string(&pid_path)?.trim().parse()?;
    let path = socket_path(DaemonKind::Auth.name(), pid);
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(send_message(&path, msg))
}

fn pid_file_path(cfg: &Config) -> String {
    if cfg.pid_file.is_empty() {
        format!("{}.pid", DaemonKind::Auth.name())
    } else {
        cfg.pid_file.clone()
    }
}

fn dispatch_table() -> DispatchTable<Session> {
    let mut table = DispatchTable::new();
    table.register(OPCODE_PING, RequiredStatus::Authed, |session, _body| {
        session.on_packet_received();
        Ok(())
    });
    table
}

/// `RequiredStatus` only distinguishes `Authed`/`LoggedIn`; a session in any
/// earlier or later lifecycle state isn't eligible for any
/// dispatch table entry.
fn required_status_of(status: SessionStatus) -> Option<RequiredStatus> {
    match status {
        SessionStatus::Authed => Some(RequiredStatus::Authed),
        SessionStatus::LoggedIn => Some(RequiredStatus::LoggedIn),
        _ => None,
    }
}

async fn run(cfg: Config) -> anyhow::Result<()> {
    logging::init(cfg.log_async_enable);

    let pid_file = PidFile::acquire(pid_file_path(&cfg))?;
    info!(pid = std::process::id(), "authserver starting");

    let sessions: Arc<Mutex<Vec<Session>>> = Arc::new(Mutex::new(Vec::new()));
    let dispatch = Arc::new(dispatch_table());

    let control_sessions = sessions.clone();
    let control_path = socket_path(DaemonKind::Auth.name(), std::process::id());
    let _control = ControlListener::bind(control_path, move |msg| match msg {
        IpcMessage::Stop => info!("stop requested over control socket"),
        IpcMessage::ReloadBanned => {
            // Ban-list reload is the daemon's own business logic, out of
            // scope here; the control contract only requires recognizing
            // the message.
            info!(sessions = control_sessions.lock().len(), "reload-banned received");
        }
        IpcMessage::ReloadRealm => info!("reload-realm received"),
    })
    .await?;

    let addr: SocketAddr = (cfg.bind_ip, cfg.listen_port).into();
    let socket_options = SocketOptions { num_opcodes: NUM_OPCODES, send_queue_limit: cfg.send_queue_limit, tcp_nodelay: cfg.tcp_nodelay };
    let socket_manager = SocketManager::spawn(cfg.network_threads.max(1), socket_options);

    let session_ids = Arc::new(Mutex::new(SessionIdGenerator::new(&mut StdRng::from_entropy())));
    let session_timeout_ms = cfg.session_timeout_ms as u32;

    let accept_handle = tokio::spawn({
        let sessions = sessions.clone();
        let session_ids = session_ids.clone();
        socket_manager.accept_loop(addr, move |socket| {
            let id = session_ids.lock().next();
            let mut session = Session::new(id, socket, session_timeout_ms, Capabilities::empty());
            session.status = SessionStatus::Authed;
            debug!(session = id.0, "accepted connection");
            sessions.lock().push(session);
        })
    });

    let mut ticker = tokio::time::interval(Duration::from_millis(AUTH_TICK_INTERVAL_MS));

    loop {
        tokio::select! {
            _ = shutdown_signal() => {
                info!("shutdown signal received");
                break;
            }
            _ = ticker.tick() => {
                tick_sessions(&sessions, &dispatch, AUTH_TICK_INTERVAL_MS as u32);
            }
        }
    }

    accept_handle.abort();
    drop(pid_file);
    Ok(())
}

fn tick_sessions(sessions: &Arc<Mutex<Vec<Session>>>, dispatch: &DispatchTable<Session>, delta_ms: u32) {
    let mut sessions = sessions.lock();

    for session in sessions.iter_mut() {
        if let (Some(socket), Some(current)) = (session.socket.clone(), required_status_of(session.status)) {
            while let Some(frame) = socket.try_recv() {
                match dispatch.dispatch(frame.opcode, current, session, &frame.body) {
                    Ok(_) => {}
                    Err(e) => warn!(session = session.id.0, error = %e, "handler failed"),
                }
            }
        }
        if session.timeout.tick(delta_ms) {
            if let Some(socket) = &session.socket {
                socket.close(SocketCloseReason::Timeout);
            }
        }
    }

    sessions.retain(|s| !s.should_logout_on_disconnect());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_file_path_defaults_to_daemon_name() {
        let cfg = Config::default_for(DaemonKind::Auth);
        assert_eq!(pid_file_path(&cfg), "authserver.pid");
    }
}
