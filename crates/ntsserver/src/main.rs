mod cli;
mod logging;

use std::net::SocketAddr;

use clap::Parser;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use sk_config::{Config, DaemonKind};
use sk_ipc::{send_message, shutdown_signal, socket_path, ControlListener, IpcMessage, PidFile};

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    if cli.version {
        println!("ntsserver (Build {})", cli::BUILD);
        return Ok(());
    }

    let cfg = match Config::load(DaemonKind::Nts, &cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("failed to load {}: {e}", cli.config.display());
            std::process::exit(1);
        }
    };

    if cli.stop {
        return request_stop(&cfg);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread().worker_threads(cfg.thread_pool.max(1)).enable_all().build()?;
    runtime.block_on(run(cfg))
}

fn request_stop(cfg: &Config) -> anyhow::Result<()> {
    let pid_path = pid_file_path(cfg);
    let pid: u32 = std::fs::read_to_string(&pid_path)?.trim().parse()?;
    let path = socket_path(DaemonKind::Nts.name(), pid);
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(send_message(&path, IpcMessage::Stop))
}

fn pid_file_path(cfg: &Config) -> String {
    if cfg.pid_file.is_empty() {
        format!("{}.pid", DaemonKind::Nts.name())
    } else {
        cfg.pid_file.clone()
    }
}

async fn run(cfg: Config) -> anyhow::Result<()> {
    logging::init(cfg.log_async_enable);

    let pid_file = PidFile::acquire(pid_file_path(&cfg))?;
    info!(pid = std::process::id(), "ntsserver starting");

    let control_path = socket_path(DaemonKind::Nts.name(), std::process::id());
    let _control = ControlListener::bind(control_path, |msg| match msg {
        IpcMessage::Stop => info!("stop requested over control socket"),
        IpcMessage::ReloadBanned | IpcMessage::ReloadRealm => {
            debug!("reload message has no effect on the time-sync daemon");
        }
    })
    .await?;

    let addr: SocketAddr = (cfg.bind_ip, cfg.listen_port).into();
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    loop {
        tokio::select! {
            _ = shutdown_signal() => {
                info!("shutdown signal received");
                break;
            }
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                tokio::spawn(echo_connection(stream, peer));
            }
        }
    }

    drop(pid_file);
    Ok(())
}

/// Echoes every byte read straight back to the peer until it closes the
/// connection or an i/o error occurs. There is no framing here: clients
/// round-trip whatever they send, which is all a time-sync probe needs.
async fn echo_connection(mut stream: TcpStream, peer: SocketAddr) {
    debug!(%peer, "accepted connection");
    let mut buf = [0u8; 512];

    loop {
        let n = match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                warn!(%peer, error = %e, "read failed");
                break;
            }
        };

        if let Err(e) = stream.write_all(&buf[..n]).await {
            warn!(%peer, error = %e, "write failed");
            break;
        }
    }

    debug!(%peer, "connection closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_file_path_defaults_to_daemon_name() {
        let cfg = Config::default_for(DaemonKind::Nts);
        assert_eq!(pid_file_path(&cfg), "ntsserver.pid");
    }
}
