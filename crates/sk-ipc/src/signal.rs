use tracing::info;

/// Resolves once SIGINT or SIGTERM (or, on Windows, a Ctrl-Break event) is
/// received. Intended to be raced against the daemon's main tick loop so a
/// shutdown request can drain running work before exiting.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

        tokio::select! {
            _ = sigint.recv() => info!("received SIGINT"),
            _ = sigterm.recv() => info!("received SIGTERM"),
        }
    }

    #[cfg(windows)]
    {
        use tokio::signal::windows::ctrl_break;

        let mut brk = ctrl_break().expect("failed to install SIGBREAK handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("received Ctrl-C"),
            _ = brk.recv() => info!("received SIGBREAK"),
        }
    }
}
