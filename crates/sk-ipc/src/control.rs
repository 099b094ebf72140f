use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, warn};

/// One line of the IPC control protocol. Unknown lines are ignored by the
/// receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpcMessage {
    Stop,
    ReloadBanned,
    ReloadRealm,
}

impl IpcMessage {
    fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "stop" => Some(IpcMessage::Stop),
            "reload-banned" => Some(IpcMessage::ReloadBanned),
            "reload-realm" => Some(IpcMessage::ReloadRealm),
            _ => None,
        }
    }

    fn as_line(self) -> &'static str {
        match self {
            IpcMessage::Stop => "stop",
            IpcMessage::ReloadBanned => "reload-banned",
            IpcMessage::ReloadRealm => "reload-realm",
        }
    }
}

/// Path convention for the control channel: a Unix domain socket named after
/// the daemon and its pid, standing in for a named message queue
/// (`"<daemon>_msg_queue_<pid>"`). The IPC substrate is free to vary as long
/// as the `stop`/`reload-*` message contract holds.
pub fn socket_path(daemon_name: &str, pid: u32) -> PathBuf {
    std::env::temp_dir().join(format!("{daemon_name}_msg_queue_{pid}.sock"))
}

/// Binds the control socket and hands each recognized message to `on_message`
/// as it arrives. Runs until the listener errors, which only happens on
/// shutdown (the socket file is removed by [`ControlListener::drop`]).
pub struct ControlListener {
    path: PathBuf,
}

impl ControlListener {
    pub async fn bind(
        path: PathBuf,
        mut on_message: impl FnMut(IpcMessage) + Send + 'static,
    ) -> anyhow::Result<Self> {
        let _ = std::fs::remove_file(&path);
        let listener = UnixListener::bind(&path)?;

        let accept_path = path.clone();
        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!(error = %e, path = %accept_path.display(), "control socket accept failed");
                        break;
                    }
                };

                if let Some(msg) = read_one_message(stream).await {
                    on_message(msg);
                }
            }
        });

        Ok(Self { path })
    }
}

async fn read_one_message(stream: UnixStream) -> Option<IpcMessage> {
    let mut lines = BufReader::new(stream).lines();
    match lines.next_line().await {
        Ok(Some(line)) => match IpcMessage::parse(&line) {
            Some(msg) => Some(msg),
            None => {
                debug!(%line, "ignoring unrecognized IPC message");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            debug!(error = %e, "error reading IPC message");
            None
        }
    }
}

impl Drop for ControlListener {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Sends one control message to a running instance's control socket. Used by
/// the `--stop`/`--reload-*` CLI flags.
pub async fn send_message(path: &Path, msg: IpcMessage) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(path).await?;
    stream.write_all(msg.as_line().as_bytes()).await?;
    stream.write_all(b"\n").await?;
    stream.shutdown().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    #[tokio::test]
    async fn stop_message_roundtrips() {
        let path = socket_path("test-daemon", std::process::id());
        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();

        let _listener = ControlListener::bind(path.clone(), move |msg| {
            received_clone.lock().push(msg);
        })
        .await
        .unwrap();

        send_message(&path, IpcMessage::Stop).await.unwrap();
        send_message(&path, IpcMessage::ReloadBanned).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let got = received.lock();
        assert_eq!(got.as_slice(), [IpcMessage::Stop, IpcMessage::ReloadBanned]);
    }

    #[tokio::test]
    async fn unknown_message_is_ignored() {
        let path = socket_path("test-daemon-unknown", std::process::id());
        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();

        let _listener = ControlListener::bind(path.clone(), move |msg| {
            received_clone.lock().push(msg);
        })
        .await
        .unwrap();

        let mut stream = UnixStream::connect(&path).await.unwrap();
        stream.write_all(b"not-a-real-command\n").await.unwrap();
        stream.shutdown().await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(received.lock().is_empty());
    }
}
