use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;
use sk_protocol::{encode_frame, DecodeError, Frame, FrameDecoder};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Id assigned to a socket by the [`crate::manager::SocketManager`] that
/// accepted it.
pub type SocketId = u64;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SocketCloseReason {
    #[error("peer closed the connection")]
    PeerClosed,
    #[error("i/o error: {0}")]
    Io(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("send queue full")]
    QueueFull,
    #[error("session timeout elapsed")]
    Timeout,
}

impl From<DecodeError> for SocketCloseReason {
    fn from(e: DecodeError) -> Self {
        SocketCloseReason::Decode(e.to_string())
    }
}

/// A length-prefixed-framed TCP connection with a bounded outbound queue.
///
/// A background task decodes inbound frames as they arrive and pushes them
/// into `inbound`; the frames are pulled out by whichever layer owns this
/// socket (a world [`Session`](sk_session) or the auth handshake code).
/// Outbound frames queued with [`FramedSocket::queue_packet`] are coalesced
/// and written out once per call to [`FramedSocket::update`], which the
/// owning reactor drives on its tick.
pub struct FramedSocket {
    id: SocketId,
    remote_addr: SocketAddr,
    write_half: Mutex<OwnedWriteHalf>,
    send_queue: Mutex<VecDeque<Bytes>>,
    send_queue_limit: usize,
    closed: Arc<AtomicBool>,
    close_reason: Mutex<Option<SocketCloseReason>>,
    inbound: flume::Receiver<Frame>,
    reader_task: JoinHandle<()>,
}

impl FramedSocket {
    /// Splits `stream`, spawns the reader task, and returns a socket ready to
    /// be registered with a reactor. `num_opcodes` bounds the decoded opcode
    /// space (see [`sk_protocol::FrameDecoder`]).
    pub fn new(
        id: SocketId,
        stream: TcpStream,
        remote_addr: SocketAddr,
        num_opcodes: u16,
        send_queue_limit: usize,
        nodelay: bool,
    ) -> anyhow::Result<Arc<Self>> {
        if nodelay {
            stream.set_nodelay(true)?;
        }

        let (mut read_half, write_half) = stream.into_split();
        let (inbound_tx, inbound_rx) = flume::unbounded();

        let closed = Arc::new(AtomicBool::new(false));
        let closed_for_reader = closed.clone();

        let reader_task = tokio::spawn(async move {
            let mut decoder = FrameDecoder::new(num_opcodes);
            let mut buf = BytesMut::with_capacity(4096);

            loop {
                match decoder.try_decode(&mut buf) {
                    Ok(Some(frame)) => {
                        if inbound_tx.send_async(frame).await.is_err() {
                            break;
                        }
                        continue;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        debug!(socket = id, error = %e, "decode error, closing socket");
                        closed_for_reader.store(true, Ordering::SeqCst);
                        break;
                    }
                }

                buf.reserve(4096);
                match read_half.read_buf(&mut buf).await {
                    Ok(0) => {
                        closed_for_reader.store(true, Ordering::SeqCst);
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        debug!(socket = id, error = %e, "read error, closing socket");
                        closed_for_reader.store(true, Ordering::SeqCst);
                        break;
                    }
                }
            }
        });

        Ok(Arc::new(Self {
            id,
            remote_addr,
            write_half: Mutex::new(write_half),
            send_queue: Mutex::new(VecDeque::new()),
            send_queue_limit,
            closed,
            close_reason: Mutex::new(None),
            inbound: inbound_rx,
            reader_task,
        }))
    }

    pub fn id(&self) -> SocketId {
        self.id
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Thread-safe enqueue. Encodes `opcode`/`body` as one frame and appends
    /// it to the outbound deque. A queue already at `send_queue_limit` (0 =
    /// unbounded) is closed with [`SocketCloseReason::QueueFull`] instead of
    /// growing further; the packet being enqueued is dropped, but everything
    /// already queued is preserved and will still be written out.
    pub fn queue_packet(&self, opcode: u16, body: &[u8]) -> Result<(), SocketCloseReason> {
        if self.is_closed() {
            return Err(self.close_reason().unwrap_or(SocketCloseReason::PeerClosed));
        }

        let mut queue = self.send_queue.lock();

        if self.send_queue_limit != 0 && queue.len() >= self.send_queue_limit {
            drop(queue);
            self.close(SocketCloseReason::QueueFull);
            return Err(SocketCloseReason::QueueFull);
        }

        let mut out = BytesMut::new();
        encode_frame(opcode, body, &mut out).map_err(SocketCloseReason::from)?;
        queue.push_back(out.freeze());
        Ok(())
    }

    /// Tries to pull the next fully-decoded inbound frame without blocking.
    pub fn try_recv(&self) -> Option<Frame> {
        self.inbound.try_recv().ok()
    }

    /// Drains the outbound queue into one coalesced buffer and issues a
    /// single write. Called once per reactor tick.
    pub async fn update(&self) {
        if self.is_closed() {
            return;
        }

        let pending: Vec<Bytes> = {
            let mut queue = self.send_queue.lock();
            queue.drain(..).collect()
        };

        if pending.is_empty() {
            return;
        }

        let mut coalesced = BytesMut::with_capacity(pending.iter().map(Bytes::len).sum());
        for frame in pending {
            coalesced.extend_from_slice(&frame);
        }

        let mut write_half = self.write_half.lock();
        if let Err(e) = write_half.write_all(&coalesced).await {
            drop(write_half);
            warn!(socket = self.id, error = %e, "write failed, closing socket");
            self.close(SocketCloseReason::Io(e.to_string()));
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn close_reason(&self) -> Option<SocketCloseReason> {
        self.close_reason.lock().clone()
    }

    /// Idempotent; the close reason recorded is the first one observed.
    pub fn close(&self, reason: SocketCloseReason) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            *self.close_reason.lock() = Some(reason);
            self.reader_task.abort();
        }
    }
}

impl Drop for FramedSocket {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::{TcpListener, TcpStream};

    use super::*;

    async fn connected_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connect = TcpStream::connect(addr);
        let (accept, connect) = tokio::join!(listener.accept(), connect);
        (accept.unwrap().0, connect.unwrap())
    }

    #[tokio::test]
    async fn send_queue_bound_closes_without_dropping_earlier_packets() {
        let (server_stream, _client_stream) = connected_pair().await;
        let socket = FramedSocket::new(
            1,
            server_stream,
            "127.0.0.1:1".parse().unwrap(),
            16,
            2,
            false,
        )
        .unwrap();

        assert!(socket.queue_packet(0, b"a").is_ok());
        assert!(socket.queue_packet(0, b"b").is_ok());
        assert!(matches!(
            socket.queue_packet(0, b"c"),
            Err(SocketCloseReason::QueueFull)
        ));
        assert!(socket.is_closed());
        assert_eq!(socket.send_queue.lock().len(), 2);
    }

    #[tokio::test]
    async fn decode_error_closes_socket() {
        let (server_stream, client_stream) = connected_pair().await;
        let socket = FramedSocket::new(
            2,
            server_stream,
            "127.0.0.1:1".parse().unwrap(),
            4,
            0,
            false,
        )
        .unwrap();

        let mut client_stream = client_stream;
        // body_len = 9000 > MAX_BODY_LEN.
        client_stream.write_all(&[0x23, 0x28, 0, 0]).await.unwrap();

        // Give the reader task a chance to observe the bad frame.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(socket.is_closed());
    }
}
