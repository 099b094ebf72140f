use std::io::{self, Write};

use tracing_subscriber::EnvFilter;

/// A `tracing_subscriber` writer that hands formatted lines to a channel
/// instead of writing them inline, so the caller's tick loop never blocks on
/// stdout. A background task drains the channel on the I/O runtime.
#[derive(Clone)]
struct ChannelWriter(flume::Sender<Vec<u8>>);

impl Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let _ = self.0.send(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Installs the process-wide subscriber. Mirrors the source's
/// `Log::Async` split: synchronous `fmt` layer by default, or one fed by a
/// bounded channel drained on a background task when `async_enable` is set.
pub fn init(async_enable: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if !async_enable {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return;
    }

    let (tx, rx) = flume::bounded::<Vec<u8>>(1024);
    tokio::spawn(async move {
        let mut stdout = io::stdout();
        while let Ok(line) = rx.recv_async().await {
            let _ = stdout.write_all(&line);
        }
    });

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(move || ChannelWriter(tx.clone())).init();
}
