//! Dedicated writer task for stream-backed channels.
//!
//! Dispatch is synchronous, so replies are queued with a non-blocking
//! `try_send` and written by a task that owns the write half:
//!
//! ```text
//! on_data_received ─► MessageWriter::write ─► mpsc ─► writer task ─► stream
//! ```
//!
//! Queued replies are coalesced into one buffer per wakeup.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::buffer::{frame_len, LENGTH_PREFIX_SIZE};
use crate::channel::VirtualChannel;
use crate::config::WriterConfig;
use crate::error::{Result, TsmfError};

/// Maximum messages coalesced into a single write.
const MAX_BATCH_SIZE: usize = 64;

/// Cloneable handle that queues messages for the writer task.
#[derive(Debug, Clone)]
pub struct MessageWriter {
    tx: mpsc::Sender<Bytes>,
    pending: Arc<AtomicUsize>,
}

impl MessageWriter {
    /// Queue a message without waiting.
    ///
    /// Fails with `Backpressure` when the queue is full, with
    /// `ConnectionClosed` when the writer task has stopped, and with a
    /// protocol error when the message is too large for the length prefix.
    pub fn try_send(&self, message: Bytes) -> Result<()> {
        frame_len(message.len())?;
        self.pending.fetch_add(1, Ordering::AcqRel);
        self.tx.try_send(message).map_err(|e| {
            self.pending.fetch_sub(1, Ordering::Release);
            match e {
                mpsc::error::TrySendError::Full(_) => TsmfError::Backpressure,
                mpsc::error::TrySendError::Closed(_) => TsmfError::ConnectionClosed,
            }
        })
    }

    /// Messages queued but not yet written.
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }
}

impl VirtualChannel for MessageWriter {
    fn write(&self, data: Bytes) -> Result<()> {
        self.try_send(data)
    }
}

/// Spawn the writer task and return a handle for queuing messages.
///
/// The task ends cleanly once every handle is dropped and the queue is
/// drained. Must be called from within a tokio runtime.
pub fn spawn_message_writer<W>(
    writer: W,
    config: &WriterConfig,
) -> (MessageWriter, JoinHandle<Result<()>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
    let pending = Arc::new(AtomicUsize::new(0));

    let handle = MessageWriter {
        tx,
        pending: Arc::clone(&pending),
    };
    let task = tokio::spawn(writer_loop(rx, writer, pending));

    (handle, task)
}

async fn writer_loop<W>(
    mut rx: mpsc::Receiver<Bytes>,
    mut writer: W,
    pending: Arc<AtomicUsize>,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut out = BytesMut::new();

    while let Some(first) = rx.recv().await {
        let mut count = 1;
        put_message(&mut out, &first)?;

        while count < MAX_BATCH_SIZE {
            match rx.try_recv() {
                Ok(message) => {
                    put_message(&mut out, &message)?;
                    count += 1;
                }
                Err(_) => break,
            }
        }

        writer.write_all(&out).await?;
        writer.flush().await?;
        out.clear();

        pending.fetch_sub(count, Ordering::Release);
    }

    debug!("Writer queue closed");
    writer.shutdown().await?;
    Ok(())
}

fn put_message(out: &mut BytesMut, message: &[u8]) -> Result<()> {
    let len = frame_len(message.len())?;
    out.reserve(LENGTH_PREFIX_SIZE + message.len());
    out.put_u32_le(len);
    out.put_slice(message);
    Ok(())
}
