//! Connection loop for stream-backed channels.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::{debug, error};

use super::{spawn_message_writer, MessageBuffer};
use crate::channel::Listener;
use crate::config::PluginConfig;
use crate::error::{Result, TsmfError};

/// Read buffer size for one `read` call.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Serve one connection until EOF or a dispatch failure.
///
/// Accepts the connection on `listener`, feeds each reassembled message to
/// the channel callback, then closes the callback and waits for pending
/// replies to be flushed. A failed reply write ends the connection and is
/// returned.
pub async fn serve_channel<R, W>(
    mut reader: R,
    writer: W,
    listener: Arc<Listener>,
    config: &PluginConfig,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (channel, writer_task) = spawn_message_writer(writer, &config.writer);
    let callback = listener.on_new_channel_connection(Box::new(channel), &[])?;
    let connection = callback.id();

    let mut buffer = MessageBuffer::with_max_message_size(config.max_message_size);
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    let result: Result<()> = 'read: loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break Ok(()),
            Ok(n) => n,
            Err(e) => break Err(TsmfError::Io(e)),
        };

        buffer.extend(&buf[..n]);
        loop {
            let message = match buffer.next_message() {
                Ok(Some(message)) => message,
                Ok(None) => break,
                Err(e) => break 'read Err(e),
            };
            if let Err(e) = callback.on_data_received(&message) {
                break 'read Err(e);
            }
        }
    };

    if let Err(e) = &result {
        error!(connection, "Closing channel: {}", e);
    } else {
        debug!(connection, "Peer closed channel");
    }

    // Dropping the callback drops the last writer handle.
    callback.on_close()?;
    let flushed = writer_task
        .await
        .map_err(|e| TsmfError::Io(std::io::Error::other(e)))?;

    result.and(flushed)
}
