//! Reassembly of length-prefixed messages from a byte stream.
//!
//! Stream framing (outside the TSMF header):
//! ```text
//! ┌──────────────┬─────────────────────┐
//! │ Length       │ Message             │
//! │ uint32 LE    │ Length bytes        │
//! └──────────────┴─────────────────────┘
//! ```
//!
//! State machine:
//! - `WaitingForLength`: need 4 bytes
//! - `WaitingForBody`: length known, need N more bytes

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::config::DEFAULT_MAX_MESSAGE_SIZE;
use crate::error::{Result, TsmfError};

/// Size of the stream length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;

#[derive(Debug, Clone, Copy)]
enum State {
    WaitingForLength,
    WaitingForBody { remaining: usize },
}

/// Accumulates stream bytes and yields complete messages.
#[derive(Debug)]
pub struct MessageBuffer {
    buffer: BytesMut,
    state: State,
    max_message_size: u32,
}

impl MessageBuffer {
    /// Default capacity: 64KB, max message: 16MB.
    pub fn new() -> Self {
        Self::with_max_message_size(DEFAULT_MAX_MESSAGE_SIZE)
    }

    pub fn with_max_message_size(max_message_size: u32) -> Self {
        Self {
            buffer: BytesMut::with_capacity(64 * 1024),
            state: State::WaitingForLength,
            max_message_size,
        }
    }

    /// Append stream bytes and extract every complete message.
    ///
    /// Partial data stays buffered for the next push. Messages completed
    /// before an oversized length prefix are still returned; the prefix stays
    /// buffered and fails the next call.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the first pending length prefix exceeds
    /// the maximum.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Bytes>> {
        self.extend(data);

        let mut messages = Vec::new();
        loop {
            match self.next_message() {
                Ok(Some(message)) => messages.push(message),
                Ok(None) => break,
                Err(e) if messages.is_empty() => return Err(e),
                Err(_) => break,
            }
        }
        Ok(messages)
    }

    /// Append stream bytes without extracting messages.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Extract the next complete message, if one is buffered.
    ///
    /// An oversized length prefix is not consumed, so the error repeats
    /// until the buffer is cleared.
    pub fn next_message(&mut self) -> Result<Option<Bytes>> {
        loop {
            match self.state {
                State::WaitingForLength => {
                    if self.buffer.len() < LENGTH_PREFIX_SIZE {
                        return Ok(None);
                    }
                    let len = (&self.buffer[..LENGTH_PREFIX_SIZE]).get_u32_le();
                    if len > self.max_message_size {
                        return Err(TsmfError::Protocol(format!(
                            "Message size {} exceeds maximum {}",
                            len, self.max_message_size
                        )));
                    }
                    self.buffer.advance(LENGTH_PREFIX_SIZE);
                    self.state = State::WaitingForBody {
                        remaining: len as usize,
                    };
                }
                State::WaitingForBody { remaining } => {
                    if self.buffer.len() < remaining {
                        return Ok(None);
                    }
                    self.state = State::WaitingForLength;
                    return Ok(Some(self.buffer.split_to(remaining).freeze()));
                }
            }
        }
    }

    /// Number of buffered bytes not yet returned.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::WaitingForLength;
    }
}

impl Default for MessageBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Length prefix for a message of `len` bytes.
///
/// Fails for messages the 32-bit prefix cannot describe.
pub fn frame_len(len: usize) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| TsmfError::Protocol(format!("Message size {} exceeds u32 prefix", len)))
}

/// Prefix `message` with its length for a stream transport.
pub fn encode_message(message: &[u8]) -> Result<Bytes> {
    let len = frame_len(message.len())?;
    let mut buf = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + message.len());
    buf.put_u32_le(len);
    buf.put_slice(message);
    Ok(buf.freeze())
}
