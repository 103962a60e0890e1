//! Error types for tsmf-channel.

use thiserror::Error;

/// Main error type for all channel operations.
#[derive(Debug, Error)]
pub enum TsmfError {
    /// Inbound message too short to hold the 12-byte request header.
    #[error("Malformed message: {len} bytes is shorter than the request header")]
    MalformedMessage { len: usize },

    /// The transport rejected a reply write with a nonzero status.
    #[error("Transport write failed with status {status}")]
    Transport { status: i32 },

    /// I/O error on a stream-backed channel.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writer side of the channel is gone.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Writer queue is full; the reply was not queued.
    #[error("Write queue full")]
    Backpressure,

    /// Framing violation on the underlying stream.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Configuration could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    /// Plugin was already terminated by the host.
    #[error("Plugin {0} has been terminated")]
    PluginTerminated(String),

    /// A plugin with this name is already registered.
    #[error("Plugin {0} is already registered")]
    AlreadyRegistered(String),

    /// The channel manager refused to create the listener.
    #[error("Listener {name} rejected by channel manager (status {status})")]
    ListenerRejected { name: String, status: i32 },
}

impl TsmfError {
    /// Nonzero status code reported to the host for this error.
    pub fn status(&self) -> i32 {
        match self {
            TsmfError::Transport { status } | TsmfError::ListenerRejected { status, .. } => {
                if *status == 0 {
                    1
                } else {
                    *status
                }
            }
            _ => 1,
        }
    }
}

/// Result type alias using TsmfError.
pub type Result<T> = std::result::Result<T, TsmfError>;
