//! Transport module - running the core over a tokio byte stream.
//!
//! Provides:
//! - [`MessageBuffer`] - reassembles length-prefixed messages
//! - [`MessageWriter`] - non-blocking [`VirtualChannel`](crate::channel::VirtualChannel)
//!   backed by a writer task
//! - [`serve_channel`] - per-connection read/dispatch loop
//! - [`LocalChannelManager`] - in-process channel manager

mod buffer;
mod manager;
mod serve;
mod writer;

pub use buffer::{encode_message, frame_len, MessageBuffer, LENGTH_PREFIX_SIZE};
pub use manager::LocalChannelManager;
pub use serve::serve_channel;
pub use writer::{spawn_message_writer, MessageWriter};
