//! Channel module - host-facing connection objects.
//!
//! The host's channel manager owns the transport. This module defines the
//! two seams it exposes ([`VirtualChannel`], [`ChannelManager`]) and the
//! objects the core hands back to it:
//! - [`Listener`] - accepts connections on the registered channel name
//! - [`ChannelCallback`] - one per open channel, dispatches inbound data

mod callback;
mod listener;

use std::sync::Arc;

use bytes::Bytes;

use crate::error::Result;

pub use callback::ChannelCallback;
pub use listener::Listener;

/// Write side of one open transport channel.
///
/// `Ok(())` corresponds to a zero status, any error to a nonzero status.
pub trait VirtualChannel: Send + Sync {
    fn write(&self, data: Bytes) -> Result<()>;
}

/// Host channel manager.
pub trait ChannelManager: Send + Sync {
    /// Register `listener` under a channel name. The host then calls
    /// [`Listener::on_new_channel_connection`] for each incoming connection.
    ///
    /// Called without any plugin lock held, so the manager may query the
    /// plugin. It must not call `Plugin::initialize` re-entrantly.
    fn create_listener(&self, name: &str, flags: u32, listener: Arc<Listener>) -> Result<()>;

    /// Drop the listener registered under `name` on plugin termination.
    ///
    /// Managers that keep no listener table can rely on the default; a
    /// terminated listener refuses new connections either way.
    fn remove_listener(&self, _name: &str) -> Result<()> {
        Ok(())
    }
}
