//! Per-connection channel callback.

use std::fmt;
use std::sync::{Arc, Weak};

use tracing::debug;

use super::{ChannelManager, VirtualChannel};
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::error::Result;

/// Bound to exactly one open transport channel.
///
/// Created on connection accept, consumed by [`on_close`](Self::on_close).
/// Closing takes `self`, so no dispatch can happen on a closed callback.
pub struct ChannelCallback {
    id: u64,
    plugin_name: String,
    channel_mgr: Weak<dyn ChannelManager>,
    channel: Box<dyn VirtualChannel>,
    dispatcher: Dispatcher,
}

impl ChannelCallback {
    pub(crate) fn new(
        id: u64,
        plugin_name: String,
        channel_mgr: Weak<dyn ChannelManager>,
        channel: Box<dyn VirtualChannel>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            id,
            plugin_name,
            channel_mgr,
            channel,
            dispatcher,
        }
    }

    /// Connection id, unique per listener.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    /// The host channel manager, if it is still alive.
    pub fn channel_manager(&self) -> Option<Arc<dyn ChannelManager>> {
        self.channel_mgr.upgrade()
    }

    /// Handle one inbound message delivered by the host.
    ///
    /// Returns an error only when the reply could not be written; the host
    /// may close the channel in response.
    pub fn on_data_received(&self, data: &[u8]) -> Result<()> {
        self.dispatch(data).map(|_| ())
    }

    /// Like [`on_data_received`](Self::on_data_received), reporting the outcome.
    pub fn dispatch(&self, data: &[u8]) -> Result<DispatchOutcome> {
        self.dispatcher.dispatch(data, self.channel.as_ref())
    }

    /// Write raw bytes to the channel, bypassing dispatch.
    pub fn write(&self, data: bytes::Bytes) -> Result<()> {
        self.channel.write(data)
    }

    /// Close the connection and release the callback.
    pub fn on_close(self) -> Result<()> {
        debug!(plugin = %self.plugin_name, connection = self.id, "Channel closed");
        Ok(())
    }
}

impl fmt::Debug for ChannelCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelCallback")
            .field("id", &self.id)
            .field("plugin_name", &self.plugin_name)
            .finish_non_exhaustive()
    }
}
