//! Listener produced by plugin initialization.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use tracing::{debug, warn};

use super::{ChannelCallback, ChannelManager, VirtualChannel};
use crate::dispatch::Dispatcher;
use crate::error::{Result, TsmfError};

/// Accepts connections for one plugin and creates their callbacks.
///
/// The channel manager usually owns the listener, so the listener only keeps
/// a weak handle back to it. Once closed by plugin termination, new
/// connections are refused.
pub struct Listener {
    plugin_name: String,
    channel_mgr: Weak<dyn ChannelManager>,
    dispatcher: Dispatcher,
    next_connection_id: AtomicU64,
    closed: AtomicBool,
}

impl Listener {
    pub fn new(
        plugin_name: impl Into<String>,
        channel_mgr: &Arc<dyn ChannelManager>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            channel_mgr: Arc::downgrade(channel_mgr),
            dispatcher,
            next_connection_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        }
    }

    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The channel manager this listener was registered with, if still alive.
    pub fn channel_manager(&self) -> Option<Arc<dyn ChannelManager>> {
        self.channel_mgr.upgrade()
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Refuse further connections. Open callbacks keep working.
    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Accept a new connection.
    ///
    /// Every connection is accepted until the plugin is terminated. `data` is
    /// the host's connection-request data; it is not used.
    pub fn on_new_channel_connection(
        &self,
        channel: Box<dyn VirtualChannel>,
        _data: &[u8],
    ) -> Result<ChannelCallback> {
        if self.is_closed() {
            warn!(plugin = %self.plugin_name, "Connection refused, plugin terminated");
            return Err(TsmfError::PluginTerminated(self.plugin_name.clone()));
        }

        let id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);
        debug!(plugin = %self.plugin_name, connection = id, "New channel connection");

        Ok(ChannelCallback::new(
            id,
            self.plugin_name.clone(),
            Weak::clone(&self.channel_mgr),
            channel,
            self.dispatcher.clone(),
        ))
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("plugin_name", &self.plugin_name)
            .field("closed", &self.is_closed())
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
