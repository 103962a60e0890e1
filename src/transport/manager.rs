//! In-process channel manager for stream transports.
//!
//! Stores listeners by channel name and runs [`serve_channel`] for each
//! stream opened against a name. Useful for loopback hosts and tests.
//!
//! # Example
//!
//! ```ignore
//! let manager = Arc::new(LocalChannelManager::new());
//! plugin.initialize(manager.clone())?;
//!
//! let (host_side, peer_side) = tokio::io::duplex(64 * 1024);
//! let (reader, writer) = tokio::io::split(host_side);
//! let task = manager.open_channel("TSMF", reader, writer)?;
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::task::JoinHandle;
use tracing::debug;

use super::serve_channel;
use crate::channel::{ChannelManager, Listener};
use crate::config::PluginConfig;
use crate::error::{Result, TsmfError};

/// Status reported when a channel name is already taken.
const STATUS_NAME_IN_USE: i32 = -1;

/// Channel manager backed by tokio streams.
#[derive(Debug, Default)]
pub struct LocalChannelManager {
    listeners: Mutex<HashMap<String, Arc<Listener>>>,
    config: PluginConfig,
}

impl LocalChannelManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config` for message limits and writer settings.
    pub fn with_config(config: PluginConfig) -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub fn listener(&self, name: &str) -> Option<Arc<Listener>> {
        self.lock().get(name).cloned()
    }

    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    /// Open a channel on `name` and serve it on a new task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open_channel<R, W>(
        &self,
        name: &str,
        reader: R,
        writer: W,
    ) -> Result<JoinHandle<Result<()>>>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let listener = self
            .listener(name)
            .ok_or_else(|| TsmfError::Protocol(format!("No listener for channel {}", name)))?;
        let config = self.config.clone();

        debug!(channel = name, "Opening channel");
        Ok(tokio::spawn(async move {
            serve_channel(reader, writer, listener, &config).await
        }))
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<Listener>>> {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ChannelManager for LocalChannelManager {
    fn create_listener(&self, name: &str, _flags: u32, listener: Arc<Listener>) -> Result<()> {
        let mut listeners = self.lock();
        if listeners.contains_key(name) {
            return Err(TsmfError::ListenerRejected {
                name: name.to_string(),
                status: STATUS_NAME_IN_USE,
            });
        }
        listeners.insert(name.to_string(), listener);
        Ok(())
    }

    fn remove_listener(&self, name: &str) -> Result<()> {
        if self.lock().remove(name).is_some() {
            debug!(channel = name, "Listener removed");
        }
        Ok(())
    }
}
