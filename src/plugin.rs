//! Plugin builder and lifecycle.
//!
//! The [`PluginBuilder`] provides a fluent API for configuring the media
//! handler and channel name. The [`Plugin`] manages the lifecycle:
//! 1. `Unregistered` - built, not yet initialized by the host
//! 2. `Initialized` - listener created and registered with the channel manager
//! 3. `Terminated` - listener released; terminal
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tsmf_channel::Plugin;
//!
//! let plugin = Plugin::builder()
//!     .handler(Arc::new(MyMediaHandler::new()))
//!     .build();
//!
//! plugin.initialize(channel_mgr)?;
//! // ... host delivers connections ...
//! plugin.terminated();
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error, warn};

use crate::channel::{ChannelManager, Listener};
use crate::config::PluginConfig;
use crate::dispatch::{DispatchTable, Dispatcher, MediaHandler, NullMediaHandler};
use crate::error::{Result, TsmfError};

/// Plugin lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    Unregistered,
    Initialized,
    Terminated,
}

/// Builder for configuring and creating a plugin.
pub struct PluginBuilder {
    config: PluginConfig,
    handler: Arc<dyn MediaHandler>,
    table: Option<Arc<DispatchTable>>,
}

impl PluginBuilder {
    /// Create a new builder with default configuration and no handlers.
    pub fn new() -> Self {
        Self {
            config: PluginConfig::default(),
            handler: Arc::new(NullMediaHandler),
            table: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: PluginConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the registry name.
    ///
    /// Default: "tsmf"
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.plugin_name = name.into();
        self
    }

    /// Set the channel name the listener is registered under.
    ///
    /// Default: "TSMF"
    pub fn channel_name(mut self, name: impl Into<String>) -> Self {
        self.config.channel_name = name.into();
        self
    }

    /// Set the media handler that receives routed requests.
    pub fn handler(mut self, handler: Arc<dyn MediaHandler>) -> Self {
        self.handler = handler;
        self
    }

    /// Share a prebuilt dispatch table between plugins.
    pub fn table(mut self, table: Arc<DispatchTable>) -> Self {
        self.table = Some(table);
        self
    }

    pub fn build(self) -> Plugin {
        let table = self
            .table
            .unwrap_or_else(|| Arc::new(DispatchTable::standard()));
        Plugin {
            config: self.config,
            dispatcher: Dispatcher::new(table, self.handler),
            inner: Mutex::new(Inner {
                state: PluginState::Unregistered,
                listener: None,
            }),
            init: Mutex::new(()),
        }
    }
}

impl Default for PluginBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct Inner {
    state: PluginState,
    listener: Option<Arc<Listener>>,
}

/// Process-wide plugin for one channel name.
///
/// Owns at most one [`Listener`], created by the first successful
/// [`initialize`](Self::initialize).
pub struct Plugin {
    config: PluginConfig,
    dispatcher: Dispatcher,
    inner: Mutex<Inner>,
    init: Mutex<()>,
}

impl Plugin {
    pub fn builder() -> PluginBuilder {
        PluginBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.config.plugin_name
    }

    pub fn channel_name(&self) -> &str {
        &self.config.channel_name
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn state(&self) -> PluginState {
        self.lock().state
    }

    /// The listener, once initialized.
    pub fn listener(&self) -> Option<Arc<Listener>> {
        self.lock().listener.clone()
    }

    /// Create the listener and hand it to the channel manager.
    ///
    /// Repeated calls after success are no-ops. A failed registration leaves
    /// the plugin `Unregistered` so the host may retry. The state lock is not
    /// held while the manager runs, so the manager may query the plugin.
    pub fn initialize(&self, channel_mgr: Arc<dyn ChannelManager>) -> Result<()> {
        let _init = self.init_lock();
        match self.state() {
            PluginState::Initialized => return Ok(()),
            PluginState::Terminated => {
                return Err(TsmfError::PluginTerminated(self.name().to_string()))
            }
            PluginState::Unregistered => {}
        }

        debug!(plugin = %self.name(), channel = %self.channel_name(), "Initializing plugin");

        let listener = Arc::new(Listener::new(
            self.name(),
            &channel_mgr,
            self.dispatcher.clone(),
        ));

        if let Err(e) = channel_mgr.create_listener(
            self.channel_name(),
            self.config.listener_flags,
            Arc::clone(&listener),
        ) {
            error!(channel = %self.channel_name(), "Listener registration failed: {}", e);
            return Err(e);
        }

        let mut inner = self.lock();
        if inner.state == PluginState::Terminated {
            // Terminated while the manager was registering the listener.
            drop(inner);
            self.release_listener(&listener);
            return Err(TsmfError::PluginTerminated(self.name().to_string()));
        }
        inner.listener = Some(listener);
        inner.state = PluginState::Initialized;
        Ok(())
    }

    /// Host shutdown notification: release the listener.
    ///
    /// The listener stops accepting connections and is removed from its
    /// channel manager. Open channel callbacks are not force-closed; the host
    /// closes them.
    pub fn terminated(&self) {
        let listener = {
            let mut inner = self.lock();
            inner.state = PluginState::Terminated;
            inner.listener.take()
        };
        debug!(plugin = %self.name(), "Plugin terminated");

        if let Some(listener) = listener {
            self.release_listener(&listener);
        }
    }

    fn release_listener(&self, listener: &Listener) {
        listener.close();
        if let Some(channel_mgr) = listener.channel_manager() {
            if let Err(e) = channel_mgr.remove_listener(self.channel_name()) {
                warn!(channel = %self.channel_name(), "Listener removal failed: {}", e);
            }
        }
    }

    fn init_lock(&self) -> MutexGuard<'_, ()> {
        self.init.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.config.plugin_name)
            .field("channel_name", &self.config.channel_name)
            .field("state", &self.state())
            .finish()
    }
}
