//! Host-owned plugin registry.
//!
//! Keeps one [`Plugin`] per name. [`PluginRegistry::entry`] is the plugin
//! entry point: a repeated registration for an existing name returns the
//! existing instance instead of building a second one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::channel::ChannelManager;
use crate::error::{Result, TsmfError};
use crate::plugin::Plugin;

/// Plugins registered with a host, keyed by name.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: Mutex<HashMap<String, Arc<Plugin>>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_plugin(&self, name: &str) -> Option<Arc<Plugin>> {
        self.lock().get(name).cloned()
    }

    /// Register a plugin under its own name.
    pub fn register_plugin(&self, plugin: Plugin) -> Result<Arc<Plugin>> {
        let mut plugins = self.lock();
        let name = plugin.name().to_string();
        if plugins.contains_key(&name) {
            return Err(TsmfError::AlreadyRegistered(name));
        }
        let plugin = Arc::new(plugin);
        plugins.insert(name, Arc::clone(&plugin));
        Ok(plugin)
    }

    /// Return the plugin registered under `name`, or build and register one.
    ///
    /// `make` runs only when no plugin of that name exists. The built plugin
    /// must carry `name`.
    pub fn entry<F>(&self, name: &str, make: F) -> Result<Arc<Plugin>>
    where
        F: FnOnce() -> Plugin,
    {
        let mut plugins = self.lock();
        if let Some(existing) = plugins.get(name) {
            debug!(plugin = name, "Plugin already registered");
            return Ok(Arc::clone(existing));
        }

        let plugin = make();
        if plugin.name() != name {
            return Err(TsmfError::Protocol(format!(
                "plugin built as {} registered under {}",
                plugin.name(),
                name
            )));
        }

        debug!(plugin = name, "Registering plugin");
        let plugin = Arc::new(plugin);
        plugins.insert(name.to_string(), Arc::clone(&plugin));
        Ok(plugin)
    }

    /// Initialize every registered plugin with the host channel manager.
    ///
    /// Stops at the first failure.
    pub fn initialize_all(&self, channel_mgr: Arc<dyn ChannelManager>) -> Result<()> {
        let plugins: Vec<_> = self.lock().values().cloned().collect();
        for plugin in plugins {
            plugin.initialize(Arc::clone(&channel_mgr))?;
        }
        Ok(())
    }

    /// Terminate and remove one plugin.
    pub fn terminate(&self, name: &str) -> Option<Arc<Plugin>> {
        let plugin = self.lock().remove(name)?;
        plugin.terminated();
        Some(plugin)
    }

    /// Terminate and remove every plugin (host shutdown).
    pub fn terminate_all(&self) {
        let drained: Vec<_> = self.lock().drain().map(|(_, p)| p).collect();
        for plugin in drained {
            plugin.terminated();
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<Plugin>>> {
        self.plugins
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Listener;
    use crate::plugin::PluginState;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingManager {
        created: AtomicUsize,
    }

    impl ChannelManager for CountingManager {
        fn create_listener(&self, _: &str, _: u32, _: Arc<Listener>) -> Result<()> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_entry_reuses_existing_plugin() {
        let registry = PluginRegistry::new();
        let built = AtomicUsize::new(0);

        let make = || {
            built.fetch_add(1, Ordering::SeqCst);
            Plugin::builder().build()
        };
        let first = registry.entry("tsmf", make).unwrap();
        let second = registry
            .entry("tsmf", || {
                built.fetch_add(1, Ordering::SeqCst);
                Plugin::builder().build()
            })
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_entry_rejects_name_mismatch() {
        let registry = PluginRegistry::new();
        let result = registry.entry("tsmf", || Plugin::builder().name("other").build());
        assert!(result.is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_duplicate_rejected() {
        let registry = PluginRegistry::new();
        registry.register_plugin(Plugin::builder().build()).unwrap();
        let result = registry.register_plugin(Plugin::builder().build());
        assert!(matches!(result, Err(TsmfError::AlreadyRegistered(name)) if name == "tsmf"));
    }

    #[test]
    fn test_double_registration_and_init_yields_one_listener() {
        let registry = PluginRegistry::new();
        let mgr = Arc::new(CountingManager::default());

        registry.entry("tsmf", || Plugin::builder().build()).unwrap();
        registry.entry("tsmf", || Plugin::builder().build()).unwrap();
        registry.initialize_all(mgr.clone()).unwrap();
        registry.initialize_all(mgr.clone()).unwrap();

        assert_eq!(mgr.created.load(Ordering::SeqCst), 1);
        assert_eq!(
            registry.get_plugin("tsmf").unwrap().state(),
            PluginState::Initialized
        );
    }

    #[test]
    fn test_terminate_removes_plugin() {
        let registry = PluginRegistry::new();
        let plugin = registry.entry("tsmf", || Plugin::builder().build()).unwrap();

        let removed = registry.terminate("tsmf").unwrap();
        assert!(Arc::ptr_eq(&plugin, &removed));
        assert_eq!(plugin.state(), PluginState::Terminated);
        assert!(registry.get_plugin("tsmf").is_none());
        assert!(registry.terminate("tsmf").is_none());
    }

    #[test]
    fn test_terminate_all() {
        let registry = PluginRegistry::new();
        let a = registry.entry("tsmf", || Plugin::builder().build()).unwrap();
        let b = registry
            .entry("video", || Plugin::builder().name("video").build())
            .unwrap();

        registry.terminate_all();

        assert!(registry.is_empty());
        assert_eq!(a.state(), PluginState::Terminated);
        assert_eq!(b.state(), PluginState::Terminated);
    }
}
