//! Plugin and transport configuration.
//!
//! Every field has a default, so hosts only set what they change. The
//! configuration can also be read from JSON (addin arguments):
//!
//! ```
//! use tsmf_channel::config::PluginConfig;
//!
//! let config = PluginConfig::from_json(r#"{ "max_message_size": 4096 }"#).unwrap();
//! assert_eq!(config.channel_name, "TSMF");
//! assert_eq!(config.max_message_size, 4096);
//! ```

use serde::Deserialize;

use crate::error::Result;

/// Registry name of the plugin.
pub const PLUGIN_NAME: &str = "tsmf";

/// Channel name the listener is registered under.
pub const CHANNEL_NAME: &str = "TSMF";

/// Default maximum size of one inbound message on a stream transport (16 MB).
pub const DEFAULT_MAX_MESSAGE_SIZE: u32 = 16 * 1024 * 1024;

/// Default capacity of the reply queue.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Plugin configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Name the plugin is registered under with the host.
    pub plugin_name: String,
    /// Channel name passed to `create_listener`.
    pub channel_name: String,
    /// Flags passed to `create_listener`.
    pub listener_flags: u32,
    /// Largest inbound message accepted on a stream transport.
    pub max_message_size: u32,
    /// Reply writer settings for stream transports.
    pub writer: WriterConfig,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            plugin_name: PLUGIN_NAME.to_string(),
            channel_name: CHANNEL_NAME.to_string(),
            listener_flags: 0,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            writer: WriterConfig::default(),
        }
    }
}

impl PluginConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Configuration for the reply writer task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Queued replies before writes fail with backpressure.
    pub channel_capacity: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TsmfError;

    #[test]
    fn test_defaults() {
        let config = PluginConfig::default();
        assert_eq!(config.plugin_name, "tsmf");
        assert_eq!(config.channel_name, "TSMF");
        assert_eq!(config.listener_flags, 0);
        assert_eq!(config.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
        assert_eq!(config.writer.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(PluginConfig::from_json("{}").unwrap(), PluginConfig::default());
    }

    #[test]
    fn test_nested_writer_config() {
        let config =
            PluginConfig::from_json(r#"{ "channel_name": "TSMF2", "writer": { "channel_capacity": 8 } }"#)
                .unwrap();
        assert_eq!(config.channel_name, "TSMF2");
        assert_eq!(config.writer.channel_capacity, 8);
        assert_eq!(config.plugin_name, "tsmf");
    }

    #[test]
    fn test_invalid_json() {
        let result = PluginConfig::from_json("{ not json");
        assert!(matches!(result, Err(TsmfError::Config(_))));
    }
}
