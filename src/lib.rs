//! # tsmf-channel
//!
//! Dispatch core for the TSMF (MS-RDPEV) multimedia-redirection virtual
//! channel.
//!
//! The crate decodes framed requests arriving on a virtual channel, routes
//! them by `(InterfaceId, FunctionId)` to a [`MediaHandler`], and writes the
//! correlated reply (or none, where the protocol defines none).
//!
//! ## Architecture
//!
//! - **Protocol**: 12-byte request header, 8-byte reply header, all LE
//! - **Dispatch**: static routing table, fallback for unrouted requests
//! - **Lifecycle**: [`PluginRegistry`] → [`Plugin`] → [`Listener`] → [`ChannelCallback`]
//! - **Transport**: optional tokio stream host ([`transport`])
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tsmf_channel::{Plugin, PluginRegistry, PLUGIN_NAME};
//!
//! let registry = PluginRegistry::new();
//! let plugin = registry.entry(PLUGIN_NAME, || {
//!     Plugin::builder().handler(Arc::new(MyMediaHandler::new())).build()
//! })?;
//! plugin.initialize(channel_manager)?;
//! ```

pub mod channel;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod transport;

mod plugin;
mod registry;

pub use channel::{ChannelCallback, ChannelManager, Listener, VirtualChannel};
pub use config::{PluginConfig, CHANNEL_NAME, PLUGIN_NAME};
pub use dispatch::{DispatchOutcome, InvocationContext, MediaHandler};
pub use error::{Result, TsmfError};
pub use plugin::{Plugin, PluginBuilder, PluginState};
pub use registry::PluginRegistry;
