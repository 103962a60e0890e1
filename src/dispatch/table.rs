//! Dispatch table mapping (InterfaceId, FunctionId) to operations.
//!
//! The table is a closed set built once by [`DispatchTable::standard`] and
//! never modified afterwards. Keys match the combined InterfaceId exactly;
//! the stream-role flag is part of the key.
//!
//! # Example
//!
//! ```
//! use tsmf_channel::dispatch::{DispatchTable, Operation, Route};
//! use tsmf_channel::protocol::{function, interface, interface_id, stream_id};
//!
//! let table = DispatchTable::standard();
//! let proxy = interface_id(interface::TSMF_INTERFACE_DEFAULT, stream_id::STREAM_ID_PROXY);
//!
//! assert_eq!(table.route(proxy, function::ON_SAMPLE), Route::Handler(Operation::OnSample));
//! assert_eq!(table.route(proxy, 0xDEAD), Route::Unhandled);
//! ```

use std::collections::HashMap;

use super::Operation;
use crate::protocol::{function, interface, interface_id, stream_id};

/// Composite routing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub interface_id: u32,
    pub function_id: u32,
}

impl RouteKey {
    pub fn new(interface_id: u32, function_id: u32) -> Self {
        Self {
            interface_id,
            function_id,
        }
    }
}

/// Routing outcome for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// A leaf operation is bound to this pair.
    Handler(Operation),
    /// No operation is bound; the fallback policy applies.
    Unhandled,
}

/// Protocol-mandated answer for requests no handler processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Interface release: succeed, no reply.
    Release,
    /// Query interface: succeed with an empty reply (not supported).
    QueryInterface,
    /// Anything else: succeed with an empty reply and log a diagnostic.
    NotProcessed,
}

impl Fallback {
    /// Select the fallback for a FunctionId, regardless of interface.
    pub fn for_function(function_id: u32) -> Self {
        match function_id {
            function::RIMCALL_RELEASE => Fallback::Release,
            function::RIMCALL_QUERYINTERFACE => Fallback::QueryInterface,
            _ => Fallback::NotProcessed,
        }
    }

    #[inline]
    pub fn suppresses_reply(self) -> bool {
        matches!(self, Fallback::Release)
    }
}

/// Capabilities interface, no stream.
pub const CAPABILITIES_NONE: u32 = interface_id(
    interface::TSMF_INTERFACE_CAPABILITIES,
    stream_id::STREAM_ID_NONE,
);

/// Default interface, proxy stream.
pub const DEFAULT_PROXY: u32 =
    interface_id(interface::TSMF_INTERFACE_DEFAULT, stream_id::STREAM_ID_PROXY);

const STANDARD_ENTRIES: &[(u32, u32, Operation)] = &[
    (
        CAPABILITIES_NONE,
        function::RIM_EXCHANGE_CAPABILITY_REQUEST,
        Operation::RimExchangeCapabilityRequest,
    ),
    (DEFAULT_PROXY, function::SET_CHANNEL_PARAMS, Operation::SetChannelParams),
    (
        DEFAULT_PROXY,
        function::EXCHANGE_CAPABILITIES_REQ,
        Operation::ExchangeCapabilityRequest,
    ),
    (
        DEFAULT_PROXY,
        function::CHECK_FORMAT_SUPPORT_REQ,
        Operation::CheckFormatSupportRequest,
    ),
    (DEFAULT_PROXY, function::ON_NEW_PRESENTATION, Operation::OnNewPresentation),
    (DEFAULT_PROXY, function::ADD_STREAM, Operation::AddStream),
    (DEFAULT_PROXY, function::SET_TOPOLOGY_REQ, Operation::SetTopologyRequest),
    (DEFAULT_PROXY, function::REMOVE_STREAM, Operation::RemoveStream),
    (
        DEFAULT_PROXY,
        function::SHUTDOWN_PRESENTATION_REQ,
        Operation::ShutdownPresentation,
    ),
    (DEFAULT_PROXY, function::ON_STREAM_VOLUME, Operation::OnStreamVolume),
    (DEFAULT_PROXY, function::ON_CHANNEL_VOLUME, Operation::OnChannelVolume),
    (DEFAULT_PROXY, function::SET_VIDEO_WINDOW, Operation::SetVideoWindow),
    (DEFAULT_PROXY, function::UPDATE_GEOMETRY_INFO, Operation::UpdateGeometryInfo),
    (DEFAULT_PROXY, function::NOTIFY_PREROLL, Operation::NotifyPreroll),
    (DEFAULT_PROXY, function::ON_SAMPLE, Operation::OnSample),
];

/// Immutable (InterfaceId, FunctionId) to operation map.
#[derive(Debug, Clone)]
pub struct DispatchTable {
    routes: HashMap<RouteKey, Operation>,
}

impl DispatchTable {
    /// Build the table for the capabilities and default/proxy interfaces.
    pub fn standard() -> Self {
        let routes = STANDARD_ENTRIES
            .iter()
            .map(|&(iface, func, op)| (RouteKey::new(iface, func), op))
            .collect();
        Self { routes }
    }

    /// Resolve a request to an operation.
    pub fn route(&self, interface_id: u32, function_id: u32) -> Route {
        match self.routes.get(&RouteKey::new(interface_id, function_id)) {
            Some(&op) => Route::Handler(op),
            None => Route::Unhandled,
        }
    }

    pub fn contains(&self, interface_id: u32, function_id: u32) -> bool {
        self.routes
            .contains_key(&RouteKey::new(interface_id, function_id))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterate over all bound routes (unordered).
    pub fn iter(&self) -> impl Iterator<Item = (RouteKey, Operation)> + '_ {
        self.routes.iter().map(|(&key, &op)| (key, op))
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::standard()
    }
}
