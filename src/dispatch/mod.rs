//! Dispatch module - routing requests to media handlers.
//!
//! Provides:
//! - [`InvocationContext`] - per-message input view and reply state
//! - [`MediaHandler`] - leaf protocol handler seam
//! - [`DispatchTable`] - (InterfaceId, FunctionId) to [`Operation`] map
//! - [`Dispatcher`] - decode, route, fall back, encode, write
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tsmf_channel::dispatch::{Dispatcher, HandlerResult, InvocationContext, MediaHandler};
//!
//! struct Player;
//!
//! impl MediaHandler for Player {
//!     fn on_sample(&self, ctx: &mut InvocationContext<'_>) -> HandlerResult {
//!         // decode ctx.input() ...
//!         Ok(())
//!     }
//! }
//!
//! let dispatcher = Dispatcher::with_handler(Arc::new(Player));
//! dispatcher.dispatch(&message, &channel)?;
//! ```

mod context;
mod dispatcher;
mod handler;
mod table;

pub use context::InvocationContext;
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use handler::{HandlerError, HandlerResult, MediaHandler, NullMediaHandler, Operation};
pub use table::{DispatchTable, Fallback, Route, RouteKey, CAPABILITIES_NONE, DEFAULT_PROXY};
