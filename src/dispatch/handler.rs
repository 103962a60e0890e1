//! Media handler seam.
//!
//! Leaf protocol functions (capability exchange, presentation and stream
//! setup, samples, geometry, volume) live behind [`MediaHandler`]. Every
//! method defaults to [`HandlerError::Unimplemented`], which the dispatcher
//! answers with the fallback policy, so implementors only override what
//! they support.

use thiserror::Error;

use super::InvocationContext;

/// Failure reported by a leaf handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler does not implement this operation.
    #[error("operation not implemented")]
    Unimplemented,

    /// The request payload could not be parsed.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The handler failed while processing a well-formed request.
    #[error("handler failed: {0}")]
    Failed(String),
}

/// Result type for handler functions.
pub type HandlerResult = std::result::Result<(), HandlerError>;

/// Leaf protocol handlers, one method per routed operation.
///
/// Handlers run synchronously on the host's delivery thread and must return
/// before the reply is encoded.
pub trait MediaHandler: Send + Sync {
    fn rim_exchange_capability_request(&self, _ctx: &mut InvocationContext<'_>) -> HandlerResult {
        Err(HandlerError::Unimplemented)
    }

    fn set_channel_params(&self, _ctx: &mut InvocationContext<'_>) -> HandlerResult {
        Err(HandlerError::Unimplemented)
    }

    fn exchange_capability_request(&self, _ctx: &mut InvocationContext<'_>) -> HandlerResult {
        Err(HandlerError::Unimplemented)
    }

    fn check_format_support_request(&self, _ctx: &mut InvocationContext<'_>) -> HandlerResult {
        Err(HandlerError::Unimplemented)
    }

    fn on_new_presentation(&self, _ctx: &mut InvocationContext<'_>) -> HandlerResult {
        Err(HandlerError::Unimplemented)
    }

    fn add_stream(&self, _ctx: &mut InvocationContext<'_>) -> HandlerResult {
        Err(HandlerError::Unimplemented)
    }

    fn set_topology_request(&self, _ctx: &mut InvocationContext<'_>) -> HandlerResult {
        Err(HandlerError::Unimplemented)
    }

    fn remove_stream(&self, _ctx: &mut InvocationContext<'_>) -> HandlerResult {
        Err(HandlerError::Unimplemented)
    }

    fn shutdown_presentation(&self, _ctx: &mut InvocationContext<'_>) -> HandlerResult {
        Err(HandlerError::Unimplemented)
    }

    fn on_stream_volume(&self, _ctx: &mut InvocationContext<'_>) -> HandlerResult {
        Err(HandlerError::Unimplemented)
    }

    fn on_channel_volume(&self, _ctx: &mut InvocationContext<'_>) -> HandlerResult {
        Err(HandlerError::Unimplemented)
    }

    fn set_video_window(&self, _ctx: &mut InvocationContext<'_>) -> HandlerResult {
        Err(HandlerError::Unimplemented)
    }

    fn update_geometry_info(&self, _ctx: &mut InvocationContext<'_>) -> HandlerResult {
        Err(HandlerError::Unimplemented)
    }

    fn notify_preroll(&self, _ctx: &mut InvocationContext<'_>) -> HandlerResult {
        Err(HandlerError::Unimplemented)
    }

    fn on_sample(&self, _ctx: &mut InvocationContext<'_>) -> HandlerResult {
        Err(HandlerError::Unimplemented)
    }
}

/// Handler that implements nothing; every request takes the fallback path.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMediaHandler;

impl MediaHandler for NullMediaHandler {}

/// A routed leaf operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    RimExchangeCapabilityRequest,
    SetChannelParams,
    ExchangeCapabilityRequest,
    CheckFormatSupportRequest,
    OnNewPresentation,
    AddStream,
    SetTopologyRequest,
    RemoveStream,
    ShutdownPresentation,
    OnStreamVolume,
    OnChannelVolume,
    SetVideoWindow,
    UpdateGeometryInfo,
    NotifyPreroll,
    OnSample,
}

impl Operation {
    /// Call the matching handler method.
    pub fn invoke(
        self,
        handler: &dyn MediaHandler,
        ctx: &mut InvocationContext<'_>,
    ) -> HandlerResult {
        match self {
            Operation::RimExchangeCapabilityRequest => handler.rim_exchange_capability_request(ctx),
            Operation::SetChannelParams => handler.set_channel_params(ctx),
            Operation::ExchangeCapabilityRequest => handler.exchange_capability_request(ctx),
            Operation::CheckFormatSupportRequest => handler.check_format_support_request(ctx),
            Operation::OnNewPresentation => handler.on_new_presentation(ctx),
            Operation::AddStream => handler.add_stream(ctx),
            Operation::SetTopologyRequest => handler.set_topology_request(ctx),
            Operation::RemoveStream => handler.remove_stream(ctx),
            Operation::ShutdownPresentation => handler.shutdown_presentation(ctx),
            Operation::OnStreamVolume => handler.on_stream_volume(ctx),
            Operation::OnChannelVolume => handler.on_channel_volume(ctx),
            Operation::SetVideoWindow => handler.set_video_window(ctx),
            Operation::UpdateGeometryInfo => handler.update_geometry_info(ctx),
            Operation::NotifyPreroll => handler.notify_preroll(ctx),
            Operation::OnSample => handler.on_sample(ctx),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::RimExchangeCapabilityRequest => "rim_exchange_capability_request",
            Operation::SetChannelParams => "set_channel_params",
            Operation::ExchangeCapabilityRequest => "exchange_capability_request",
            Operation::CheckFormatSupportRequest => "check_format_support_request",
            Operation::OnNewPresentation => "on_new_presentation",
            Operation::AddStream => "add_stream",
            Operation::SetTopologyRequest => "set_topology_request",
            Operation::RemoveStream => "remove_stream",
            Operation::ShutdownPresentation => "shutdown_presentation",
            Operation::OnStreamVolume => "on_stream_volume",
            Operation::OnChannelVolume => "on_channel_volume",
            Operation::SetVideoWindow => "set_video_window",
            Operation::UpdateGeometryInfo => "update_geometry_info",
            Operation::NotifyPreroll => "notify_preroll",
            Operation::OnSample => "on_sample",
        }
    }
}
