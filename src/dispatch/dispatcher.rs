//! Request/response pipeline.
//!
//! For each inbound message:
//! 1. Decode the 12-byte header (short messages are dropped, no reply)
//! 2. Build an [`InvocationContext`] over the remaining payload
//! 3. Route through the [`DispatchTable`] and invoke the handler
//! 4. Apply the [`Fallback`] when nothing handled the request
//! 5. Encode and write the reply once, unless it is suppressed

use std::sync::Arc;

use tracing::{debug, error, warn};

use super::{DispatchTable, Fallback, HandlerError, InvocationContext, MediaHandler, Route};
use crate::channel::VirtualChannel;
use crate::error::Result;
use crate::protocol::{build_reply, ReplyHeader, Request};

/// What happened to a dispatched message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A reply of `len` bytes (header included) was written.
    Replied { len: usize },
    /// The protocol defines no reply for this request.
    Suppressed,
    /// The message was malformed and discarded.
    Dropped,
}

/// Routes decoded requests to a [`MediaHandler`] and writes replies.
#[derive(Clone)]
pub struct Dispatcher {
    table: Arc<DispatchTable>,
    handler: Arc<dyn MediaHandler>,
}

impl Dispatcher {
    pub fn new(table: Arc<DispatchTable>, handler: Arc<dyn MediaHandler>) -> Self {
        Self { table, handler }
    }

    /// Dispatcher over the standard table.
    pub fn with_handler(handler: Arc<dyn MediaHandler>) -> Self {
        Self::new(Arc::new(DispatchTable::standard()), handler)
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    /// Dispatch one inbound message and write its reply to `channel`.
    ///
    /// Only a failed reply write is returned as an error; malformed input,
    /// unrouted requests and handler failures all resolve locally.
    pub fn dispatch(&self, data: &[u8], channel: &dyn VirtualChannel) -> Result<DispatchOutcome> {
        let request = match Request::parse(data) {
            Ok(request) => request,
            Err(e) => {
                error!("Dropping inbound message: {}", e);
                return Ok(DispatchOutcome::Dropped);
            }
        };

        let header = request.header;
        debug!(
            size = data.len(),
            interface_id = header.interface_id,
            message_id = header.message_id,
            function_id = header.function_id,
            "Received request"
        );

        let mut ctx = InvocationContext::new(&header, request.payload());

        let handled = match self.table.route(header.interface_id, header.function_id) {
            Route::Handler(op) => match op.invoke(self.handler.as_ref(), &mut ctx) {
                Ok(()) => true,
                Err(HandlerError::Unimplemented) => false,
                Err(e) => {
                    warn!(
                        operation = op.name(),
                        message_id = header.message_id,
                        "Handler failed, answering with empty reply: {}",
                        e
                    );
                    false
                }
            },
            Route::Unhandled => false,
        };

        if !handled {
            ctx.reset();
            let fallback = Fallback::for_function(header.function_id);
            if fallback == Fallback::NotProcessed {
                warn!(
                    "InterfaceId {:#x} FunctionId {:#x} not processed",
                    header.interface_id, header.function_id
                );
            }
            if fallback.suppresses_reply() {
                ctx.suppress_reply();
            }
        }

        if ctx.is_reply_suppressed() {
            debug!(message_id = header.message_id, "Reply suppressed");
            return Ok(DispatchOutcome::Suppressed);
        }

        let reply_header = ReplyHeader::new(ctx.output_interface_id(), header.message_id);
        let reply = build_reply(&reply_header, &ctx.take_output());

        let len = reply.len();
        debug!(size = len, "Writing response");
        channel.write(reply).map_err(|e| {
            error!(message_id = header.message_id, "Response write failed: {}", e);
            e
        })?;

        Ok(DispatchOutcome::Replied { len })
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.table.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TsmfError;
    use crate::dispatch::{HandlerResult, NullMediaHandler};
    use crate::protocol::{
        build_request, function, interface_id, stream_id, ReplyHeader, RequestHeader,
        REPLY_HEADER_SIZE,
    };
    use bytes::Bytes;
    use std::sync::Mutex;

    const DEFAULT_PROXY: u32 = interface_id(0, stream_id::STREAM_ID_PROXY);

    #[derive(Default)]
    struct CaptureChannel {
        written: Mutex<Vec<Bytes>>,
        fail_with: Option<i32>,
    }

    impl VirtualChannel for CaptureChannel {
        fn write(&self, data: Bytes) -> Result<()> {
            if let Some(status) = self.fail_with {
                return Err(TsmfError::Transport { status });
            }
            self.written.lock().unwrap().push(data);
            Ok(())
        }
    }

    struct TestHandler;

    impl MediaHandler for TestHandler {
        fn on_sample(&self, ctx: &mut InvocationContext<'_>) -> HandlerResult {
            ctx.respond_raw(ctx.input());
            Ok(())
        }

        fn set_video_window(&self, ctx: &mut InvocationContext<'_>) -> HandlerResult {
            ctx.respond_raw(b"partial");
            Err(HandlerError::Failed("window gone".into()))
        }

        fn notify_preroll(&self, ctx: &mut InvocationContext<'_>) -> HandlerResult {
            ctx.suppress_reply();
            Ok(())
        }

        fn add_stream(&self, ctx: &mut InvocationContext<'_>) -> HandlerResult {
            ctx.set_output_interface_id(stream_id::STREAM_ID_STUB);
            Ok(())
        }
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::with_handler(Arc::new(TestHandler))
    }

    fn request(interface: u32, message_id: u32, func: u32, payload: &[u8]) -> Bytes {
        build_request(&RequestHeader::new(interface, message_id, func), payload)
    }

    #[test]
    fn test_handled_request_echoes_ids_and_output() {
        let channel = CaptureChannel::default();
        let outcome = dispatcher()
            .dispatch(&request(DEFAULT_PROXY, 11, function::ON_SAMPLE, b"abc"), &channel)
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::Replied { len: REPLY_HEADER_SIZE + 3 });
        let written = channel.written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(
            ReplyHeader::decode(&written[0]),
            Some(ReplyHeader::new(DEFAULT_PROXY, 11))
        );
        assert_eq!(&written[0][REPLY_HEADER_SIZE..], b"abc");
    }

    #[test]
    fn test_short_message_dropped() {
        let channel = CaptureChannel::default();
        for len in 0..12 {
            let data = vec![0xAA; len];
            let outcome = dispatcher().dispatch(&data, &channel).unwrap();
            assert_eq!(outcome, DispatchOutcome::Dropped);
        }
        assert!(channel.written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_handler_failure_answers_empty() {
        let channel = CaptureChannel::default();
        let outcome = dispatcher()
            .dispatch(&request(DEFAULT_PROXY, 3, function::SET_VIDEO_WINDOW, &[]), &channel)
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::Replied { len: REPLY_HEADER_SIZE });
        let written = channel.written.lock().unwrap();
        assert_eq!(written[0].len(), REPLY_HEADER_SIZE);
    }

    #[test]
    fn test_handler_can_suppress_reply() {
        let channel = CaptureChannel::default();
        let outcome = dispatcher()
            .dispatch(&request(DEFAULT_PROXY, 4, function::NOTIFY_PREROLL, &[]), &channel)
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::Suppressed);
        assert!(channel.written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_handler_can_override_reply_interface() {
        let channel = CaptureChannel::default();
        dispatcher()
            .dispatch(&request(DEFAULT_PROXY, 5, function::ADD_STREAM, &[]), &channel)
            .unwrap();

        let written = channel.written.lock().unwrap();
        let header = ReplyHeader::decode(&written[0]).unwrap();
        assert_eq!(header.interface_id, stream_id::STREAM_ID_STUB);
        assert_eq!(header.message_id, 5);
    }

    #[test]
    fn test_unimplemented_operation_takes_fallback() {
        let channel = CaptureChannel::default();
        let dispatcher = Dispatcher::with_handler(Arc::new(NullMediaHandler));
        let outcome = dispatcher
            .dispatch(&request(DEFAULT_PROXY, 6, function::ON_SAMPLE, b"x"), &channel)
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::Replied { len: REPLY_HEADER_SIZE });
    }

    #[test]
    fn test_release_suppressed_on_any_interface() {
        let channel = CaptureChannel::default();
        for iface in [0, 1, 2, DEFAULT_PROXY, 0x1234_5678] {
            let outcome = dispatcher()
                .dispatch(&request(iface, 1, function::RIMCALL_RELEASE, &[]), &channel)
                .unwrap();
            assert_eq!(outcome, DispatchOutcome::Suppressed);
        }
        assert!(channel.written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_transport_failure_returned() {
        let channel = CaptureChannel {
            fail_with: Some(7),
            ..Default::default()
        };
        let result = dispatcher().dispatch(
            &request(DEFAULT_PROXY, 1, function::RIMCALL_QUERYINTERFACE, &[]),
            &channel,
        );
        assert!(matches!(result, Err(TsmfError::Transport { status: 7 })));
    }
}
