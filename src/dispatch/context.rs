//! Invocation context for handlers.
//!
//! One context is built per inbound message. Handlers read the request
//! payload from it and leave their result in it:
//! - `respond` / `respond_raw` - set the reply payload
//! - `suppress_reply` - the protocol defines no reply for this message
//! - `set_output_interface_id` - answer on a different interface/stream role
//!
//! # Example
//!
//! ```
//! use tsmf_channel::dispatch::InvocationContext;
//! use tsmf_channel::protocol::RequestHeader;
//!
//! let header = RequestHeader::new(2, 7, 0x100);
//! let mut ctx = InvocationContext::new(&header, b"\x01\x00\x00\x00");
//! ctx.respond_raw(&[1, 0, 0, 0, 0, 0, 0, 0]);
//! assert_eq!(ctx.output().len(), 8);
//! ```

use bytes::Bytes;

use crate::protocol::RequestHeader;

/// Context passed to media handlers.
///
/// The input payload is borrowed from the inbound buffer for `'a`, which
/// ends when the dispatch call returns. Handlers that need the data later
/// must copy it.
#[derive(Debug)]
pub struct InvocationContext<'a> {
    /// Request header this context answers.
    header: RequestHeader,
    /// Payload after the 12-byte header.
    input: &'a [u8],
    /// Reply payload, `None` until a handler responds.
    output: Option<Bytes>,
    /// No reply will be written for this message.
    reply_suppressed: bool,
    /// InterfaceId written in the reply header.
    output_interface_id: u32,
}

impl<'a> InvocationContext<'a> {
    /// Create a context bound to the request's InterfaceId.
    pub fn new(header: &RequestHeader, input: &'a [u8]) -> Self {
        Self {
            header: *header,
            input,
            output: None,
            reply_suppressed: false,
            output_interface_id: header.interface_id,
        }
    }

    #[inline]
    pub fn input(&self) -> &'a [u8] {
        self.input
    }

    #[inline]
    pub fn interface_id(&self) -> u32 {
        self.header.interface_id
    }

    #[inline]
    pub fn message_id(&self) -> u32 {
        self.header.message_id
    }

    #[inline]
    pub fn function_id(&self) -> u32 {
        self.header.function_id
    }

    /// Set the reply payload. Replaces any earlier payload.
    pub fn respond(&mut self, payload: Bytes) {
        self.output = Some(payload);
    }

    /// Set the reply payload from a slice (copies).
    pub fn respond_raw(&mut self, payload: &[u8]) {
        self.output = Some(Bytes::copy_from_slice(payload));
    }

    /// Mark the message as having no reply.
    pub fn suppress_reply(&mut self) {
        self.reply_suppressed = true;
    }

    #[inline]
    pub fn is_reply_suppressed(&self) -> bool {
        self.reply_suppressed
    }

    /// Override the InterfaceId echoed in the reply header.
    pub fn set_output_interface_id(&mut self, interface_id: u32) {
        self.output_interface_id = interface_id;
    }

    #[inline]
    pub fn output_interface_id(&self) -> u32 {
        self.output_interface_id
    }

    /// Current reply payload (empty if none was set).
    pub fn output(&self) -> &[u8] {
        self.output.as_deref().unwrap_or(&[])
    }

    /// Move the reply payload out of the context.
    pub fn take_output(&mut self) -> Bytes {
        self.output.take().unwrap_or_default()
    }

    /// Drop everything a handler left behind, keeping the request binding.
    pub(crate) fn reset(&mut self) {
        self.output = None;
        self.reply_suppressed = false;
        self.output_interface_id = self.header.interface_id;
    }
}
