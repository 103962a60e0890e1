//! Protocol module - wire format and request/reply frames.
//!
//! - 12-byte request header / 8-byte reply header codec
//! - Interface, stream-role and function id constants
//! - [`Request`] view and reply builders

mod frame;
mod wire_format;

pub use frame::{build_reply, build_request, Request};
pub use wire_format::{
    function, interface, interface_id, stream_id, ReplyHeader, RequestHeader, REPLY_HEADER_SIZE,
    REQUEST_HEADER_SIZE,
};
