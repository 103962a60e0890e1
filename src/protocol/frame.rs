//! Request view and reply frame building.
//!
//! A [`Request`] borrows its payload from the inbound buffer, so it cannot
//! outlive the buffer the host delivered.
//!
//! # Example
//!
//! ```
//! use tsmf_channel::protocol::{build_reply, ReplyHeader, Request, RequestHeader};
//!
//! let mut bytes = RequestHeader::new(2, 7, 0x100).encode().to_vec();
//! bytes.extend_from_slice(b"caps");
//!
//! let request = Request::parse(&bytes).unwrap();
//! assert_eq!(request.payload(), b"caps");
//!
//! let reply = build_reply(&request.header.reply(), b"ok");
//! assert_eq!(reply.len(), 8 + 2);
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::wire_format::{ReplyHeader, RequestHeader, REPLY_HEADER_SIZE, REQUEST_HEADER_SIZE};
use crate::error::Result;

/// An inbound request: decoded header plus a borrowed payload view.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    pub header: RequestHeader,
    payload: &'a [u8],
}

impl<'a> Request<'a> {
    /// Split an inbound message into header and payload.
    ///
    /// Fails with `MalformedMessage` when the message is shorter than the header.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let header = RequestHeader::decode(data)?;
        Ok(Self {
            header,
            payload: &data[REQUEST_HEADER_SIZE..],
        })
    }

    #[inline]
    pub fn payload(&self) -> &'a [u8] {
        self.payload
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
}

/// Build a reply frame: 8-byte header followed by the payload.
pub fn build_reply(header: &ReplyHeader, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(REPLY_HEADER_SIZE + payload.len());
    buf.put_slice(&header.encode());
    buf.put_slice(payload);
    buf.freeze()
}

/// Build a request frame. Peers use this; tests use it to drive dispatch.
pub fn build_request(header: &RequestHeader, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(REQUEST_HEADER_SIZE + payload.len());
    buf.put_slice(&header.encode());
    buf.put_slice(payload);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TsmfError;

    #[test]
    fn test_parse_splits_payload() {
        let bytes = build_request(&RequestHeader::new(0x4000_0000, 5, 0x103), b"sample");
        let request = Request::parse(&bytes).unwrap();

        assert_eq!(request.interface_id(), 0x4000_0000);
        assert_eq!(request.message_id(), 5);
        assert_eq!(request.function_id(), 0x103);
        assert_eq!(request.payload(), b"sample");
    }

    #[test]
    fn test_parse_header_only_has_empty_payload() {
        let bytes = RequestHeader::new(2, 1, 0x100).encode();
        let request = Request::parse(&bytes).unwrap();
        assert!(request.payload().is_empty());
    }

    #[test]
    fn test_parse_short_message() {
        let result = Request::parse(&[0u8; 9]);
        assert!(matches!(result, Err(TsmfError::MalformedMessage { len: 9 })));
    }

    #[test]
    fn test_payload_is_borrowed_not_copied() {
        let bytes = build_request(&RequestHeader::new(0, 1, 2), b"view");
        let request = Request::parse(&bytes).unwrap();
        assert_eq!(request.payload().as_ptr(), bytes[REQUEST_HEADER_SIZE..].as_ptr());
    }

    #[test]
    fn test_build_reply_empty_payload() {
        let reply = build_reply(&ReplyHeader::new(2, 7), &[]);
        assert_eq!(&reply[..], &[2, 0, 0, 0, 7, 0, 0, 0]);
    }

    #[test]
    fn test_build_reply_appends_payload() {
        let reply = build_reply(&ReplyHeader::new(2, 7), b"\x01\x02");
        assert_eq!(reply.len(), REPLY_HEADER_SIZE + 2);
        assert_eq!(&reply[REPLY_HEADER_SIZE..], b"\x01\x02");
    }
}
