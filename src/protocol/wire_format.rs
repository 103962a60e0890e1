//! Wire format encoding and decoding.
//!
//! Request header (shared message header, 12 bytes):
//! ```text
//! ┌──────────────┬──────────────┬──────────────┐
//! │ InterfaceId  │ MessageId    │ FunctionId   │
//! │ uint32 LE    │ uint32 LE    │ uint32 LE    │
//! └──────────────┴──────────────┴──────────────┘
//! ```
//!
//! Reply header (8 bytes, no FunctionId):
//! ```text
//! ┌──────────────┬──────────────┐
//! │ InterfaceId  │ MessageId    │
//! │ uint32 LE    │ uint32 LE    │
//! └──────────────┴──────────────┘
//! ```
//!
//! All multi-byte integers are Little Endian.

use crate::error::{Result, TsmfError};

/// Request header size in bytes.
pub const REQUEST_HEADER_SIZE: usize = 12;

/// Reply header size in bytes.
pub const REPLY_HEADER_SIZE: usize = 8;

/// Base interface values.
pub mod interface {
    /// Default interface, carries the presentation/stream functions.
    pub const TSMF_INTERFACE_DEFAULT: u32 = 0x0000_0000;
    /// Client notifications interface (client to server only).
    pub const TSMF_INTERFACE_CLIENT_NOTIFICATIONS: u32 = 0x0000_0001;
    /// Capabilities negotiation interface.
    pub const TSMF_INTERFACE_CAPABILITIES: u32 = 0x0000_0002;
}

/// Stream-role flags OR'd into the InterfaceId.
pub mod stream_id {
    pub const STREAM_ID_NONE: u32 = 0x0000_0000;
    pub const STREAM_ID_PROXY: u32 = 0x4000_0000;
    pub const STREAM_ID_STUB: u32 = 0x8000_0000;
}

/// Function identifiers.
///
/// `RIMCALL_*` values are reserved on every interface; the rest are scoped
/// to the interface they are listed under.
pub mod function {
    pub const RIMCALL_RELEASE: u32 = 0x0000_0001;
    pub const RIMCALL_QUERYINTERFACE: u32 = 0x0000_0002;

    // Capabilities interface
    pub const RIM_EXCHANGE_CAPABILITY_REQUEST: u32 = 0x0000_0100;

    // Default interface
    pub const EXCHANGE_CAPABILITIES_REQ: u32 = 0x0000_0100;
    pub const SET_CHANNEL_PARAMS: u32 = 0x0000_0101;
    pub const ADD_STREAM: u32 = 0x0000_0102;
    pub const ON_SAMPLE: u32 = 0x0000_0103;
    pub const SET_VIDEO_WINDOW: u32 = 0x0000_0104;
    pub const ON_NEW_PRESENTATION: u32 = 0x0000_0105;
    pub const SHUTDOWN_PRESENTATION_REQ: u32 = 0x0000_0106;
    pub const SET_TOPOLOGY_REQ: u32 = 0x0000_0107;
    pub const CHECK_FORMAT_SUPPORT_REQ: u32 = 0x0000_0108;
    pub const ON_STREAM_VOLUME: u32 = 0x0000_010F;
    pub const ON_CHANNEL_VOLUME: u32 = 0x0000_0110;
    pub const NOTIFY_PREROLL: u32 = 0x0000_0113;
    pub const UPDATE_GEOMETRY_INFO: u32 = 0x0000_0114;
    pub const REMOVE_STREAM: u32 = 0x0000_0115;
}

/// Combine a base interface value with a stream-role flag.
#[inline]
pub const fn interface_id(base: u32, stream_flag: u32) -> u32 {
    base | stream_flag
}

#[inline]
fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

/// Decoded request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    /// Base interface OR'd with a stream-role flag.
    pub interface_id: u32,
    /// Correlation id, echoed in the reply.
    pub message_id: u32,
    /// Function scoped to the interface.
    pub function_id: u32,
}

impl RequestHeader {
    pub fn new(interface_id: u32, message_id: u32, function_id: u32) -> Self {
        Self {
            interface_id,
            message_id,
            function_id,
        }
    }

    /// Decode a request header from the first 12 bytes of `buf`.
    ///
    /// # Example
    ///
    /// ```
    /// use tsmf_channel::protocol::RequestHeader;
    ///
    /// let bytes = [2, 0, 0, 0, 7, 0, 0, 0, 0, 1, 0, 0];
    /// let header = RequestHeader::decode(&bytes).unwrap();
    /// assert_eq!(header.interface_id, 2);
    /// assert_eq!(header.message_id, 7);
    /// assert_eq!(header.function_id, 0x100);
    /// ```
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < REQUEST_HEADER_SIZE {
            return Err(TsmfError::MalformedMessage { len: buf.len() });
        }
        Ok(Self {
            interface_id: read_u32_le(buf, 0),
            message_id: read_u32_le(buf, 4),
            function_id: read_u32_le(buf, 8),
        })
    }

    /// Encode to bytes. Used by peers and tests; the dispatch core only decodes requests.
    pub fn encode(&self) -> [u8; REQUEST_HEADER_SIZE] {
        let mut buf = [0u8; REQUEST_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.interface_id.to_le_bytes());
        buf[4..8].copy_from_slice(&self.message_id.to_le_bytes());
        buf[8..12].copy_from_slice(&self.function_id.to_le_bytes());
        buf
    }

    /// Reply header correlated to this request.
    #[inline]
    pub fn reply(&self) -> ReplyHeader {
        ReplyHeader::new(self.interface_id, self.message_id)
    }
}

/// Reply header. Replies are correlated by MessageId, not by function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyHeader {
    pub interface_id: u32,
    pub message_id: u32,
}

impl ReplyHeader {
    pub fn new(interface_id: u32, message_id: u32) -> Self {
        Self {
            interface_id,
            message_id,
        }
    }

    /// Encode header to bytes (Little Endian).
    pub fn encode(&self) -> [u8; REPLY_HEADER_SIZE] {
        let mut buf = [0u8; REPLY_HEADER_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Encode header into an existing buffer.
    ///
    /// # Panics
    ///
    /// Panics if buffer is smaller than `REPLY_HEADER_SIZE` (8 bytes).
    pub fn encode_into(&self, buf: &mut [u8]) {
        buf[0..4].copy_from_slice(&self.interface_id.to_le_bytes());
        buf[4..8].copy_from_slice(&self.message_id.to_le_bytes());
    }

    /// Decode a reply header, `None` if the buffer is too short.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < REPLY_HEADER_SIZE {
            return None;
        }
        Some(Self {
            interface_id: read_u32_le(buf, 0),
            message_id: read_u32_le(buf, 4),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_header_little_endian_byte_order() {
        let bytes = [
            0x04, 0x03, 0x02, 0x01, // InterfaceId
            0x08, 0x07, 0x06, 0x05, // MessageId
            0x0C, 0x0B, 0x0A, 0x09, // FunctionId
        ];
        let header = RequestHeader::decode(&bytes).unwrap();
        assert_eq!(header.interface_id, 0x0102_0304);
        assert_eq!(header.message_id, 0x0506_0708);
        assert_eq!(header.function_id, 0x090A_0B0C);
    }

    #[test]
    fn test_request_header_ignores_trailing_payload() {
        let mut bytes = RequestHeader::new(1, 2, 3).encode().to_vec();
        bytes.extend_from_slice(b"payload");
        let header = RequestHeader::decode(&bytes).unwrap();
        assert_eq!(header, RequestHeader::new(1, 2, 3));
    }

    #[test]
    fn test_decode_every_short_length_is_malformed() {
        let buf = [0xFFu8; REQUEST_HEADER_SIZE];
        for len in 0..REQUEST_HEADER_SIZE {
            match RequestHeader::decode(&buf[..len]) {
                Err(TsmfError::MalformedMessage { len: reported }) => assert_eq!(reported, len),
                other => panic!("expected MalformedMessage for {} bytes, got {:?}", len, other),
            }
        }
    }

    #[test]
    fn test_reply_header_layout() {
        let header = ReplyHeader::new(0x4000_0000, 42);
        let bytes = header.encode();
        assert_eq!(bytes, [0x00, 0x00, 0x00, 0x40, 42, 0, 0, 0]);
        assert_eq!(ReplyHeader::decode(&bytes), Some(header));
        assert_eq!(ReplyHeader::decode(&bytes[..7]), None);
    }

    #[test]
    fn test_reply_drops_function_id() {
        let request = RequestHeader::new(0x4000_0000, 99, function::ON_SAMPLE);
        let reply = request.reply();
        assert_eq!(reply.interface_id, 0x4000_0000);
        assert_eq!(reply.message_id, 99);
        assert_eq!(reply.encode().len(), REPLY_HEADER_SIZE);
    }

    #[test]
    fn test_interface_id_combines_flags() {
        use interface::*;
        use stream_id::*;

        assert_eq!(interface_id(TSMF_INTERFACE_DEFAULT, STREAM_ID_PROXY), 0x4000_0000);
        assert_eq!(interface_id(TSMF_INTERFACE_CAPABILITIES, STREAM_ID_NONE), 0x0000_0002);
        assert_eq!(interface_id(TSMF_INTERFACE_DEFAULT, STREAM_ID_STUB), 0x8000_0000);
    }
}
