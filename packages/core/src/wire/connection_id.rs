//! QUIC connection ID, per spec.md §3 "connection IDs". Grounded on
//! `original_source/include/nexus/quic/detail/encoding/connection_id.hpp`,
//! which instantiates `length_prefix_string_encoder<uint8_t>` — an 8-bit
//! length prefix, per [`crate::codec::length_prefix::FixedPrefixed`].

use crate::codec::length_prefix::FixedPrefixed;
use crate::codec::{Decode, DecodeResult, Encode};

/// RFC 9000 bounds a connection ID to `0..=20` bytes.
pub const MAX_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(Vec<u8>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("connection id length {0} exceeds the maximum of {MAX_LEN}")]
pub struct ConnectionIdTooLong(pub usize);

impl ConnectionId {
    pub fn new(bytes: Vec<u8>) -> Result<Self, ConnectionIdTooLong> {
        if bytes.len() > MAX_LEN {
            return Err(ConnectionIdTooLong(bytes.len()));
        }
        Ok(ConnectionId(bytes))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Encode for ConnectionId {
    fn encoded_size(&self) -> usize {
        FixedPrefixed::<1>(self.0.clone()).encoded_size()
    }

    fn encode(&self, out: &mut Vec<u8>) {
        FixedPrefixed::<1>(self.0.clone()).encode(out);
    }
}

impl Decode for ConnectionId {
    fn decode(input: &mut &[u8]) -> DecodeResult<Self> {
        let bytes = FixedPrefixed::<1>::decode(input)?.0;
        Ok(ConnectionId(bytes))
    }
}
