//! QUIC stream ID, per spec.md §3: "A 62-bit unsigned integer. Low bit 0 ⇒
//! client-initiated; low bit 1 ⇒ server-initiated; bit 1 distinguishes
//! bidirectional (0) from unidirectional (1)." Grounded on
//! `original_source/include/nexus/quic/stream_id.hpp`, extended here with
//! the bidi/uni bit RFC 9000 §2.1 defines alongside it.

use crate::codec::varint::{VarInt, VarIntOutOfRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamId(VarInt);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initiator {
    Client,
    Server,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directionality {
    Bidirectional,
    Unidirectional,
}

impl StreamId {
    pub fn new(value: u64) -> Result<Self, VarIntOutOfRange> {
        Ok(StreamId(VarInt::new(value)?))
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0.get()
    }

    #[must_use]
    pub fn initiator(self) -> Initiator {
        if self.get() & 0x1 == 0 {
            Initiator::Client
        } else {
            Initiator::Server
        }
    }

    #[must_use]
    pub fn is_client_initiated(self) -> bool {
        matches!(self.initiator(), Initiator::Client)
    }

    #[must_use]
    pub fn is_server_initiated(self) -> bool {
        matches!(self.initiator(), Initiator::Server)
    }

    #[must_use]
    pub fn directionality(self) -> Directionality {
        if self.get() & 0x2 == 0 {
            Directionality::Bidirectional
        } else {
            Directionality::Unidirectional
        }
    }

    #[must_use]
    pub fn is_bidirectional(self) -> bool {
        matches!(self.directionality(), Directionality::Bidirectional)
    }

    #[must_use]
    pub fn is_unidirectional(self) -> bool {
        matches!(self.directionality(), Directionality::Unidirectional)
    }
}

impl From<StreamId> for VarInt {
    fn from(id: StreamId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_all_four_combinations() {
        let client_bidi = StreamId::new(0).unwrap();
        let server_bidi = StreamId::new(1).unwrap();
        let client_uni = StreamId::new(2).unwrap();
        let server_uni = StreamId::new(3).unwrap();

        assert!(client_bidi.is_client_initiated() && client_bidi.is_bidirectional());
        assert!(server_bidi.is_server_initiated() && server_bidi.is_bidirectional());
        assert!(client_uni.is_client_initiated() && client_uni.is_unidirectional());
        assert!(server_uni.is_server_initiated() && server_uni.is_unidirectional());
    }

    #[test]
    fn classification_ignores_higher_bits() {
        let id = StreamId::new(400).unwrap();
        assert_eq!(id.get() & 0x3, 0);
        assert!(id.is_client_initiated());
        assert!(id.is_bidirectional());
    }
}
