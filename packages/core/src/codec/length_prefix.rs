//! Length-prefixed byte strings, per spec.md §4.1: "`length_prefix` (fixed-
//! length or varint-prefixed)". Grounded on
//! `original_source/include/nexus/detail/encoding/length_prefix.hpp` and its
//! QUIC-specific instantiations in
//! `include/nexus/quic/detail/encoding/string.hpp` (`length_prefix_string_encoder`
//! for connection IDs, `varint_prefix_string_encoder` for tokens).

use super::network_order::NetworkOrder;
use super::varint::VarInt;
use super::{string, Decode, DecodeResult, Encode, Truncated};

/// A byte string prefixed by a fixed-width big-endian length
/// (used for [`crate::wire::ConnectionId`]: an 8-bit length prefix).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedPrefixed<const WIDTH: usize>(pub Vec<u8>);

impl<const WIDTH: usize> Encode for FixedPrefixed<WIDTH> {
    fn encoded_size(&self) -> usize {
        WIDTH + self.0.len()
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let len = NetworkOrder::<WIDTH>::new(self.0.len() as u64)
            .expect("length prefix width too small for data");
        len.encode(out);
        string::encode(&self.0, out);
    }
}

impl<const WIDTH: usize> Decode for FixedPrefixed<WIDTH> {
    fn decode(input: &mut &[u8]) -> DecodeResult<Self> {
        let len = NetworkOrder::<WIDTH>::decode(input)?;
        let bytes = string::decode(input, len.get() as usize)?;
        Ok(FixedPrefixed(bytes))
    }
}

/// A byte string prefixed by a QUIC varint length
/// (used for [`crate::wire::Token`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarintPrefixed(pub Vec<u8>);

impl Encode for VarintPrefixed {
    fn encoded_size(&self) -> usize {
        let len = VarInt::new(self.0.len() as u64).expect("token too large for varint length");
        len.encoded_size() + self.0.len()
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let len = VarInt::new(self.0.len() as u64).expect("token too large for varint length");
        len.encode(out);
        string::encode(&self.0, out);
    }
}

impl Decode for VarintPrefixed {
    fn decode(input: &mut &[u8]) -> DecodeResult<Self> {
        let len = VarInt::decode(input)?;
        let len: usize = usize::try_from(len.get()).map_err(|_| Truncated)?;
        let bytes = string::decode(input, len)?;
        Ok(VarintPrefixed(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_to_vec;

    #[test]
    fn fixed_prefixed_round_trip() {
        let v = FixedPrefixed::<1>(b"connid-1234".to_vec());
        let bytes = encode_to_vec(&v);
        assert_eq!(bytes[0] as usize, v.0.len());
        let mut input: &[u8] = &bytes;
        let decoded = FixedPrefixed::<1>::decode(&mut input).unwrap();
        assert_eq!(decoded, v);
        assert!(input.is_empty());
    }

    #[test]
    fn varint_prefixed_round_trip() {
        let v = VarintPrefixed(vec![0u8; 100]);
        let bytes = encode_to_vec(&v);
        let mut input: &[u8] = &bytes;
        let decoded = VarintPrefixed::decode(&mut input).unwrap();
        assert_eq!(decoded, v);
        assert!(input.is_empty());
    }
}
