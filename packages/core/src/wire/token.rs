//! QUIC retry/stateless-reset tokens, per spec.md §3 "tokens". Grounded on
//! `original_source/include/nexus/quic/detail/encoding/token.hpp`, which
//! instantiates `varint_prefix_string_encoder` — a varint length prefix,
//! per [`crate::codec::length_prefix::VarintPrefixed`].

use crate::codec::length_prefix::VarintPrefixed;
use crate::codec::{Decode, DecodeResult, Encode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token(Vec<u8>);

impl Token {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Token(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Encode for Token {
    fn encoded_size(&self) -> usize {
        VarintPrefixed(self.0.clone()).encoded_size()
    }

    fn encode(&self, out: &mut Vec<u8>) {
        VarintPrefixed(self.0.clone()).encode(out);
    }
}

impl Decode for Token {
    fn decode(input: &mut &[u8]) -> DecodeResult<Self> {
        Ok(Token(VarintPrefixed::decode(input)?.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_to_vec;

    #[test]
    fn round_trips() {
        let token = Token::new(vec![1, 2, 3, 4, 5]);
        let bytes = encode_to_vec(&token);
        let mut input: &[u8] = &bytes;
        assert_eq!(Token::decode(&mut input).unwrap(), token);
        assert!(input.is_empty());
    }

    #[test]
    fn empty_token_round_trips() {
        let token = Token::new(Vec::new());
        let bytes = encode_to_vec(&token);
        assert_eq!(bytes, [0x00]);
        let mut input: &[u8] = &bytes;
        assert_eq!(Token::decode(&mut input).unwrap(), token);
    }
}
