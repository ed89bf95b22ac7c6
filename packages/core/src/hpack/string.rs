//! HPACK string literal representation (RFC 7541 §5.2): a 7-bit prefixed
//! length with a Huffman flag in the top bit. Grounded on
//! `original_source/include/nexus/http2/hpack/string.hpp` and
//! `include/http2/detail/hpack/string.hpp`.
//!
//! Huffman-coded strings are not implemented; decoding one is rejected with
//! [`HpackError::HuffmanNotSupported`] rather than silently miscoding it.

use super::integer;
use crate::error::HpackError;

const HUFFMAN_FLAG: u8 = 0x80;

/// Encodes `value` as a non-Huffman string literal.
pub fn encode(value: &str, out: &mut Vec<u8>) {
    integer::encode::<7>(value.len() as u64, 0, out);
    out.extend_from_slice(value.as_bytes());
}

/// Decodes a string literal, advancing `input` past the bytes consumed.
pub fn decode(input: &mut &[u8]) -> Result<String, HpackError> {
    let (len, flags) = integer::decode::<7>(input)?;
    if flags & HUFFMAN_FLAG != 0 {
        return Err(HpackError::HuffmanNotSupported);
    }
    let len = usize::try_from(len).map_err(|_| HpackError::DecodeIntegerOverflow)?;
    if input.len() < len {
        return Err(HpackError::DecodeTruncated);
    }
    let bytes = &input[..len];
    *input = &input[len..];
    String::from_utf8(bytes.to_vec()).map_err(|_| HpackError::DecodeTruncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_ooo_with_3_bit_length() {
        let mut out = Vec::new();
        encode("ooo", &mut out);
        assert_eq!(out, b"\x03ooo");
    }

    #[test]
    fn encodes_a_domain_name() {
        let mut out = Vec::new();
        encode("www.example.com", &mut out);
        assert_eq!(out[0], 0x0f);
        assert_eq!(&out[1..], b"www.example.com");
    }

    #[test]
    fn encode_empty_is_a_single_zero_byte() {
        let mut out = Vec::new();
        encode("", &mut out);
        assert_eq!(out, [0x00]);
    }

    #[test]
    fn round_trips() {
        let mut out = Vec::new();
        encode("hello, hpack", &mut out);
        let mut input: &[u8] = &out;
        assert_eq!(decode(&mut input).unwrap(), "hello, hpack");
        assert!(input.is_empty());
    }

    #[test]
    fn huffman_flag_is_rejected() {
        let bytes = [0x80 | 0x03, b'o', b'o', b'o'];
        let mut input: &[u8] = &bytes;
        assert_eq!(decode(&mut input), Err(HpackError::HuffmanNotSupported));
    }
}
