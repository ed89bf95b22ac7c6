//! Raw byte-string encoding with an externally-supplied length, per
//! `original_source/include/nexus/detail/encoding/string.hpp`. This building
//! block carries no length prefix of its own — see [`super::length_prefix`]
//! for the composite that adds one.

use super::{DecodeResult, Truncated};

#[must_use]
pub fn encoded_size(bytes: &[u8]) -> usize {
    bytes.len()
}

pub fn encode(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(bytes);
}

/// Reads exactly `length` bytes.
pub fn decode(input: &mut &[u8], length: usize) -> DecodeResult<Vec<u8>> {
    if input.len() < length {
        return Err(Truncated);
    }
    let (head, tail) = input.split_at(length);
    let bytes = head.to_vec();
    *input = tail;
    Ok(bytes)
}
