//! Homogeneous sequence encoding, per spec.md §4.1 "`array`" and
//! `original_source/include/nexus/detail/encoding/array.hpp`.

use super::{Decode, DecodeResult, Encode};

#[must_use]
pub fn encoded_size<T: Encode>(items: &[T]) -> usize {
    items.iter().map(Encode::encoded_size).sum()
}

pub fn encode_array<T: Encode>(items: &[T], out: &mut Vec<u8>) {
    for item in items {
        item.encode(out);
    }
}

/// Decodes exactly `count` items.
pub fn decode_array<T: Decode>(input: &mut &[u8], count: usize) -> DecodeResult<Vec<T>> {
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(T::decode(input)?);
    }
    Ok(items)
}

/// Decodes items until the input is exhausted (used for HTTP/2 SETTINGS
/// frame payloads, which are a flat run of fixed-size entries with no count
/// prefix).
pub fn decode_array_until_empty<T: Decode>(input: &mut &[u8]) -> DecodeResult<Vec<T>> {
    let mut items = Vec::new();
    while !input.is_empty() {
        items.push(T::decode(input)?);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::varint::VarInt;

    #[test]
    fn round_trips_a_sequence_of_varints() {
        let items: Vec<VarInt> = [0u64, 100, 20000, 2_000_000_000]
            .into_iter()
            .map(|v| VarInt::new(v).unwrap())
            .collect();
        let mut out = Vec::new();
        encode_array(&items, &mut out);
        assert_eq!(out.len(), encoded_size(&items));

        let mut input: &[u8] = &out;
        let decoded: Vec<VarInt> = decode_array(&mut input, items.len()).unwrap();
        assert_eq!(decoded, items);
        assert!(input.is_empty());
    }

    #[test]
    fn decode_until_empty_consumes_everything() {
        let items: Vec<VarInt> = [1u64, 2, 3].into_iter().map(|v| VarInt::new(v).unwrap()).collect();
        let mut out = Vec::new();
        encode_array(&items, &mut out);
        let mut input: &[u8] = &out;
        let decoded: Vec<VarInt> = decode_array_until_empty(&mut input).unwrap();
        assert_eq!(decoded, items);
    }
}
