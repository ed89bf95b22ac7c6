//! QUIC variable-length integer (RFC 9000 §16), per spec.md §4.1 "QUIC
//! varint" and `original_source/include/nexus/quic/detail/varint.hpp` +
//! `include/nexus/quic/detail/encoding/varint.hpp`.
//!
//! Length is encoded in the top two bits of the first byte: `00`->1 byte,
//! `01`->2 bytes, `10`->4 bytes, `11`->8 bytes; the remaining bits of the
//! first byte (and all of the following bytes) hold the value, big-endian,
//! with the length-prefix bits masked out.

use super::{Decode, DecodeResult, Encode, Truncated};

/// Maximum value representable in 62 bits (the 2 length-prefix bits come
/// out of the first byte's top bits, leaving 62 value bits across 8 bytes).
pub const VARINT_MAX: u64 = (1u64 << 62) - 1;

/// A QUIC variable-length integer in `0..=VARINT_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarInt(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("value {0} exceeds the 62-bit QUIC varint range")]
pub struct VarIntOutOfRange(pub u64);

impl VarInt {
    pub const ZERO: VarInt = VarInt(0);

    /// Validates `value` fits in 62 bits.
    pub fn new(value: u64) -> Result<Self, VarIntOutOfRange> {
        if value > VARINT_MAX {
            Err(VarIntOutOfRange(value))
        } else {
            Ok(VarInt(value))
        }
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }

    /// The wire length in bytes: 1, 2, 4, or 8, minimal for `self`'s value.
    #[must_use]
    pub fn length(self) -> u8 {
        varint_length(self.0)
    }
}

impl From<u8> for VarInt {
    fn from(v: u8) -> Self {
        VarInt(v as u64)
    }
}

impl From<u32> for VarInt {
    fn from(v: u32) -> Self {
        // every u32 fits in 62 bits
        VarInt(v as u64)
    }
}

impl TryFrom<u64> for VarInt {
    type Error = VarIntOutOfRange;
    fn try_from(value: u64) -> Result<Self, Self::Error> {
        VarInt::new(value)
    }
}

impl TryFrom<usize> for VarInt {
    type Error = VarIntOutOfRange;
    fn try_from(value: usize) -> Result<Self, Self::Error> {
        VarInt::new(value as u64)
    }
}

/// The minimal encoded length for `value`, one of `{1, 2, 4, 8}`
/// (spec.md §8 invariant 3).
#[must_use]
pub fn varint_length(value: u64) -> u8 {
    match value {
        0..=0x3f => 1,
        0x40..=0x3fff => 2,
        0x4000..=0x3fff_ffff => 4,
        _ => 8,
    }
}

const fn length_prefix_bits(length: u8) -> u8 {
    match length {
        1 => 0b00,
        2 => 0b01,
        4 => 0b10,
        _ => 0b11,
    }
}

impl Encode for VarInt {
    fn encoded_size(&self) -> usize {
        self.length() as usize
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let length = self.length();
        let prefix = length_prefix_bits(length);
        let shifted = (prefix as u64) << (8 * length as u64 - 2);
        let wire = shifted | self.0;
        out.extend_from_slice(&wire.to_be_bytes()[8 - length as usize..]);
    }
}

impl Decode for VarInt {
    fn decode(input: &mut &[u8]) -> DecodeResult<Self> {
        let first = *input.first().ok_or(Truncated)?;
        let length = match first >> 6 {
            0b00 => 1usize,
            0b01 => 2,
            0b10 => 4,
            _ => 8,
        };
        if input.len() < length {
            return Err(Truncated);
        }
        let mut buf = [0u8; 8];
        buf[8 - length..].copy_from_slice(&input[..length]);
        let mut value = u64::from_be_bytes(buf);
        let bits = 8 * length as u32 - 2;
        value &= (1u64 << bits) - 1;
        *input = &input[length..];
        Ok(VarInt(value))
    }
}
