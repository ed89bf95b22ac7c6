//! Wire codecs (spec.md §4.1).
//!
//! Every codec in this module follows the same three-operation convention
//! as `original_source/include/nexus/detail/encoding/*.hpp`: `encoded_size`,
//! `encode`, `decode`. The C++ original expresses this with free functions
//! overloaded per encoder/decoder type operating on buffer iterators; Rust
//! expresses the same shape with the [`Encode`]/[`Decode`] traits operating
//! on `Vec<u8>` output and `&mut &[u8]` input (a shrinking slice plays the
//! role of the original's `(iterator, remaining)` pair — `remaining` is just
//! `input.len()`).
//!
//! `decode` returns `Err(Truncated)` exactly where the original returns
//! `false`: not enough bytes remained. [`encode2`](encode_checked) plays the
//! role of the original's `encode2`, which raises if the predicted length
//! disagrees with what was actually written (spec.md §8 invariant 2).

pub mod array;
pub mod base64url;
pub mod frame_header;
pub mod length_prefix;
pub mod network_order;
pub mod priority;
pub mod settings;
pub mod string;
pub mod transport_parameters;
pub mod varint;

pub use array::{decode_array, encode_array};
pub use frame_header::FrameHeader;
pub use priority::Http2Priority;
pub use settings::{SettingIdentifier, SettingValues};
pub use transport_parameters::{TransportParameterSet, TransportParameters};
pub use varint::VarInt;

/// Not enough bytes remained to decode a value (spec.md §4.1: "decode ...
/// returns false on truncation/overflow").
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("truncated input")]
pub struct Truncated;

pub type DecodeResult<T> = Result<T, Truncated>;

/// A value that can be written to the wire.
pub trait Encode {
    /// The exact number of bytes [`Encode::encode`] will write.
    fn encoded_size(&self) -> usize;
    /// Append this value's wire representation to `out`.
    fn encode(&self, out: &mut Vec<u8>);
}

/// A value that can be read from the wire.
///
/// `input` is advanced past the consumed bytes on success; on failure its
/// position is unspecified (callers should not assume partial progress).
pub trait Decode: Sized {
    fn decode(input: &mut &[u8]) -> DecodeResult<Self>;
}

/// Equivalent of `nexus::detail::encode2`: encodes `value`, and panics if
/// the number of bytes actually written disagrees with `encoded_size()`.
/// Spec.md §8 invariant 2 treats this mismatch as a bug, not a recoverable
/// runtime error — "a mismatch is a bug, not a runtime error to recover
/// from" — so this mirrors the original's `throw` with a Rust `panic!`.
pub fn encode_checked<T: Encode>(value: &T, out: &mut Vec<u8>) {
    let predicted = value.encoded_size();
    let start = out.len();
    value.encode(out);
    let written = out.len() - start;
    assert_eq!(
        written, predicted,
        "encoded_size() predicted {predicted} bytes but encode() wrote {written}"
    );
}

#[cfg(test)]
pub(crate) fn encode_to_vec<T: Encode>(value: &T) -> Vec<u8> {
    let mut out = Vec::new();
    encode_checked(value, &mut out);
    out
}
