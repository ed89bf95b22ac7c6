//! HPACK decode error conditions, per spec.md §7 "HPACK".
//!
//! Grounded on `original_source/include/nexus/http2/detail/hpack/error.hpp`.

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum HpackError {
    #[error("hpack: invalid index")]
    DecodeInvalidIndex,
    #[error("hpack: integer overflow while decoding")]
    DecodeIntegerOverflow,
    #[error("hpack: truncated input")]
    DecodeTruncated,
    #[error("hpack: exceeded max header list size")]
    ExceededMaxHeaderListSize,
    /// Huffman-coded strings are not implemented (spec.md §9 design notes);
    /// the core rejects them on decode rather than silently miscoding them.
    #[error("hpack: huffman coding is not supported")]
    HuffmanNotSupported,
}
