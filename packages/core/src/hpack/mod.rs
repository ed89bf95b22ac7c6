//! HPACK header compression (RFC 7541), per spec.md §4.1 "HPACK integer/
//! string/header encoding with static+dynamic table".
//!
//! Grounded on `original_source/include/http2/detail/hpack/` and
//! `include/nexus/http2/hpack/`. Huffman coding is out of scope (see
//! [`string`] and [`crate::error::HpackError::HuffmanNotSupported`]).

pub mod dynamic_table;
pub mod header;
pub mod integer;
pub mod static_table;
pub mod string;

pub use dynamic_table::DynamicTable;
pub use header::{HeaderField, Indexing};
