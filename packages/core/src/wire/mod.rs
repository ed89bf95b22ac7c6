//! Wire-level protocol objects built atop the codecs: connection IDs,
//! tokens, stream IDs, and the HTTP fields collection (spec.md §3 "Wire
//! objects").

pub mod connection_id;
pub mod fields;
pub mod stream_id;
pub mod token;

pub use connection_id::ConnectionId;
pub use fields::{Field, Fields, IndexHint};
pub use stream_id::StreamId;
pub use token::Token;
