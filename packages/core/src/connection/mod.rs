//! The connection state machine, per spec.md §4.3.

pub mod state;

pub use state::{ConnectionState, OpenConnection, StreamTables};
