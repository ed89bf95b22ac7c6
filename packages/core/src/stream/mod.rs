//! Per-stream state, buffers, and the waiter protocol (spec.md §4.2, §3
//! "Stream buffer"/"Stream state").

pub mod buffer;
pub mod state;
pub mod waiter;

pub use buffer::{BufferPool, PoolExhausted, StreamBuffer};
pub use state::{FlowControlWindow, Lifecycle, ShutdownHow, Stream, StreamWaiters};
pub use waiter::{SyncWait, Waiter, WaiterSlot};
