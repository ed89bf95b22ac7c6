//! Per-stream state machine, per spec.md §3 "Stream state" and §4.2
//! "Lifecycle". Grounded on `original_source/include/nexus/quic/stream.hpp`'s
//! state enum, generalized to the `idle/open/half_closed_*/closed` plus
//! `reset_sent`/`reset_received` set spec.md names explicitly.

use crate::codec::priority::Http2Priority;
use crate::error::{Error, QuicStreamError, Result};
use crate::wire::StreamId;

use super::buffer::StreamBuffer;
use super::waiter::WaiterSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Idle,
    Open,
    HalfClosedLocal,
    HalfClosedRemote,
    Closed,
    ResetSent,
    ResetReceived,
}

impl Lifecycle {
    #[must_use]
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Closed | Self::ResetSent | Self::ResetReceived)
    }

    #[must_use]
    pub fn accepts_new_data(self) -> bool {
        // spec.md §3 invariant (b): "new data arriving in state `closed` or
        // `reset_received` is rejected with `stream_reset`".
        !matches!(self, Self::Closed | Self::ResetReceived)
    }

    /// Whether a local write is still admissible: false once the local
    /// write half has been shut down (spec.md §4.2 "I/O semantics": "writes
    /// after `shutdown(write)` fail with `broken_pipe`").
    #[must_use]
    pub fn accepts_new_writes(self) -> bool {
        !matches!(self, Self::HalfClosedLocal | Self::Closed | Self::ResetSent | Self::ResetReceived)
    }
}

/// A signed flow-control window, default 65535 (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowControlWindow(i64);

impl Default for FlowControlWindow {
    fn default() -> Self {
        FlowControlWindow(65_535)
    }
}

impl FlowControlWindow {
    #[must_use]
    pub fn new(initial: i64) -> Self {
        FlowControlWindow(initial)
    }

    #[must_use]
    pub fn available(self) -> i64 {
        self.0
    }

    pub fn consume(&mut self, n: i64) {
        self.0 -= n;
    }

    pub fn grant(&mut self, n: i64) {
        self.0 += n;
    }
}

/// Which way `shutdown` is applied (spec.md §4.2 contract).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownHow {
    Read,
    Write,
    Both,
}

/// A stream's pending waiters: "at most one pending read data-waiter, at
/// most one pending write data-waiter, at most one pending read-headers
/// waiter, at most one pending write-headers waiter, at most one pending
/// connect waiter, at most one pending accept waiter" (spec.md §3).
#[derive(Default)]
pub struct StreamWaiters {
    pub read: WaiterSlot<usize>,
    pub write: WaiterSlot<usize>,
    pub read_headers: WaiterSlot<crate::wire::Fields>,
    pub write_headers: WaiterSlot<()>,
    pub connect: WaiterSlot<()>,
    pub accept: WaiterSlot<()>,
}

impl StreamWaiters {
    /// Fails every pending waiter with `err` exactly once (spec.md §8
    /// invariant 6).
    pub fn fail_all(&mut self, err: Error) {
        self.read.complete(Err(err.clone()));
        self.write.complete(Err(err.clone()));
        self.read_headers.complete(Err(err.clone()));
        self.write_headers.complete(Err(err.clone()));
        self.connect.complete(Err(err.clone()));
        self.accept.complete(Err(err));
    }
}

pub struct Stream {
    pub id: StreamId,
    pub lifecycle: Lifecycle,
    pub inbound_window: FlowControlWindow,
    pub outbound_window: FlowControlWindow,
    pub priority: Http2Priority,
    pub waiters: StreamWaiters,
    pub read_buffer: Option<StreamBuffer>,
    pub write_buffer: Option<StreamBuffer>,
    /// Set once a FIN has been observed and all buffered bytes drained
    /// (spec.md §8 invariant 7: EOF is reported only at that point, never
    /// before).
    fin_delivered: bool,
    fin_pending: bool,
    /// Set once the first body byte has been accepted by `write_some`
    /// (spec.md §4.2 "Headers (HTTP/3)": "calling `write_headers` after the
    /// first byte of body data has been accepted fails with
    /// `protocol_error`").
    pub body_started: bool,
}

impl Stream {
    #[must_use]
    pub fn new(id: StreamId) -> Self {
        Stream {
            id,
            lifecycle: Lifecycle::Idle,
            inbound_window: FlowControlWindow::default(),
            outbound_window: FlowControlWindow::default(),
            priority: Http2Priority::new(false, 0, 16),
            waiters: StreamWaiters::default(),
            read_buffer: None,
            write_buffer: None,
            fin_delivered: false,
            fin_pending: false,
            body_started: false,
        }
    }

    /// Called by the engine when a peer FIN is observed; the stream still
    /// reports buffered bytes (if any) before surfacing `end_of_stream`.
    pub fn mark_peer_fin(&mut self) {
        self.fin_pending = true;
    }

    /// Whether the next read should return `end_of_stream`: a FIN was seen
    /// and there is no more buffered data to drain first.
    #[must_use]
    pub fn should_report_eof(&self, buffered_bytes_remaining: usize) -> bool {
        self.fin_pending && buffered_bytes_remaining == 0
    }

    pub fn mark_eof_delivered(&mut self) {
        self.fin_delivered = true;
        self.lifecycle = match self.lifecycle {
            Lifecycle::Open => Lifecycle::HalfClosedRemote,
            other => other,
        };
    }

    /// Rejects data arriving while the stream can't accept it (spec.md §3
    /// invariant b).
    pub fn check_accepts_data(&self) -> Result<()> {
        if self.lifecycle.accepts_new_data() {
            Ok(())
        } else {
            Err(Error::Stream(QuicStreamError::Reset))
        }
    }

    /// Rejects a write once the local write half is shut down (spec.md
    /// §4.2 "I/O semantics").
    pub fn check_accepts_write(&self) -> Result<()> {
        if self.lifecycle.accepts_new_writes() {
            Ok(())
        } else {
            Err(Error::Stream(QuicStreamError::BrokenPipe))
        }
    }

    pub fn shutdown(&mut self, how: ShutdownHow) {
        self.lifecycle = match (self.lifecycle, how) {
            (Lifecycle::Open, ShutdownHow::Write) => Lifecycle::HalfClosedLocal,
            (Lifecycle::Open, ShutdownHow::Both) => Lifecycle::Closed,
            (Lifecycle::HalfClosedRemote, ShutdownHow::Write) => Lifecycle::Closed,
            (other, ShutdownHow::Read) => other,
            (other, _) => other,
        };
    }

    /// `close()`: forces a local reset if the stream isn't already closed
    /// (spec.md §4.2).
    pub fn close(&mut self) {
        if !self.lifecycle.is_closed() {
            self.lifecycle = Lifecycle::ResetSent;
        }
        self.waiters.fail_all(Error::OperationAborted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(v: u64) -> StreamId {
        StreamId::new(v).unwrap()
    }

    #[test]
    fn new_stream_starts_idle_with_default_windows() {
        let s = Stream::new(id(0));
        assert_eq!(s.lifecycle, Lifecycle::Idle);
        assert_eq!(s.inbound_window.available(), 65_535);
        assert_eq!(s.outbound_window.available(), 65_535);
    }

    #[test]
    fn closed_and_reset_received_reject_new_data() {
        let mut s = Stream::new(id(0));
        s.lifecycle = Lifecycle::Closed;
        assert!(s.check_accepts_data().is_err());
        s.lifecycle = Lifecycle::ResetReceived;
        assert!(s.check_accepts_data().is_err());
        s.lifecycle = Lifecycle::Open;
        assert!(s.check_accepts_data().is_ok());
    }

    #[test]
    fn eof_is_reported_only_after_buffered_bytes_drain() {
        let mut s = Stream::new(id(0));
        s.mark_peer_fin();
        assert!(!s.should_report_eof(10));
        assert!(s.should_report_eof(0));
    }

    #[test]
    fn shutdown_write_moves_open_to_half_closed_local() {
        let mut s = Stream::new(id(0));
        s.lifecycle = Lifecycle::Open;
        s.shutdown(ShutdownHow::Write);
        assert_eq!(s.lifecycle, Lifecycle::HalfClosedLocal);
    }

    #[test]
    fn writes_after_shutdown_write_fail_with_broken_pipe() {
        let mut s = Stream::new(id(0));
        s.lifecycle = Lifecycle::Open;
        assert!(s.check_accepts_write().is_ok());
        s.shutdown(ShutdownHow::Write);
        let err = s.check_accepts_write().unwrap_err();
        assert!(err.is_broken_pipe());
    }

    #[test]
    fn shutdown_both_closes_directly() {
        let mut s = Stream::new(id(0));
        s.lifecycle = Lifecycle::Open;
        s.shutdown(ShutdownHow::Both);
        assert_eq!(s.lifecycle, Lifecycle::Closed);
    }

    #[test]
    fn close_on_an_open_stream_resets_and_fails_waiters_once() {
        let mut s = Stream::new(id(0));
        s.lifecycle = Lifecycle::Open;
        let (w, rx) = super::super::waiter::Waiter::new_async();
        s.waiters.read.set(w).unwrap();
        s.close();
        assert_eq!(s.lifecycle, Lifecycle::ResetSent);
        assert!(!s.waiters.read.is_pending());
        drop(rx);
    }
}
