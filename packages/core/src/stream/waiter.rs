//! The waiter protocol, per spec.md §5 "Scheduling model": "I/O operations
//! expose two flavors: synchronous (block the caller on a condition
//! variable owned by the waiter) and asynchronous (a completion handler
//! bound to a user-supplied executor). Both share the same waiter
//! representation; only the completion sink differs."
//!
//! There's no 1:1 grounding file for this in `original_source` (it builds
//! this on Boost.Asio's coroutine/completion-handler machinery); built here
//! on stock `tokio` primitives (`oneshot` for async completion, a
//! `Mutex`+`Notify` pair for the sync path) rather than the teacher's
//! `ystream`/`cyrup_sugars` stack, which assumes nightly `impl Trait` in
//! associated types this workspace doesn't require. See DESIGN.md.

use std::sync::{Arc, Mutex};

use tokio::sync::{oneshot, Notify};

use crate::error::{Error, Result};

/// The sync-path completion slot: a single `Result<T>` plus a `Notify` the
/// blocking side awaits (via `Notify::notified().await` on a dedicated
/// runtime, matching spec.md's "block the caller on a condition variable").
struct SyncSlot<T> {
    result: Mutex<Option<Result<T>>>,
    notify: Notify,
}

/// A handle the blocking caller holds to retrieve a sync waiter's result.
pub struct SyncWait<T> {
    slot: Arc<SyncSlot<T>>,
}

impl<T> SyncWait<T> {
    /// Blocks the current thread until the waiter completes.
    pub fn wait(self) -> Result<T> {
        loop {
            if let Some(result) = self.slot.result.lock().unwrap().take() {
                return result;
            }
            // The sync path runs on a thread without its own async
            // runtime; block_on drives just enough of `notify` to wake us.
            tokio::runtime::Handle::current().block_on(self.slot.notify.notified());
        }
    }
}

enum Sink<T> {
    Sync(Arc<SyncSlot<T>>),
    Async(oneshot::Sender<Result<T>>),
}

/// A suspended caller's completion slot, completed exactly once by the
/// engine (spec.md GLOSSARY "Waiter").
pub struct Waiter<T> {
    sink: Sink<T>,
}

impl<T> Waiter<T> {
    #[must_use]
    pub fn new_async() -> (Self, oneshot::Receiver<Result<T>>) {
        let (tx, rx) = oneshot::channel();
        (Waiter { sink: Sink::Async(tx) }, rx)
    }

    #[must_use]
    pub fn new_sync() -> (Self, SyncWait<T>) {
        let slot = Arc::new(SyncSlot { result: Mutex::new(None), notify: Notify::new() });
        (Waiter { sink: Sink::Sync(Arc::clone(&slot)) }, SyncWait { slot })
    }

    /// Completes the waiter exactly once. A dropped receiver (async path)
    /// or dropped `SyncWait` (sync path) is not an error: the caller simply
    /// isn't listening anymore.
    pub fn complete(self, result: Result<T>) {
        match self.sink {
            Sink::Sync(slot) => {
                *slot.result.lock().unwrap() = Some(result);
                slot.notify.notify_one();
            }
            Sink::Async(tx) => {
                let _ = tx.send(result);
            }
        }
    }
}

/// "At most one pending X waiter" (spec.md §3 "Stream state"): a slot that
/// rejects a second concurrent request with [`crate::error::QuicStreamError::Busy`].
pub struct WaiterSlot<T>(Option<Waiter<T>>);

impl<T> Default for WaiterSlot<T> {
    fn default() -> Self {
        WaiterSlot(None)
    }
}

impl<T> WaiterSlot<T> {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.0.is_some()
    }

    /// Installs `waiter`, failing with `Busy` if one is already pending
    /// (spec.md §4.2: "Violating this concurrency rule fails the second
    /// request with `device_or_resource_busy`").
    pub fn set(&mut self, waiter: Waiter<T>) -> Result<()> {
        if self.0.is_some() {
            return Err(Error::Stream(crate::error::QuicStreamError::Busy));
        }
        self.0 = Some(waiter);
        Ok(())
    }

    /// Takes and completes the pending waiter, if any.
    pub fn complete(&mut self, result: Result<T>) {
        if let Some(waiter) = self.0.take() {
            waiter.complete(result);
        }
    }

    /// Cancels the pending waiter with `operation_aborted`, if any
    /// (spec.md §5 "Cancellation").
    pub fn cancel(&mut self) {
        self.complete(Err(Error::OperationAborted));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn async_waiter_delivers_its_result() {
        let (waiter, rx) = Waiter::<u32>::new_async();
        waiter.complete(Ok(42));
        assert_eq!(rx.await.unwrap().unwrap(), 42);
    }

    #[tokio::test]
    async fn slot_rejects_a_second_concurrent_waiter() {
        let mut slot = WaiterSlot::<u32>::default();
        let (w1, _rx1) = Waiter::new_async();
        slot.set(w1).unwrap();
        assert!(slot.is_pending());

        let (w2, _rx2) = Waiter::new_async();
        let err = slot.set(w2).unwrap_err();
        assert!(err.is_busy());
    }

    #[tokio::test]
    async fn slot_completes_and_clears_the_pending_waiter() {
        let mut slot = WaiterSlot::<u32>::default();
        let (w, rx) = Waiter::new_async();
        slot.set(w).unwrap();
        slot.complete(Ok(7));
        assert!(!slot.is_pending());
        assert_eq!(rx.await.unwrap().unwrap(), 7);
    }

    #[tokio::test]
    async fn cancel_fails_the_waiter_with_operation_aborted() {
        let mut slot = WaiterSlot::<u32>::default();
        let (w, rx) = Waiter::new_async();
        slot.set(w).unwrap();
        slot.cancel();
        assert!(matches!(rx.await.unwrap(), Err(Error::OperationAborted)));
    }

    #[test]
    fn sync_waiter_delivers_its_result_without_blocking_forever() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (waiter, wait) = Waiter::<u32>::new_sync();
            waiter.complete(Ok(99));
            let value = tokio::task::spawn_blocking(move || wait.wait()).await.unwrap();
            assert_eq!(value.unwrap(), 99);
        });
    }
}
