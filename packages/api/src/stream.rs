//! The `stream` facade (spec.md §4.2 "Contract"): `read_some`, `write_some`,
//! `read_headers`/`write_headers` (HTTP/3 only), `flush`, `shutdown`,
//! `close`.

use std::time::Duration;

use nexusq_core::connection::ConnectionState;
use nexusq_core::error::{Error, Http3Error, Result};
use nexusq_core::stream::{ShutdownHow, StreamWaiters, Waiter, WaiterSlot};
use nexusq_core::wire::{ConnectionId, Fields, StreamId};

use crate::connection::drive_until;
use crate::engine_handle::{Inner, Shared};

/// A move-only handle to one stream on one connection.
pub struct Stream {
    conn_id: ConnectionId,
    id: StreamId,
    shared: Shared,
}

impl Stream {
    pub(crate) fn new(conn_id: ConnectionId, id: StreamId, shared: Shared) -> Self {
        Stream { conn_id, id, shared }
    }

    #[must_use]
    pub fn id(&self) -> StreamId {
        self.id
    }

    /// Returns as soon as any byte is available, `Ok(0)` with
    /// [`Error::is_end_of_stream`] on orderly FIN, or `stream_reset` if the
    /// peer reset (spec.md §4.2 "I/O semantics"). At most one concurrent
    /// call per stream: a second call while one is outstanding fails with
    /// `device_or_resource_busy`.
    pub async fn read_some(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.check_open().await?;
        self.acquire_slot(|w| &mut w.read).await?;
        let conn_id = self.conn_id.clone();
        let stream_id = self.id.get();
        let result = drive_until(&self.shared, Duration::from_secs(60), move |inner| {
            match inner.engine.stream_recv(&conn_id, stream_id, buf) {
                Ok((0, false)) => None,
                Ok((n, _fin)) => Some(Ok(n)),
                Err(e) => Some(Err(e)),
            }
        })
        .await;
        self.release_slot(|w| &mut w.read).await;
        result
    }

    /// Returns once at least one byte is accepted by the transport's send
    /// buffer (spec.md §4.2 "I/O semantics"). Fails with `broken_pipe` once
    /// the local write half has already been shut down.
    pub async fn write_some(&mut self, buf: &[u8]) -> Result<usize> {
        self.check_open().await?;
        self.check_accepts_write().await?;
        self.acquire_slot(|w| &mut w.write).await?;
        let conn_id = self.conn_id.clone();
        let stream_id = self.id.get();
        let result = drive_until(&self.shared, Duration::from_secs(60), move |inner| {
            match inner.engine.stream_send(&conn_id, stream_id, buf, false) {
                Ok(0) if !buf.is_empty() => None,
                Ok(n) => Some(Ok(n)),
                Err(e) => Some(Err(e)),
            }
        })
        .await;
        self.release_slot(|w| &mut w.write).await;
        if matches!(result, Ok(n) if n > 0) {
            self.mark_body_started().await;
        }
        result
    }

    /// HTTP/3 only: suspends until the peer's header block is delivered by
    /// the engine, decodes it, and populates `fields` (spec.md §4.2
    /// "Headers (HTTP/3)"). Completes strictly before the first body byte
    /// surfaces through `read_some` (spec.md §5 "Ordering guarantees").
    pub async fn read_headers(&mut self, fields: &mut Fields) -> Result<()> {
        self.check_open().await?;
        self.acquire_slot(|w| &mut w.read_headers).await?;
        let conn_id = self.conn_id.clone();
        let stream_id = self.id.get();
        let mut buf = vec![0u8; 64 * 1024];
        let result = drive_until(&self.shared, Duration::from_secs(60), move |inner| {
            match inner.engine.stream_recv(&conn_id, stream_id, &mut buf) {
                Ok((0, false)) => None,
                Ok((n, _fin)) => Some(Ok(buf[..n].to_vec())),
                Err(e) => Some(Err(e)),
            }
        })
        .await;
        self.release_slot(|w| &mut w.read_headers).await;
        let bytes = result?;

        let mut table = nexusq_core::hpack::DynamicTable::default();
        let mut input: &[u8] = &bytes;
        while !input.is_empty() {
            let field = nexusq_core::hpack::header::decode(&mut input, &mut table).map_err(Error::Hpack)?;
            fields.insert(field.name, field.value);
        }
        Ok(())
    }

    /// HTTP/3 only: encodes `fields` via the QUIC state machine and
    /// suspends until accepted. Fails with `protocol_error` if body bytes
    /// have already been written (spec.md §4.2 "Headers (HTTP/3)").
    pub async fn write_headers(&mut self, fields: &Fields) -> Result<()> {
        self.check_open().await?;
        self.check_headers_not_started().await?;
        self.acquire_slot(|w| &mut w.write_headers).await?;

        let mut encoded = Vec::new();
        let mut table = nexusq_core::hpack::DynamicTable::default();
        for field in fields.iter() {
            let indexing = match field.index {
                nexusq_core::wire::IndexHint::Default => nexusq_core::hpack::Indexing::Incremental,
                nexusq_core::wire::IndexHint::Never => nexusq_core::hpack::Indexing::NeverIndexed,
            };
            let header =
                nexusq_core::hpack::HeaderField { name: field.name.clone(), value: field.value.clone() };
            nexusq_core::hpack::header::encode(&header, indexing, &mut table, &mut encoded);
        }

        let conn_id = self.conn_id.clone();
        let stream_id = self.id.get();
        let result = drive_until(&self.shared, Duration::from_secs(60), move |inner| {
            match inner.engine.stream_send(&conn_id, stream_id, &encoded, false) {
                Ok(0) if !encoded.is_empty() => None,
                Ok(_) => Some(Ok(())),
                Err(e) => Some(Err(e)),
            }
        })
        .await;
        self.release_slot(|w| &mut w.write_headers).await;
        result
    }

    /// Forces whatever is already queued for this stream's connection out
    /// to the socket now, instead of waiting for the next scheduled engine
    /// tick (`stream_flush`, spec.md §4.2 "Contract").
    pub async fn flush(&mut self) -> Result<()> {
        self.check_open().await?;
        let mut inner = self.shared.lock().await;
        inner.tick().map_err(|_| Error::OperationAborted)
    }

    /// `shutdown(write)` sends FIN; `shutdown(both)` sends FIN+STOP_SENDING
    /// (spec.md §4.2 "Lifecycle").
    pub async fn shutdown(&mut self, how: ShutdownHow) -> Result<()> {
        let mut inner = self.shared.lock().await;
        inner.engine.stream_shutdown_write(&self.conn_id, self.id.get())?;
        if let Some(ConnectionState::Open(open)) = inner.connections.get_mut(&self.conn_id) {
            for table in open.streams.all_tables_mut() {
                if let Some(s) = table.get_mut(&self.id) {
                    s.shutdown(how);
                    break;
                }
            }
        }
        Ok(())
    }

    /// Forces a local reset if the stream is not yet closed (spec.md §4.2
    /// "Lifecycle").
    pub async fn close(&mut self) {
        let mut inner = self.shared.lock().await;
        let reset_code = nexusq_core::error::QuicStreamError::Reset as u64;
        let _ = inner.engine.stream_reset(&self.conn_id, self.id.get(), reset_code);
        if let Some(ConnectionState::Open(open)) = inner.connections.get_mut(&self.conn_id) {
            for table in open.streams.all_tables_mut() {
                if let Some(s) = table.get_mut(&self.id) {
                    s.close();
                    break;
                }
            }
        }
    }

    /// Rejects the call up front if the owning connection isn't `open`.
    async fn check_open(&self) -> Result<()> {
        let inner = self.shared.lock().await;
        match inner.connections.get(&self.conn_id) {
            Some(ConnectionState::Open(_)) => Ok(()),
            Some(ConnectionState::Error { ec }) => Err(ec.clone()),
            _ => Err(Error::OperationAborted),
        }
    }

    /// `broken_pipe` once the local write half has already been shut down
    /// (spec.md §4.2 "I/O semantics").
    async fn check_accepts_write(&self) -> Result<()> {
        let mut inner = self.shared.lock().await;
        match find_stream(&mut inner, &self.conn_id, self.id) {
            Some(stream) => stream.check_accepts_write(),
            None => Err(Error::OperationAborted),
        }
    }

    /// `protocol_error` once the first body byte has been accepted (spec.md
    /// §4.2 "Headers (HTTP/3)").
    async fn check_headers_not_started(&self) -> Result<()> {
        let mut inner = self.shared.lock().await;
        match find_stream(&mut inner, &self.conn_id, self.id) {
            Some(stream) if stream.body_started => Err(Error::Http3(Http3Error::GeneralProtocolError)),
            _ => Ok(()),
        }
    }

    async fn mark_body_started(&self) {
        let mut inner = self.shared.lock().await;
        if let Some(stream) = find_stream(&mut inner, &self.conn_id, self.id) {
            stream.body_started = true;
        }
    }

    /// Installs a waiter in `slot`, failing with `device_or_resource_busy`
    /// if one is already pending (spec.md §4.2 "Contract", concurrency
    /// rule). `drive_until` polls the engine state directly rather than
    /// awaiting the waiter's own completion, so the waiter carries no
    /// payload here — it only occupies the slot for the call's duration.
    async fn acquire_slot<T>(&self, slot: impl Fn(&mut StreamWaiters) -> &mut WaiterSlot<T>) -> Result<()> {
        let mut inner = self.shared.lock().await;
        let stream = find_stream(&mut inner, &self.conn_id, self.id).ok_or(Error::OperationAborted)?;
        let (waiter, _rx) = Waiter::<T>::new_async();
        slot(&mut stream.waiters).set(waiter)
    }

    async fn release_slot<T>(&self, slot: impl Fn(&mut StreamWaiters) -> &mut WaiterSlot<T>) {
        let mut inner = self.shared.lock().await;
        if let Some(stream) = find_stream(&mut inner, &self.conn_id, self.id) {
            slot(&mut stream.waiters).cancel();
        }
    }
}

/// Locates a stream across whichever of the connection's five tables
/// currently holds it (spec.md §3 invariant a: "every stream pointer
/// appears in exactly one table").
fn find_stream<'a>(
    inner: &'a mut Inner,
    conn_id: &ConnectionId,
    stream_id: StreamId,
) -> Option<&'a mut nexusq_core::stream::Stream> {
    if let Some(ConnectionState::Open(open)) = inner.connections.get_mut(conn_id) {
        for table in open.streams.all_tables_mut() {
            if let Some(s) = table.get_mut(&stream_id) {
                return Some(s);
            }
        }
    }
    None
}
