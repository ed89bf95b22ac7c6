//! The engine: the single serialization point driving the underlying QUIC
//! state machine (spec.md §4.4). Grounded on
//! `original_source/include/nexus/quic/detail/engine_impl.hpp`'s
//! `engine_impl` (mutex, executor, steady_timer, `lsquic_engine` handle,
//! `is_http` flag) generalized onto `quiche` as the external QUIC state
//! machine (spec.md §6 "External QUIC state machine contract").

pub mod callbacks;
pub mod timer;

pub use callbacks::EngineCallbacks;
pub use timer::EngineTimer;

use std::io;
use std::net::SocketAddr;
use std::pin::Pin;

use indexmap::IndexMap;

use crate::error::{Error, QuicConnectionError};
use crate::settings::Settings;
use crate::socket::{InDatagram, OutSpec, UdpSocket};
use crate::wire::ConnectionId;

const MAX_DATAGRAM_SIZE: usize = 1350;
const RECV_BATCH: usize = 64;

fn quiche_cid(id: &ConnectionId) -> quiche::ConnectionId<'static> {
    quiche::ConnectionId::from_vec(id.as_bytes().to_vec())
}

/// The engine: holds the executor-visible mutex-guarded state (the socket,
/// the per-connection quiche handles, the single timer) plus a flag for
/// whether it is driving HTTP/3 (spec.md §3 "Engine").
pub struct Engine {
    config: quiche::Config,
    connections: IndexMap<ConnectionId, quiche::Connection>,
    socket: UdpSocket,
    local_addr: SocketAddr,
    timer: Pin<Box<EngineTimer>>,
    /// Whether this engine is driving HTTP/3 atop QUIC, vs. bare transport.
    pub is_http: bool,
    backlog: usize,
}

impl Engine {
    /// Builds a `quiche::Config` from transport settings, the way
    /// `engine_impl`'s constructor wires `const settings*` into
    /// `lsquic_engine_settings`.
    fn build_config(settings: &Settings, is_http: bool) -> Result<quiche::Config, Error> {
        let mut config = quiche::Config::new(quiche::PROTOCOL_VERSION)
            .map_err(|_| Error::Global(crate::error::GlobalError::InitFailed))?;
        if is_http {
            config
                .set_application_protos(&[b"h3"])
                .map_err(|_| Error::Global(crate::error::GlobalError::InitFailed))?;
        }
        config.set_max_idle_timeout(settings.idle_timeout.as_millis() as u64);
        config.set_initial_max_data(settings.connection_flow_control_window.max(0) as u64);
        config.set_initial_max_stream_data_bidi_local(settings.incoming_stream_flow_control_window.max(0) as u64);
        config.set_initial_max_stream_data_bidi_remote(settings.outgoing_stream_flow_control_window.max(0) as u64);
        config.set_initial_max_streams_bidi(settings.max_streams_per_connection);
        config.set_initial_max_streams_uni(settings.max_streams_per_connection);
        Ok(config)
    }

    pub fn new_client(settings: &Settings) -> Result<Self, Error> {
        let socket = UdpSocket::bind_client("0.0.0.0:0".parse().unwrap())
            .map_err(|_| Error::Global(crate::error::GlobalError::InitFailed))?;
        let local_addr = "0.0.0.0:0".parse().unwrap();
        Ok(Engine {
            config: Self::build_config(settings, false)?,
            connections: IndexMap::new(),
            socket,
            local_addr,
            timer: Box::pin(EngineTimer::new()),
            is_http: false,
            backlog: 0,
        })
    }

    pub fn new_server(settings: &Settings, bind_addr: SocketAddr, backlog: usize) -> Result<Self, Error> {
        let socket =
            UdpSocket::bind_server(bind_addr).map_err(|_| Error::Global(crate::error::GlobalError::InitFailed))?;
        Ok(Engine {
            config: Self::build_config(settings, false)?,
            connections: IndexMap::new(),
            socket,
            local_addr: bind_addr,
            timer: Box::pin(EngineTimer::new()),
            is_http: false,
            backlog,
        })
    }

    /// `engine_impl::connect`: allocates a local connection id and issues
    /// `quiche::connect`.
    pub fn connect(&mut self, id: &ConnectionId, peer: SocketAddr, server_name: Option<&str>) -> Result<(), Error> {
        let scid = quiche_cid(id);
        let conn = quiche::connect(server_name, &scid, self.local_addr, peer, &mut self.config)
            .map_err(|_| Error::Connection(QuicConnectionError::HandshakeFailed))?;
        self.connections.insert(id.clone(), conn);
        Ok(())
    }

    /// `engine_impl::on_accept`: completes the QUIC-layer handshake setup
    /// for an incoming connection admitted past the backlog ring (spec.md
    /// §4.3 "Accept queue").
    fn accept_new(&mut self, id: &ConnectionId, peer: SocketAddr) -> Result<(), Error> {
        let scid = quiche_cid(id);
        let conn = quiche::accept(&scid, None, self.local_addr, peer, &mut self.config)
            .map_err(|_| Error::Connection(QuicConnectionError::HandshakeFailed))?;
        self.connections.insert(id.clone(), conn);
        Ok(())
    }

    /// One engine tick: ingest, dispatch callbacks, emit, reschedule
    /// (spec.md §4.4, the four engine responsibilities run back-to-back).
    pub fn process(&mut self, callbacks: &mut impl EngineCallbacks) -> io::Result<()> {
        self.ingest(callbacks)?;
        self.dispatch(callbacks);
        self.egress()?;
        self.reschedule();
        Ok(())
    }

    /// Drains up to `RECV_BATCH` datagrams and feeds each to the matching
    /// connection, admitting new connections subject to the backlog ring
    /// (spec.md §4.4 item 1).
    fn ingest(&mut self, callbacks: &mut impl EngineCallbacks) -> io::Result<()> {
        let datagrams = self.socket.recv_batch(RECV_BATCH)?;
        for datagram in datagrams {
            self.ingest_one(datagram, callbacks);
        }
        Ok(())
    }

    fn ingest_one(&mut self, datagram: InDatagram, callbacks: &mut impl EngineCallbacks) {
        let header = match quiche::Header::from_slice(&mut datagram.payload.clone(), quiche::MAX_CONN_ID_LEN) {
            Ok(h) => h,
            Err(_) => {
                tracing::warn!("dropped malformed datagram from {}", datagram.peer);
                return;
            }
        };
        let id = match ConnectionId::new(header.dcid.to_vec()) {
            Ok(id) => id,
            Err(_) => return,
        };

        if !self.connections.contains_key(&id) {
            if self.backlog > 0 && self.connections.len() >= self.backlog {
                tracing::warn!("incoming connection ring full, refusing handshake from {}", datagram.peer);
                return;
            }
            if self.accept_new(&id, datagram.peer).is_err() {
                return;
            }
            callbacks.on_new_connection(&id, datagram.peer);
        }

        let Some(conn) = self.connections.get_mut(&id) else { return };
        let recv_info = quiche::RecvInfo { from: datagram.peer, to: datagram.local.unwrap_or(self.local_addr) };
        let mut payload = datagram.payload;
        if conn.recv(&mut payload, recv_info).is_err() {
            tracing::warn!("recv() rejected datagram on connection {:?}", id);
        }
    }

    /// Walks every connection once, delivering the callbacks spec.md §4.4
    /// item 2 names (`on_handshake`, `on_new_stream`, `on_stream_read`,
    /// `on_stream_write`, `on_stream_close`, `on_conncloseframe`,
    /// `on_connection_close`).
    fn dispatch(&mut self, callbacks: &mut impl EngineCallbacks) {
        let mut closed = Vec::new();
        for (id, conn) in &mut self.connections {
            if conn.is_established() && !conn.is_closed() {
                callbacks.on_handshake(id, Ok(()));
            }

            for stream_id in conn.readable() {
                callbacks.on_stream_read(id, crate::wire::StreamId::new(stream_id).expect("valid stream id"));
            }
            for stream_id in conn.writable() {
                callbacks.on_stream_write(id, crate::wire::StreamId::new(stream_id).expect("valid stream id"));
            }

            if let Some(peer_err) = conn.peer_error() {
                callbacks.on_conncloseframe(id, peer_err.is_app, peer_err.error_code);
            }

            if conn.is_closed() {
                let result = match conn.peer_error() {
                    Some(e) if e.is_app => Err(Error::Http3(crate::error::Http3Error::from_code(e.error_code))),
                    Some(e) => match crate::error::TransportError::from_code(e.error_code) {
                        Some(t) => Err(Error::Transport(t)),
                        None => Err(Error::Connection(QuicConnectionError::Reset)),
                    },
                    None => Ok(()),
                };
                callbacks.on_connection_close(id, result);
                closed.push(id.clone());
            }
        }
        for id in closed {
            self.connections.shift_remove(&id);
        }
    }

    /// Collects one `out_spec` per connection with pending data and issues
    /// `send_packets` (spec.md §4.4 item 3, "Packet send path details").
    fn egress(&mut self) -> io::Result<()> {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let mut owned_specs: Vec<(SocketAddr, Vec<u8>)> = Vec::new();
        for conn in self.connections.values_mut() {
            loop {
                match conn.send(&mut buf) {
                    Ok((len, send_info)) => owned_specs.push((send_info.to, buf[..len].to_vec())),
                    Err(quiche::Error::Done) => break,
                    Err(_) => break,
                }
            }
        }
        let specs: Vec<OutSpec<'_>> = owned_specs
            .iter()
            .map(|(dest, payload)| OutSpec { destination: *dest, source: None, payload, ecn: 0 })
            .collect();
        if specs.is_empty() {
            return Ok(());
        }
        match self.socket.send_packets(&specs) {
            Ok(n) if (n as usize) < specs.len() => {
                tracing::debug!(sent = n, total = specs.len(), "partial sendmsg batch, retrying on next writable edge");
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Asks every connection for its next deadline and rearms the single
    /// timer to the earliest one, coalescing wake-ups (spec.md §4.4 item 4).
    fn reschedule(&mut self) {
        let next = self.connections.values().filter_map(quiche::Connection::timeout).min();
        self.timer.as_mut().rearm(next);
    }

    /// Fires every connection's `on_timeout`, then lets the next `process`
    /// call pick up any resulting egress (`engine_impl::on_timer`).
    pub fn on_timer(&mut self) {
        for conn in self.connections.values_mut() {
            conn.on_timeout();
        }
    }

    pub async fn wait_for_wake(&mut self) {
        self.timer.as_mut().wait().await;
    }

    pub async fn wait_readable(&self) -> io::Result<()> {
        self.socket.readable().await
    }

    /// Reads from a stream's receive buffer (the `stream_recv` primitive
    /// spec.md §6 expects of the external QUIC state machine). Returns the
    /// byte count and whether the peer's FIN has been reached.
    pub fn stream_recv(&mut self, conn: &ConnectionId, stream: u64, buf: &mut [u8]) -> Result<(usize, bool), Error> {
        let conn = self.connections.get_mut(conn).ok_or(Error::OperationAborted)?;
        match conn.stream_recv(stream, buf) {
            Ok(result) => Ok(result),
            Err(quiche::Error::Done) => Ok((0, false)),
            Err(quiche::Error::StreamReset(_)) => Err(Error::Stream(crate::error::QuicStreamError::Reset)),
            Err(_) => Err(Error::Connection(QuicConnectionError::Reset)),
        }
    }

    /// Writes to a stream's send buffer (`stream_send`).
    pub fn stream_send(&mut self, conn: &ConnectionId, stream: u64, buf: &[u8], fin: bool) -> Result<usize, Error> {
        let conn = self.connections.get_mut(conn).ok_or(Error::OperationAborted)?;
        match conn.stream_send(stream, buf, fin) {
            Ok(n) => Ok(n),
            Err(quiche::Error::Done) => Ok(0),
            Err(quiche::Error::StreamReset(_)) => Err(Error::Stream(crate::error::QuicStreamError::Reset)),
            Err(_) => Err(Error::Connection(QuicConnectionError::Reset)),
        }
    }

    /// Sends FIN (`shutdown(write)`) or a local reset (`shutdown(both)` /
    /// `close()`) on a stream (spec.md §4.2 "Lifecycle").
    pub fn stream_shutdown_write(&mut self, conn: &ConnectionId, stream: u64) -> Result<(), Error> {
        self.stream_send(conn, stream, &[], true).map(|_| ())
    }

    pub fn stream_reset(&mut self, conn: &ConnectionId, stream: u64, error_code: u64) -> Result<(), Error> {
        let conn = self.connections.get_mut(conn).ok_or(Error::OperationAborted)?;
        conn.stream_shutdown(stream, quiche::Shutdown::Write, error_code)
            .map_err(|_| Error::Connection(QuicConnectionError::Reset))
    }
}
