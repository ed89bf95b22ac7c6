//! UDP socket wrapper with ECN and destination-address control messages,
//! per spec.md §6 "UDP socket options"/"UDP send control messages" and
//! §4.4 "Packet send path details". Grounded on
//! `original_source/include/nexus/udp.hpp` (`receive_ecn`, `receive_dstaddr`
//! socket options) and `src/quic/socket.cc` (`prepare_socket`,
//! `send_udp_packets`'s `sendmsg`+cmsg pattern).

use std::collections::VecDeque;
use std::io;
use std::mem;
use std::net::SocketAddr;
use std::os::fd::{AsRawFd, RawFd};

use socket2::{Domain, Protocol, Socket, Type};
use tokio::io::unix::AsyncFd;

/// One outbound datagram description: destination, optional source (for a
/// DSTADDR control message), payload, and ECN codepoint (spec.md GLOSSARY
/// "Spec").
pub struct OutSpec<'a> {
    pub destination: SocketAddr,
    pub source: Option<SocketAddr>,
    pub payload: &'a [u8],
    pub ecn: u8,
}

/// One received datagram plus the ECN bits and destination address parsed
/// from its control messages.
#[derive(Debug, Clone)]
pub struct InDatagram {
    pub payload: Vec<u8>,
    pub peer: SocketAddr,
    pub local: Option<SocketAddr>,
    pub ecn: u8,
}

/// Per-datagram control message space: one `int` for ECN plus one
/// `in_pktinfo`/`in6_pktinfo` for destination address, each cmsg-aligned.
/// Mirrors `CMSG_SPACE` from `src/quic/socket.cc`, hand-rolled since `libc`
/// doesn't expose the C macros directly.
fn cmsg_align(len: usize) -> usize {
    let align = mem::size_of::<usize>();
    (len + align - 1) & !(align - 1)
}

fn cmsg_space(payload_len: usize) -> usize {
    cmsg_align(mem::size_of::<libc::cmsghdr>()) + cmsg_align(payload_len)
}

const MAX_CONTROL_LEN: usize = 128;

pub struct UdpSocket {
    io: AsyncFd<Socket>,
    fd: RawFd,
}

impl UdpSocket {
    /// Binds a server socket: non-blocking, ECN receive, destination
    /// address receive, `SO_REUSEADDR` (`prepare_socket(sock, is_server=true)`).
    pub fn bind_server(addr: SocketAddr) -> io::Result<Self> {
        let socket = Self::new_bound(addr)?;
        socket.set_option_ecn(true)?;
        socket.set_option_dstaddr(true)?;
        socket.as_socket2().set_reuse_address(true)?;
        Self::wrap(socket)
    }

    /// Binds a client socket: non-blocking + ECN only
    /// (`prepare_socket(sock, is_server=false)`).
    pub fn bind_client(addr: SocketAddr) -> io::Result<Self> {
        let socket = Self::new_bound(addr)?;
        socket.set_option_ecn(true)?;
        Self::wrap(socket)
    }

    fn new_bound(addr: SocketAddr) -> io::Result<Socket> {
        let domain = if addr.is_ipv6() { Domain::IPV6 } else { Domain::IPV4 };
        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_nonblocking(true)?;
        socket.bind(&addr.into())?;
        Ok(socket)
    }

    fn wrap(socket: Socket) -> io::Result<Self> {
        let fd = socket.as_raw_fd();
        Ok(UdpSocket { io: AsyncFd::new(socket)?, fd })
    }

    fn as_socket2(&self) -> &Socket {
        self.io.get_ref()
    }

    /// `IP_RECVTOS` / `IPV6_RECVTCLASS`.
    fn set_option_ecn(&self, enable: bool) -> io::Result<()> {
        let is_v6 = self.as_socket2().domain()? == Domain::IPV6;
        let value: libc::c_int = i32::from(enable);
        let (level, name) = if is_v6 {
            (libc::IPPROTO_IPV6, libc::IPV6_RECVTCLASS)
        } else {
            (libc::IPPROTO_IP, libc::IP_RECVTOS)
        };
        set_sockopt_int(self.fd, level, name, value)
    }

    /// `IP_RECVORIGDSTADDR` (falling back to `IP_PKTINFO` where the former
    /// isn't available) / `IPV6_RECVPKTINFO`.
    fn set_option_dstaddr(&self, enable: bool) -> io::Result<()> {
        let is_v6 = self.as_socket2().domain()? == Domain::IPV6;
        let value: libc::c_int = i32::from(enable);
        if is_v6 {
            set_sockopt_int(self.fd, libc::IPPROTO_IPV6, libc::IPV6_RECVPKTINFO, value)
        } else {
            #[cfg(target_os = "linux")]
            {
                set_sockopt_int(self.fd, libc::IPPROTO_IP, libc::IP_RECVORIGDSTADDR, value)
            }
            #[cfg(not(target_os = "linux"))]
            {
                set_sockopt_int(self.fd, libc::IPPROTO_IP, libc::IP_PKTINFO, value)
            }
        }
    }

    /// Sends each spec as one `sendmsg` call (spec.md §4.4: "The function
    /// returns the number of specs fully sent ... or −1 if none were sent
    /// and the first attempt failed other than EAGAIN"), matching
    /// `send_udp_packets` in `src/quic/socket.cc`.
    pub fn send_packets(&self, specs: &[OutSpec<'_>]) -> io::Result<i32> {
        let mut sent = 0i32;
        for (i, spec) in specs.iter().enumerate() {
            match self.send_one(spec) {
                Ok(()) => sent += 1,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if i == 0 && sent == 0 => return Err(e),
                Err(_) => break,
            }
        }
        Ok(if sent == 0 && specs.is_empty() { 0 } else if sent == 0 { -1 } else { sent })
    }

    fn send_one(&self, spec: &OutSpec<'_>) -> io::Result<()> {
        let dest = socket2::SockAddr::from(spec.destination);
        let iov = libc::iovec { iov_base: spec.payload.as_ptr() as *mut _, iov_len: spec.payload.len() };
        let mut control = [0u8; MAX_CONTROL_LEN];
        let mut msg: libc::msghdr = unsafe { mem::zeroed() };
        msg.msg_name = dest.as_ptr() as *mut _;
        msg.msg_namelen = dest.len();
        msg.msg_iov = &iov as *const _ as *mut _;
        msg.msg_iovlen = 1;

        if spec.ecn != 0 {
            let ecn_value: libc::c_int = i32::from(spec.ecn);
            let needed = cmsg_space(mem::size_of::<libc::c_int>());
            msg.msg_control = control.as_mut_ptr() as *mut _;
            msg.msg_controllen = needed as _;
            unsafe {
                let cmsg = libc::CMSG_FIRSTHDR(&msg);
                let (level, ty) = if spec.destination.is_ipv6() {
                    (libc::IPPROTO_IPV6, libc::IPV6_TCLASS)
                } else {
                    (libc::IPPROTO_IP, libc::IP_TOS)
                };
                (*cmsg).cmsg_level = level;
                (*cmsg).cmsg_type = ty;
                (*cmsg).cmsg_len = libc::CMSG_LEN(mem::size_of::<libc::c_int>() as u32) as _;
                std::ptr::copy_nonoverlapping(
                    &ecn_value as *const _ as *const u8,
                    libc::CMSG_DATA(cmsg),
                    mem::size_of::<libc::c_int>(),
                );
            }
        } else {
            msg.msg_control = std::ptr::null_mut();
            msg.msg_controllen = 0;
        }

        let rc = unsafe { libc::sendmsg(self.fd, &msg, 0) };
        if rc == -1 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }

    /// Drains up to `max_batch` datagrams with `recvmsg`, parsing ECN bits
    /// and destination address from control messages (spec.md §4.4
    /// "Ingests").
    pub fn recv_batch(&self, max_batch: usize) -> io::Result<Vec<InDatagram>> {
        let mut out = Vec::with_capacity(max_batch);
        for _ in 0..max_batch {
            match self.recv_one() {
                Ok(Some(datagram)) => out.push(datagram),
                Ok(None) => break,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }

    fn recv_one(&self) -> io::Result<Option<InDatagram>> {
        let mut buf = vec![0u8; 65_535];
        let mut control = [0u8; MAX_CONTROL_LEN];
        let mut src: libc::sockaddr_storage = unsafe { mem::zeroed() };
        let mut iov = libc::iovec { iov_base: buf.as_mut_ptr() as *mut _, iov_len: buf.len() };
        let mut msg: libc::msghdr = unsafe { mem::zeroed() };
        msg.msg_name = &mut src as *mut _ as *mut _;
        msg.msg_namelen = mem::size_of::<libc::sockaddr_storage>() as _;
        msg.msg_iov = &mut iov;
        msg.msg_iovlen = 1;
        msg.msg_control = control.as_mut_ptr() as *mut _;
        msg.msg_controllen = control.len() as _;

        let n = unsafe { libc::recvmsg(self.fd, &mut msg, 0) };
        if n == -1 {
            return Err(io::Error::last_os_error());
        }
        buf.truncate(n as usize);

        let peer = sockaddr_storage_to_socketaddr(&src)?;
        let (ecn, local) = parse_control_messages(&msg);
        Ok(Some(InDatagram { payload: buf, peer, local, ecn }))
    }

    /// Waits for the socket to become readable (used by the engine's
    /// ingest loop between `recv_batch` calls).
    pub async fn readable(&self) -> io::Result<()> {
        loop {
            let mut guard = self.io.readable().await?;
            if guard.try_io(|_| Ok(())).is_ok() {
                return Ok(());
            }
            guard.clear_ready();
        }
    }

    pub async fn writable(&self) -> io::Result<()> {
        loop {
            let mut guard = self.io.writable().await?;
            if guard.try_io(|_| Ok(())).is_ok() {
                return Ok(());
            }
            guard.clear_ready();
        }
    }
}

fn set_sockopt_int(fd: RawFd, level: libc::c_int, name: libc::c_int, value: libc::c_int) -> io::Result<()> {
    let rc = unsafe {
        libc::setsockopt(
            fd,
            level,
            name,
            &value as *const _ as *const libc::c_void,
            mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    };
    if rc == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

fn sockaddr_storage_to_socketaddr(storage: &libc::sockaddr_storage) -> io::Result<SocketAddr> {
    unsafe {
        match storage.ss_family as libc::c_int {
            libc::AF_INET => {
                let addr: &libc::sockaddr_in = &*(storage as *const _ as *const libc::sockaddr_in);
                let ip = std::net::Ipv4Addr::from(u32::from_be(addr.sin_addr.s_addr));
                let port = u16::from_be(addr.sin_port);
                Ok(SocketAddr::from((ip, port)))
            }
            libc::AF_INET6 => {
                let addr: &libc::sockaddr_in6 = &*(storage as *const _ as *const libc::sockaddr_in6);
                let ip = std::net::Ipv6Addr::from(addr.sin6_addr.s6_addr);
                let port = u16::from_be(addr.sin6_port);
                Ok(SocketAddr::from((ip, port)))
            }
            _ => Err(io::Error::new(io::ErrorKind::InvalidInput, "unsupported address family")),
        }
    }
}

/// Parses ECN codepoint and destination address out of `msg`'s control
/// messages, matching what `set_option_ecn`/`set_option_dstaddr` requested.
fn parse_control_messages(msg: &libc::msghdr) -> (u8, Option<SocketAddr>) {
    let mut ecn = 0u8;
    let mut local = None;
    unsafe {
        let mut cmsg = libc::CMSG_FIRSTHDR(msg);
        while !cmsg.is_null() {
            let level = (*cmsg).cmsg_level;
            let ty = (*cmsg).cmsg_type;
            if (level == libc::IPPROTO_IP && ty == libc::IP_TOS)
                || (level == libc::IPPROTO_IPV6 && ty == libc::IPV6_TCLASS)
            {
                let mut value: libc::c_int = 0;
                std::ptr::copy_nonoverlapping(
                    libc::CMSG_DATA(cmsg),
                    &mut value as *mut _ as *mut u8,
                    mem::size_of::<libc::c_int>(),
                );
                ecn = (value & 0x3) as u8;
            } else if level == libc::IPPROTO_IP && ty == libc::IP_PKTINFO {
                let info: &libc::in_pktinfo = &*(libc::CMSG_DATA(cmsg) as *const libc::in_pktinfo);
                let ip = std::net::Ipv4Addr::from(u32::from_be(info.ipi_addr.s_addr));
                local = Some(SocketAddr::from((ip, 0)));
            } else if level == libc::IPPROTO_IPV6 && ty == libc::IPV6_PKTINFO {
                let info: &libc::in6_pktinfo = &*(libc::CMSG_DATA(cmsg) as *const libc::in6_pktinfo);
                let ip = std::net::Ipv6Addr::from(info.ipi6_addr.s6_addr);
                local = Some(SocketAddr::from((ip, 0)));
            }
            cmsg = libc::CMSG_NXTHDR(msg as *const _ as *mut _, cmsg);
        }
    }
    (ecn, local)
}

/// A bounded ring of incoming connection handles, sized by `backlog`
/// (spec.md §3 "Socket": "a bounded ring of incoming connection handles
/// (depth = backlog)"; §4.3 "Accept queue": full ring rejects at the QUIC
/// layer rather than admitting the connection).
pub struct IncomingRing<T> {
    backlog: usize,
    queue: VecDeque<T>,
}

impl<T> IncomingRing<T> {
    #[must_use]
    pub fn new(backlog: usize) -> Self {
        IncomingRing { backlog, queue: VecDeque::new() }
    }

    /// Admits a new incoming connection handle, `Err` if the ring is full
    /// (the caller refuses the handshake per spec.md §4.3).
    pub fn try_push(&mut self, handle: T) -> Result<(), T> {
        if self.queue.len() >= self.backlog {
            return Err(handle);
        }
        self.queue.push_back(handle);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<T> {
        self.queue.pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incoming_ring_rejects_past_backlog() {
        let mut ring: IncomingRing<u32> = IncomingRing::new(2);
        ring.try_push(1).unwrap();
        ring.try_push(2).unwrap();
        assert_eq!(ring.try_push(3), Err(3));
        assert_eq!(ring.pop(), Some(1));
        ring.try_push(3).unwrap();
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn cmsg_space_accounts_for_header_and_alignment() {
        let space = cmsg_space(mem::size_of::<libc::c_int>());
        assert!(space >= mem::size_of::<libc::cmsghdr>() + mem::size_of::<libc::c_int>());
    }
}
