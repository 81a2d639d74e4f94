use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io;
use std::mem::MaybeUninit;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

/// Largest datagram read back from the socket
pub const RECV_BUFFER_SIZE: usize = 1500;

/// Datagram transport the probe session runs over
pub trait Transport {
    /// Send one ICMP message to `dest`
    fn send_to(&mut self, packet: &[u8], dest: Ipv4Addr) -> io::Result<usize>;

    /// Block for at most `timeout` waiting for one datagram
    ///
    /// Expiry surfaces as `WouldBlock` or `TimedOut`.
    fn recv_from(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<(usize, IpAddr)>;
}

/// Raw ICMPv4 socket, optionally bound to a source address
pub struct RawSocketTransport {
    socket: Socket,
}

impl RawSocketTransport {
    pub fn open(source: Option<Ipv4Addr>) -> io::Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))?;
        if let Some(source) = source {
            socket.bind(&SockAddr::from(SocketAddrV4::new(source, 0)))?;
        }
        Ok(RawSocketTransport { socket })
    }
}

impl Transport for RawSocketTransport {
    fn send_to(&mut self, packet: &[u8], dest: Ipv4Addr) -> io::Result<usize> {
        let dest = SockAddr::from(SocketAddr::new(IpAddr::V4(dest), 0));
        self.socket.send_to(packet, &dest)
    }

    fn recv_from(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<(usize, IpAddr)> {
        let timeout = effective_read_timeout(timeout)
            .ok_or_else(|| io::Error::new(io::ErrorKind::TimedOut, "deadline already passed"))?;
        self.socket.set_read_timeout(Some(timeout))?;

        let mut recv_buf = [MaybeUninit::<u8>::uninit(); RECV_BUFFER_SIZE];
        let (size, addr) = self.socket.recv_from(&mut recv_buf)?;
        let from = addr
            .as_socket()
            .map(|s| s.ip())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "non-IP peer address"))?;

        let initialized_part: &[MaybeUninit<u8>] = &recv_buf[..size];
        // SAFETY: recv_from initialised the first `size` bytes
        let packet_data: &[u8] =
            unsafe { &*(initialized_part as *const [MaybeUninit<u8>] as *const [u8]) };

        let copied = size.min(buf.len());
        buf[..copied].copy_from_slice(&packet_data[..copied]);
        Ok((copied, from))
    }
}

// The socket timeout is truncated to whole microseconds and a zero timeval
// blocks forever, so anything shorter than 1 us counts as already expired.
fn effective_read_timeout(remaining: Duration) -> Option<Duration> {
    if remaining.as_micros() == 0 { None } else { Some(remaining) }
}
