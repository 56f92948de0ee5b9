use crate::error::IoResult;
use std::net::SocketAddr;
use std::time::Duration;

/// A raw ICMP network socket.
#[cfg_attr(test, mockall::automock)]
pub trait Socket
where
    Self: Sized,
{
    /// Create a raw IPv4 socket for sending and receiving ICMP packets.
    ///
    /// This operation requires the `CAP_NET_RAW` capability on Linux.
    fn new_icmp_socket_ipv4() -> IoResult<Self>;
    /// Send a packet to the given address.
    ///
    /// The port of `addr` is unused by ICMP but required by the socket
    /// addressing API.
    fn send_to(&mut self, buf: &[u8], addr: SocketAddr) -> IoResult<()>;
    /// Returns true if the socket becomes readable before the timeout, false otherwise.
    fn is_readable(&mut self, timeout: Duration) -> IoResult<bool>;
    /// Read the next datagram.
    fn read(&mut self, buf: &mut [u8]) -> IoResult<usize>;
}
