use crate::error::Result;
use crate::probe::{EchoProbe, ProbeOutcome};
use std::time::Duration;

/// A network socket.
mod socket;

/// Platform specific network code.
#[cfg(unix)]
mod platform;

#[cfg(not(unix))]
compile_error!("raw ICMP sockets are only implemented for unix targets");

/// A channel for sending probes and receiving replies.
pub mod channel;

pub use socket::Socket;

/// The platform specific socket type.
#[cfg(unix)]
pub use platform::SocketImpl;

/// An abstraction over a raw ICMP transport for probing.
#[cfg_attr(test, mockall::automock)]
pub trait Network {
    /// Send an `EchoProbe`.
    fn send_probe(&mut self, probe: EchoProbe) -> Result<()>;

    /// Wait up to `wait` for the next ICMP datagram and decode it.
    ///
    /// Returns `None` if the readiness wait times out without data.
    fn recv_reply(&mut self, wait: Duration) -> Result<Option<ProbeOutcome>>;
}
