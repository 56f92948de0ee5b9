use crate::types::{ProbeId, Sequence};
use pingkit_packet::icmpv4::{IcmpCode, IcmpType};
use std::time::SystemTime;

/// An ICMP Echo probe.
///
/// The send timestamp travels in the packet payload and is echoed back by the
/// target, so the round-trip time can be computed from the reply alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoProbe {
    /// The session identifier.
    pub identifier: ProbeId,
    /// The sequence of the probe.
    pub sequence: Sequence,
    /// Timestamp when the probe was sent.
    pub sent: SystemTime,
}

impl EchoProbe {
    #[must_use]
    pub const fn new(identifier: ProbeId, sequence: Sequence, sent: SystemTime) -> Self {
        Self {
            identifier,
            sequence,
            sent,
        }
    }
}

/// A decoded ICMP reply.
///
/// Every reply carries the raw header fields for diagnostics, whether or not
/// it belongs to this session.  The `rtt` is only present for replies which
/// matched the session identifier and `description` is only present for
/// non-Echo-Reply messages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reply {
    /// The ICMP type of the reply.
    pub icmp_type: IcmpType,
    /// The ICMP code of the reply.
    pub icmp_code: IcmpCode,
    /// The checksum as found in the reply header.
    pub checksum: u16,
    /// The identifier echoed back in the reply.
    pub identifier: ProbeId,
    /// The sequence echoed back in the reply.
    pub sequence: Sequence,
    /// The round-trip time in seconds.
    pub rtt: Option<f64>,
    /// The catalog description for an ICMP error message.
    pub description: Option<&'static str>,
}

/// The outcome of a single probe attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeOutcome {
    /// An Echo Reply matching the session identifier.
    Success(Reply),
    /// An ICMP error message matching the session identifier.
    ///
    /// The network itself raised a routing or policy condition, such as
    /// `DestinationUnreachable`.  The round-trip time is still reported
    /// alongside the description.
    ProtocolError(Reply),
    /// A reply belonging to a different probing session.
    ///
    /// Raw ICMP sockets receive all ICMP traffic to the host, not just
    /// self-originated probes, so foreign replies must be discarded rather
    /// than treated as this probe's answer.
    IdentifierMismatch(Reply),
    /// No matching reply arrived within the wait budget.
    Timeout,
}

impl ProbeOutcome {
    /// The round-trip time sample this outcome contributes to the session
    /// statistics, if any.
    #[must_use]
    pub const fn sample(&self) -> Option<f64> {
        match self {
            Self::Success(reply) => reply.rtt,
            Self::ProtocolError(_) | Self::IdentifierMismatch(_) | Self::Timeout => None,
        }
    }

    /// The decoded reply, for all outcomes which carry one.
    #[must_use]
    pub const fn reply(&self) -> Option<&Reply> {
        match self {
            Self::Success(reply) | Self::ProtocolError(reply) | Self::IdentifierMismatch(reply) => {
                Some(reply)
            }
            Self::Timeout => None,
        }
    }
}
