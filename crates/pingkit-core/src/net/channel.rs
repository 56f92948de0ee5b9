use crate::catalog;
use crate::error::{Error, Result};
use crate::net::socket::Socket;
use crate::net::Network;
use crate::probe::{EchoProbe, ProbeOutcome, Reply};
use crate::types::{ProbeId, Sequence};
use pingkit_packet::checksum::icmp_checksum;
use pingkit_packet::icmpv4::echo_reply::EchoReplyPacket;
use pingkit_packet::icmpv4::echo_request::EchoRequestPacket;
use pingkit_packet::icmpv4::{IcmpCode, IcmpType};
use pingkit_packet::ipv4::Ipv4Packet;
use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, SystemTime};
use tracing::instrument;

/// The maximum size of any datagram we receive.
const MAX_PACKET_SIZE: usize = 1024;

/// The size of an echo request, an 8 byte header and an 8 byte timestamp.
const ECHO_REQUEST_PACKET_SIZE: usize = 16;

/// An channel for sending ICMP Echo probes and receiving replies.
pub struct Channel<S: Socket> {
    socket: S,
    dest_addr: Ipv4Addr,
    identifier: ProbeId,
}

impl<S: Socket> Channel<S> {
    /// Open a raw ICMP channel to the given target.
    #[instrument(skip_all, level = "trace")]
    pub fn connect(dest_addr: Ipv4Addr, identifier: ProbeId) -> Result<Self> {
        let socket = S::new_icmp_socket_ipv4().map_err(|err| {
            if err.kind() == ErrorKind::PermissionDenied {
                Error::PermissionDenied(err)
            } else {
                Error::IoError(err)
            }
        })?;
        Ok(Self::new(socket, dest_addr, identifier))
    }

    pub(crate) const fn new(socket: S, dest_addr: Ipv4Addr, identifier: ProbeId) -> Self {
        Self {
            socket,
            dest_addr,
            identifier,
        }
    }
}

impl<S: Socket> Network for Channel<S> {
    #[instrument(skip(self), level = "trace")]
    fn send_probe(&mut self, probe: EchoProbe) -> Result<()> {
        let mut buf = [0_u8; ECHO_REQUEST_PACKET_SIZE];
        let icmp = make_echo_request(&mut buf, probe)?;
        let addr = SocketAddr::new(IpAddr::V4(self.dest_addr), 0);
        self.socket
            .send_to(icmp.packet(), addr)
            .map_err(Error::ProbeFailed)?;
        Ok(())
    }

    #[instrument(skip(self), level = "trace")]
    fn recv_reply(&mut self, wait: Duration) -> Result<Option<ProbeOutcome>> {
        if !self.socket.is_readable(wait)? {
            return Ok(None);
        }
        let mut buf = [0_u8; MAX_PACKET_SIZE];
        let bytes_read = match self.socket.read(&mut buf) {
            Ok(bytes_read) => bytes_read,
            Err(err) if err.kind() == ErrorKind::WouldBlock => return Ok(None),
            Err(err) => return Err(Error::IoError(err)),
        };
        let outcome = extract_reply(&buf[..bytes_read], self.identifier, SystemTime::now())?;
        tracing::debug!(?outcome);
        Ok(Some(outcome))
    }
}

/// Build an ICMP `EchoRequest` packet in `buf`.
///
/// The payload is the probe send timestamp as fractional seconds since the
/// Unix epoch, in native byte order, which makes it possible to compute the
/// round-trip time from the echoed payload alone.
fn make_echo_request(buf: &mut [u8], probe: EchoProbe) -> Result<EchoRequestPacket<'_>> {
    let timestamp = probe
        .sent
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64();
    let mut icmp = EchoRequestPacket::new(buf)?;
    icmp.set_icmp_type(IcmpType::EchoRequest);
    icmp.set_icmp_code(IcmpCode(0));
    icmp.set_identifier(probe.identifier.0);
    icmp.set_sequence(probe.sequence.0);
    icmp.set_payload(&timestamp.to_ne_bytes());
    icmp.set_checksum(icmp_checksum(icmp.packet()));
    Ok(icmp)
}

/// Decode a received IP datagram into a `ProbeOutcome`.
///
/// The datagram is the full IP packet as delivered by a raw socket, so the
/// ICMP message starts after the IP header, the length of which varies with
/// IP options.
///
/// Replies with a foreign identifier are classified before the timestamp is
/// read, as foreign payloads need not carry one.
pub(crate) fn extract_reply(
    datagram: &[u8],
    identifier: ProbeId,
    received: SystemTime,
) -> Result<ProbeOutcome> {
    let ipv4 = Ipv4Packet::new_view(datagram)?;
    let icmp = EchoReplyPacket::new_view(ipv4.payload())?;
    let reply = Reply {
        icmp_type: icmp.get_icmp_type(),
        icmp_code: icmp.get_icmp_code(),
        checksum: icmp.get_checksum(),
        identifier: ProbeId(icmp.get_identifier()),
        sequence: Sequence(icmp.get_sequence()),
        rtt: None,
        description: None,
    };
    if reply.identifier != identifier {
        return Ok(ProbeOutcome::IdentifierMismatch(reply));
    }
    let sent = read_timestamp(icmp.payload())?;
    let received_secs = received
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64();
    let rtt = received_secs - sent;
    match reply.icmp_type {
        IcmpType::EchoReply => Ok(ProbeOutcome::Success(Reply {
            rtt: Some(rtt),
            ..reply
        })),
        icmp_type => Ok(ProbeOutcome::ProtocolError(Reply {
            rtt: Some(rtt),
            description: Some(catalog::describe(icmp_type, reply.icmp_code)),
            ..reply
        })),
    }
}

fn read_timestamp(payload: &[u8]) -> Result<f64> {
    let bytes: [u8; 8] = payload
        .get(..8)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| {
            pingkit_packet::error::Error::InsufficientPacketBuffer(
                String::from("EchoTimestamp"),
                8,
                payload.len(),
            )
        })?;
    Ok(f64::from_ne_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IoError, IoOperation, IoResult};
    use crate::mocket_read;
    use crate::net::socket::MockSocket;
    use mockall::predicate;
    use std::io;

    const IDENTIFIER: ProbeId = ProbeId(0x1234);
    const SEQUENCE: Sequence = Sequence(7);

    fn sent_at(epoch_secs: f64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs_f64(epoch_secs)
    }

    /// Wrap an ICMP message in a minimal 20 byte IPv4 header.
    fn ipv4_datagram(icmp: &[u8]) -> Vec<u8> {
        let mut buf = vec![0_u8; Ipv4Packet::minimum_packet_size() + icmp.len()];
        buf[0] = 0x45;
        let total_length = u16::try_from(buf.len()).unwrap();
        buf[2..4].copy_from_slice(&total_length.to_be_bytes());
        buf[8] = 64;
        buf[9] = 1;
        buf[20..].copy_from_slice(icmp);
        buf
    }

    fn echo_reply(
        icmp_type: IcmpType,
        icmp_code: IcmpCode,
        identifier: ProbeId,
        sequence: Sequence,
        timestamp: f64,
    ) -> Vec<u8> {
        let mut buf = vec![0_u8; ECHO_REQUEST_PACKET_SIZE];
        let mut icmp = EchoReplyPacket::new(&mut buf).unwrap();
        icmp.set_icmp_type(icmp_type);
        icmp.set_icmp_code(icmp_code);
        icmp.set_identifier(identifier.0);
        icmp.set_sequence(sequence.0);
        icmp.set_payload(&timestamp.to_ne_bytes());
        icmp.set_checksum(icmp_checksum(icmp.packet()));
        buf
    }

    #[test]
    fn test_make_echo_request() {
        let mut buf = [0_u8; ECHO_REQUEST_PACKET_SIZE];
        let probe = EchoProbe::new(IDENTIFIER, SEQUENCE, sent_at(100.5));
        let icmp = make_echo_request(&mut buf, probe).unwrap();
        assert_eq!(IcmpType::EchoRequest, icmp.get_icmp_type());
        assert_eq!(IcmpCode(0), icmp.get_icmp_code());
        assert_eq!(0x1234, icmp.get_identifier());
        assert_eq!(7, icmp.get_sequence());
        assert_eq!(100.5_f64.to_ne_bytes(), icmp.payload()[..8]);
        // summing a packet with a valid embedded checksum yields zero
        assert_eq!(0, icmp_checksum(icmp.packet()));
    }

    #[test]
    fn test_extract_reply_success() {
        let icmp = echo_reply(IcmpType::EchoReply, IcmpCode(0), IDENTIFIER, SEQUENCE, 100.0);
        let datagram = ipv4_datagram(&icmp);
        let outcome = extract_reply(&datagram, IDENTIFIER, sent_at(100.042)).unwrap();
        let ProbeOutcome::Success(reply) = outcome else {
            panic!("expected Success, got {outcome:?}");
        };
        assert_eq!(IcmpType::EchoReply, reply.icmp_type);
        assert_eq!(IDENTIFIER, reply.identifier);
        assert_eq!(SEQUENCE, reply.sequence);
        assert!((reply.rtt.unwrap() - 0.042).abs() < 1e-9);
        assert_eq!(None, reply.description);
    }

    #[test]
    fn test_extract_reply_dest_unreachable() {
        let icmp = echo_reply(
            IcmpType::DestinationUnreachable,
            IcmpCode(1),
            IDENTIFIER,
            SEQUENCE,
            100.0,
        );
        let datagram = ipv4_datagram(&icmp);
        let outcome = extract_reply(&datagram, IDENTIFIER, sent_at(100.5)).unwrap();
        let ProbeOutcome::ProtocolError(reply) = outcome else {
            panic!("expected ProtocolError, got {outcome:?}");
        };
        assert_eq!(IcmpType::DestinationUnreachable, reply.icmp_type);
        assert_eq!(IcmpCode(1), reply.icmp_code);
        assert_eq!(Some("Host is unreachable"), reply.description);
        assert!(reply.rtt.is_some());
    }

    #[test]
    fn test_extract_reply_identifier_mismatch() {
        let icmp = echo_reply(
            IcmpType::EchoReply,
            IcmpCode(0),
            ProbeId(0x9999),
            SEQUENCE,
            100.0,
        );
        let datagram = ipv4_datagram(&icmp);
        let outcome = extract_reply(&datagram, IDENTIFIER, sent_at(100.042)).unwrap();
        let ProbeOutcome::IdentifierMismatch(reply) = outcome else {
            panic!("expected IdentifierMismatch, got {outcome:?}");
        };
        assert_eq!(ProbeId(0x9999), reply.identifier);
        assert_eq!(None, reply.rtt);
    }

    #[test]
    fn test_extract_reply_short_datagram() {
        let datagram = [0x45_u8; 12];
        let err = extract_reply(&datagram, IDENTIFIER, sent_at(100.0)).unwrap_err();
        assert!(matches!(err, Error::MalformedDatagram(_)));
    }

    #[test]
    fn test_extract_reply_missing_timestamp() {
        // a matching echo reply with a truncated payload
        let mut buf = [0_u8; 12];
        let mut icmp = EchoReplyPacket::new(&mut buf).unwrap();
        icmp.set_icmp_type(IcmpType::EchoReply);
        icmp.set_identifier(IDENTIFIER.0);
        icmp.set_sequence(SEQUENCE.0);
        let datagram = ipv4_datagram(&buf);
        let err = extract_reply(&datagram, IDENTIFIER, sent_at(100.0)).unwrap_err();
        assert!(matches!(err, Error::MalformedDatagram(_)));
    }

    #[test]
    fn test_extract_reply_ipv4_options() {
        // a header length of 6 words pushes the ICMP message out by 4 bytes
        let icmp = echo_reply(IcmpType::EchoReply, IcmpCode(0), IDENTIFIER, SEQUENCE, 50.0);
        let mut datagram = vec![0_u8; 24 + icmp.len()];
        datagram[0] = 0x46;
        let total_length = u16::try_from(datagram.len()).unwrap();
        datagram[2..4].copy_from_slice(&total_length.to_be_bytes());
        datagram[9] = 1;
        datagram[24..].copy_from_slice(&icmp);
        let outcome = extract_reply(&datagram, IDENTIFIER, sent_at(50.1)).unwrap();
        assert!(matches!(outcome, ProbeOutcome::Success(_)));
    }

    #[test]
    fn test_channel_send_probe() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), 0);
        let mut mocket = MockSocket::new();
        mocket
            .expect_send_to()
            .with(
                predicate::function(|buf: &[u8]| {
                    buf.len() == ECHO_REQUEST_PACKET_SIZE && buf[0] == 8 && icmp_checksum(buf) == 0
                }),
                predicate::eq(addr),
            )
            .times(1)
            .returning(|_, _| Ok(()));
        let mut channel = Channel::new(mocket, Ipv4Addr::new(10, 0, 0, 1), IDENTIFIER);
        let probe = EchoProbe::new(IDENTIFIER, SEQUENCE, sent_at(100.0));
        channel.send_probe(probe).unwrap();
    }

    #[test]
    fn test_channel_send_probe_failed() {
        let mut mocket = MockSocket::new();
        mocket.expect_send_to().times(1).returning(|_, addr| {
            Err(IoError::SendTo(
                io::Error::from(io::ErrorKind::AddrNotAvailable),
                addr,
            ))
        });
        let mut channel = Channel::new(mocket, Ipv4Addr::new(10, 0, 0, 1), IDENTIFIER);
        let probe = EchoProbe::new(IDENTIFIER, SEQUENCE, sent_at(100.0));
        let err = channel.send_probe(probe).unwrap_err();
        assert!(matches!(err, Error::ProbeFailed(_)));
    }

    #[test]
    fn test_channel_recv_reply_not_readable() {
        let mut mocket = MockSocket::new();
        mocket
            .expect_is_readable()
            .with(predicate::eq(Duration::from_millis(250)))
            .times(1)
            .returning(|_| Ok(false));
        let mut channel = Channel::new(mocket, Ipv4Addr::new(10, 0, 0, 1), IDENTIFIER);
        let outcome = channel.recv_reply(Duration::from_millis(250)).unwrap();
        assert_eq!(None, outcome);
    }

    #[test]
    fn test_channel_recv_reply_would_block() {
        let mut mocket = MockSocket::new();
        mocket.expect_is_readable().times(1).returning(|_| Ok(true));
        mocket.expect_read().times(1).returning(|_| {
            Err(IoError::Other(
                io::Error::from(io::ErrorKind::WouldBlock),
                IoOperation::Read,
            ))
        });
        let mut channel = Channel::new(mocket, Ipv4Addr::new(10, 0, 0, 1), IDENTIFIER);
        let outcome = channel.recv_reply(Duration::from_millis(250)).unwrap();
        assert_eq!(None, outcome);
    }

    #[test]
    fn test_channel_recv_reply_success() {
        let icmp = echo_reply(IcmpType::EchoReply, IcmpCode(0), IDENTIFIER, SEQUENCE, 0.0);
        let datagram = ipv4_datagram(&icmp);
        let mut mocket = MockSocket::new();
        mocket.expect_is_readable().times(1).returning(|_| Ok(true));
        mocket
            .expect_read()
            .times(1)
            .returning(mocket_read!(datagram));
        let mut channel = Channel::new(mocket, Ipv4Addr::new(10, 0, 0, 1), IDENTIFIER);
        let outcome = channel
            .recv_reply(Duration::from_millis(250))
            .unwrap()
            .unwrap();
        let ProbeOutcome::Success(reply) = outcome else {
            panic!("expected Success, got {outcome:?}");
        };
        assert_eq!(IDENTIFIER, reply.identifier);
        assert_eq!(SEQUENCE, reply.sequence);
    }
}
