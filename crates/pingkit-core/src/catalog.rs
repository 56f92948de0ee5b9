//! Human readable descriptions for ICMP error messages.

use pingkit_packet::icmpv4::{IcmpCode, IcmpType};

/// The fallback description for (type, code) pairs not in the catalog.
pub const UNKNOWN_ERROR: &str = "Unknown error Type+Code";

/// Descriptions for `DestinationUnreachable` codes 0 through 15.
const DESTINATION_UNREACHABLE: [&str; 16] = [
    "Net is unreachable",
    "Host is unreachable",
    "Protocol is unreachable",
    "Port is unreachable",
    "Fragmentation is needed",
    "Source route failed",
    "Destination network is unknown",
    "Destination host is unknown",
    "Source host is isolated",
    "Communication with destination network is administratively prohibited",
    "Communication with destination host is administratively prohibited",
    "Destination network is unreachable for type of service",
    "Destination host is unreachable for type of service",
    "Communication is administratively prohibited",
    "Host precedence violation",
    "Precedence cutoff is in effect",
];

/// Look up the description for an ICMP (type, code) pair.
///
/// Unmapped pairs resolve to [`UNKNOWN_ERROR`], never a panic.
#[must_use]
pub fn describe(icmp_type: IcmpType, icmp_code: IcmpCode) -> &'static str {
    match icmp_type {
        IcmpType::DestinationUnreachable => DESTINATION_UNREACHABLE
            .get(usize::from(icmp_code.0))
            .copied()
            .unwrap_or(UNKNOWN_ERROR),
        _ => UNKNOWN_ERROR,
    }
}
