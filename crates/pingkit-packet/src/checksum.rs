//! The RFC 1071 Internet checksum for `ICMP` over IPv4.
//!
//! The checksum is computed over the complete `ICMP` header and payload with
//! the checksum field zeroed.  The result is returned in host byte order;
//! writing it back via [`crate::icmpv4::IcmpPacket::set_checksum`] stores it
//! in network byte order regardless of the host architecture.

/// Calculate the checksum for an `ICMP` packet.
///
/// The checksum field of `data` must be zero when calling this function.
#[must_use]
pub fn icmp_checksum(data: &[u8]) -> u16 {
    finalize_checksum(sum_be_words(data))
}

/// Sum the buffer as 16-bit big-endian words.
///
/// An odd trailing byte is padded with a zero low byte.
fn sum_be_words(data: &[u8]) -> u32 {
    let mut sum = 0_u32;
    let mut chunks = data.chunks_exact(2);
    for word in chunks.by_ref() {
        sum += u32::from(u16::from_be_bytes([word[0], word[1]]));
    }
    if let [last] = *chunks.remainder() {
        sum += u32::from(last) << 8;
    }
    sum
}

/// Fold the 32-bit sum into 16 bits and take the one's complement.
const fn finalize_checksum(mut sum: u32) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum >> 16) + (sum & 0xFFFF);
    }
    !sum as u16
}
