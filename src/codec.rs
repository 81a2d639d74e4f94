use crate::error::{PingError, Result};
use pnet::packet::Packet;
use pnet::packet::icmp::destination_unreachable::DestinationUnreachablePacket;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::{EchoRequestPacket, MutableEchoRequestPacket};
use pnet::packet::icmp::time_exceeded::TimeExceededPacket;
use pnet::packet::icmp::{IcmpCode, IcmpPacket, IcmpTypes, checksum};
use pnet::packet::ipv4::Ipv4Packet;

/// Classification of an inbound ICMP message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    EchoReply,
    /// Our own request looping back (seen on loopback raw sockets)
    EchoRequest,
    DestinationUnreachable,
    TimeExceeded,
    Other(u8),
}

/// A decoded ICMP message
///
/// For error messages the identifier and sequence are taken from the quoted
/// original request, when the quote is long enough to carry them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcmpReply {
    pub kind: ReplyKind,
    pub code: u8,
    pub identifier: Option<u16>,
    pub sequence: Option<u16>,
    /// Length of the ICMP message, header included
    pub size: usize,
}

impl IcmpReply {
    /// Whether this message answers (or reports on) the given request
    pub fn matches(&self, identifier: u16, sequence: u16) -> bool {
        self.identifier == Some(identifier) && self.sequence == Some(sequence)
    }

    /// Like [`matches`](Self::matches), but our own looped-back request never counts
    pub fn answers(&self, identifier: u16, sequence: u16) -> bool {
        self.kind != ReplyKind::EchoRequest && self.matches(identifier, sequence)
    }
}

/// Build an Echo Request carrying `payload`
pub fn encode_echo_request(identifier: u16, sequence: u16, payload: &[u8]) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; EchoRequestPacket::minimum_packet_size() + payload.len()];
    let mut echo_packet = MutableEchoRequestPacket::new(&mut buf)
        .ok_or_else(|| PingError::Codec("echo request buffer too small".to_string()))?;

    echo_packet.set_icmp_type(IcmpTypes::EchoRequest);
    echo_packet.set_icmp_code(IcmpCode::new(0));
    echo_packet.set_identifier(identifier);
    echo_packet.set_sequence_number(sequence);
    echo_packet.set_payload(payload);

    let echo_checksum = checksum(
        &IcmpPacket::new(echo_packet.packet())
            .ok_or_else(|| PingError::Codec("echo request too short for checksum".to_string()))?,
    );
    echo_packet.set_checksum(echo_checksum);

    Ok(buf)
}

/// Parse a datagram read from the raw socket
///
/// Raw IPv4 sockets hand back the IP header too; it is stripped when present.
pub fn decode_reply(datagram: &[u8]) -> Result<IcmpReply> {
    let icmp_bytes = strip_ipv4_header(datagram)?;
    let icmp_packet = IcmpPacket::new(icmp_bytes)
        .ok_or_else(|| PingError::Codec(format!("truncated ICMP message ({} bytes)", icmp_bytes.len())))?;
    let code = icmp_packet.get_icmp_code().0;
    let size = icmp_bytes.len();

    let (kind, identifier, sequence) = match icmp_packet.get_icmp_type() {
        IcmpTypes::EchoReply => {
            let echo = EchoReplyPacket::new(icmp_bytes)
                .ok_or_else(|| PingError::Codec("truncated echo reply".to_string()))?;
            (ReplyKind::EchoReply, Some(echo.get_identifier()), Some(echo.get_sequence_number()))
        }
        IcmpTypes::EchoRequest => {
            let echo = EchoRequestPacket::new(icmp_bytes)
                .ok_or_else(|| PingError::Codec("truncated echo request".to_string()))?;
            (ReplyKind::EchoRequest, Some(echo.get_identifier()), Some(echo.get_sequence_number()))
        }
        IcmpTypes::DestinationUnreachable => {
            let quoted = DestinationUnreachablePacket::new(icmp_bytes)
                .map(|p| quoted_echo_attrs(p.payload()))
                .unwrap_or((None, None));
            (ReplyKind::DestinationUnreachable, quoted.0, quoted.1)
        }
        IcmpTypes::TimeExceeded => {
            let quoted = TimeExceededPacket::new(icmp_bytes)
                .map(|p| quoted_echo_attrs(p.payload()))
                .unwrap_or((None, None));
            (ReplyKind::TimeExceeded, quoted.0, quoted.1)
        }
        other => (ReplyKind::Other(other.0), None, None),
    };

    Ok(IcmpReply { kind, code, identifier, sequence, size })
}

fn strip_ipv4_header(datagram: &[u8]) -> Result<&[u8]> {
    // version nibble 4 never collides with a valid ICMP type byte
    if datagram.first().map(|b| b >> 4) != Some(4) {
        return Ok(datagram);
    }
    let ipv4 = Ipv4Packet::new(datagram)
        .ok_or_else(|| PingError::Codec(format!("truncated IPv4 header ({} bytes)", datagram.len())))?;
    let header_len = ipv4.get_header_length() as usize * 4;
    datagram
        .get(header_len..)
        .ok_or_else(|| PingError::Codec(format!("bad IPv4 header length {header_len}")))
}

// The quote is the original IP header plus the first 8 bytes of our request.
fn quoted_echo_attrs(quoted: &[u8]) -> (Option<u16>, Option<u16>) {
    let Some(ipv4) = Ipv4Packet::new(quoted) else {
        return (None, None);
    };
    let header_len = ipv4.get_header_length() as usize * 4;
    match quoted.get(header_len..).and_then(EchoRequestPacket::new) {
        Some(original) => (Some(original.get_identifier()), Some(original.get_sequence_number())),
        None => (None, None),
    }
}
