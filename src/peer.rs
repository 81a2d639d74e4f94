use crate::error::Result;
use std::fmt;
use std::net::IpAddr;

/// Display identity of the remote end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub fqdn: String,
    pub ip: String,
}

impl Peer {
    pub fn unknown() -> Self {
        Peer { fqdn: "Unknown".to_string(), ip: "?.?.?.?".to_string() }
    }

    fn from_lookup(addr: IpAddr, name: &Result<String>) -> Self {
        let ip = addr.to_string();
        match name {
            Ok(fqdn) => Peer { fqdn: fqdn.clone(), ip },
            Err(_) => Peer { fqdn: ip.clone(), ip },
        }
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.fqdn, self.ip)
    }
}

/// Pick the identity to show for the session
///
/// The address that actually answered is preferred over the requested target,
/// which matters for round-robin names. A failed reverse lookup falls back to
/// the address itself.
pub fn choose_peer(
    target_addr: Option<IpAddr>,
    target_name: &Result<String>,
    responding_addr: Option<IpAddr>,
    responding_name: &Result<String>,
) -> Peer {
    if let Some(addr) = responding_addr {
        return Peer::from_lookup(addr, responding_name);
    }
    if let Some(addr) = target_addr {
        return Peer::from_lookup(addr, target_name);
    }
    Peer::unknown()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PingError;
    use std::net::Ipv4Addr;

    fn ip(a: u8, b: u8, c: u8, d: u8) -> Option<IpAddr> {
        Some(IpAddr::V4(Ipv4Addr::new(a, b, c, d)))
    }

    #[test]
    fn test_responder_wins_over_target() {
        let peer = choose_peer(
            ip(216, 58, 193, 68),
            &Ok("www.google.com".to_string()),
            ip(216, 58, 193, 99),
            &Ok("lax17s01-in-f3.1e100.net".to_string()),
        );
        assert_eq!(peer.fqdn, "lax17s01-in-f3.1e100.net");
        assert_eq!(peer.ip, "216.58.193.99");
    }

    #[test]
    fn test_unresolved_responder_uses_its_address() {
        let peer = choose_peer(
            ip(127, 0, 0, 1),
            &Ok("localhost".to_string()),
            ip(10, 0, 0, 1),
            &Err(PingError::NotResolving("10.0.0.1".into())),
        );
        assert_eq!(peer, Peer { fqdn: "10.0.0.1".into(), ip: "10.0.0.1".into() });
    }

    #[test]
    fn test_target_used_without_responder() {
        let peer = choose_peer(
            ip(127, 0, 0, 1),
            &Ok("localhost".to_string()),
            None,
            &Err(PingError::MissingPeer),
        );
        assert_eq!(peer.to_string(), "localhost (127.0.0.1)");

        let peer = choose_peer(
            ip(192, 0, 2, 7),
            &Err(PingError::NotResolving("192.0.2.7".into())),
            None,
            &Err(PingError::MissingPeer),
        );
        assert_eq!(peer.fqdn, "192.0.2.7");
    }

    #[test]
    fn test_sentinel_when_nothing_known() {
        let peer = choose_peer(None, &Err(PingError::MissingPeer), None, &Err(PingError::MissingPeer));
        assert_eq!(peer, Peer::unknown());
        assert_eq!(peer.ip, "?.?.?.?");
    }
}
