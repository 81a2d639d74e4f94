//! Host string to target address resolution

use super::Dns;
use crate::error::{PingError, Result};
use crate::session::Target;
use log::debug;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Instant;

/// Resolve a host string to a concrete address
///
/// Literals (v4 or v6) are returned as-is. Names go through a forward lookup
/// and the first candidate with an IPv4 form wins; `localhost` for example may
/// answer `[::1, fe80::1, 127.0.0.1]`.
pub fn resolve(dns: &dyn Dns, host: &str) -> Result<IpAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    let candidates = dns.lookup_host(host).map_err(|e| {
        debug!("forward lookup of {host} failed: {e}");
        PingError::UnknownHost(host.to_string())
    })?;

    candidates
        .iter()
        .find_map(ipv4_form)
        .map(IpAddr::V4)
        .ok_or_else(|| PingError::UnknownHost(host.to_string()))
}

/// Resolve the probe target, rejecting anything that is not IPv4
pub fn resolve_target(dns: &dyn Dns, host: &str) -> Result<Target> {
    if host.is_empty() {
        return Err(PingError::NoTarget);
    }

    let start = Instant::now();
    let resolved = resolve(dns, host);
    debug!("lookup of {host} took {:?}", start.elapsed());

    match resolved? {
        IpAddr::V4(addr) => Ok(Target { addr, host: host.to_string() }),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(addr) => Ok(Target { addr, host: host.to_string() }),
            None => Err(PingError::Ipv6NotSupported),
        },
    }
}

fn ipv4_form(ip: &IpAddr) -> Option<Ipv4Addr> {
    match ip {
        IpAddr::V4(v4) => Some(*v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped(),
    }
}
