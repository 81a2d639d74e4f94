//! Forward and reverse DNS lookups
//!
//! All name service traffic goes through the [`Dns`] trait so the resolver and
//! the reverse-name cache can be driven by a scripted backend in tests.

pub mod cache;
pub mod resolver;

#[cfg(test)]
pub mod test_utils;

use std::io;
use std::net::IpAddr;

pub use cache::ReverseNameCache;
pub use resolver::{resolve, resolve_target};

/// Name service backend
pub trait Dns: Send + Sync {
    /// Forward lookup, returning every candidate address in resolver order
    fn lookup_host(&self, host: &str) -> io::Result<Vec<IpAddr>>;

    /// Reverse lookup, returning every name found for the address
    fn lookup_addr(&self, addr: &IpAddr) -> io::Result<Vec<String>>;
}

/// The system resolver (getaddrinfo / getnameinfo)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDns;

impl Dns for SystemDns {
    fn lookup_host(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        dns_lookup::lookup_host(host)
    }

    fn lookup_addr(&self, addr: &IpAddr) -> io::Result<Vec<String>> {
        let name = dns_lookup::lookup_addr(addr)?;
        // getnameinfo falls back to the numeric form when no PTR record exists
        if name.is_empty() || name == addr.to_string() {
            return Ok(Vec::new());
        }
        Ok(vec![name])
    }
}
