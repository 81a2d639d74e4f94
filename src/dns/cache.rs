//! Reverse DNS lookup caching

use super::Dns;
use crate::error::{PingError, Result};
use log::debug;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

/// Thread-safe, process-lifetime cache of reverse names
///
/// Only successful lookups are remembered, so a peer whose PTR query failed
/// is asked again on the next call.
pub struct ReverseNameCache {
    dns: Arc<dyn Dns>,
    names: Mutex<HashMap<String, String>>,
}

impl ReverseNameCache {
    pub fn new(dns: Arc<dyn Dns>) -> Self {
        Self {
            dns,
            names: Mutex::new(HashMap::new()),
        }
    }

    /// Reverse-resolve a peer, consulting the cache first
    pub fn reverse(&self, peer: Option<IpAddr>) -> Result<String> {
        let peer = peer.ok_or(PingError::MissingPeer)?;
        let key = peer.to_string();

        // held across the query so one key never triggers two lookups
        let mut names = self.names.lock().expect("mutex poisoned");
        if let Some(name) = names.get(&key) {
            return Ok(name.clone());
        }

        match self.dns.lookup_addr(&peer) {
            Ok(found) => match found.into_iter().next() {
                Some(first) => {
                    names.insert(key, first.clone());
                    Ok(first)
                }
                None => Err(PingError::NotResolving(key)),
            },
            Err(e) => {
                debug!("reverse lookup of {key} failed: {e}");
                Err(PingError::NotResolving(key))
            }
        }
    }

    /// Get the number of cached names
    pub fn len(&self) -> usize {
        self.names.lock().expect("mutex poisoned").len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.names.lock().expect("mutex poisoned").is_empty()
    }
}
