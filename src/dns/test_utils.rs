//! Scripted DNS backend for tests

use super::Dns;
use std::collections::HashMap;
use std::io;
use std::net::IpAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// DNS backend answering from fixed tables and counting every query
#[derive(Default)]
pub struct MockDns {
    hosts: HashMap<String, Vec<IpAddr>>,
    names: Mutex<HashMap<String, Vec<String>>>,
    forward_queries: AtomicUsize,
    reverse_queries: AtomicUsize,
}

impl MockDns {
    /// The fixture used across the test suite
    pub fn fixture() -> Self {
        let mut dns = MockDns::default();
        dns.hosts.insert(
            "localhost".to_string(),
            vec![
                "::1".parse().unwrap(),
                "fe80::1".parse().unwrap(),
                "127.0.0.1".parse().unwrap(),
            ],
        );
        dns.hosts
            .insert("www.google.com".to_string(), vec!["216.58.193.68".parse().unwrap()]);
        dns.hosts.insert("ipv6.only".to_string(), vec!["2001:db8::1".parse().unwrap()]);
        dns.hosts.insert("empty.answer".to_string(), Vec::new());
        dns.set_names("127.0.0.1", &["localhost", "frodo"]);
        dns
    }

    /// Replace the reverse answer for an address
    pub fn set_names(&self, addr: &str, names: &[&str]) {
        self.names.lock().unwrap().insert(
            addr.to_string(),
            names.iter().map(|n| n.to_string()).collect(),
        );
    }

    pub fn hosts_mut(&mut self) -> &mut HashMap<String, Vec<IpAddr>> {
        &mut self.hosts
    }

    pub fn forward_queries(&self) -> usize {
        self.forward_queries.load(Ordering::SeqCst)
    }

    pub fn reverse_queries(&self) -> usize {
        self.reverse_queries.load(Ordering::SeqCst)
    }
}

impl Dns for MockDns {
    fn lookup_host(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        self.forward_queries.fetch_add(1, Ordering::SeqCst);
        self.hosts
            .get(host)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such host"))
    }

    fn lookup_addr(&self, addr: &IpAddr) -> io::Result<Vec<String>> {
        self.reverse_queries.fetch_add(1, Ordering::SeqCst);
        self.names
            .lock()
            .unwrap()
            .get(&addr.to_string())
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "unrecognized address"))
    }
}
