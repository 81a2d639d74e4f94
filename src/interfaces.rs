use crate::error::{PingError, Result};
use pnet::datalink::{self, NetworkInterface};
use std::io::{self, Write};
use std::net::{IpAddr, Ipv4Addr};

fn ipv4_addrs(interface: &NetworkInterface) -> Vec<Ipv4Addr> {
    interface
        .ips
        .iter()
        .filter_map(|ip| match ip.ip() {
            IpAddr::V4(v4) if !v4.is_unspecified() => Some(v4),
            _ => None,
        })
        .collect()
}

/// Print every interface that carries an IPv4 address
pub fn list_interfaces<W: Write>(out: &mut W) -> io::Result<()> {
    let mut interfaces = datalink::interfaces();
    interfaces.sort_by_key(|k| k.index);
    for i in &interfaces {
        let ips = ipv4_addrs(i).iter().map(|ip| ip.to_string()).collect::<Vec<String>>();
        if !ips.is_empty() {
            writeln!(out, "Index: {:2}, Name: {}, IP: {}", i.index, i.name, ips.join(", "))?;
        }
    }
    Ok(())
}

/// First IPv4 address of the named interface, used as the probe source
pub fn source_address(name: &str) -> Result<Ipv4Addr> {
    find_source_address(&datalink::interfaces(), name)
}

fn find_source_address(interfaces: &[NetworkInterface], name: &str) -> Result<Ipv4Addr> {
    interfaces
        .iter()
        .find(|i| i.name == name)
        .and_then(|i| ipv4_addrs(i).into_iter().next())
        .ok_or_else(|| PingError::UnknownInterface(name.to_string()))
}
