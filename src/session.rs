//! The probe loop and the report it shares with the interrupt listener

use crate::codec::{ReplyKind, decode_reply, encode_echo_request};
use crate::config::{MatchPolicy, SessionConfig};
use crate::dns::ReverseNameCache;
use crate::error::{PingError, Result};
use crate::peer::{Peer, choose_peer};
use crate::stats::Statistics;
use crate::transport::{RECV_BUFFER_SIZE, Transport};
use log::debug;
use std::io::{self, Write};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

/// Bytes of IPv4 + ICMP header on top of the echo payload
const HEADER_OVERHEAD: usize = 28;

/// The address being probed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub addr: Ipv4Addr,
    /// Host string as supplied by the user
    pub host: String,
}

/// How one sequence number ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Matched,
    /// Destination Unreachable or Time Exceeded
    IcmpError,
    /// Something else arrived (e.g. our own request looping back)
    Unclassified,
    TimedOut,
    WriteFailed,
}

/// Everything needed to print the final statistics, from either flow
pub struct Reporter {
    target: Target,
    stats: Arc<Statistics>,
    cache: Arc<ReverseNameCache>,
    last_responder: Mutex<Option<IpAddr>>,
}

impl Reporter {
    pub fn new(target: Target, stats: Arc<Statistics>, cache: Arc<ReverseNameCache>) -> Self {
        Self {
            target,
            stats,
            cache,
            last_responder: Mutex::new(None),
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    fn note_responder(&self, addr: IpAddr) {
        *self.last_responder.lock().expect("mutex poisoned") = Some(addr);
    }

    /// Identity to show in the report heading
    pub fn peer(&self) -> Peer {
        let target_addr = IpAddr::V4(self.target.addr);
        let target_name = self.cache.reverse(Some(target_addr));
        let responder = *self.last_responder.lock().expect("mutex poisoned");
        let responding_name = self.cache.reverse(responder);
        choose_peer(Some(target_addr), &target_name, responder, &responding_name)
    }

    fn identify(&self, addr: IpAddr) -> Peer {
        choose_peer(None, &Err(PingError::MissingPeer), Some(addr), &self.cache.reverse(Some(addr)))
    }

    /// Heading plus statistics, built from whatever has accumulated so far
    pub fn report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let heading = format!("\n--- {} ping statistics ---", self.peer().fqdn);
        self.stats.report(out, &heading)
    }
}

/// Sequential Echo Request / Echo Reply loop
pub struct ProbeSession<T: Transport, W: Write> {
    config: SessionConfig,
    transport: T,
    reporter: Arc<Reporter>,
    out: W,
}

impl<T: Transport, W: Write> ProbeSession<T, W> {
    pub fn new(config: SessionConfig, transport: T, reporter: Arc<Reporter>, out: W) -> Self {
        Self { config, transport, reporter, out }
    }

    /// Probe every sequence number once, then print the report
    pub fn run(&mut self) -> Result<()> {
        self.config.validate()?;
        let target = self.reporter.target().clone();
        writeln!(
            self.out,
            "PING {} ({}) {}({}) bytes of data.",
            target.host,
            target.addr,
            self.config.payload.len(),
            self.config.payload.len() + HEADER_OVERHEAD
        )?;

        // validate() keeps it within u16
        let count = self.config.count as u16;
        for sequence in 1..=count {
            let outcome = self.probe(sequence)?;
            debug!("icmp_seq={sequence} ended as {outcome:?}");
        }

        self.reporter.report(&mut self.out)?;
        self.out.flush()?;
        Ok(())
    }

    /// Send one Echo Request and wait for its answer
    pub fn probe(&mut self, sequence: u16) -> Result<ProbeOutcome> {
        let identifier = self.config.identifier;
        let dest = self.reporter.target().addr;
        let request = encode_echo_request(identifier, sequence, &self.config.payload)?;

        let deadline = Instant::now() + self.config.timeout;
        thread::sleep(self.config.interval);

        let start = Instant::now();
        if let Err(e) = self.transport.send_to(&request, dest) {
            eprintln!("{sequence} connect: Network is unreachable");
            debug!("send to {dest} failed: {e}");
            return Ok(ProbeOutcome::WriteFailed);
        }
        self.reporter.stats().on_sent();

        let mut buf = [0u8; RECV_BUFFER_SIZE];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let (size, from) = match self.transport.recv_from(&mut buf, remaining) {
                Ok(received) => received,
                Err(e) => {
                    writeln!(self.out, "no response from {dest}: icmp_seq={sequence}")?;
                    debug!("read failed: {e}");
                    return Ok(ProbeOutcome::TimedOut);
                }
            };
            let elapsed = start.elapsed();
            let reply = decode_reply(&buf[..size])?;

            if self.config.match_policy == MatchPolicy::Strict && !reply.answers(identifier, sequence) {
                debug!("ignoring {reply:?} from {from} while waiting for icmp_seq={sequence}");
                continue;
            }
            self.reporter.note_responder(from);

            return match reply.kind {
                ReplyKind::EchoReply => {
                    let rtt_ms = elapsed.as_secs_f64() * 1000.0;
                    self.reporter.stats().on_received(rtt_ms);
                    let peer = self.reporter.identify(from);
                    writeln!(
                        self.out,
                        "{} bytes from {}: icmp_seq={} time={:.3} ms",
                        reply.size, peer, sequence, rtt_ms
                    )?;
                    debug!("RTT {} ns; {reply:?}", elapsed.as_nanos());
                    Ok(ProbeOutcome::Matched)
                }
                ReplyKind::DestinationUnreachable => {
                    self.reporter.stats().on_error();
                    writeln!(
                        self.out,
                        "From {from} icmp_seq={sequence} Destination Unreachable (code {})",
                        reply.code
                    )?;
                    Ok(ProbeOutcome::IcmpError)
                }
                ReplyKind::TimeExceeded => {
                    self.reporter.stats().on_error();
                    writeln!(self.out, "From {from} icmp_seq={sequence} Time to live exceeded")?;
                    Ok(ProbeOutcome::IcmpError)
                }
                ReplyKind::EchoRequest => {
                    debug!("echo from {from}: {reply:?}");
                    Ok(ProbeOutcome::Unclassified)
                }
                ReplyKind::Other(icmp_type) => {
                    debug!("unexpected ICMP type {icmp_type} from {from}: {reply:?}");
                    Ok(ProbeOutcome::Unclassified)
                }
            };
        }
    }

    #[cfg(test)]
    pub(crate) fn into_parts(self) -> (T, W) {
        (self.transport, self.out)
    }
}
