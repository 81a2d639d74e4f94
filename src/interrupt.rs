use crate::error::Result;
use crate::messages::SessionMessage;
use crate::session::Reporter;
use std::io::{self, Write};
use std::process;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

/// Exit status when the run is cut short
pub const EXIT_INTERRUPTED: i32 = 1;

/// Trap SIGINT and spawn the thread that prints partial statistics and exits
pub fn start(reporter: Arc<Reporter>) -> Result<JoinHandle<()>> {
    let (tx, rx) = mpsc::channel::<SessionMessage>();
    ctrlc::set_handler(move || {
        let _ = tx.send(SessionMessage::Interrupted);
    })?;

    Ok(thread::spawn(move || {
        let stdout = io::stdout();
        if wait_and_report(&rx, &reporter, &mut stdout.lock()) {
            process::exit(EXIT_INTERRUPTED);
        }
    }))
}

/// Block until interrupted, then write the report
///
/// Returns false if the sending side went away without an interrupt.
fn wait_and_report<W: Write>(rx: &Receiver<SessionMessage>, reporter: &Reporter, out: &mut W) -> bool {
    match rx.recv() {
        Ok(SessionMessage::Interrupted) => {
            if let Err(e) = reporter.report(out).and_then(|_| out.flush()) {
                log::warn!("failed to write statistics: {e}");
            }
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::ReverseNameCache;
    use crate::dns::test_utils::MockDns;
    use crate::session::Target;
    use crate::stats::Statistics;
    use std::net::Ipv4Addr;

    fn reporter() -> Reporter {
        let target = Target { addr: Ipv4Addr::LOCALHOST, host: "localhost".to_string() };
        let cache = Arc::new(ReverseNameCache::new(Arc::new(MockDns::fixture())));
        Reporter::new(target, Arc::new(Statistics::new()), cache)
    }

    #[test]
    fn test_interrupt_reports_partial_counts() {
        let reporter = reporter();
        reporter.stats().on_sent();
        reporter.stats().on_sent();
        reporter.stats().on_received(3.0);

        let (tx, rx) = mpsc::channel();
        tx.send(SessionMessage::Interrupted).unwrap();
        let mut out = Vec::new();
        assert!(wait_and_report(&rx, &reporter, &mut out));
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\n--- localhost ping statistics ---\n\
             2 packets transmitted, 1 received, 50% packet loss\n\
             rtt min/avg/max/mdev = 3.000/3.000/3.000/0.000 ms\n"
        );
    }

    #[test]
    fn test_listener_returns_when_sender_dropped() {
        let reporter = reporter();
        let (tx, rx) = mpsc::channel::<SessionMessage>();
        drop(tx);
        let mut out = Vec::new();
        assert!(!wait_and_report(&rx, &reporter, &mut out));
        assert!(out.is_empty());
    }
}
