//! Delivery counters and streaming RTT statistics

use std::io::{self, Write};
use std::sync::Mutex;

/// Single-pass mean/variance estimator (Welford), samples in milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RttEstimator {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RttEstimator {
    pub fn push(&mut self, sample: f64) {
        self.count += 1;
        if self.count == 1 {
            self.min = sample;
            self.max = sample;
        } else {
            self.min = self.min.min(sample);
            self.max = self.max.max(sample);
        }

        let delta = sample - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (sample - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Standard deviation over all samples seen (`sqrt(m2 / n)`)
    pub fn std_dev(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.m2 / self.count as f64).sqrt()
    }
}

/// Consistent view of every counter at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Snapshot {
    pub sent: u64,
    pub received: u64,
    pub errors: u64,
    pub rtt: RttEstimator,
}

impl Snapshot {
    /// Rounded loss percentage; 0 when nothing was sent
    pub fn loss_percent(&self) -> u64 {
        if self.sent == 0 {
            return 0;
        }
        if self.received == 0 {
            return 100;
        }
        let lost = self.sent.saturating_sub(self.received) as f64;
        (lost / self.sent as f64 * 100.0).round() as u64
    }

    pub fn needs_detailed_stats(&self) -> bool {
        self.sent > 0 && self.received > 0 && self.received <= self.sent
    }

    /// Header, then the transmitted/received/loss line
    pub fn write_summary<W: Write>(&self, out: &mut W, header: &str) -> io::Result<()> {
        let errors = if self.errors > 0 {
            format!("+{} errors, ", self.errors)
        } else {
            String::new()
        };
        writeln!(out, "{header}")?;
        writeln!(
            out,
            "{} packets transmitted, {} received, {}{}% packet loss",
            self.sent,
            self.received,
            errors,
            self.loss_percent()
        )
    }

    /// The rtt line, only once some reply has been seen
    pub fn write_rtt<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if !self.needs_detailed_stats() {
            return Ok(());
        }
        writeln!(
            out,
            "rtt min/avg/max/mdev = {:.3}/{:.3}/{:.3}/{:.3} ms",
            self.rtt.min(),
            self.rtt.mean(),
            self.rtt.max(),
            self.rtt.std_dev()
        )
    }
}

/// Session-wide statistics, shared between the probe loop and the interrupt listener
///
/// All fields sit behind one lock so a report never mixes counts from
/// different moments.
#[derive(Debug, Default)]
pub struct Statistics {
    inner: Mutex<Snapshot>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// An Echo Request was written
    pub fn on_sent(&self) {
        self.inner.lock().expect("mutex poisoned").sent += 1;
    }

    /// An Echo Reply arrived after `rtt_ms` milliseconds
    pub fn on_received(&self, rtt_ms: f64) {
        let mut inner = self.inner.lock().expect("mutex poisoned");
        inner.received += 1;
        inner.rtt.push(rtt_ms);
    }

    /// Destination Unreachable or Time Exceeded came back
    pub fn on_error(&self) {
        self.inner.lock().expect("mutex poisoned").errors += 1;
    }

    pub fn snapshot(&self) -> Snapshot {
        *self.inner.lock().expect("mutex poisoned")
    }

    /// Write the header and the transmitted/received/loss line
    pub fn render<W: Write>(&self, out: &mut W, header: &str) -> io::Result<()> {
        self.snapshot().write_summary(out, header)
    }

    /// Write the RTT summary line, if there is anything meaningful to show
    pub fn render_rtt<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.snapshot().write_rtt(out)
    }

    /// `render` followed by `render_rtt`, both from a single snapshot
    pub fn report<W: Write>(&self, out: &mut W, header: &str) -> io::Result<()> {
        let snapshot = self.snapshot();
        snapshot.write_summary(out, header)?;
        snapshot.write_rtt(out)
    }
}
