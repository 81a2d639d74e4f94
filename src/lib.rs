//! rtping - ICMP echo round-trip probe
//!
//! Sends sequence-numbered Echo Requests over a raw IPv4 socket, waits for
//! each reply under a deadline and reports loss and RTT statistics, also
//! when the run is interrupted.

pub mod codec;
pub mod config;
pub mod dns;
pub mod error;
pub mod interfaces;
pub mod interrupt;
pub mod messages;
pub mod peer;
pub mod session;
pub mod stats;
pub mod transport;

pub use config::{MatchPolicy, SessionConfig};
pub use error::{PingError, Result};
pub use session::{ProbeOutcome, ProbeSession, Reporter, Target};
pub use stats::Statistics;
