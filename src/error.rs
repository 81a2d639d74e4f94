//! Error types for probe sessions

use std::io;
use thiserror::Error;

/// Errors that can occur while resolving, probing or reporting
#[derive(Debug, Error)]
pub enum PingError {
    /// The target could not be parsed or resolved to an IPv4 address
    #[error("Unknown host: {0}")]
    UnknownHost(String),

    /// No target was supplied on the command line
    #[error("No target host specified")]
    NoTarget,

    /// Packet count (or another numeric option) is out of range
    #[error("Bad count: {0} (must be between 1 and 65535)")]
    BadCount(u64),

    /// An option value is out of range
    #[error("Invalid option: {0}")]
    BadOption(String),

    /// Reverse lookup was asked for a peer it was never given
    #[error("Peer argument is missing")]
    MissingPeer,

    /// No reverse name was found for the peer
    #[error("Peer not resolving: {0}")]
    NotResolving(String),

    /// IPv6 targets are not supported
    #[error("IPv6 targets are not supported")]
    Ipv6NotSupported,

    /// The source interface was not found or carries no IPv4 address
    #[error("Unknown interface: {0}")]
    UnknownInterface(String),

    /// An ICMP packet could not be built or parsed
    #[error("ICMP codec failure: {0}")]
    Codec(String),

    /// Raw socket failure
    #[error("Socket error: {0}")]
    Socket(#[from] io::Error),

    /// The interrupt handler could not be installed
    #[error("Unable to trap interrupt: {0}")]
    Signal(#[from] ctrlc::Error),
}

impl PingError {
    /// Whether the error stems from how the program was invoked
    ///
    /// Usage errors exit with status 2 and print the usage text.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            PingError::UnknownHost(_)
                | PingError::NoTarget
                | PingError::BadCount(_)
                | PingError::BadOption(_)
                | PingError::Ipv6NotSupported
                | PingError::UnknownInterface(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PingError>;
