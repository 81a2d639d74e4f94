//! Session configuration with compile-time defaults

use crate::error::{PingError, Result};
use std::time::Duration;

/// Default number of Echo Requests per session
pub const DEFAULT_COUNT: u64 = 5;
/// Default pause before each transmission
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
/// Default deadline for a reply, measured from the start of the iteration
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(6);
/// Echo body reused for every request (a quote by Arthur Schopenhauer)
pub const PAYLOAD: &str = "A high degree of intellect tends to make a man unsocial.";

/// How an inbound message is matched to the outstanding request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Classify whatever arrives first inside the deadline
    #[default]
    FirstArrival,
    /// Require identifier and sequence to match; keep waiting otherwise
    Strict,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub count: u64,
    pub interval: Duration,
    pub timeout: Duration,
    pub payload: Vec<u8>,
    pub identifier: u16,
    pub match_policy: MatchPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            payload: PAYLOAD.as_bytes().to_vec(),
            identifier: (std::process::id() & 0xffff) as u16,
            match_policy: MatchPolicy::default(),
        }
    }
}

impl SessionConfig {
    /// Reject settings no session can run with
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 || self.count > u64::from(u16::MAX) {
            return Err(PingError::BadCount(self.count));
        }
        if self.timeout.is_zero() {
            return Err(PingError::BadOption("timeout must be greater than zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.count, 5);
        assert_eq!(config.interval, Duration::from_secs(1));
        assert_eq!(config.timeout, Duration::from_secs(6));
        assert_eq!(config.payload, PAYLOAD.as_bytes());
        assert_eq!(config.identifier, (std::process::id() & 0xffff) as u16);
        assert_eq!(config.match_policy, MatchPolicy::FirstArrival);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_count() {
        let config = SessionConfig { count: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(PingError::BadCount(0))));
    }

    #[test]
    fn test_validate_rejects_count_beyond_sequence_space() {
        let config = SessionConfig { count: 70_000, ..Default::default() };
        assert!(matches!(config.validate(), Err(PingError::BadCount(70_000))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = SessionConfig { timeout: Duration::ZERO, ..Default::default() };
        assert!(matches!(config.validate(), Err(PingError::BadOption(_))));
    }
}
