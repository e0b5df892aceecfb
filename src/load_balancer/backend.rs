//! Backend instance abstraction.
//!
//! # Responsibilities
//! - Represent a single backend instance (address + liveness flag)
//! - Allow the flag to be flipped without holding the pool lock
//!
//! # Design Decisions
//! - Instances are shared as `Arc<Instance>` so a probe or forward that
//!   outlives a concurrent removal only touches a detached flag
//! - Health is a single boolean; last write wins

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

/// Error returned when a `host:port` string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddrParseError {
    #[error("missing ':' separator in {0:?}")]
    MissingPort(String),
    #[error("empty host in {0:?}")]
    EmptyHost(String),
    #[error("invalid port {0:?}")]
    InvalidPort(String),
}

/// Network address of an instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceAddr {
    pub host: String,
    pub port: u16,
}

impl InstanceAddr {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Absolute `http://` URL for the given path on this instance.
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self, path_and_query)
    }
}

impl fmt::Display for InstanceAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bare IPv6 literals need brackets to be a valid URI authority.
        if self.host.contains(':') && !self.host.starts_with('[') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for InstanceAddr {
    type Err = AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| AddrParseError::MissingPort(s.to_string()))?;
        if host.is_empty() {
            return Err(AddrParseError::EmptyHost(s.to_string()));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| AddrParseError::InvalidPort(port.to_string()))?;
        Ok(Self::new(host, port))
    }
}

/// A single backend instance in the pool.
#[derive(Debug)]
pub struct Instance {
    /// The address of the instance.
    pub addr: InstanceAddr,
    healthy: AtomicBool,
}

impl Instance {
    /// Create a new instance. Instances start out unhealthy until probed.
    pub fn new(addr: InstanceAddr) -> Self {
        Self {
            addr,
            healthy: AtomicBool::new(false),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    /// Overwrite the liveness flag. Returns the previous value.
    pub fn set_healthy(&self, healthy: bool) -> bool {
        self.healthy.swap(healthy, Ordering::Relaxed)
    }

    pub fn mark_unhealthy(&self) -> bool {
        self.set_healthy(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_addr() {
        let addr: InstanceAddr = "127.0.0.1:5001".parse().unwrap();
        assert_eq!(addr, InstanceAddr::new("127.0.0.1", 5001));
        assert_eq!(addr.to_string(), "127.0.0.1:5001");
        assert_eq!(addr.url("/process?x=1"), "http://127.0.0.1:5001/process?x=1");

        let named: InstanceAddr = "backend.local:80".parse().unwrap();
        assert_eq!(named.host, "backend.local");
    }

    #[test]
    fn test_ipv6_hosts_are_bracketed() {
        let bare = InstanceAddr::new("::1", 5001);
        assert_eq!(bare.to_string(), "[::1]:5001");
        assert_eq!(bare.url("/health"), "http://[::1]:5001/health");
        assert!(bare.url("/health").parse::<axum::http::Uri>().is_ok());

        let bracketed: InstanceAddr = "[::1]:5001".parse().unwrap();
        assert_eq!(bracketed.url("/health"), "http://[::1]:5001/health");

        let round_trip: InstanceAddr = bare.to_string().parse().unwrap();
        assert_eq!(round_trip.url("/"), bare.url("/"));
    }

    #[test]
    fn test_parse_addr_errors() {
        assert!(matches!(
            "localhost".parse::<InstanceAddr>(),
            Err(AddrParseError::MissingPort(_))
        ));
        assert!(matches!(
            ":8080".parse::<InstanceAddr>(),
            Err(AddrParseError::EmptyHost(_))
        ));
        assert!(matches!(
            "localhost:99999".parse::<InstanceAddr>(),
            Err(AddrParseError::InvalidPort(_))
        ));
    }

    #[test]
    fn test_health_flag() {
        let instance = Instance::new(InstanceAddr::new("127.0.0.1", 1));
        assert!(!instance.is_healthy());

        assert!(!instance.set_healthy(true));
        assert!(instance.is_healthy());

        assert!(instance.mark_unhealthy());
        assert!(!instance.is_healthy());
    }
}
