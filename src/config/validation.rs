//! Configuration validation.
//!
//! Returns every error found, not just the first. Pure function of the
//! parsed config; runs before the config is accepted.

use std::net::SocketAddr;
use crate::config::schema::RouterConfig;
use crate::load_balancer::backend::{AddrParseError, InstanceAddr};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a host:port address")]
    BindAddress(String),
    #[error("timeouts.request_secs ({request_secs}) is shorter than health_check.timeout_secs ({probe_secs})")]
    RequestDeadline {
        request_secs: u64,
        probe_secs: u64,
    },
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("health_check.path {0:?} must start with '/'")]
    HealthPath(String),
    #[error("backends[{index}]: {source}")]
    BackendAddress {
        index: usize,
        source: AddrParseError,
    },
    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),
}

pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Host names are resolved at bind time.
    if config.listener.bind_address.parse::<InstanceAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    let durations = [
        ("health_check.interval_secs", config.health_check.interval_secs),
        ("health_check.timeout_secs", config.health_check.timeout_secs),
        ("timeouts.forward_secs", config.timeouts.forward_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
    ];
    for (name, value) in durations {
        if value == 0 {
            errors.push(ValidationError::ZeroDuration(name));
        }
    }

    // Admin requests probe instances inside the request deadline.
    if config.timeouts.request_secs < config.health_check.timeout_secs {
        errors.push(ValidationError::RequestDeadline {
            request_secs: config.timeouts.request_secs,
            probe_secs: config.health_check.timeout_secs,
        });
    }

    if !config.health_check.path.starts_with('/') {
        errors.push(ValidationError::HealthPath(config.health_check.path.clone()));
    }

    for (index, backend) in config.backends.iter().enumerate() {
        if let Err(source) = backend.address.parse::<InstanceAddr>() {
            errors.push(ValidationError::BackendAddress { index, source });
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
