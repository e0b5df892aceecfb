//! Single-instance liveness probe.

use std::time::Duration;
use axum::body::Body;
use axum::http::Request;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tokio::time;

use crate::config::HealthCheckConfig;
use crate::load_balancer::backend::Instance;
use crate::observability::metrics;

/// Issues `GET <path>` against an instance with a fixed timeout.
#[derive(Debug, Clone)]
pub struct HealthProbe {
    client: Client<HttpConnector, Body>,
    path: String,
    timeout: Duration,
}

impl HealthProbe {
    pub fn new(path: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new())
            .build(HttpConnector::new());

        Self {
            client,
            path: path.into(),
            timeout,
        }
    }

    pub fn from_config(config: &HealthCheckConfig) -> Self {
        Self::new(config.path.clone(), config.timeout())
    }

    /// Probe the instance and store the result in its health flag.
    ///
    /// Timeouts, connection errors and non-success statuses all count as
    /// unhealthy.
    pub async fn check(&self, instance: &Instance) -> bool {
        let healthy = self.probe(instance).await;
        let was_healthy = instance.set_healthy(healthy);
        if was_healthy != healthy {
            tracing::info!(addr = %instance.addr, healthy, "Instance health changed");
        }
        metrics::record_backend_health(&instance.addr.to_string(), healthy);
        healthy
    }

    async fn probe(&self, instance: &Instance) -> bool {
        let addr = &instance.addr;
        let request = match Request::builder()
            .method("GET")
            .uri(addr.url(&self.path))
            .header("user-agent", "failover-router-health-check")
            .body(Body::empty()) {
                Ok(req) => req,
                Err(e) => {
                    tracing::error!(addr = %addr, error = %e, "Failed to build health check request");
                    return false;
                }
            };

        match time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let success = response.status().is_success();
                if !success {
                    tracing::debug!(addr = %addr, status = %response.status(), "Health check failed: non-success status");
                }
                success
            }
            Ok(Err(e)) => {
                tracing::debug!(addr = %addr, error = %e, "Health check failed: connection error");
                false
            }
            Err(_) => {
                tracing::debug!(addr = %addr, "Health check failed: timeout");
                false
            }
        }
    }
}
