//! Relay with round-robin failover.
//!
//! # Responsibilities
//! - Pick instances from the pool in round-robin order
//! - Forward the buffered request with a per-attempt timeout
//! - Mark an instance unhealthy as soon as a forward to it fails
//! - Give up after one pass over the pool

use std::sync::Arc;
use std::time::Duration;
use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, Method, Request};
use axum::response::Response;
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use serde::de::IgnoredAny;
use tokio::time;

use crate::load_balancer::{Instance, InstancePool};
use crate::observability::metrics;
use crate::routing::error::{ForwardError, RelayError};

/// Upper bound on a buffered upstream response body.
const MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;

/// Connection-scoped headers that are not relayed in either direction.
const HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(name)
}

/// Buffered inbound request, replayable across attempts.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    pub method: Method,
    /// Path plus optional query, e.g. `/process?id=1`.
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RelayRequest {
    pub fn get(path_and_query: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path_and_query: path_and_query.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }
}

/// Forwards requests to pool members.
#[derive(Debug)]
pub struct Router {
    pool: Arc<InstancePool>,
    client: Client<HttpConnector, Body>,
    forward_timeout: Duration,
}

impl Router {
    pub fn new(pool: Arc<InstancePool>, forward_timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new())
            .build(HttpConnector::new());

        Self {
            pool,
            client,
            forward_timeout,
        }
    }

    pub fn pool(&self) -> &Arc<InstancePool> {
        &self.pool
    }

    /// Relay `request` to the next healthy instance, failing over on error.
    ///
    /// The backend's status, headers (minus hop-by-hop ones) and JSON body
    /// are passed through.
    ///
    /// At most `pool.len()` attempts are made; the bound is taken once at
    /// the start so concurrent pool changes cannot extend the loop.
    pub async fn relay(&self, request: &RelayRequest) -> Result<Response, RelayError> {
        let max_attempts = self.pool.len();
        if max_attempts == 0 {
            tracing::warn!(path = %request.path_and_query, "Relay on empty pool");
            return Err(RelayError::NoBackends);
        }

        for attempt in 1..=max_attempts {
            let Some(instance) = self.pool.select_next() else {
                tracing::warn!(path = %request.path_and_query, attempt, "No healthy instance left");
                break;
            };

            match self.forward(&instance, request).await {
                Ok(response) => {
                    tracing::debug!(
                        addr = %instance.addr,
                        attempt,
                        status = %response.status(),
                        "Relayed request"
                    );
                    return Ok(response);
                }
                Err(e) => {
                    tracing::warn!(
                        addr = %instance.addr,
                        attempt,
                        error = %e,
                        "Forward failed, marking instance unhealthy"
                    );
                    instance.mark_unhealthy();
                    metrics::record_failover(&instance.addr.to_string());
                    metrics::record_backend_health(&instance.addr.to_string(), false);
                }
            }
        }

        Err(RelayError::NoBackends)
    }

    async fn forward(
        &self,
        instance: &Instance,
        request: &RelayRequest,
    ) -> Result<Response, ForwardError> {
        let mut builder = Request::builder()
            .method(request.method.clone())
            .uri(instance.addr.url(&request.path_and_query));
        if let Some(headers) = builder.headers_mut() {
            for (name, value) in request.headers.iter() {
                if *name != header::HOST && !is_hop_by_hop(name) {
                    headers.append(name.clone(), value.clone());
                }
            }
        }
        let upstream = builder.body(Body::from(request.body.clone()))?;

        time::timeout(self.forward_timeout, async {
            let response: hyper::Response<Incoming> = self.client.request(upstream).await?;
            let (mut parts, body) = response.into_parts();
            let bytes = axum::body::to_bytes(Body::new(body), MAX_RESPONSE_BYTES).await?;
            serde_json::from_slice::<IgnoredAny>(&bytes)?;

            // The body is re-sent whole, so its framing is recomputed.
            let upstream_headers = std::mem::take(&mut parts.headers);
            for (name, value) in upstream_headers.iter() {
                if !is_hop_by_hop(name) && *name != header::CONTENT_LENGTH {
                    parts.headers.append(name.clone(), value.clone());
                }
            }
            parts.headers
                .entry(header::CONTENT_TYPE)
                .or_insert(header::HeaderValue::from_static("application/json"));
            Ok::<_, ForwardError>(Response::from_parts(parts, Body::from(bytes)))
        })
        .await
        .map_err(|_| ForwardError::Timeout)?
    }
}
