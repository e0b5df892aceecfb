//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router (admin endpoints + relay catch-all)
//! - Wire up middleware (request ID, tracing, admin request deadline)
//! - Seed the pool from configuration
//! - Spawn the background health monitor
//! - Serve until shutdown

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::config::RouterConfig;
use crate::health::{HealthMonitor, HealthProbe};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::load_balancer::{InstanceAddr, InstancePool};
use crate::observability::metrics;
use crate::routing::{RelayRequest, Router as ProxyRouter};

/// Upper bound on a buffered inbound request body.
const MAX_REQUEST_BYTES: usize = 2 * 1024 * 1024;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<InstancePool>,
    pub router: Arc<ProxyRouter>,
}

/// HTTP server for the failover router.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
    pool: Arc<InstancePool>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// The pool starts empty; configured backends are added by [`HttpServer::run`].
    pub fn new(config: RouterConfig) -> Self {
        let probe = HealthProbe::from_config(&config.health_check);
        let pool = Arc::new(InstancePool::new(probe));
        let proxy_router = Arc::new(ProxyRouter::new(pool.clone(), config.timeouts.forward()));

        let state = AppState {
            pool: pool.clone(),
            router: proxy_router,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            pool,
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Only the admin routes get the request deadline. Relay routes are
    /// bounded by the per-attempt forward timeout, so failover always runs
    /// to completion.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        Router::new()
            .merge(
                admin::admin_routes()
                    .layer(TimeoutLayer::new(config.timeouts.request())),
            )
            .route("/process", any(relay_handler))
            .route("/{*path}", any(relay_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(propagate_request_id_layer()),
            )
    }

    /// Shared handle to the instance pool.
    pub fn pool(&self) -> Arc<InstancePool> {
        self.pool.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Seed the pool, start the health monitor, and serve on `listener`
    /// until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;

        for (index, backend) in self.config.backends.iter().enumerate() {
            match backend.address.parse::<InstanceAddr>() {
                Ok(instance_addr) => {
                    self.pool.add(instance_addr).await;
                }
                Err(e) => {
                    tracing::warn!(index, address = %backend.address, error = %e, "Skipping invalid backend address");
                }
            }
        }

        if self.config.health_check.enabled {
            let monitor = HealthMonitor::new(
                self.pool.clone(),
                self.config.health_check.interval(),
            );
            tokio::spawn(monitor.run(shutdown.resubscribe()));
        } else {
            tracing::info!("Active health checks disabled");
        }

        tracing::info!(
            address = %addr,
            pool_size = self.pool.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Relay handler for `/process` and every path not owned by the admin API.
async fn relay_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let (parts, body) = request.into_parts();
    let request_id = request_id(&parts.headers).to_string();

    let body = match axum::body::to_bytes(body, MAX_REQUEST_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to buffer request body");
            metrics::record_request(StatusCode::PAYLOAD_TOO_LARGE.as_u16(), start);
            return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
        }
    };

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        path = %path_and_query,
        "Relaying request"
    );

    let relay_request = RelayRequest {
        method: parts.method,
        path_and_query,
        headers: parts.headers,
        body,
    };

    let response = match state.router.relay(&relay_request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Relay failed");
            e.into_response()
        }
    };

    metrics::record_request(response.status().as_u16(), start);
    response
}
