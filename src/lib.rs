//! Health-aware round-robin request router.
//!
//! Keeps a pool of backend instances, probes them in the background, and
//! relays inbound requests to a healthy instance with failover.

pub mod admin;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod routing;

pub use config::schema::RouterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
