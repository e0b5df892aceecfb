//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Fixed-interval loop
//!     → InstancePool::health_check_all
//!     → probe.rs per instance
//!
//! Passive health checks (routing::Router):
//!     Forward attempt fails
//!     → instance flag cleared immediately
//! ```
//!
//! # State Machine
//! ```text
//! unhealthy → healthy:   successful probe only
//! healthy   → unhealthy: failed probe or failed forward
//! ```

pub mod active;
pub mod probe;

pub use active::HealthMonitor;
pub use probe::HealthProbe;
