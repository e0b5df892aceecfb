//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Pool membership is runtime state; the file only seeds it

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::RouterConfig;
pub use schema::ListenerConfig;
pub use schema::BackendConfig;
pub use schema::HealthCheckConfig;
pub use schema::TimeoutConfig;
pub use schema::ObservabilityConfig;
