//! Request relay subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request (buffered)
//!     → router.rs: up to pool-size cycles of
//!         select_next → forward (bounded timeout)
//!         → success: backend response returned verbatim
//!         → failure: instance marked unhealthy, next cycle
//!     → exhausted / empty pool: RelayError::NoBackends
//! ```

pub mod error;
pub mod router;

pub use error::{ForwardError, RelayError};
pub use router::{RelayRequest, Router};
