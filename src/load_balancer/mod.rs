//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → pool.rs (select_next: round-robin over healthy instances)
//!     → backend.rs (instance address + health flag)
//!     → forward attempt; on failure the flag is cleared and the
//!       next candidate is requested
//! ```
//!
//! # Design Decisions
//! - Instance identity is its position in the pool
//! - Selection and mutation share one lock; network I/O never holds it
//! - Unhealthy instances are skipped, never evicted, by selection

pub mod backend;
pub mod pool;

pub use backend::{Instance, InstanceAddr};
pub use pool::InstancePool;
