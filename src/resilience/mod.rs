//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Session operation (chain check + gateway call):
//!     → timeouts.rs (enforce per-operation deadline)
//!     → lifecycle::cancel (raced against the in-flight call during bulk sends)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries: a failed send aborts the bulk run

pub mod timeouts;

pub use timeouts::{with_deadline, OperationTimeout};
