//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Cancellation (cancel.rs):
//!     CancelToken fired → bulk run stops before the next send
//!
//! Signals (signals.rs):
//!     SIGINT → fire the CancelToken
//! ```

pub mod cancel;
pub mod signals;

pub use cancel::CancelToken;
