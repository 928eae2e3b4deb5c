//! User session and the bulk-send workflow.
//!
//! # Data Flow
//! ```text
//! create_wallet(private key)
//!     → load_contacts()          chain guard → directory → contacts swapped in
//!     → set_draft / update_draft
//!     → send_message(recipient)  chain guard → dispatcher
//!     → send_to_all(cancel)      for each contact: progress label → chain guard → dispatcher
//! ```
//!
//! # Design Decisions
//! - Every failure is a typed `SessionError` and is also kept for the status view
//! - Loading flag, busy flag and progress label are reset on every exit path

pub mod bulk;
pub mod error;
pub mod pagination;
pub mod state;

pub use bulk::{BulkReport, BulkState, Delivery, Progress};
pub use error::{ErrorKind, SessionError, SessionResult};
pub use pagination::{Page, Pager};
pub use state::{LiveSession, Session, SessionStatus};
