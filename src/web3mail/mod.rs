//! Decentralized-mail collaborators.
//!
//! # Data Flow
//! ```text
//! Session operation
//!     → guard.rs (chain ID check, every call)
//!     → directory.rs (contact lookup)  ─┐
//!     → dispatcher.rs (one message)    ─┴→ gateway.rs (HTTP, signed requests)
//! ```
//!
//! # Design Decisions
//! - Each external capability is a trait so the workflow can run against test doubles
//! - Guard failures are recovered in the fetch path and propagated in the send path

pub mod directory;
pub mod dispatcher;
pub mod gateway;
pub mod guard;
pub mod types;

pub use directory::{fetch_my_contacts, ContactDirectory};
pub use dispatcher::{send_mail, MailDispatcher};
pub use gateway::GatewayClient;
pub use guard::{ChainGuard, ChainQuery};
pub use types::{
    Contact, ContactFetch, GatewayError, MessageDraft, SendRequest, TaskId, Web3MailError,
    CONTENT_TYPE, WRONG_NETWORK_MESSAGE,
};
