//! Web3Mail bulk dispatch library.

pub mod blockchain;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod session;
pub mod web3mail;

pub use config::schema::Web3MailConfig;
pub use lifecycle::CancelToken;
pub use session::{ErrorKind, LiveSession, Session, SessionError};
