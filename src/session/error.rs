//! Session-level error type.
//!
//! Every workflow failure becomes a [`SessionError`]: `Display` gives the
//! human-readable message and [`SessionError::kind`] the machine-checkable
//! category.

use thiserror::Error;

use crate::blockchain::types::BlockchainError;
use crate::resilience::timeouts::OperationTimeout;
use crate::web3mail::types::{GatewayError, Web3MailError, WRONG_NETWORK_MESSAGE};

/// Category of a [`SessionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    WrongNetwork,
    InvalidCredential,
    NoWallet,
    NoContacts,
    WalletChanged,
    Busy,
    DispatchFailure,
    Timeout,
    Cancelled,
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// Connected to a network other than the sidechain.
    #[error("{0}")]
    WrongNetwork(String),

    /// Private key missing or malformed.
    #[error("{0}")]
    InvalidCredential(String),

    #[error("No wallet, create one from a private key first")]
    NoWallet,

    #[error("No contacts loaded")]
    NoContacts,

    /// The wallet was replaced while its contacts were being fetched.
    #[error("Wallet changed while fetching contacts, fetch again")]
    WalletChanged,

    /// A bulk send is already running on this session.
    #[error("A send to all contacts is already running")]
    Busy,

    /// The chain ID could not be read.
    #[error("Chain query failed: {0}")]
    Chain(#[source] BlockchainError),

    /// Directory lookup or message submission failed.
    #[error("Mail gateway failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Timeout(#[from] OperationTimeout),

    /// A bulk send stopped at its first failure.
    #[error("Stopped after {sent} of {total} messages, sending to {recipient} failed: {cause}")]
    Aborted {
        sent: usize,
        total: usize,
        recipient: String,
        #[source]
        cause: Box<SessionError>,
    },

    #[error("Cancelled after {sent} of {total} messages")]
    Cancelled { sent: usize, total: usize },
}

impl SessionError {
    /// Machine-checkable category. An aborted bulk send reports its cause.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::WrongNetwork(_) => ErrorKind::WrongNetwork,
            SessionError::InvalidCredential(_) => ErrorKind::InvalidCredential,
            SessionError::NoWallet => ErrorKind::NoWallet,
            SessionError::NoContacts => ErrorKind::NoContacts,
            SessionError::WalletChanged => ErrorKind::WalletChanged,
            SessionError::Busy => ErrorKind::Busy,
            SessionError::Chain(_) | SessionError::Gateway(_) => ErrorKind::DispatchFailure,
            SessionError::Timeout(_) => ErrorKind::Timeout,
            SessionError::Aborted { cause, .. } => cause.kind(),
            SessionError::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// Messages submitted before a bulk send stopped, if this ended one.
    pub fn sent(&self) -> Option<usize> {
        match self {
            SessionError::Aborted { sent, .. } | SessionError::Cancelled { sent, .. } => Some(*sent),
            _ => None,
        }
    }
}

impl From<BlockchainError> for SessionError {
    fn from(e: BlockchainError) -> Self {
        match e {
            BlockchainError::ChainMismatch { .. } => {
                SessionError::WrongNetwork(WRONG_NETWORK_MESSAGE.to_string())
            }
            BlockchainError::Wallet(msg) => SessionError::InvalidCredential(msg),
            other => SessionError::Chain(other),
        }
    }
}

impl From<Web3MailError> for SessionError {
    fn from(e: Web3MailError) -> Self {
        match e {
            Web3MailError::Chain(e) => e.into(),
            Web3MailError::Gateway(e) => e.into(),
        }
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
