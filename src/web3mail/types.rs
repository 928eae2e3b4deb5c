//! Mail domain types and error definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::types::BlockchainError;

/// Message shown when the chain guard rejects a contact fetch.
pub const WRONG_NETWORK_MESSAGE: &str = "Wrong network, please switch to iExec sidechain";

/// An address that granted the wallet owner permission to email it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Protected-data address used as the message recipient.
    pub address: String,
    /// Owner of the protected data, as reported by the directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// When access was granted, as reported by the directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_grant_timestamp: Option<String>,
}

impl Contact {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            owner: None,
            access_grant_timestamp: None,
        }
    }
}

/// Content type of every message this workflow sends.
pub const CONTENT_TYPE: &str = "text/plain";

/// User-edited message fields. Empty values are passed through as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageDraft {
    pub subject: String,
    pub body: String,
    pub sender_name: String,
}

/// One message submission.
#[derive(Debug, Clone, Copy)]
pub struct SendRequest<'a> {
    pub subject: &'a str,
    pub body: &'a str,
    pub recipient: &'a str,
    pub sender_name: &'a str,
}

impl<'a> SendRequest<'a> {
    /// Build a request addressed to `recipient` from the current draft.
    pub fn from_draft(draft: &'a MessageDraft, recipient: &'a str) -> Self {
        Self {
            subject: &draft.subject,
            body: &draft.body,
            recipient,
            sender_name: &draft.sender_name,
        }
    }
}

/// Opaque handle of the remote compute task processing a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a guarded contact fetch.
///
/// A rejected network is not an error here: the contact set is empty and
/// `error` carries the message to show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFetch {
    pub contacts: Vec<Contact>,
    pub error: Option<String>,
}

impl ContactFetch {
    pub fn wrong_network() -> Self {
        Self {
            contacts: Vec::new(),
            error: Some(WRONG_NETWORK_MESSAGE.to_string()),
        }
    }
}

/// Errors from the mail gateway (directory lookup and dispatch).
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Endpoint URL could not be built.
    #[error("invalid gateway URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure.
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("gateway returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape.
    #[error("invalid gateway response: {0}")]
    Decode(String),

    /// The gateway accepted the request but refused it.
    #[error("gateway rejected request: {0}")]
    Rejected(String),

    /// Could not sign the request.
    #[error(transparent)]
    Signing(#[from] BlockchainError),
}

/// Errors from a guarded mail operation.
#[derive(Debug, Error)]
pub enum Web3MailError {
    #[error(transparent)]
    Chain(#[from] BlockchainError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
