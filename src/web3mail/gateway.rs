//! HTTP client for the mail gateway.
//!
//! # Responsibilities
//! - Look up the contacts authorized for a wallet (`POST v1/contacts`)
//! - Submit one message and return its task ID (`POST v1/mails`)
//! - Authenticate every request with an EIP-191 signature from the wallet
//!
//! The gateway fronts the decentralized-mail protocol; encryption and task
//! scheduling happen behind it.

use std::time::Duration;

use alloy::primitives::{hex, keccak256, Address, B256};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::blockchain::wallet::Wallet;
use crate::config::schema::GatewayConfig;
use crate::web3mail::directory::ContactDirectory;
use crate::web3mail::dispatcher::MailDispatcher;
use crate::web3mail::types::{Contact, GatewayError, SendRequest, TaskId, CONTENT_TYPE};

const CONTACTS_PATH: &str = "v1/contacts";
const MAILS_PATH: &str = "v1/mails";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContactsBody {
    owner: String,
    signature: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailBody<'a> {
    email_subject: &'a str,
    email_content: &'a str,
    protected_data: &'a str,
    content_type: &'static str,
    sender_name: &'a str,
    requester: String,
    signature: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailResponse {
    task_id: String,
}

/// Gateway client implementing both the directory and the dispatcher.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: Client,
    base_url: Url,
}

impl GatewayClient {
    /// Create a new gateway client.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut base_url = Url::parse(&config.base_url)
            .map_err(|e| GatewayError::InvalidUrl(format!("'{}': {}", config.base_url, e)))?;
        // Url::join replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        tracing::info!(base_url = %base_url, "Mail gateway client initialized");

        Ok(Self { http, base_url })
    }

    /// Get the normalized base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path)
            .map_err(|e| GatewayError::InvalidUrl(format!("'{}': {}", path, e)))
    }

    async fn sign(&self, wallet: &Wallet, payload: &str) -> Result<String, GatewayError> {
        let signature = wallet.sign_message(payload.as_bytes()).await?;
        Ok(hex::encode_prefixed(signature.as_bytes()))
    }

    async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        let resp = self.http.post(url).json(body).send().await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

impl ContactDirectory for GatewayClient {
    async fn fetch_contacts(&self, wallet: &Wallet) -> Result<Vec<Contact>, GatewayError> {
        let owner = wallet.address();
        let body = ContactsBody {
            owner: owner.to_string(),
            signature: self.sign(wallet, &contacts_payload(&owner)).await?,
        };

        let url = self.endpoint(CONTACTS_PATH)?;
        tracing::debug!(url = %url, owner = %owner, "Fetching contacts");
        self.post_json(url, &body).await
    }
}

impl MailDispatcher for GatewayClient {
    async fn send_email(
        &self,
        wallet: &Wallet,
        request: &SendRequest<'_>,
    ) -> Result<TaskId, GatewayError> {
        let requester = wallet.address();
        let payload = send_payload(&requester, request);
        let body = SendEmailBody {
            email_subject: request.subject,
            email_content: request.body,
            protected_data: request.recipient,
            content_type: CONTENT_TYPE,
            sender_name: request.sender_name,
            requester: requester.to_string(),
            signature: self.sign(wallet, &payload).await?,
        };

        let url = self.endpoint(MAILS_PATH)?;
        tracing::debug!(url = %url, recipient = %request.recipient, "Submitting message");
        let resp: SendEmailResponse = self.post_json(url, &body).await?;

        if resp.task_id.is_empty() {
            return Err(GatewayError::Rejected("empty taskId in response".to_string()));
        }
        Ok(TaskId(resp.task_id))
    }
}

/// Text signed to authorize a contact lookup.
fn contacts_payload(owner: &Address) -> String {
    format!("web3mail:contacts:{}", owner)
}

/// Text signed to authorize one message; binds recipient and content.
fn send_payload(requester: &Address, request: &SendRequest<'_>) -> String {
    format!(
        "web3mail:send:{}:{}:{}",
        requester,
        request.recipient,
        content_digest(request)
    )
}

fn content_digest(request: &SendRequest<'_>) -> B256 {
    let mut data = Vec::with_capacity(
        request.subject.len() + request.body.len() + request.sender_name.len() + 16,
    );
    data.extend_from_slice(request.subject.as_bytes());
    data.push(0);
    data.extend_from_slice(request.body.as_bytes());
    data.push(0);
    data.extend_from_slice(request.sender_name.as_bytes());
    data.push(0);
    data.extend_from_slice(CONTENT_TYPE.as_bytes());
    keccak256(&data)
}
