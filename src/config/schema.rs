//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the mail
//! client. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the mail client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Web3MailConfig {
    /// Sidechain RPC settings and the chain guard's expected network.
    pub chain: ChainConfig,

    /// Mail gateway (directory + dispatch) settings.
    pub gateway: GatewayConfig,

    /// Message dispatch behaviour.
    pub dispatch: DispatchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Chain RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Chain ID the guard requires, compared as a string.
    pub expected_chain_id: String,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://bellecour.iex.ec".to_string(),
            failover_urls: Vec::new(),
            expected_chain_id: crate::blockchain::types::IEXEC_CHAIN_ID.to_string(),
            rpc_timeout_secs: 10,
        }
    }
}

/// Mail gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of the gateway (e.g., "https://gateway.example/").
    pub base_url: String,

    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8787".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Dispatch workflow configuration.
///
/// Messages are always sent as `text/plain`; there is no content type setting.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Deadline for one chain check plus one message submission.
    pub send_timeout_secs: u64,

    /// Deadline for one chain check plus the contact lookup.
    pub fetch_timeout_secs: u64,

    /// Rows per page in the contact table.
    pub contacts_per_page: usize,

    /// Number of page links shown in the pagination strip.
    pub page_window: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            send_timeout_secs: 60,
            fetch_timeout_secs: 60,
            contacts_per_page: 10,
            page_window: 1,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
