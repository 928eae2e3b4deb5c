//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate URLs and value ranges (timeouts > 0, page sizes > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Web3MailConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::Web3MailConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &Web3MailConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = url::Url::parse(&config.chain.rpc_url) {
        errors.push(ValidationError::new("chain.rpc_url", format!("invalid URL: {}", e)));
    }
    for url_str in &config.chain.failover_urls {
        if url::Url::parse(url_str).is_err() {
            errors.push(ValidationError::new(
                "chain.failover_urls",
                format!("invalid URL '{}'", url_str),
            ));
        }
    }
    if config.chain.expected_chain_id.parse::<u64>().is_err() {
        errors.push(ValidationError::new(
            "chain.expected_chain_id",
            "must be a decimal chain ID",
        ));
    }
    if config.chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.rpc_timeout_secs", "must be greater than 0"));
    }

    if let Err(e) = url::Url::parse(&config.gateway.base_url) {
        errors.push(ValidationError::new("gateway.base_url", format!("invalid URL: {}", e)));
    }
    if config.gateway.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "gateway.request_timeout_secs",
            "must be greater than 0",
        ));
    }

    if config.dispatch.send_timeout_secs == 0 {
        errors.push(ValidationError::new("dispatch.send_timeout_secs", "must be greater than 0"));
    }
    if config.dispatch.fetch_timeout_secs == 0 {
        errors.push(ValidationError::new("dispatch.fetch_timeout_secs", "must be greater than 0"));
    }
    if config.dispatch.contacts_per_page == 0 {
        errors.push(ValidationError::new("dispatch.contacts_per_page", "must be greater than 0"));
    }
    if config.dispatch.page_window == 0 {
        errors.push(ValidationError::new("dispatch.page_window", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "must be a socket address when metrics are enabled",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
