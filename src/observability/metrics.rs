//! Metrics collection and exposition.
//!
//! # Metrics
//! - `web3mail_messages_sent_total` (counter): messages accepted by the gateway
//! - `web3mail_dispatch_failures_total` (counter): messages the gateway refused or lost
//! - `web3mail_chain_guard_rejections_total` (counter): operations blocked on a wrong network
//! - `web3mail_contacts_fetched_total` (counter): contacts returned by directory lookups
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const MESSAGES_SENT: &str = "web3mail_messages_sent_total";
pub const DISPATCH_FAILURES: &str = "web3mail_dispatch_failures_total";
pub const CHAIN_GUARD_REJECTIONS: &str = "web3mail_chain_guard_rejections_total";
pub const CONTACTS_FETCHED: &str = "web3mail_contacts_fetched_total";

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

pub fn record_message_sent() {
    metrics::counter!(MESSAGES_SENT).increment(1);
}

pub fn record_dispatch_failure() {
    metrics::counter!(DISPATCH_FAILURES).increment(1);
}

pub fn record_chain_guard_rejection() {
    metrics::counter!(CHAIN_GUARD_REJECTIONS).increment(1);
}

pub fn record_contacts_fetched(count: usize) {
    metrics::counter!(CONTACTS_FETCHED).increment(count as u64);
}
