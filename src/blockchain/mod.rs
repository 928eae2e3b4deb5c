//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Private key (CLI flag or environment)
//!     → wallet.rs (key parsing, request signing)
//!     → client.rs (chain ID queries with timeouts and failover)
//!     → web3mail::guard (network check before every mail operation)
//! ```
//!
//! # Security Constraints
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod types;
pub mod wallet;

pub use client::ChainClient;
pub use types::{BlockchainError, ChainConfig, ChainId, IEXEC_CHAIN_ID};
pub use wallet::Wallet;
