//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Web3MailConfig (validated, immutable)
//!     → split into ChainConfig / GatewayConfig / DispatchConfig for each subsystem
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{ChainConfig, DispatchConfig, GatewayConfig, ObservabilityConfig, Web3MailConfig};
