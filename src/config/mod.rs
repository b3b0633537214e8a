//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → AdapterConfig (validated, immutable)
//!     → loader.rs builds PrerenderedAssets (inline files + manifest)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; an invocation never changes it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_prerendered, ConfigError};
pub use schema::AdapterConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::PrerenderedConfig;
pub use schema::RuntimeConfig;
pub use schema::UpstreamConfig;
