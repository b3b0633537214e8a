//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the prerendered asset set
//! - Construct the request handler
//! - Assemble the orchestrator shared by every invocation

use std::sync::Arc;

use thiserror::Error;

use crate::config::{load_prerendered, AdapterConfig, ConfigError};
use crate::error::AdapterError;
use crate::orchestrator::{Orchestrator, UpstreamHandler};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("request handler: {0}")]
    Handler(#[from] AdapterError),
}

/// Build the orchestrator for a validated configuration, forwarding to the
/// configured upstream application.
pub fn build_orchestrator(config: &AdapterConfig) -> Result<Orchestrator, StartupError> {
    let assets = load_prerendered(config)?;
    let handler = UpstreamHandler::new(&config.upstream)?;

    tracing::info!(
        upstream = %config.upstream.address,
        prerendered = assets.len(),
        debug_events = config.observability.debug_events,
        "Orchestrator ready"
    );

    Ok(Orchestrator::new(Arc::new(handler), assets)
        .with_debug_events(config.observability.debug_events))
}
