//! Lambda Runtime API integration.
//!
//! # Data Flow
//! ```text
//! GET  /runtime/invocation/next            → raw event + request id
//!     → Orchestrator::handle
//! POST /runtime/invocation/{id}/response   ← wire response / passthrough
//! POST /runtime/invocation/{id}/error      ← ErrorDocument on fatal error
//! ```
//!
//! # Design Decisions
//! - One invocation in flight at a time, as the platform guarantees
//! - Fatal adapter errors are reported per invocation; the loop continues
//! - Runtime API transport errors end the loop (the platform restarts us)

pub mod client;

pub use client::{Invocation, RuntimeClient, RuntimeError};

use tokio::sync::broadcast;
use tracing::Instrument;

use crate::orchestrator::Orchestrator;

/// Poll the Runtime API until shutdown, handling one invocation at a time.
pub async fn run(
    client: RuntimeClient,
    orchestrator: Orchestrator,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), RuntimeError> {
    tracing::info!(endpoint = %client.endpoint(), "Runtime loop starting");

    loop {
        let invocation = tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("Runtime loop stopping");
                return Ok(());
            }
            next = client.next_invocation() => next?,
        };

        let span = tracing::info_span!("invocation", request_id = %invocation.request_id);
        async {
            match orchestrator.handle(invocation.event).await {
                Ok(outcome) => client.send_response(&invocation.request_id, &outcome).await,
                Err(e) => client.send_error(&invocation.request_id, &e).await,
            }
        }
        .instrument(span)
        .await?;
    }
}
