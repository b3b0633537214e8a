//! Local invocation server.
//!
//! # Data Flow
//! ```text
//! POST /invoke          (raw platform event as JSON)
//!     → server.rs (body limit, request id, timeout, trace)
//!     → Orchestrator::handle
//!     → wire response / passthrough request as JSON
//! POST /viewer-request  (edge viewer-request event)
//!     → edge::sanitizer
//! ```

pub mod server;

pub use server::{AppState, InvocationServer};
