//! Edge Adapter Library
//!
//! Translates API Gateway (payload v1 and v2) and CloudFront Lambda@Edge
//! invocation events into plain HTTP requests for a generic request handler,
//! and translates the handler's responses back into the shape each platform
//! expects.

pub mod config;
pub mod edge;
pub mod error;
pub mod event;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod orchestrator;
pub mod runtime;

pub use config::schema::AdapterConfig;
pub use error::{AdapterError, AdapterResult};
pub use event::{Event, EventResult, Protocol};
pub use http::InvocationServer;
pub use lifecycle::Shutdown;
pub use orchestrator::{Orchestrator, Outcome, RequestHandler};
