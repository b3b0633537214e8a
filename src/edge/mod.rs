//! Viewer-request processing at the edge.
//!
//! Runs on the CDN before the origin request event exists, in a restricted
//! environment: no I/O, no failure path, synchronous.

pub mod sanitizer;

pub use sanitizer::{encode_uri_component, handle_viewer_request, sanitize_request};
