//! Event model and wire translation subsystem.
//!
//! # Data Flow
//! ```text
//! raw JSON event
//!     → classify.rs (which wire protocol produced it)
//!     → wire.rs (typed wire shape for that protocol)
//!     → inbound.rs (wire request → Event)
//!     → [orchestrator]
//!     → outbound.rs (EventResult → wire response)
//! ```
//!
//! # Design Decisions
//! - One sum type per direction, dispatched once by the classifier
//! - Translation is total: missing fields degrade to empty defaults
//! - `Event` and `EventResult` live for one invocation only

pub mod classify;
pub mod inbound;
pub mod outbound;
pub mod pairs;
pub mod wire;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::AdapterError;

pub use classify::classify;
pub use inbound::{convert_from, InboundEvent};
pub use outbound::{convert_to, WireResponse};
pub use pairs::Pairs;

/// The wire protocol an event arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    /// API Gateway REST / payload format 1.0.
    #[serde(rename = "v1")]
    GatewayV1,
    /// API Gateway HTTP API / payload format 2.0.
    #[serde(rename = "v2")]
    GatewayV2,
    /// CloudFront Lambda@Edge request event.
    #[serde(rename = "cf")]
    EdgeFunction,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::GatewayV1 => "v1",
            Protocol::GatewayV2 => "v2",
            Protocol::EdgeFunction => "cf",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v1" => Ok(Protocol::GatewayV1),
            "v2" => Ok(Protocol::GatewayV2),
            "cf" => Ok(Protocol::EdgeFunction),
            other => Err(AdapterError::UnsupportedEventKind(format!(
                "unknown protocol tag {other:?}"
            ))),
        }
    }
}

/// Protocol-agnostic request.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub protocol: Protocol,
    pub method: String,
    /// Path component, unescaped.
    pub raw_path: String,
    /// Path plus normalized query string.
    pub url: String,
    pub body: Bytes,
    /// Lower-case header name to a single (pre-joined) value.
    pub headers: BTreeMap<String, String>,
    pub remote_address: String,
}

impl Event {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// A response header value as produced by the handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Single(String),
    Multi(Vec<String>),
    Null,
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::Single(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        HeaderValue::Single(value)
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(values: Vec<String>) -> Self {
        HeaderValue::Multi(values)
    }
}

/// Protocol-agnostic response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResult {
    /// Must equal the originating event's protocol.
    #[serde(rename = "type")]
    pub protocol: Protocol,
    pub status_code: u16,
    /// Original-case header name to value, in handler order.
    pub headers: Pairs<HeaderValue>,
    pub body: String,
    pub is_base64_encoded: bool,
}
