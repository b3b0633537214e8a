//! Request orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! raw event (Received)
//!     → classify + inbound translation (Classified)
//!     → host correction (x-forwarded-host → host)
//!     → GET with prerendered match?  → ShortCircuit
//!         edge:    original request, uri rewritten
//!         gateway: 200 text/html from local storage
//!     → otherwise                    → Forwarded
//!         handler.rs (one awaited call)
//!         binary.rs (base64 or text body)
//!     → outbound translation (Responded)
//! ```
//!
//! # Design Decisions
//! - The handler is an explicit dependency, constructed by the entry point
//! - No state survives an invocation
//! - Verbose event logging is a side channel and never changes behavior

pub mod binary;
pub mod handler;
pub mod prerendered;

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, HOST};
use axum::http::{HeaderName, HeaderValue as HttpHeaderValue, Method, Request, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::{AdapterError, AdapterResult};
use crate::event::wire::CloudFrontRequest;
use crate::event::{
    convert_from, convert_to, Event, EventResult, HeaderValue, InboundEvent, Pairs, Protocol,
    WireResponse,
};
use crate::observability::metrics;

pub use binary::is_binary_content_type;
pub use handler::{ClientAddress, RequestHandler, UpstreamHandler};
pub use prerendered::{PrerenderedAssets, PRERENDERED_CACHE_CONTROL};

/// Header set by the edge sanitizer (or the platform) carrying the public host.
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";

const NOT_FOUND_BODY: &str = "Not found.";

/// What an invocation hands back to the platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    /// A response in the originating wire shape.
    Response(WireResponse),
    /// An edge request to be served by the platform's own origin fetch.
    Passthrough(Box<CloudFrontRequest>),
}

/// Drives one invocation from raw event to wire output.
#[derive(Clone)]
pub struct Orchestrator {
    handler: Arc<dyn RequestHandler>,
    assets: PrerenderedAssets,
    debug_events: bool,
}

impl Orchestrator {
    pub fn new(handler: Arc<dyn RequestHandler>, assets: PrerenderedAssets) -> Self {
        Self {
            handler,
            assets,
            debug_events: false,
        }
    }

    /// Log every inbound event, synthesized request and produced output.
    pub fn with_debug_events(mut self, enabled: bool) -> Self {
        self.debug_events = enabled;
        self
    }

    pub fn assets(&self) -> &PrerenderedAssets {
        &self.assets
    }

    /// Handle one raw invocation event.
    pub async fn handle(&self, raw: Value) -> AdapterResult<Outcome> {
        let start = Instant::now();
        if self.debug_events {
            tracing::info!(event = %raw, "Inbound event");
        }

        let inbound = match InboundEvent::from_value(raw) {
            Ok(inbound) => inbound,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected inbound event");
                metrics::record_invocation("unknown", "error", start);
                return Err(e);
            }
        };
        let protocol = inbound.protocol();

        let result = self.dispatch(inbound).await;
        match &result {
            Ok(outcome) => {
                if self.debug_events {
                    let rendered = serde_json::to_string(outcome).unwrap_or_default();
                    tracing::info!(protocol = %protocol, output = %rendered, "Invocation output");
                }
                metrics::record_invocation(protocol.as_str(), outcome_label(outcome), start);
            }
            Err(e) => {
                tracing::error!(protocol = %protocol, error = %e, "Invocation failed");
                metrics::record_invocation(protocol.as_str(), "error", start);
            }
        }
        result
    }

    async fn dispatch(&self, inbound: InboundEvent) -> AdapterResult<Outcome> {
        let mut event = convert_from(&inbound);
        correct_host(&mut event);

        tracing::debug!(
            protocol = %event.protocol,
            method = %event.method,
            path = %event.raw_path,
            "Event classified"
        );

        if event.method == Method::GET.as_str() {
            if let Some(file) = self.assets.resolve(&event.raw_path) {
                metrics::record_prerendered_hit(event.protocol.as_str());
                return self.short_circuit(inbound, &event, &file);
            }
        }

        self.forward(event).await
    }

    fn short_circuit(&self, inbound: InboundEvent, event: &Event, file: &str) -> AdapterResult<Outcome> {
        tracing::debug!(protocol = %event.protocol, file = %file, "Serving prerendered file");

        if let InboundEvent::EdgeFunction(edge) = inbound {
            let mut request = edge.into_request().unwrap_or_default();
            request.uri = format!("/{file}");
            return Ok(Outcome::Passthrough(Box::new(request)));
        }

        let body = self.assets.read(file)?;
        let headers: Pairs<HeaderValue> = [
            ("content-type", HeaderValue::from("text/html")),
            ("cache-control", HeaderValue::from(PRERENDERED_CACHE_CONTROL)),
        ]
        .into_iter()
        .collect();

        Ok(Outcome::Response(convert_to(EventResult {
            protocol: event.protocol,
            status_code: 200,
            headers,
            body,
            is_base64_encoded: false,
        })))
    }

    async fn forward(&self, event: Event) -> AdapterResult<Outcome> {
        let host = event.header(HOST.as_str()).unwrap_or("localhost");
        // Paths arrive unescaped; parsing percent-encodes them into a valid URI.
        let url = Url::parse(&format!("https://{host}{}", event.url))
            .map_err(|e| AdapterError::InvalidRequest(format!("url {:?}: {e}", event.url)))?;
        let request = build_request(&event, url.as_str())?;

        if self.debug_events {
            tracing::info!(
                url = %url,
                method = %request.method(),
                headers = ?request.headers(),
                "Synthesized request"
            );
        }

        let client = ClientAddress::new(event.remote_address.clone());
        let response = self.handler.respond(request, &client).await?;

        let result = match response {
            Some(response) => {
                if self.debug_events {
                    tracing::info!(
                        status = %response.status(),
                        headers = ?response.headers(),
                        "Handler response"
                    );
                }
                result_from_response(event.protocol, response).await?
            }
            None => {
                tracing::debug!(url = %url, "Handler produced no response");
                not_found(event.protocol)
            }
        };

        Ok(Outcome::Response(convert_to(result)))
    }
}

fn outcome_label(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Passthrough(_) => "prerendered",
        Outcome::Response(_) => "responded",
    }
}

/// The handler must see the externally visible host, not the internal one.
fn correct_host(event: &mut Event) {
    if let Some(forwarded) = event.headers.get(X_FORWARDED_HOST).cloned() {
        event.headers.insert(HOST.as_str().to_string(), forwarded);
    }
}

fn build_request(event: &Event, url: &str) -> AdapterResult<Request<Body>> {
    let method = Method::from_bytes(event.method.as_bytes())
        .map_err(|e| AdapterError::InvalidRequest(format!("method {:?}: {e}", event.method)))?;

    let mut builder = Request::builder().method(method.clone()).uri(url);
    if let Some(headers) = builder.headers_mut() {
        for (name, value) in &event.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HttpHeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping header that is not valid HTTP"),
            }
        }
    }

    let body = if method == Method::GET || method == Method::HEAD {
        Body::empty()
    } else {
        Body::from(event.body.clone())
    };

    builder
        .body(body)
        .map_err(|e| AdapterError::InvalidRequest(format!("{url}: {e}")))
}

async fn result_from_response(protocol: Protocol, response: Response<Body>) -> AdapterResult<EventResult> {
    let (parts, body) = response.into_parts();

    let mut headers = Pairs::new();
    for name in parts.headers.keys() {
        let values = parts
            .headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>();
        headers.insert(name.as_str(), HeaderValue::Multi(values));
    }

    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
    let is_base64_encoded = is_binary_content_type(content_type.as_deref());

    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| AdapterError::Handler(format!("reading response body: {e}")))?;
    let body = if is_base64_encoded {
        STANDARD.encode(&bytes)
    } else {
        String::from_utf8_lossy(&bytes).into_owned()
    };

    Ok(EventResult {
        protocol,
        status_code: parts.status.as_u16(),
        headers,
        body,
        is_base64_encoded,
    })
}

fn not_found(protocol: Protocol) -> EventResult {
    EventResult {
        protocol,
        status_code: 404,
        headers: [("content-type", HeaderValue::from("text/plain"))]
            .into_iter()
            .collect(),
        body: NOT_FOUND_BODY.to_string(),
        is_base64_encoded: false,
    }
}
