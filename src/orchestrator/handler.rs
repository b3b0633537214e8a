//! The generic request-handling capability.
//!
//! # Responsibilities
//! - Define the seam between the adapter and the application it fronts
//! - Forward synthesized requests to an upstream HTTP application
//! - Let an in-process `axum::Router` act as the application
//!
//! # Design Decisions
//! - One awaited call per invocation; the trait has no batching surface
//! - "No response" is an explicit `None`, mapped to a 404 by the caller
//! - The client address travels as an explicit argument and as a request
//!   extension, so routers can extract it

use std::convert::Infallible;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::uri::{Authority, Scheme};
use axum::http::{HeaderValue, Request, Response, Uri};
use hyper::body::Incoming;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tower::ServiceExt;

use crate::config::UpstreamConfig;
use crate::error::{AdapterError, AdapterResult};

/// Originating client IP as supplied by the invoking platform.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientAddress(String);

impl ClientAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn get(&self) -> &str {
        &self.0
    }
}

/// Produces a response for a synthesized request, or nothing.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn respond(
        &self,
        request: Request<Body>,
        client: &ClientAddress,
    ) -> AdapterResult<Option<Response<Body>>>;
}

#[async_trait]
impl RequestHandler for axum::Router {
    async fn respond(
        &self,
        mut request: Request<Body>,
        client: &ClientAddress,
    ) -> AdapterResult<Option<Response<Body>>> {
        request.extensions_mut().insert(client.clone());
        let response: Result<Response<Body>, Infallible> = self.clone().oneshot(request).await;
        match response {
            Ok(response) => Ok(Some(response)),
            Err(never) => match never {},
        }
    }
}

/// Forwards requests to an HTTP application listening on a local address.
#[derive(Clone)]
pub struct UpstreamHandler {
    client: Client<HttpConnector, Body>,
    authority: Authority,
}

impl UpstreamHandler {
    pub fn new(config: &UpstreamConfig) -> AdapterResult<Self> {
        let authority = Authority::from_str(&config.address).map_err(|e| {
            AdapterError::InvalidRequest(format!("upstream address {:?}: {e}", config.address))
        })?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self { client, authority })
    }
}

#[async_trait]
impl RequestHandler for UpstreamHandler {
    async fn respond(
        &self,
        request: Request<Body>,
        client: &ClientAddress,
    ) -> AdapterResult<Option<Response<Body>>> {
        let (mut parts, body) = request.into_parts();

        // Keep path and query, swap in the upstream. The Host header is left
        // alone so the application sees the public host.
        let mut uri_parts = parts.uri.clone().into_parts();
        uri_parts.scheme = Some(Scheme::HTTP);
        uri_parts.authority = Some(self.authority.clone());
        parts.uri = Uri::from_parts(uri_parts)
            .map_err(|e| AdapterError::InvalidRequest(e.to_string()))?;

        if let Ok(value) = HeaderValue::from_str(client.get()) {
            parts.headers.append("x-forwarded-for", value);
        }
        parts
            .headers
            .insert("x-forwarded-proto", HeaderValue::from_static("https"));

        let upstream = self.authority.to_string();
        match self.client.request(Request::from_parts(parts, body)).await {
            Ok(response) => {
                tracing::debug!(upstream = %upstream, status = %response.status(), "Upstream responded");
                let (parts, body): (_, Incoming) = response.into_parts();
                Ok(Some(Response::from_parts(parts, Body::new(body))))
            }
            Err(e) => {
                tracing::error!(upstream = %upstream, error = %e, "Upstream error");
                Err(AdapterError::Handler(format!("upstream {upstream}: {e}")))
            }
        }
    }
}
