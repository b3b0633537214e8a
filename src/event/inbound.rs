//! Wire request → `Event` translation.
//!
//! # Responsibilities
//! - Decode a classified raw event into its typed wire shape
//! - Normalize headers (lower-case keys, protocol-specific joins)
//! - Rebuild the request URL and decode the body bytes
//!
//! # Design Decisions
//! - Every function here is pure and total over its wire shape
//! - Base64 decoding is lenient; undecodable bodies become empty

use std::collections::BTreeMap;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use bytes::Bytes;
use serde_json::Value;
use url::form_urlencoded;

use super::classify::classify;
use super::wire::{
    ApiGatewayV1Request, ApiGatewayV2Request, CloudFrontEvent, CloudFrontRequest, V2Body,
};
use super::{Event, Protocol};
use crate::error::{AdapterError, AdapterResult};

/// Accepts padded or unpadded input, as the platform is not consistent.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// A classified inbound event in its typed wire shape.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    GatewayV1(ApiGatewayV1Request),
    GatewayV2(ApiGatewayV2Request),
    EdgeFunction(CloudFrontEvent),
}

impl InboundEvent {
    /// Classify `value` and decode it into the matching wire shape.
    pub fn from_value(value: Value) -> AdapterResult<Self> {
        let protocol = classify(&value)?;
        let decoded = match protocol {
            Protocol::GatewayV1 => serde_json::from_value(value).map(InboundEvent::GatewayV1),
            Protocol::GatewayV2 => serde_json::from_value(value).map(InboundEvent::GatewayV2),
            Protocol::EdgeFunction => serde_json::from_value(value).map(InboundEvent::EdgeFunction),
        };
        decoded.map_err(|source| AdapterError::MalformedEvent { protocol, source })
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            InboundEvent::GatewayV1(_) => Protocol::GatewayV1,
            InboundEvent::GatewayV2(_) => Protocol::GatewayV2,
            InboundEvent::EdgeFunction(_) => Protocol::EdgeFunction,
        }
    }
}

impl CloudFrontEvent {
    /// The request of the first (and only) record.
    pub fn request(&self) -> Option<&CloudFrontRequest> {
        self.records.first().map(|record| &record.cf.request)
    }

    pub fn into_request(self) -> Option<CloudFrontRequest> {
        self.records.into_iter().next().map(|record| record.cf.request)
    }
}

/// Translate a classified event into the internal model.
pub fn convert_from(event: &InboundEvent) -> Event {
    match event {
        InboundEvent::GatewayV1(req) => from_gateway_v1(req),
        InboundEvent::GatewayV2(req) => from_gateway_v2(req),
        InboundEvent::EdgeFunction(evt) => match evt.request() {
            Some(req) => from_edge_function(req),
            None => from_edge_function(&CloudFrontRequest::default()),
        },
    }
}

pub fn from_gateway_v1(req: &ApiGatewayV1Request) -> Event {
    let remote_address = req
        .request_context
        .as_ref()
        .and_then(|ctx| ctx.identity.as_ref())
        .and_then(|identity| identity.source_ip.clone())
        .unwrap_or_default();

    Event {
        protocol: Protocol::GatewayV1,
        method: req.http_method.clone(),
        raw_path: req.path.clone(),
        url: format!("{}{}", req.path, gateway_v1_query(req)),
        body: decode_body(
            req.body.as_deref().unwrap_or_default(),
            req.is_base64_encoded.unwrap_or(false),
        ),
        headers: gateway_v1_headers(req),
        remote_address,
    }
}

pub fn from_gateway_v2(req: &ApiGatewayV2Request) -> Event {
    let http = req.request_context.as_ref().and_then(|ctx| ctx.http.as_ref());
    let query = req.raw_query_string.as_deref().unwrap_or_default();

    Event {
        protocol: Protocol::GatewayV2,
        method: http.map(|h| h.method.clone()).unwrap_or_default(),
        raw_path: req.raw_path.clone(),
        url: with_query(&req.raw_path, query),
        body: gateway_v2_body(req),
        headers: gateway_v2_headers(req),
        remote_address: http.map(|h| h.source_ip.clone()).unwrap_or_default(),
    }
}

pub fn from_edge_function(req: &CloudFrontRequest) -> Event {
    let body = match &req.body {
        Some(body) => decode_body(&body.data, body.encoding.as_deref() == Some("base64")),
        None => Bytes::new(),
    };

    let mut headers = BTreeMap::new();
    for (name, entries) in req.headers.iter() {
        for entry in entries.iter().filter(|e| !e.value.is_empty()) {
            headers.insert(name.to_lowercase(), entry.value.clone());
        }
    }

    Event {
        protocol: Protocol::EdgeFunction,
        method: req.method.clone(),
        raw_path: req.uri.clone(),
        url: with_query(&req.uri, &req.querystring),
        body,
        headers,
        remote_address: req.client_ip.clone(),
    }
}

fn with_query(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

/// Multi-value parameters first, then single-value ones, form-urlencoded.
fn gateway_v1_query(req: &ApiGatewayV1Request) -> String {
    let mut params = form_urlencoded::Serializer::new(String::new());
    if let Some(multi) = &req.multi_value_query_string_parameters {
        for (name, values) in multi.iter() {
            for value in values.iter().flatten() {
                params.append_pair(name, value);
            }
        }
    }
    if let Some(single) = &req.query_string_parameters {
        for (name, value) in single.iter() {
            if let Some(value) = value {
                params.append_pair(name, value);
            }
        }
    }
    let query = params.finish();
    if query.is_empty() {
        query
    } else {
        format!("?{query}")
    }
}

fn gateway_v1_headers(req: &ApiGatewayV1Request) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    if let Some(multi) = &req.multi_value_headers {
        for (name, values) in multi.iter() {
            if let Some(values) = values {
                headers.insert(name.to_lowercase(), values.join(","));
            }
        }
    }
    if let Some(single) = &req.headers {
        for (name, value) in single.iter() {
            match value {
                Some(value) if !value.is_empty() => {
                    headers.insert(name.to_lowercase(), value.clone());
                }
                _ => {}
            }
        }
    }
    headers
}

fn gateway_v2_headers(req: &ApiGatewayV2Request) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    if let Some(cookies) = &req.cookies {
        headers.insert("cookie".to_string(), cookies.join("; "));
    }
    // Literal headers are copied after the synthesized cookie and win on collision.
    if let Some(raw) = &req.headers {
        for (name, value) in raw.iter() {
            if let Some(value) = value {
                headers.insert(name.to_lowercase(), value.clone());
            }
        }
    }
    headers
}

fn gateway_v2_body(req: &ApiGatewayV2Request) -> Bytes {
    match &req.body {
        V2Body::Bytes(bytes) => bytes.clone(),
        V2Body::Text(text) => decode_body(text, req.is_base64_encoded.unwrap_or(false)),
        V2Body::Structured(value) => Bytes::from(value.to_string()),
        V2Body::Absent => Bytes::new(),
    }
}

/// Decode a wire body string into bytes.
pub(crate) fn decode_body(data: &str, is_base64: bool) -> Bytes {
    if !is_base64 {
        return Bytes::copy_from_slice(data.as_bytes());
    }
    let cleaned: String = data
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();
    match LENIENT_BASE64.decode(cleaned.as_bytes()) {
        Ok(bytes) => Bytes::from(bytes),
        Err(e) => {
            tracing::warn!(error = %e, "Undecodable base64 body, treating as empty");
            Bytes::new()
        }
    }
}
