//! `EventResult` → wire response translation.
//!
//! # Design Decisions
//! - A null header value blanks that header; translation always completes
//! - v2 promotes `set-cookie` into its dedicated `cookies` list
//! - Edge responses never carry `content-length` (the platform rejects it)

use axum::http::StatusCode;
use serde::Serialize;

use super::pairs::Pairs;
use super::wire::{ApiGatewayV1Response, ApiGatewayV2Response, CloudFrontHeader, CloudFrontResult};
use super::{EventResult, HeaderValue, Protocol};

/// A response in the wire shape of its originating protocol.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WireResponse {
    GatewayV1(ApiGatewayV1Response),
    GatewayV2(ApiGatewayV2Response),
    EdgeFunction(CloudFrontResult),
}

impl WireResponse {
    pub fn protocol(&self) -> Protocol {
        match self {
            WireResponse::GatewayV1(_) => Protocol::GatewayV1,
            WireResponse::GatewayV2(_) => Protocol::GatewayV2,
            WireResponse::EdgeFunction(_) => Protocol::EdgeFunction,
        }
    }
}

/// Translate a result into the wire shape named by its protocol tag.
pub fn convert_to(result: EventResult) -> WireResponse {
    let response = match result.protocol {
        Protocol::GatewayV1 => WireResponse::GatewayV1(to_gateway_v1(result)),
        Protocol::GatewayV2 => WireResponse::GatewayV2(to_gateway_v2(result)),
        Protocol::EdgeFunction => WireResponse::EdgeFunction(to_edge_function(result)),
    };
    tracing::trace!(protocol = %response.protocol(), "Result translated");
    response
}

pub fn to_gateway_v1(result: EventResult) -> ApiGatewayV1Response {
    let mut headers = Pairs::new();
    let mut multi_value_headers = Pairs::new();

    for (name, value) in result.headers {
        match value {
            HeaderValue::Multi(values) => multi_value_headers.insert(name, values),
            HeaderValue::Single(value) => headers.insert(name, value),
            HeaderValue::Null => headers.insert(name, String::new()),
        }
    }

    ApiGatewayV1Response {
        status_code: result.status_code,
        headers,
        multi_value_headers,
        body: result.body,
        is_base64_encoded: result.is_base64_encoded,
    }
}

pub fn to_gateway_v2(result: EventResult) -> ApiGatewayV2Response {
    let cookies = match result.headers.get_ignore_case("set-cookie") {
        Some(HeaderValue::Multi(values)) => Some(values.clone()),
        Some(HeaderValue::Single(value)) => Some(vec![value.clone()]),
        Some(HeaderValue::Null) | None => None,
    };

    let mut headers = Pairs::new();
    for (name, value) in result.headers {
        if name.eq_ignore_ascii_case("set-cookie") {
            continue;
        }
        let flat = match value {
            HeaderValue::Single(value) => value,
            HeaderValue::Multi(values) => values.join(", "),
            HeaderValue::Null => String::new(),
        };
        headers.insert(name, flat);
    }

    ApiGatewayV2Response {
        status_code: result.status_code,
        headers,
        cookies,
        body: result.body,
        is_base64_encoded: result.is_base64_encoded,
    }
}

pub fn to_edge_function(result: EventResult) -> CloudFrontResult {
    let mut headers: Pairs<Vec<CloudFrontHeader>> = Pairs::new();

    for (name, value) in result.headers {
        if name.eq_ignore_ascii_case("content-length") {
            continue;
        }
        let values = match value {
            HeaderValue::Single(value) => vec![value],
            HeaderValue::Multi(values) => values,
            HeaderValue::Null => vec![String::new()],
        };
        let entries = values.into_iter().map(|value| CloudFrontHeader {
            key: Some(name.clone()),
            value,
        });
        // The platform indexes headers by lower-case name.
        let slot = name.to_lowercase();
        match headers.get_mut(&slot) {
            Some(existing) => existing.extend(entries),
            None => headers.insert(slot, entries.collect()),
        }
    }

    let status_description = StatusCode::from_u16(result.status_code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("OK")
        .to_string();

    CloudFrontResult {
        status: result.status_code.to_string(),
        status_description,
        headers,
        body_encoding: if result.is_base64_encoded { "base64" } else { "text" }.to_string(),
        body: result.body,
    }
}
