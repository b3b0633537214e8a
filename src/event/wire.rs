//! Wire shapes of the three invocation protocols.
//!
//! Field names follow the platform's JSON payloads. Everything the adapter
//! does not strictly need is optional so that minor variations between
//! platform versions decode instead of failing.

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::pairs::Pairs;

/// Treat an explicit JSON `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// API Gateway payload format 1.0
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiGatewayV1Request {
    #[serde(deserialize_with = "null_as_default")]
    pub http_method: String,
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,
    pub headers: Option<Pairs<Option<String>>>,
    pub multi_value_headers: Option<Pairs<Option<Vec<String>>>>,
    pub query_string_parameters: Option<Pairs<Option<String>>>,
    pub multi_value_query_string_parameters: Option<Pairs<Option<Vec<String>>>>,
    pub body: Option<String>,
    pub is_base64_encoded: Option<bool>,
    pub request_context: Option<ApiGatewayV1RequestContext>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiGatewayV1RequestContext {
    pub identity: Option<ApiGatewayV1Identity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiGatewayV1Identity {
    pub source_ip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayV1Response {
    pub status_code: u16,
    pub headers: Pairs<String>,
    pub multi_value_headers: Pairs<Vec<String>>,
    pub body: String,
    pub is_base64_encoded: bool,
}

// ---------------------------------------------------------------------------
// API Gateway payload format 2.0
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiGatewayV2Request {
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub raw_path: String,
    pub raw_query_string: Option<String>,
    pub cookies: Option<Vec<String>>,
    pub headers: Option<Pairs<Option<String>>>,
    pub body: V2Body,
    pub is_base64_encoded: Option<bool>,
    pub request_context: Option<ApiGatewayV2RequestContext>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiGatewayV2RequestContext {
    pub http: Option<ApiGatewayV2Http>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiGatewayV2Http {
    #[serde(deserialize_with = "null_as_default")]
    pub method: String,
    #[serde(deserialize_with = "null_as_default")]
    pub source_ip: String,
}

/// The v2 body field, which may arrive in several shapes.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum V2Body {
    #[default]
    Absent,
    /// Already-decoded bytes, only produced by in-process callers.
    Bytes(Bytes),
    Text(String),
    /// A JSON object or array delivered without string encoding.
    Structured(Value),
}

impl<'de> Deserialize<'de> for V2Body {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(text) => V2Body::Text(text),
            value @ (Value::Object(_) | Value::Array(_)) => V2Body::Structured(value),
            _ => V2Body::Absent,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayV2Response {
    pub status_code: u16,
    pub headers: Pairs<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<Vec<String>>,
    pub body: String,
    pub is_base64_encoded: bool,
}

// ---------------------------------------------------------------------------
// CloudFront Lambda@Edge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudFrontEvent {
    #[serde(rename = "Records")]
    pub records: Vec<CloudFrontRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudFrontRecord {
    pub cf: CloudFrontRecordBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudFrontRecordBody {
    pub request: CloudFrontRequest,
    /// `config` and anything else the platform sends alongside the request.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A CloudFront request. Unknown fields are kept so that the request can be
/// handed back to the platform unchanged apart from its `uri`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudFrontRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub client_ip: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: Pairs<Vec<CloudFrontHeader>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub method: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub querystring: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<CloudFrontBody>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudFrontHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudFrontBody {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudFrontResult {
    pub status: String,
    pub status_description: String,
    pub headers: Pairs<Vec<CloudFrontHeader>>,
    pub body_encoding: String,
    pub body: String,
}
