//! Query-string key sanitization and host forwarding.
//!
//! Form actions post to URLs such as `/login?/register`. The CDN's query
//! string parser rejects a raw `/` in a key, so such keys are re-inserted
//! percent-encoded. The viewer's `host` is preserved as `x-forwarded-host`
//! because the origin sees an internal host.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

/// Characters left alone by ECMAScript `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a string the way `encodeURIComponent` does.
pub fn encode_uri_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}

/// Entry point for a viewer-request event: sanitize and return its request.
///
/// An event without a `request` member yields `null`.
pub fn handle_viewer_request(mut event: Value) -> Value {
    let mut request = event
        .get_mut("request")
        .map(Value::take)
        .unwrap_or(Value::Null);
    sanitize_request(&mut request);
    request
}

/// Mutate a viewer request in place. Shapes that do not match are left alone.
pub fn sanitize_request(request: &mut Value) {
    if let Some(headers) = request.get_mut("headers").and_then(Value::as_object_mut) {
        if let Some(host) = headers.get("host").cloned() {
            headers.insert("x-forwarded-host".to_string(), host);
        }
    }

    if let Some(query) = request.get_mut("querystring").and_then(Value::as_object_mut) {
        let slashed: Vec<String> = query.keys().filter(|k| k.contains('/')).cloned().collect();
        for key in slashed {
            // Other keys keep their positions; the encoded key is appended.
            if let Some(value) = query.shift_remove(&key) {
                tracing::trace!(key = %key, "Encoding query key");
                query.insert(encode_uri_component(&key), value);
            }
        }
    }
}
