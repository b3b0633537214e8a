//! End-to-end invocation tests through the orchestrator.

use std::fs;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};

use edge_adapter::orchestrator::PrerenderedAssets;
use edge_adapter::AdapterError;

mod common;
use common::{edge_event, gateway_v1_event, gateway_v2_event, orchestrator, SilentHandler, StaticHandler};

async fn run(handler: Arc<StaticHandler>, assets: PrerenderedAssets, event: Value) -> Value {
    let outcome = orchestrator(handler, assets).handle(event).await.unwrap();
    serde_json::to_value(outcome).unwrap()
}

#[tokio::test]
async fn test_gateway_v1_forwarded() {
    let handler = StaticHandler::new(
        200,
        vec![("content-type", "text/html"), ("set-cookie", "a=1"), ("set-cookie", "b=2")],
        "<h1>dynamic</h1>",
    );
    let mut event = gateway_v1_event("GET", "/dynamic");
    event["multiValueQueryStringParameters"] = json!({ "q": ["one", "two"] });

    let out = run(handler.clone(), PrerenderedAssets::none(), event).await;

    assert_eq!(out["statusCode"], 200);
    assert_eq!(out["body"], "<h1>dynamic</h1>");
    assert_eq!(out["isBase64Encoded"], false);
    assert_eq!(out["multiValueHeaders"]["set-cookie"], json!(["a=1", "b=2"]));

    let seen = handler.last();
    assert_eq!(seen.method, "GET");
    assert_eq!(
        seen.uri,
        "https://abc123.execute-api.us-east-1.amazonaws.com/dynamic?q=one&q=two"
    );
    assert_eq!(seen.client, "198.51.100.1");
    assert!(seen.body.is_empty());
}

#[tokio::test]
async fn test_unescaped_path_is_encoded() {
    let handler = StaticHandler::html("ok");
    let out = run(handler.clone(), PrerenderedAssets::none(), gateway_v1_event("GET", "/hello world")).await;

    assert_eq!(out["statusCode"], 200);
    assert_eq!(
        handler.last().uri,
        "https://abc123.execute-api.us-east-1.amazonaws.com/hello%20world"
    );
}

#[tokio::test]
async fn test_missing_host_falls_back_to_localhost() {
    let handler = StaticHandler::html("ok");
    let mut event = gateway_v1_event("GET", "/status");
    event["headers"] = json!({ "Accept": "text/html" });
    event["multiValueHeaders"] = json!({ "Accept": ["text/html"] });

    run(handler.clone(), PrerenderedAssets::none(), event).await;
    assert_eq!(handler.last().uri, "https://localhost/status");
}

#[tokio::test]
async fn test_gateway_v2_forwarded_with_host_correction() {
    let handler = StaticHandler::new(
        303,
        vec![("location", "/done"), ("set-cookie", "flash=1; Path=/")],
        "",
    );
    let mut event = gateway_v2_event("POST", "/todos", "/create");
    event["body"] = json!("dGl0bGU9bWlsaw==");
    event["isBase64Encoded"] = json!(true);

    let out = run(handler.clone(), PrerenderedAssets::none(), event).await;

    assert_eq!(out["statusCode"], 303);
    assert_eq!(out["headers"]["location"], "/done");
    assert!(out["headers"].get("set-cookie").is_none());
    assert_eq!(out["cookies"], json!(["flash=1; Path=/"]));

    let seen = handler.last();
    assert_eq!(seen.uri, "https://www.example.com/todos?/create");
    assert_eq!(seen.header("host"), Some("www.example.com"));
    assert_eq!(seen.header("cookie"), Some("session=abc"));
    assert_eq!(seen.body, b"title=milk");
    assert_eq!(seen.client, "192.0.2.55");
}

#[tokio::test]
async fn test_edge_forwarded_drops_content_length() {
    let handler = StaticHandler::new(
        200,
        vec![("content-type", "application/json"), ("content-length", "2")],
        "{}",
    );
    let out = run(handler.clone(), PrerenderedAssets::none(), edge_event("GET", "/api/items", "page=2")).await;

    assert_eq!(out["status"], "200");
    assert_eq!(out["bodyEncoding"], "text");
    assert_eq!(out["body"], "{}");
    assert!(out["headers"].get("content-length").is_none());
    assert_eq!(
        out["headers"]["content-type"],
        json!([{ "key": "content-type", "value": "application/json" }])
    );
    assert_eq!(handler.last().uri, "https://www.example.com/api/items?page=2");
}

#[tokio::test]
async fn test_binary_response_is_base64() {
    let png = vec![0x89u8, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    let handler = StaticHandler::new(200, vec![("content-type", "image/png")], png.clone());

    let out = run(handler, PrerenderedAssets::none(), gateway_v2_event("GET", "/logo.png", "")).await;

    assert_eq!(out["isBase64Encoded"], true);
    let decoded = STANDARD.decode(out["body"].as_str().unwrap()).unwrap();
    assert_eq!(decoded, png);
}

#[tokio::test]
async fn test_prerendered_gateway_short_circuit() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("blog")).unwrap();
    fs::write(dir.path().join("blog/index.html"), "<h1>blog</h1>").unwrap();
    let assets = PrerenderedAssets::new(dir.path(), ["index.html", "about.html", "blog/index.html"]);

    let handler = StaticHandler::html("should not be used");
    let out = run(handler.clone(), assets, gateway_v1_event("GET", "/blog/")).await;

    assert_eq!(out["statusCode"], 200);
    assert_eq!(out["body"], "<h1>blog</h1>");
    assert_eq!(out["isBase64Encoded"], false);
    assert_eq!(out["headers"]["content-type"], "text/html");
    assert_eq!(
        out["headers"]["cache-control"],
        "public, max-age=0, s-maxage=31536000, must-revalidate"
    );
    assert_eq!(handler.call_count(), 0);
}

#[tokio::test]
async fn test_prerendered_only_for_get() {
    let dir = tempfile::tempdir().unwrap();
    let assets = PrerenderedAssets::new(dir.path(), ["about.html"]);
    let handler = StaticHandler::html("posted");

    let out = run(handler.clone(), assets, gateway_v1_event("POST", "/about")).await;
    assert_eq!(out["body"], "posted");
    assert_eq!(handler.call_count(), 1);
}

#[tokio::test]
async fn test_prerendered_edge_passthrough() {
    let assets = PrerenderedAssets::new("unused", ["about.html"]);
    let handler = StaticHandler::html("should not be used");

    let out = run(handler.clone(), assets, edge_event("GET", "/about", "")).await;

    assert_eq!(out["uri"], "/about.html");
    assert_eq!(out["method"], "GET");
    assert_eq!(out["clientIp"], "203.0.113.178");
    assert_eq!(out["origin"]["s3"]["domainName"], "assets.s3.amazonaws.com");
    assert_eq!(out["headers"]["host"][0]["value"], "origin.example.com");
    assert!(out.get("status").is_none());
    assert_eq!(handler.call_count(), 0);
}

#[tokio::test]
async fn test_missing_prerendered_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let assets = PrerenderedAssets::new(dir.path(), ["index.html"]);
    let err = orchestrator(StaticHandler::html(""), assets)
        .handle(gateway_v2_event("GET", "/", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, AdapterError::AssetRead { .. }));
}

#[tokio::test]
async fn test_no_response_becomes_not_found() {
    let orchestrator = orchestrator(Arc::new(SilentHandler), PrerenderedAssets::none());

    let out = serde_json::to_value(orchestrator.handle(gateway_v1_event("GET", "/nope")).await.unwrap()).unwrap();
    assert_eq!(out["statusCode"], 404);
    assert_eq!(out["body"], "Not found.");

    let out = serde_json::to_value(orchestrator.handle(edge_event("GET", "/nope", "")).await.unwrap()).unwrap();
    assert_eq!(out["status"], "404");
    assert_eq!(out["body"], "Not found.");
}

#[tokio::test]
async fn test_unknown_event_is_rejected() {
    let handler = StaticHandler::html("unused");
    let err = orchestrator(handler.clone(), PrerenderedAssets::none())
        .handle(json!({ "version": "1.5", "rawPath": "/" }))
        .await
        .unwrap_err();
    assert!(matches!(err, AdapterError::UnsupportedEventKind(_)));
    assert_eq!(handler.call_count(), 0);
}
