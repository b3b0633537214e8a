//! Local invocation server tests, forwarding to a real upstream socket.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::net::TcpListener;

use edge_adapter::config::AdapterConfig;
use edge_adapter::lifecycle::{build_orchestrator, Shutdown};
use edge_adapter::orchestrator::PrerenderedAssets;
use edge_adapter::{InvocationServer, Orchestrator};

mod common;
use common::{gateway_v2_event, start_mock_backend, StaticHandler};

async fn start_server(config: AdapterConfig, orchestrator: Orchestrator) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = InvocationServer::new(&config, orchestrator);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    (addr, shutdown)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[tokio::test]
async fn test_invoke_through_upstream() {
    let backend = start_mock_backend("text/plain; charset=utf-8", b"hello from upstream").await;

    let mut config = AdapterConfig::default();
    config.upstream.address = backend.to_string();
    let orchestrator = build_orchestrator(&config).unwrap();
    let (addr, shutdown) = start_server(config, orchestrator).await;

    let res = client()
        .post(format!("http://{addr}/invoke"))
        .json(&gateway_v2_event("GET", "/greeting", "lang=en"))
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["statusCode"], 200);
    assert_eq!(body["body"], "hello from upstream");
    assert_eq!(body["isBase64Encoded"], false);
    assert_eq!(body["headers"]["content-type"], "text/plain; charset=utf-8");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    // Grab a free port and release it so nothing is listening there.
    let free = TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap();

    let mut config = AdapterConfig::default();
    config.upstream.address = free.to_string();
    let orchestrator = build_orchestrator(&config).unwrap();
    let (addr, shutdown) = start_server(config, orchestrator).await;

    let res = client()
        .post(format!("http://{addr}/invoke"))
        .json(&gateway_v2_event("GET", "/", ""))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["errorType"], "HandlerFailure");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unsupported_event_is_bad_gateway() {
    let orchestrator = Orchestrator::new(StaticHandler::html("unused"), PrerenderedAssets::none());
    let (addr, shutdown) = start_server(AdapterConfig::default(), orchestrator).await;

    let res = client()
        .post(format!("http://{addr}/invoke"))
        .json(&json!({ "version": "9.9" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["errorType"], "UnsupportedEventKind");

    shutdown.trigger();
}

#[tokio::test]
async fn test_viewer_request_endpoint() {
    let orchestrator = Orchestrator::new(Arc::new(common::SilentHandler), PrerenderedAssets::none());
    let (addr, shutdown) = start_server(AdapterConfig::default(), orchestrator).await;

    let res = client()
        .post(format!("http://{addr}/viewer-request"))
        .json(&json!({
            "version": "1.0",
            "request": {
                "method": "POST",
                "uri": "/todos",
                "headers": { "host": { "value": "www.example.com" } },
                "querystring": { "/create": { "value": "" } }
            }
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let request: Value = res.json().await.unwrap();
    assert_eq!(request["headers"]["x-forwarded-host"]["value"], "www.example.com");
    assert!(request["querystring"].get("%2Fcreate").is_some());
    assert!(request["querystring"].get("/create").is_none());

    shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_event_rejected() {
    let mut config = AdapterConfig::default();
    config.listener.max_event_bytes = 64;
    let orchestrator = Orchestrator::new(StaticHandler::html("unused"), PrerenderedAssets::none());
    let (addr, shutdown) = start_server(config, orchestrator).await;

    let mut event = gateway_v2_event("POST", "/upload", "");
    event["body"] = json!("x".repeat(1024));
    let res = client()
        .post(format!("http://{addr}/invoke"))
        .json(&event)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 413);

    shutdown.trigger();
}
