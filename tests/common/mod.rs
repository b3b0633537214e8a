//! Shared fixtures and mock handlers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use edge_adapter::orchestrator::{ClientAddress, PrerenderedAssets, RequestHandler};
use edge_adapter::{AdapterResult, Orchestrator};

/// What the handler saw for the last request.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub client: String,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Answers every request with the same response and records the request.
pub struct StaticHandler {
    status: u16,
    headers: Vec<(&'static str, &'static str)>,
    body: Vec<u8>,
    pub seen: Mutex<Option<Captured>>,
    pub calls: Mutex<u32>,
}

impl StaticHandler {
    pub fn new(status: u16, headers: Vec<(&'static str, &'static str)>, body: impl Into<Vec<u8>>) -> Arc<Self> {
        Arc::new(Self {
            status,
            headers,
            body: body.into(),
            seen: Mutex::new(None),
            calls: Mutex::new(0),
        })
    }

    pub fn html(body: &str) -> Arc<Self> {
        Self::new(200, vec![("content-type", "text/html; charset=utf-8")], body.as_bytes().to_vec())
    }

    pub fn last(&self) -> Captured {
        self.seen.lock().unwrap().clone().expect("handler was not called")
    }

    pub fn call_count(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl RequestHandler for StaticHandler {
    async fn respond(
        &self,
        request: Request<Body>,
        client: &ClientAddress,
    ) -> AdapterResult<Option<Response<Body>>> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        *self.seen.lock().unwrap() = Some(Captured {
            method: parts.method.to_string(),
            uri: parts.uri.to_string(),
            headers: parts
                .headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap().to_string()))
                .collect(),
            body: body.to_vec(),
            client: client.get().to_string(),
        });
        *self.calls.lock().unwrap() += 1;

        let mut builder = Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(*name, *value);
        }
        Ok(Some(builder.body(Body::from(self.body.clone())).unwrap()))
    }
}

/// Never produces a response.
pub struct SilentHandler;

#[async_trait]
impl RequestHandler for SilentHandler {
    async fn respond(
        &self,
        _request: Request<Body>,
        _client: &ClientAddress,
    ) -> AdapterResult<Option<Response<Body>>> {
        Ok(None)
    }
}

pub fn orchestrator(handler: Arc<dyn RequestHandler>, assets: PrerenderedAssets) -> Orchestrator {
    Orchestrator::new(handler, assets)
}

pub fn gateway_v1_event(method: &str, path: &str) -> Value {
    json!({
        "resource": "/{proxy+}",
        "path": path,
        "httpMethod": method,
        "headers": { "Host": "abc123.execute-api.us-east-1.amazonaws.com", "Accept": "text/html" },
        "multiValueHeaders": {
            "Host": ["abc123.execute-api.us-east-1.amazonaws.com"],
            "Accept": ["text/html"]
        },
        "queryStringParameters": null,
        "multiValueQueryStringParameters": null,
        "requestContext": { "identity": { "sourceIp": "198.51.100.1" } },
        "body": null,
        "isBase64Encoded": false
    })
}

pub fn gateway_v2_event(method: &str, raw_path: &str, raw_query: &str) -> Value {
    json!({
        "version": "2.0",
        "routeKey": "$default",
        "rawPath": raw_path,
        "rawQueryString": raw_query,
        "cookies": ["session=abc"],
        "headers": { "host": "internal.lambda-url.aws", "x-forwarded-host": "www.example.com" },
        "requestContext": { "http": { "method": method, "path": raw_path, "sourceIp": "192.0.2.55" } },
        "isBase64Encoded": false
    })
}

pub fn edge_event(method: &str, uri: &str, querystring: &str) -> Value {
    json!({
        "Records": [{
            "cf": {
                "config": { "distributionId": "EDFDVBD6EXAMPLE", "eventType": "origin-request" },
                "request": {
                    "clientIp": "203.0.113.178",
                    "headers": {
                        "host": [{ "key": "Host", "value": "origin.example.com" }],
                        "x-forwarded-host": [{ "key": "X-Forwarded-Host", "value": "www.example.com" }]
                    },
                    "method": method,
                    "querystring": querystring,
                    "uri": uri,
                    "origin": { "s3": { "domainName": "assets.s3.amazonaws.com", "path": "" } }
                }
            }
        }]
    })
}

/// Start a raw HTTP backend returning a fixed response. Returns its address.
pub async fn start_mock_backend(content_type: &'static str, body: &'static [u8]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    content_type,
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}
