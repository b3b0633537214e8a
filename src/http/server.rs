//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the invocation handlers
//! - Wire up middleware (tracing, limits, request ID, timeout)
//! - Bind server to listener
//! - Report fatal invocation errors the way the platform does (502)

use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AdapterConfig;
use crate::edge::handle_viewer_request;
use crate::error::ErrorDocument;
use crate::orchestrator::Orchestrator;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
}

/// Serves platform events over HTTP for local runs and tests.
pub struct InvocationServer {
    router: Router,
}

impl InvocationServer {
    pub fn new(config: &AdapterConfig, orchestrator: Orchestrator) -> Self {
        let state = AppState { orchestrator };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AdapterConfig, state: AppState) -> Router {
        Router::new()
            .route("/invoke", post(invoke_handler))
            .route("/viewer-request", post(viewer_request_handler))
            .route("/health", get(|| async { "ok" }))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.listener.max_event_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Invocation server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Invocation server stopped");
        Ok(())
    }
}

fn request_id(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Run one platform event through the orchestrator.
async fn invoke_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<Value>,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&headers);

    match state.orchestrator.handle(event).await {
        Ok(outcome) => {
            tracing::debug!(
                request_id = %request_id,
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Invocation complete"
            );
            Json(outcome).into_response()
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Invocation failed");
            (StatusCode::BAD_GATEWAY, Json(ErrorDocument::from(&e))).into_response()
        }
    }
}

async fn viewer_request_handler(Json(event): Json<Value>) -> Json<Value> {
    Json(handle_viewer_request(event))
}
