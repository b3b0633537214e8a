//! Edge Adapter
//!
//! Runs a generic HTTP application behind API Gateway and CloudFront
//! invocation events.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────────────┐
//!   viewer request    │  edge::sanitizer (x-forwarded-host, query key encoding)│
//!   ──────────────────┼─▶ (runs on the CDN, before any origin event exists)    │
//!                     └───────────────────────────────────────────────────────┘
//!                                                │
//!                                                ▼
//!                     ┌───────────────────────────────────────────────────────┐
//!   platform event    │  ┌──────────┐   ┌──────────┐   ┌──────────────────┐   │
//!   ──────────────────┼─▶│ classify │──▶│ inbound  │──▶│   orchestrator   │   │
//!                     │  └──────────┘   └──────────┘   │ host correction  │   │
//!                     │                                │ prerendered?     │──┐│
//!                     │                                └────────┬─────────┘  ││
//!                     │                                         ▼            ││
//!                     │                                ┌──────────────────┐  ││
//!                     │                                │ RequestHandler   │  ││
//!                     │                                │ (upstream app)   │  ││
//!                     │                                └────────┬─────────┘  ││
//!   wire response     │  ┌──────────┐                           │            ││
//!   ◀─────────────────┼──│ outbound │◀──────────────────────────┴────────────┘│
//!                     │  └──────────┘                                         │
//!                     └───────────────────────────────────────────────────────┘
//! ```
//!
//! # Entry Points
//! - `serve`: local invocation server (POST events over HTTP)
//! - `runtime`: Lambda Runtime API loop
//! - `invoke` / `sanitize`: one-shot processing of an event file

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio::net::TcpListener;

use edge_adapter::config::load_config;
use edge_adapter::edge::handle_viewer_request;
use edge_adapter::lifecycle::{build_orchestrator, Shutdown};
use edge_adapter::observability::{logging, metrics};
use edge_adapter::runtime::{self, RuntimeClient};
use edge_adapter::InvocationServer;

#[derive(Parser)]
#[command(name = "edge-adapter")]
#[command(about = "Run an HTTP application behind API Gateway and CloudFront events", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve events over HTTP on the configured listener
    Serve,
    /// Poll the Lambda Runtime API for invocations
    Runtime,
    /// Run one event file through the adapter and print the output
    Invoke { event: PathBuf },
    /// Run one viewer-request event file through the edge sanitizer
    Sanitize { event: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("edge-adapter v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    match cli.command {
        Commands::Serve => {
            let orchestrator = build_orchestrator(&config)?;
            let listener = TcpListener::bind(&config.listener.bind_address).await?;

            let shutdown = Shutdown::new();
            shutdown.trigger_on_signal();

            InvocationServer::new(&config, orchestrator)
                .run(listener, shutdown.subscribe())
                .await?;
        }
        Commands::Runtime => {
            let api = config
                .runtime
                .api
                .clone()
                .ok_or("AWS_LAMBDA_RUNTIME_API is not set")?;
            let client = RuntimeClient::new(&api);

            let orchestrator = match build_orchestrator(&config) {
                Ok(orchestrator) => orchestrator,
                Err(e) => {
                    let _ = client.send_init_error("StartupError", &e.to_string()).await;
                    return Err(e.into());
                }
            };

            let shutdown = Shutdown::new();
            shutdown.trigger_on_signal();
            runtime::run(client, orchestrator, shutdown.subscribe()).await?;
        }
        Commands::Invoke { event } => {
            let orchestrator = build_orchestrator(&config)?;
            let raw: Value = serde_json::from_str(&std::fs::read_to_string(event)?)?;
            let outcome = orchestrator.handle(raw).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Sanitize { event } => {
            let raw: Value = serde_json::from_str(&std::fs::read_to_string(event)?)?;
            println!("{}", serde_json::to_string_pretty(&handle_viewer_request(raw))?);
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
