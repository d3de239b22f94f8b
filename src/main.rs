//! route-dispatch service binary.
//!
//! Loads configuration, installs logging and metrics, registers the built-in
//! operations and routes, and serves them through the pooled dispatcher
//! until Ctrl-C.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use clap::Parser;
use serde_json::json;

use route_dispatch::config::{load_config, AppConfig};
use route_dispatch::handler::{Context, HandlerFunc, HandlerResult};
use route_dispatch::observability::{logging, metrics};
use route_dispatch::registry::{HandlerDescriptor, IdentityRegistry, RouteSpec};
use route_dispatch::routing::{introspection_handler, Router};
use route_dispatch::Server;

#[derive(Debug, Parser)]
#[command(name = "route-dispatch", version, about = "Pooled HTTP dispatch server")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `server.address`.
    #[arg(short, long)]
    address: Option<String>,
}

fn health(c: &mut Context<'_>) -> HandlerResult {
    c.json(StatusCode::OK, &json!({ "status": "ok" }))
}

fn build_registry() -> Result<Arc<IdentityRegistry>, Box<dyn std::error::Error>> {
    let registry = Arc::new(IdentityRegistry::new());

    let probe = registry.register(
        HandlerDescriptor::builder()
            .description("liveness probe")
            .types(["GET", "HEAD"])
            .handler(HandlerFunc::new("route_dispatch::health", health))
            .build()?,
    );
    registry.mount("/health", &probe);

    registry.register_route(
        RouteSpec::new("/_routes", introspection_handler(&registry))
            .methods(["GET"])
            .description("registered operations and routes")
            .produces(["application/json"])
            .build()?,
    );

    Ok(registry)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(address) = args.address {
        config.server.address = address;
    }

    logging::init_tracing(&config.observability.log_level)?;
    tracing::info!("route-dispatch v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        address = %config.server.address,
        tls = config.server.tls_enabled(),
        max_body_bytes = config.server.max_body_bytes,
        pool_prewarm = config.pool.prewarm,
        pool_max_idle = config.pool.max_idle,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let registry = build_registry()?;
    let server = Server::with_pool_config(config.server, &config.pool);
    server.set_handler(Router::new(&registry));

    let handle = server.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            handle.graceful_shutdown(Some(Duration::from_secs(10)));
        }
    });

    server.start().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
