//! Shared utilities for integration and load testing.

use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use axum::http::StatusCode;
use route_dispatch::config::ServerConfig;
use route_dispatch::handler::{Context, HandlerFunc, HandlerResult};
use route_dispatch::registry::{IdentityRegistry, RouteSpec};
use route_dispatch::routing::Router;
use route_dispatch::Server;

/// Bind an ephemeral local port.
pub fn bound_listener() -> TcpListener {
    TcpListener::bind("127.0.0.1:0").unwrap()
}

/// Start `server` in the background and wait until it accepts connections.
pub async fn spawn(server: Arc<Server>) -> SocketAddr {
    let handle = server.handle();
    tokio::spawn(async move {
        if let Err(e) = server.start().await {
            panic!("server failed: {e}");
        }
    });
    handle.listening().await.expect("server did not start listening")
}

fn echo_user(c: &mut Context<'_>) -> HandlerResult {
    let id = c.param("id").unwrap_or_default().to_string();
    let verbose = c.query("verbose").is_some();
    c.json(StatusCode::OK, &serde_json::json!({ "id": id, "verbose": verbose }))
}

fn create_user(c: &mut Context<'_>) -> HandlerResult {
    let body: serde_json::Value = c.bind_json()?;
    c.json(StatusCode::CREATED, &body)
}

/// A registry with a small user API.
#[allow(dead_code)]
pub fn user_registry() -> IdentityRegistry {
    let registry = IdentityRegistry::new();
    registry.register_route(
        RouteSpec::new("/users/:id", HandlerFunc::new("users::show", echo_user))
            .methods(["GET"])
            .build()
            .unwrap(),
    );
    registry.register_route(
        RouteSpec::new("/users", HandlerFunc::new("users::create", create_user))
            .methods(["POST"])
            .build()
            .unwrap(),
    );
    registry
}

/// A plaintext server on a pre-bound listener, routing `user_registry()`.
#[allow(dead_code)]
pub fn user_server() -> Arc<Server> {
    let config = ServerConfig::new("").with_listener(bound_listener());
    let server = Server::with_config(config);
    server.set_handler(Router::new(&user_registry()));
    Arc::new(server)
}
