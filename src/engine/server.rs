//! HTTP server setup and control surface.
//!
//! # Responsibilities
//! - Pick the listener: a pre-bound one from the config, or bind `address`
//! - Serve TLS when both certificate and key paths are set, else plaintext
//! - Wire up middleware (request id, trace span)
//! - Collect request bodies and hand native contexts to the dispatcher
//!
//! # Listener selection
//! ```text
//! listener | cert & key | behavior
//! ---------+------------+-------------------------------------
//! absent   | both set   | bind address, serve TLS
//! absent   | not both   | bind address, serve plaintext
//! present  | both set   | serve TLS on the given listener
//! present  | not both   | serve plaintext on the given listener
//! ```

use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request as AxumRequest, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response as AxumResponse},
    Router,
};
use axum_server::Handle;
use http_body_util::LengthLimitError;
use tower_http::{
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::config::{PoolConfig, ServerConfig};
use crate::engine::dispatch::PooledDispatcher;
use crate::engine::native::NativeContext;
use crate::engine::{tls, Handler};

/// Error type for server startup and serving.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind the configured address.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The pre-bound listener could not be prepared.
    #[error("Failed to prepare listener: {0}")]
    Listener(#[source] std::io::Error),

    /// Certificate or key could not be loaded.
    #[error("Failed to load TLS configuration: {0}")]
    Tls(#[source] std::io::Error),

    /// The accept loop failed.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Generates a UUID v4 `x-request-id` for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(id))
    }
}

/// State injected into the native dispatch service.
#[derive(Clone)]
struct EngineState {
    dispatcher: Arc<PooledDispatcher>,
    max_body_bytes: usize,
}

/// HTTP server backed by the pooled dispatcher.
pub struct Server {
    config: ServerConfig,
    dispatcher: Arc<PooledDispatcher>,
    handle: Handle,
}

impl Server {
    /// Plaintext server bound to `address`.
    pub fn new(address: impl Into<String>) -> Self {
        Self::with_config(ServerConfig::new(address))
    }

    /// TLS server bound to `address`.
    pub fn with_tls(
        address: impl Into<String>,
        certfile: impl Into<String>,
        keyfile: impl Into<String>,
    ) -> Self {
        Self::with_config(ServerConfig::new(address).with_tls(certfile, keyfile))
    }

    pub fn with_config(config: ServerConfig) -> Self {
        Self::with_pool_config(config, &PoolConfig::default())
    }

    pub fn with_pool_config(config: ServerConfig, pool: &PoolConfig) -> Self {
        Self {
            config,
            dispatcher: Arc::new(PooledDispatcher::new(pool)),
            handle: Handle::new(),
        }
    }

    /// Replace the request handler. Safe to call while serving.
    pub fn set_handler(&self, handler: impl Handler + 'static) {
        self.dispatcher.set_handler(handler);
    }

    /// Send dispatch-time events to `logger`. Safe to call while serving.
    pub fn set_logger(&self, logger: tracing::Dispatch) {
        self.dispatcher.set_logger(logger);
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<PooledDispatcher> {
        &self.dispatcher
    }

    /// Handle for address discovery and (graceful) shutdown.
    pub fn handle(&self) -> Handle {
        self.handle.clone()
    }

    /// Run one dispatch cycle directly against a native context.
    pub fn serve_native(&self, ctx: &mut NativeContext) {
        self.dispatcher.serve_native(ctx);
    }

    /// The axum service that feeds every request into the dispatcher.
    pub fn service(&self) -> Router {
        let state = EngineState {
            dispatcher: self.dispatcher.clone(),
            max_body_bytes: self.config.max_body_bytes,
        };

        Router::new()
            .fallback(dispatch_native)
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// Serve until the handle is shut down or the accept loop fails.
    pub async fn start(&self) -> Result<(), ServerError> {
        let listener = self.listener().await?;
        let local_addr = listener.local_addr().map_err(ServerError::Listener)?;
        let app = self
            .service()
            .into_make_service_with_connect_info::<SocketAddr>();

        match tls::rustls_config(&self.config)
            .await
            .map_err(ServerError::Tls)?
        {
            Some(tls_config) => {
                tracing::info!(address = %local_addr, "HTTPS server starting");
                axum_server::tls_rustls::from_tcp_rustls(listener, tls_config)
                    .handle(self.handle.clone())
                    .serve(app)
                    .await
                    .map_err(ServerError::Serve)?;
            }
            None => {
                tracing::info!(address = %local_addr, "HTTP server starting");
                axum_server::from_tcp(listener)
                    .handle(self.handle.clone())
                    .serve(app)
                    .await
                    .map_err(ServerError::Serve)?;
            }
        }

        tracing::info!(address = %local_addr, "HTTP server stopped");
        Ok(())
    }

    async fn listener(&self) -> Result<StdTcpListener, ServerError> {
        let listener = match &self.config.listener {
            Some(listener) => listener.try_clone().map_err(ServerError::Listener)?,
            None => {
                let bind_error = |source| ServerError::Bind {
                    address: self.config.address.clone(),
                    source,
                };
                tokio::net::TcpListener::bind(&self.config.address)
                    .await
                    .map_err(bind_error)?
                    .into_std()
                    .map_err(ServerError::Listener)?
            }
        };
        listener
            .set_nonblocking(true)
            .map_err(ServerError::Listener)?;
        Ok(listener)
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

/// Collect the body, build a native context and dispatch it.
async fn dispatch_native(
    State(state): State<EngineState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: AxumRequest<Body>,
) -> AxumResponse {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) if exceeds_limit(&e) => {
            tracing::warn!(
                peer = %peer,
                limit = state.max_body_bytes,
                "Request body rejected"
            );
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
        Err(e) => {
            tracing::warn!(peer = %peer, error = %e, "Failed to read request body");
            return (StatusCode::BAD_REQUEST, "Failed to read request body").into_response();
        }
    };

    let mut ctx = NativeContext::from_parts(parts, body, Some(peer));
    state.dispatcher.serve_native(&mut ctx);
    ctx.into_response()
}

/// True if the body read stopped at the configured size limit.
fn exceeds_limit(e: &axum::Error) -> bool {
    let mut source = std::error::Error::source(e);
    while let Some(err) = source {
        if err.is::<LengthLimitError>() {
            return true;
        }
        source = err.source();
    }
    false
}
