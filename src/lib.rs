//! Route/handler identity registry and pooled request dispatch.
//!
//! # Architecture Overview
//!
//! ```text
//!   declarations                         transport
//!   ────────────                         ─────────
//!   HandlerDescriptor / RouteSpec        axum-server (TCP or TLS)
//!          │                                   │
//!          ▼                                   ▼
//!   registry (identity, dedup,           engine::server (request id, trace,
//!   handler table)                       body collection)
//!          │                                   │
//!          ▼                                   ▼
//!   routing::Router ───── Handler ────▶ engine::dispatch (pooled wrappers)
//!          │
//!          ▼
//!   handler::HandlerFunc(Context)
//! ```

pub mod config;
pub mod engine;
pub mod handler;
pub mod observability;
pub mod registry;
pub mod routing;

pub use config::AppConfig;
pub use engine::{Handler, PooledDispatcher, Server, ServerError};
pub use handler::{Context, HandlerError, HandlerFunc, HandlerResult};
pub use registry::{HandlerDescriptor, IdentityRegistry, Param, ParamIn, RouteDescriptor, RouteSpec};
pub use routing::Router;
