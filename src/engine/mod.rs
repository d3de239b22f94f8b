//! Transport engine adapter.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection (axum-server)
//!     → server.rs (listener selection, TLS, request id, trace span)
//!     → native.rs (collect body into a NativeContext)
//!     → dispatch.rs (lease pooled wrappers, run handler, release)
//!     → native.rs (NativeContext → transport response)
//! ```
//!
//! # Design Decisions
//! - Wrappers are pooled per kind (pool.rs) and own the native fields they
//!   are bound to for exactly one cycle
//! - Release is tied to a drop guard, so it also runs when a handler panics
//! - The handler and logger can be swapped while serving

pub mod dispatch;
pub mod native;
pub mod pool;
pub mod request;
pub mod response;
pub mod server;
pub mod tls;

pub use dispatch::{PooledDispatcher, WrapperPoolStats, WrapperPools};
pub use native::{NativeContext, NativeRequest, NativeResponse};
pub use pool::{Pool, PoolStats, Recycle};
pub use request::{Request, RequestHeader, Url};
pub use response::{Response, ResponseHeader};
pub use server::{Server, ServerError};

/// Engine-level handler invoked once per dispatch cycle.
pub trait Handler: Send + Sync {
    fn serve_http(&self, request: &mut Request, response: &mut Response);
}

impl<F> Handler for F
where
    F: Fn(&mut Request, &mut Response) + Send + Sync,
{
    fn serve_http(&self, request: &mut Request, response: &mut Response) {
        self(request, response)
    }
}

/// Handler used until `set_handler` is called.
///
/// Logs an error and leaves the response untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotConfigured;

impl Handler for NotConfigured {
    fn serve_http(&self, request: &mut Request, _response: &mut Response) {
        tracing::error!(
            method = %request.method(),
            path = %request.path(),
            "handler not set, use `set_handler()` to set it"
        );
    }
}
