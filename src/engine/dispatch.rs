//! Pooled request dispatch.
//!
//! # Per-request protocol
//! ```text
//! NativeContext
//!     → acquire request, response, request-header, response-header, url
//!     → reset each against the native fields
//!     → handler.serve_http(request, response)
//!     → move response fields back into the native context
//!     → release all five (drop guard, runs on every exit path)
//! ```

use std::sync::Arc;
use std::time::Instant;

use arc_swap::{ArcSwap, ArcSwapOption};

use crate::config::PoolConfig;
use crate::engine::native::NativeContext;
use crate::engine::pool::{Pool, PoolStats};
use crate::engine::request::{Request, RequestHeader, Url};
use crate::engine::response::{Response, ResponseHeader};
use crate::engine::{Handler, NotConfigured};
use crate::observability::metrics;

/// One pool per wrapper kind.
#[derive(Debug)]
pub struct WrapperPools {
    pub request: Pool<Request>,
    pub response: Pool<Response>,
    pub request_header: Pool<RequestHeader>,
    pub response_header: Pool<ResponseHeader>,
    pub url: Pool<Url>,
}

/// Counters for all five pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WrapperPoolStats {
    pub request: PoolStats,
    pub response: PoolStats,
    pub request_header: PoolStats,
    pub response_header: PoolStats,
    pub url: PoolStats,
}

impl WrapperPoolStats {
    /// Total instances leased and not yet released, across every kind.
    pub fn in_use(&self) -> usize {
        self.request.in_use
            + self.response.in_use
            + self.request_header.in_use
            + self.response_header.in_use
            + self.url.in_use
    }
}

impl WrapperPools {
    pub fn new(config: &PoolConfig) -> Self {
        let pools = Self {
            request: Pool::new("request", config.max_idle),
            response: Pool::new("response", config.max_idle),
            request_header: Pool::new("request_header", config.max_idle),
            response_header: Pool::new("response_header", config.max_idle),
            url: Pool::new("url", config.max_idle),
        };
        if config.prewarm > 0 {
            pools.request.prewarm(config.prewarm);
            pools.response.prewarm(config.prewarm);
            pools.request_header.prewarm(config.prewarm);
            pools.response_header.prewarm(config.prewarm);
            pools.url.prewarm(config.prewarm);
        }
        pools
    }

    pub fn stats(&self) -> WrapperPoolStats {
        WrapperPoolStats {
            request: self.request.stats(),
            response: self.response.stats(),
            request_header: self.request_header.stats(),
            response_header: self.response_header.stats(),
            url: self.url.stats(),
        }
    }

    /// Acquire and bind all five wrappers to `ctx`.
    fn lease(&self, ctx: &mut NativeContext) -> Lease<'_> {
        // Request
        let mut request_header = self.request_header.acquire();
        let mut url = self.url.acquire();
        let mut request = self.request.acquire();
        request_header.reset(std::mem::take(&mut ctx.request.headers));
        url.reset(std::mem::take(&mut ctx.request.uri));
        request.reset(&mut ctx.request, request_header, url);

        // Response
        let mut response_header = self.response_header.acquire();
        let mut response = self.response.acquire();
        response_header.reset(std::mem::take(&mut ctx.response.headers));
        response.reset(&mut ctx.response, response_header);

        Lease {
            pools: self,
            request: Some(request),
            response: Some(response),
        }
    }
}

/// Exclusive ownership of one set of bound wrappers.
///
/// Dropping the lease returns every wrapper to its pool.
struct Lease<'p> {
    pools: &'p WrapperPools,
    request: Option<Box<Request>>,
    response: Option<Box<Response>>,
}

impl Lease<'_> {
    fn parts(&mut self) -> Option<(&mut Request, &mut Response)> {
        match (self.request.as_deref_mut(), self.response.as_deref_mut()) {
            (Some(rq), Some(rs)) => Some((rq, rs)),
            _ => None,
        }
    }

    fn complete(mut self, ctx: &mut NativeContext) {
        if let Some(response) = self.response.as_mut() {
            response.complete(&mut ctx.response);
        }
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        if let Some(mut request) = self.request.take() {
            let (header, url) = request.unbind();
            if let Some(header) = header {
                self.pools.request_header.release(header);
            }
            if let Some(url) = url {
                self.pools.url.release(url);
            }
            self.pools.request.release(request);
        }
        if let Some(mut response) = self.response.take() {
            if let Some(header) = response.unbind() {
                self.pools.response_header.release(header);
            }
            self.pools.response.release(response);
        }
    }
}

/// Converts native contexts into pooled wrapper pairs and runs the handler.
pub struct PooledDispatcher {
    handler: ArcSwap<Box<dyn Handler>>,
    logger: ArcSwapOption<tracing::Dispatch>,
    pools: WrapperPools,
}

impl PooledDispatcher {
    /// Create a dispatcher with the built-in fallback handler.
    pub fn new(config: &PoolConfig) -> Self {
        Self {
            handler: ArcSwap::from_pointee(Box::new(NotConfigured) as Box<dyn Handler>),
            logger: ArcSwapOption::empty(),
            pools: WrapperPools::new(config),
        }
    }

    /// Replace the handler. Takes effect for the next dispatch cycle.
    pub fn set_handler(&self, handler: impl Handler + 'static) {
        self.handler.store(Arc::new(Box::new(handler)));
    }

    /// Route dispatch-time events to `logger` instead of the global subscriber.
    pub fn set_logger(&self, logger: tracing::Dispatch) {
        self.logger.store(Some(Arc::new(logger)));
    }

    pub fn pool_stats(&self) -> WrapperPoolStats {
        self.pools.stats()
    }

    /// Run one dispatch cycle against `ctx`.
    pub fn serve_native(&self, ctx: &mut NativeContext) {
        match self.logger.load_full() {
            Some(logger) => tracing::dispatcher::with_default(&logger, || self.dispatch(ctx)),
            None => self.dispatch(ctx),
        }
    }

    fn dispatch(&self, ctx: &mut NativeContext) {
        let started = Instant::now();
        let method = ctx.request.method.clone();
        let handler = self.handler.load_full();

        let mut lease = self.pools.lease(ctx);
        if let Some((request, response)) = lease.parts() {
            handler.serve_http(request, response);
        }
        lease.complete(ctx);

        metrics::record_dispatch(method.as_str(), ctx.response.status.as_u16(), started);
    }
}

impl std::fmt::Debug for PooledDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledDispatcher")
            .field("pools", &self.pools)
            .finish_non_exhaustive()
    }
}
