//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Snapshot the registry's routes with their callbacks
//! - Resolve a method and path to a route, a method mismatch, or no match
//! - Run the resolved handler and turn its error into a response
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Candidates ordered by static segment count, then identity, so the
//!   most specific template wins deterministically
//! - O(n) template scan (acceptable for typical route counts)
//! - Explicit NoMatch rather than silent default

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method, StatusCode};

use crate::engine::{Handler, Request, Response};
use crate::handler::{chain, Context, HandlerFunc, Middleware, PathParams};
use crate::registry::{clean_path, IdentityRegistry, RouteDescriptor};
use crate::routing::matcher::PathTemplate;

#[derive(Debug)]
struct CompiledRoute {
    template: PathTemplate,
    descriptor: Arc<RouteDescriptor>,
    handler: HandlerFunc,
}

/// Outcome of resolving a request against the routing table.
#[derive(Debug)]
pub enum RouteMatch<'a> {
    Found {
        descriptor: &'a Arc<RouteDescriptor>,
        handler: &'a HandlerFunc,
        params: PathParams,
    },
    /// The path matched, but none of the candidates accept the method.
    MethodNotAllowed { allow: Vec<Method> },
    NotFound,
}

/// Immutable routing table built from an [`IdentityRegistry`].
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<CompiledRoute>,
}

impl Router {
    pub fn new(registry: &IdentityRegistry) -> Self {
        Self::with_middleware(registry, &[])
    }

    /// Build the table, wrapping every route handler in `middleware`.
    ///
    /// The first middleware runs outermost.
    pub fn with_middleware(registry: &IdentityRegistry, middleware: &[Middleware]) -> Self {
        let mut routes: Vec<CompiledRoute> = registry
            .routes()
            .into_iter()
            .filter_map(|descriptor| {
                let Some(handler) = registry.handler(descriptor.id()) else {
                    tracing::warn!(id = %descriptor.id(), "route without handler skipped");
                    return None;
                };
                Some(CompiledRoute {
                    template: PathTemplate::compile(descriptor.prefix()),
                    handler: chain(handler, middleware),
                    descriptor,
                })
            })
            .collect();

        routes.sort_by(|a, b| {
            b.template
                .static_segments()
                .cmp(&a.template.static_segments())
                .then_with(|| a.descriptor.id().cmp(b.descriptor.id()))
        });

        tracing::info!(routes = routes.len(), "Router compiled");
        Self { routes }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Resolve `method` and `path` to a route.
    pub fn resolve(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        let path = clean_path(path);
        let mut allow: Vec<Method> = Vec::new();

        for route in &self.routes {
            let Some(params) = route.template.matches(&path) else {
                continue;
            };
            if route.descriptor.allows(method) {
                return RouteMatch::Found {
                    descriptor: &route.descriptor,
                    handler: &route.handler,
                    params,
                };
            }
            for m in route.descriptor.methods() {
                if !allow.contains(m) {
                    allow.push(m.clone());
                }
            }
        }

        if allow.is_empty() {
            RouteMatch::NotFound
        } else {
            RouteMatch::MethodNotAllowed { allow }
        }
    }
}

impl Handler for Router {
    fn serve_http(&self, request: &mut Request, response: &mut Response) {
        let method = request.method().clone();
        let path = request.path().to_string();

        match self.resolve(&method, &path) {
            RouteMatch::Found {
                descriptor,
                handler,
                params,
            } => {
                let mut c = Context::new(request, response).with_route(descriptor.clone(), params);
                if let Err(e) = handler.call(&mut c) {
                    tracing::warn!(
                        route = %descriptor.id(),
                        status = %e.status(),
                        error = %e.message(),
                        "Handler returned error"
                    );
                    e.write_to(c.response_mut());
                }
            }
            RouteMatch::MethodNotAllowed { allow } => {
                let allow = allow
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                if let Ok(value) = HeaderValue::from_str(&allow) {
                    response.header_mut().set(header::ALLOW, value);
                }
                response.write_text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
            }
            RouteMatch::NotFound => {
                tracing::debug!(method = %method, path = %path, "No route matched");
                response.write_text(StatusCode::NOT_FOUND, "Not Found");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{NativeContext, PooledDispatcher};
    use crate::config::PoolConfig;
    use crate::handler::{HandlerError, HandlerResult};
    use crate::registry::RouteSpec;
    use axum::body::Bytes;

    fn route(registry: &IdentityRegistry, prefix: &str, methods: &[&str], symbol: &str) {
        let tag = symbol.to_string();
        let handler = HandlerFunc::new(symbol, move |c: &mut Context<'_>| -> HandlerResult {
            let id = c.param("id").unwrap_or("-").to_string();
            let body = format!("{tag}:{id}");
            c.string(StatusCode::OK, &body)
        });
        let decl = RouteSpec::new(prefix, handler)
            .methods(methods.iter().copied())
            .build()
            .unwrap();
        registry.register_route(decl);
    }

    fn serve(router: Router, method: Method, uri: &str) -> NativeContext {
        let dispatcher = PooledDispatcher::new(&PoolConfig::default());
        dispatcher.set_handler(router);
        let request = axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::new())
            .unwrap();
        let mut ctx = NativeContext::from_request(request);
        dispatcher.serve_native(&mut ctx);
        ctx
    }

    fn body(ctx: &NativeContext) -> &str {
        std::str::from_utf8(&ctx.response.body).unwrap()
    }

    #[test]
    fn test_static_beats_param() {
        let registry = IdentityRegistry::new();
        route(&registry, "/users/:id", &["GET"], "item");
        route(&registry, "/users/me", &["GET"], "me");
        let router = Router::new(&registry);

        match router.resolve(&Method::GET, "/users/me") {
            RouteMatch::Found { handler, .. } => assert_eq!(handler.symbol(), "me"),
            other => panic!("unexpected: {other:?}"),
        }
        let ctx = serve(router, Method::GET, "/users/42");
        assert_eq!(body(&ctx), "item:42");
    }

    #[test]
    fn test_method_not_allowed_sets_allow() {
        let registry = IdentityRegistry::new();
        route(&registry, "/items", &["GET", "POST"], "items");
        let ctx = serve(Router::new(&registry), Method::DELETE, "/items");

        assert_eq!(ctx.response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ctx.response.headers[header::ALLOW], "GET, POST");
    }

    #[test]
    fn test_not_found() {
        let registry = IdentityRegistry::new();
        route(&registry, "/items", &[], "items");
        let router = Router::new(&registry);
        assert!(matches!(router.resolve(&Method::GET, "/nothing"), RouteMatch::NotFound));

        let ctx = serve(router, Method::PATCH, "/items/");
        assert_eq!(ctx.response.status, StatusCode::OK);
    }

    #[test]
    fn test_handler_error_written() {
        let registry = IdentityRegistry::new();
        let decl = RouteSpec::new(
            "/fail",
            HandlerFunc::new("fail", |_: &mut Context<'_>| Err(HandlerError::bad_request("nope"))),
        )
        .build()
        .unwrap();
        registry.register_route(decl);

        let ctx = serve(Router::new(&registry), Method::GET, "/fail");
        assert_eq!(ctx.response.status, StatusCode::BAD_REQUEST);
        assert_eq!(body(&ctx), "nope");
    }

    #[test]
    fn test_middleware_wraps_handlers() {
        let registry = IdentityRegistry::new();
        route(&registry, "/m", &["GET"], "m");
        let tag: Middleware = Arc::new(|next: HandlerFunc| {
            HandlerFunc::new(format!("tag>{}", next.symbol()), move |c: &mut Context<'_>| {
                c.response_mut()
                    .header_mut()
                    .set(header::HeaderName::from_static("x-tag"), HeaderValue::from_static("1"));
                next.call(c)
            })
        });

        let router = Router::with_middleware(&registry, &[tag]);
        let ctx = serve(router, Method::GET, "/m");
        assert_eq!(ctx.response.headers["x-tag"], "1");
        assert_eq!(body(&ctx), "m:-");
    }

    #[test]
    fn test_matched_route_exposed_on_context() {
        let registry = IdentityRegistry::new();
        let decl = RouteSpec::new(
            "/who/:id",
            HandlerFunc::new("who", |c: &mut Context<'_>| {
                let id = c.route().map(|r| r.id().to_string()).unwrap_or_default();
                c.string(StatusCode::OK, &id)
            }),
        )
        .methods(["GET"])
        .build()
        .unwrap();
        registry.register_route(decl);

        let ctx = serve(Router::new(&registry), Method::GET, "/who/1");
        assert_eq!(body(&ctx), "who[/who/:id][GET]");
    }
}
