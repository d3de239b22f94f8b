//! Registry introspection endpoint.

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::handler::{Context, HandlerError, HandlerFunc};
use crate::registry::IdentityRegistry;

/// Render registered operations and routes, both in identity order.
pub fn catalog(registry: &IdentityRegistry) -> Value {
    let operations = registry.enumerate();
    let routes = registry.routes();
    let operations: Vec<_> = operations.iter().map(Arc::as_ref).collect();
    let routes: Vec<_> = routes.iter().map(Arc::as_ref).collect();

    json!({
        "operations": operations,
        "routes": routes,
    })
}

/// Handler that serves [`catalog`] as JSON. The catalog is rendered per
/// request, so it reflects registrations made after the handler was built.
///
/// Holds the registry weakly, since the registry usually stores this handler.
pub fn introspection_handler(registry: &Arc<IdentityRegistry>) -> HandlerFunc {
    let registry = Arc::downgrade(registry);
    HandlerFunc::new("routing::introspect", move |c: &mut Context<'_>| {
        let registry = registry.upgrade().ok_or_else(|| {
            HandlerError::new(StatusCode::SERVICE_UNAVAILABLE, "registry dropped")
        })?;
        c.json(StatusCode::OK, &catalog(&registry))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::engine::{NativeContext, PooledDispatcher, Request, Response};
    use crate::registry::{HandlerDescriptor, Param, RouteSpec};
    use axum::body::Bytes;

    #[test]
    fn test_catalog_lists_both_kinds() {
        let registry = Arc::new(IdentityRegistry::new());
        registry.register(
            HandlerDescriptor::builder()
                .description("get user")
                .types(["get"])
                .param(Param::path("id"))
                .handler(HandlerFunc::new("users::get", |_: &mut Context<'_>| Ok(())))
                .build()
                .unwrap(),
        );
        registry.register_nil("later");
        registry.register_route(
            RouteSpec::new("/catalog", introspection_handler(&registry))
                .methods(["GET"])
                .produces(["application/json"])
                .build()
                .unwrap(),
        );

        let value = catalog(&registry);
        let ops = value["operations"].as_array().unwrap();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0]["id"], "nil[][later]");
        assert_eq!(ops[1]["id"], "users::get[/:id][get user][GET]");
        assert_eq!(ops[1]["params"][0]["in"], "path");
        assert_eq!(ops[1]["params"][0]["required"], true);

        let routes = value["routes"].as_array().unwrap();
        assert_eq!(routes[0]["id"], "routing::introspect[/catalog][GET]");
        assert_eq!(routes[0]["prefix_path"], "/catalog");
        assert_eq!(routes[0]["produces"][0], "application/json");
    }

    #[test]
    fn test_handler_serves_live_catalog() {
        let registry = Arc::new(IdentityRegistry::new());
        let handler = introspection_handler(&registry);
        registry.register_nil("added later");

        let dispatcher = PooledDispatcher::new(&PoolConfig::default());
        let h = handler.clone();
        dispatcher.set_handler(move |rq: &mut Request, rs: &mut Response| {
            let _ = h.call(&mut Context::new(rq, rs));
        });
        let mut ctx = NativeContext::from_request(
            axum::http::Request::builder().uri("/").body(Bytes::new()).unwrap(),
        );
        dispatcher.serve_native(&mut ctx);

        let value: Value = serde_json::from_slice(&ctx.response.body).unwrap();
        assert_eq!(value["operations"][0]["id"], "nil[][added later]");
    }
}
