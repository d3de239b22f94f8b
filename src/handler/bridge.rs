//! Adapters that embed transport-native callbacks in the handler chain.
//!
//! The native callback runs against a `NativeContext` lent out of the bound
//! wrappers. Afterwards the fields are rebound and the response wrapper's
//! cached status and size are refreshed from the native response, so later
//! logging and metrics see what the callback produced.

use crate::engine::NativeContext;
use crate::handler::{callable_symbol, Context, HandlerFunc, Middleware};

/// Run `native` against the context's native request/response pair.
fn run_native<F>(native: &F, c: &mut Context<'_>)
where
    F: Fn(&mut NativeContext),
{
    let (request, response) = c.parts_mut();
    let mut ctx = NativeContext {
        request: request.lend_native(),
        response: response.lend_native(),
    };

    native(&mut ctx);

    request.restore_native(ctx.request);
    response.restore_native(ctx.response);
}

/// Wrap a native callback as a framework handler. Never reports an error.
#[track_caller]
pub fn wrap_handler<F>(native: F) -> HandlerFunc
where
    F: Fn(&mut NativeContext) + Send + Sync + 'static,
{
    HandlerFunc::new(callable_symbol::<F>(), move |c: &mut Context<'_>| {
        run_native(&native, c);
        Ok(())
    })
}

/// Wrap a native callback as middleware that runs it, then the next handler.
#[track_caller]
pub fn wrap_middleware<F>(native: F) -> Middleware
where
    F: Fn(&mut NativeContext) + Send + Sync + 'static,
{
    let outer = callable_symbol::<F>();
    let native = std::sync::Arc::new(native);
    std::sync::Arc::new(move |next: HandlerFunc| {
        let native = native.clone();
        let symbol = format!("{outer}>{}", next.symbol());
        HandlerFunc::new(symbol, move |c: &mut Context<'_>| {
            run_native(native.as_ref(), c);
            next.call(c)
        })
    })
}
