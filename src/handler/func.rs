//! Framework-level handler functions and middleware.

use std::fmt;
use std::sync::Arc;

use crate::handler::{Context, HandlerError};

/// Outcome of a framework handler.
pub type HandlerResult = Result<(), HandlerError>;

type BoxedHandler = dyn Fn(&mut Context<'_>) -> HandlerResult + Send + Sync;

/// A dispatchable callback with a stable symbolic identity.
///
/// The symbol feeds descriptor identities, so it must be the same every time
/// the same logical handler is declared.
#[derive(Clone)]
pub struct HandlerFunc {
    symbol: Arc<str>,
    f: Arc<BoxedHandler>,
}

impl HandlerFunc {
    /// Wrap `f` under an explicit symbol.
    pub fn new<F>(symbol: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            symbol: Arc::from(symbol.into()),
            f: Arc::new(f),
        }
    }

    /// Wrap `f`, deriving the symbol from its type.
    ///
    /// For a function item this is its fully-qualified path. Closures are
    /// additionally tagged with the declaring call site (see
    /// [`callable_symbol`]).
    #[track_caller]
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Self::new(callable_symbol::<F>(), f)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn call(&self, c: &mut Context<'_>) -> HandlerResult {
        (self.f)(c)
    }
}

impl fmt::Debug for HandlerFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerFunc").field(&self.symbol).finish()
    }
}

/// Stable symbol for the callable type `F`.
///
/// Function items map to their path. Every closure in one function shares the
/// type name `path::{{closure}}`, so closures get `@file:line:col` of the
/// caller appended: the same declaration site always yields the same symbol,
/// and different sites never collide.
#[track_caller]
pub fn callable_symbol<F>() -> String {
    let name = std::any::type_name::<F>();
    if !name.contains("{{closure}}") {
        return name.to_string();
    }
    let at = std::panic::Location::caller();
    format!("{name}@{}:{}:{}", at.file(), at.line(), at.column())
}

/// Wraps a handler into another handler.
pub type Middleware = Arc<dyn Fn(HandlerFunc) -> HandlerFunc + Send + Sync>;

/// Apply `middleware` so that the first entry runs outermost.
pub fn chain(handler: HandlerFunc, middleware: &[Middleware]) -> HandlerFunc {
    middleware.iter().rev().fold(handler, |next, m| m(next))
}
