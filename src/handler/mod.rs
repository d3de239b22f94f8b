//! Framework handler abstraction.
//!
//! # Responsibilities
//! - `Context`: the request/response pair plus routing results
//! - `HandlerFunc`: a callback with a stable symbolic identity
//! - `Middleware`: handler-to-handler wrappers
//! - `bridge`: embed transport-native callbacks as handlers or middleware

pub mod bridge;
pub mod context;
pub mod error;
pub mod func;

pub use bridge::{wrap_handler, wrap_middleware};
pub use context::{Context, PathParams};
pub use error::HandlerError;
pub use func::{callable_symbol, chain, HandlerFunc, HandlerResult, Middleware};
