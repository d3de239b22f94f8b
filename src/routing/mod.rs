//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! IdentityRegistry (routes + handler table)
//!     → router.rs (snapshot, compile templates, order by specificity)
//!     → matcher.rs (segment match, capture :params)
//!     → Found → HandlerFunc(Context) | MethodNotAllowed (405) | NotFound (404)
//! ```
//!
//! # Design Decisions
//! - The router is a snapshot; routes registered later need a new router
//! - Deterministic: same input always matches same route
//! - The router is itself an engine `Handler`, so it plugs into `set_handler`

pub mod introspect;
pub mod matcher;
pub mod router;

pub use introspect::{catalog, introspection_handler};
pub use matcher::PathTemplate;
pub use router::{RouteMatch, Router};
