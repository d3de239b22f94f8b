//! Handler and route identity registry.
//!
//! # Data Flow
//! ```text
//! HandlerDescriptor::builder() / RouteSpec::new()
//!     → param.rs (path suffix, required path params)
//!     → prefix.rs (clean and split route prefixes)
//!     → identity.rs (deterministic identity string)
//!     → store.rs (dedup by identity, keep canonical instance)
//!     → table.rs (identity → callback)
//! ```
//!
//! # Design Decisions
//! - Descriptors are normalized once, when built, and immutable afterwards
//! - Identity is the only key; registering an equal identity twice returns
//!   the first instance
//! - Operation identities include description and parameters, route
//!   identities do not

pub mod descriptor;
pub mod identity;
pub mod param;
pub mod prefix;
pub mod route;
pub mod store;
pub mod table;

pub use descriptor::{DeclarationError, HandlerDescriptor, HandlerDescriptorBuilder, STANDARD_TYPES};
pub use identity::{operation_identity, route_identity, NIL_SYMBOL};
pub use param::{derive_suffix_and_required, Param, ParamIn};
pub use prefix::{clean_path, decompose_prefix, PrefixParts};
pub use route::{RouteDeclaration, RouteDescriptor, RouteSpec};
pub use store::IdentityRegistry;
pub use table::HandlerTable;
