//! The process-wide identity registry.
//!
//! # Design Decisions
//! - Lookups take the read lock only; inserts re-check under the write lock
//!   so concurrent registrations of one identity converge on one entry
//! - Operations are kept in a vector ordered by identity alongside the map,
//!   so enumeration never sorts
//! - Callbacks are stored in a separate [`HandlerTable`] keyed by identity

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::handler::HandlerFunc;
use crate::registry::descriptor::HandlerDescriptor;
use crate::registry::route::{RouteDeclaration, RouteDescriptor};
use crate::registry::table::HandlerTable;

#[derive(Debug, Default)]
struct RegistryState {
    operations: HashMap<String, Arc<HandlerDescriptor>>,
    ordered: Vec<Arc<HandlerDescriptor>>,
    routes: BTreeMap<String, Arc<RouteDescriptor>>,
}

/// Deduplicating store of operation and route descriptors.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    state: RwLock<RegistryState>,
    handlers: HandlerTable,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation descriptor.
    ///
    /// Returns the canonical instance for its identity, which is the
    /// argument itself on first registration.
    pub fn register(&self, descriptor: HandlerDescriptor) -> Arc<HandlerDescriptor> {
        if let Some(existing) = self.get(descriptor.id()) {
            return existing;
        }

        let mut state = self.state.write();
        if let Some(existing) = state.operations.get(descriptor.id()) {
            return existing.clone();
        }

        let descriptor = Arc::new(descriptor);
        let id = descriptor.id().to_string();
        if let Some(handler) = descriptor.handler() {
            self.handlers.insert(id.clone(), handler.clone());
        }
        let at = state
            .ordered
            .partition_point(|d| d.id() < descriptor.id());
        state.ordered.insert(at, descriptor.clone());
        state.operations.insert(id, descriptor.clone());

        tracing::debug!(id = %descriptor.id(), "operation registered");
        descriptor
    }

    /// Register a handler-less placeholder described by `description`.
    pub fn register_nil(&self, description: impl Into<String>) -> Arc<HandlerDescriptor> {
        self.register(HandlerDescriptor::nil(description))
    }

    pub fn get(&self, id: &str) -> Option<Arc<HandlerDescriptor>> {
        self.state.read().operations.get(id).cloned()
    }

    /// All operation descriptors in ascending identity order.
    pub fn enumerate(&self) -> Vec<Arc<HandlerDescriptor>> {
        self.state.read().ordered.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a route and store its callback under the route identity.
    ///
    /// Returns the canonical descriptor. A callback already stored for the
    /// identity is kept.
    pub fn register_route(&self, declaration: RouteDeclaration) -> Arc<RouteDescriptor> {
        let (descriptor, handler) = declaration.into_parts();
        if let Some(existing) = self.get_route(descriptor.id()) {
            return existing;
        }

        let mut state = self.state.write();
        if let Some(existing) = state.routes.get(descriptor.id()) {
            return existing.clone();
        }

        let descriptor = Arc::new(descriptor);
        self.handlers.insert(descriptor.id(), handler);
        state
            .routes
            .insert(descriptor.id().to_string(), descriptor.clone());

        tracing::debug!(
            id = %descriptor.id(),
            prefix = %descriptor.prefix(),
            "route registered"
        );
        descriptor
    }

    /// Expose an operation under `prefix`.
    ///
    /// The operation's suffix is appended to the prefix and its methods
    /// become the route methods. Returns `None` for handler-less operations.
    pub fn mount(&self, prefix: &str, operation: &HandlerDescriptor) -> Option<Arc<RouteDescriptor>> {
        let handler = operation.handler()?.clone();
        let path = format!("{}{}", prefix.trim_end_matches('/'), operation.suffix());
        let descriptor = RouteDescriptor::assemble(
            &handler,
            &path,
            operation.methods().to_vec(),
            operation.description().to_string(),
            Vec::new(),
            operation.params(),
        );

        let declaration = RouteDeclaration::from_parts(descriptor, handler);
        Some(self.register_route(declaration))
    }

    pub fn get_route(&self, id: &str) -> Option<Arc<RouteDescriptor>> {
        self.state.read().routes.get(id).cloned()
    }

    /// All route descriptors in ascending identity order.
    pub fn routes(&self) -> Vec<Arc<RouteDescriptor>> {
        self.state.read().routes.values().cloned().collect()
    }

    /// Callback stored for `id`, for either an operation or a route.
    pub fn handler(&self, id: &str) -> Option<HandlerFunc> {
        self.handlers.get(id)
    }

    pub fn handlers(&self) -> &HandlerTable {
        &self.handlers
    }
}
