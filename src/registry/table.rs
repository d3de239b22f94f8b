//! Identity → callback side table.

use dashmap::DashMap;

use crate::handler::HandlerFunc;

/// Maps descriptor identities to their dispatchable callbacks.
///
/// Filled alongside registry inserts; an identity keeps the first callback
/// stored for it.
#[derive(Debug, Default)]
pub struct HandlerTable {
    handlers: DashMap<String, HandlerFunc>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `handler` under `id` unless one is already present.
    ///
    /// Returns true if the handler was stored.
    pub fn insert(&self, id: impl Into<String>, handler: HandlerFunc) -> bool {
        let mut inserted = false;
        self.handlers.entry(id.into()).or_insert_with(|| {
            inserted = true;
            handler
        });
        inserted
    }

    pub fn get(&self, id: &str) -> Option<HandlerFunc> {
        self.handlers.get(id).map(|h| h.value().clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.handlers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
