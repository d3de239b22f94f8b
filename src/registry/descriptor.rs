//! Operation-bound handler descriptors.
//!
//! # Responsibilities
//! - Normalize declared method types (default set, case, order, duplicates)
//! - Resolve surviving types to HTTP methods
//! - Derive the path suffix and force path parameters required
//! - Derive the operation identity
//!
//! # Design Decisions
//! - All normalization happens in `build()`; a built descriptor is immutable
//! - `build()` is where malformed declarations are rejected; registering a
//!   built descriptor cannot fail

use axum::http::Method;
use serde::{Serialize, Serializer};

use crate::handler::{Context, HandlerFunc, HandlerResult};
use crate::registry::identity::{operation_identity, NIL_SYMBOL};
use crate::registry::param::{derive_suffix_and_required, Param};

/// Method types used when a declaration lists none.
pub const STANDARD_TYPES: [&str; 9] = [
    "CONNECT", "DELETE", "GET", "HEAD", "OPTIONS", "PATCH", "POST", "PUT", "TRACE",
];

/// A declaration rejected while building a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclarationError {
    #[error("invalid method type {0:?}")]
    InvalidMethod(String),

    #[error("parameter #{index} has an empty name")]
    EmptyParamName { index: usize },
}

/// Resolve a method type token to a dispatch-level method.
pub(crate) fn resolve_method(token: &str) -> Result<Method, DeclarationError> {
    let upper = token.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return Err(DeclarationError::InvalidMethod(token.to_string()));
    }
    Method::from_bytes(upper.as_bytes()).map_err(|_| DeclarationError::InvalidMethod(token.to_string()))
}

pub(crate) fn check_params(params: &[Param]) -> Result<(), DeclarationError> {
    match params.iter().position(|p| p.name.trim().is_empty()) {
        Some(index) => Err(DeclarationError::EmptyParamName { index }),
        None => Ok(()),
    }
}

pub(crate) fn serialize_methods<S: Serializer>(methods: &[Method], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(methods.iter().map(Method::as_str))
}

/// Upper-case, sort and deduplicate types, then resolve the survivors.
fn normalize_types(declared: &[String]) -> Result<(Vec<String>, Vec<Method>), DeclarationError> {
    let mut types: Vec<String> = if declared.is_empty() {
        STANDARD_TYPES.iter().map(|t| t.to_string()).collect()
    } else {
        declared.iter().map(|t| t.trim().to_ascii_uppercase()).collect()
    };
    types.sort();
    types.dedup();

    let methods = types
        .iter()
        .map(|t| resolve_method(t))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((types, methods))
}

/// Canonical description of a declared operation.
#[derive(Debug, Clone, Serialize)]
pub struct HandlerDescriptor {
    id: String,
    description: String,
    types: Vec<String>,
    #[serde(serialize_with = "serialize_methods")]
    methods: Vec<Method>,
    params: Vec<Param>,
    suffix: String,
    #[serde(skip)]
    handler: Option<HandlerFunc>,
}

impl HandlerDescriptor {
    pub fn builder() -> HandlerDescriptorBuilder {
        HandlerDescriptorBuilder::default()
    }

    /// A handler-less placeholder carrying only a description.
    pub fn nil(description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            id: operation_identity::<&str>(NIL_SYMBOL, "", &description, &[]),
            description,
            types: Vec::new(),
            methods: Vec::new(),
            params: Vec::new(),
            suffix: String::new(),
            handler: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Declared types after normalization, in identity order.
    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// Resolved methods, one per surviving type.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// URL suffix contributed by path parameters (`/:a/:b`).
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn handler(&self) -> Option<&HandlerFunc> {
        self.handler.as_ref()
    }
}

/// Collects a declaration and normalizes it into a [`HandlerDescriptor`].
#[derive(Debug, Default)]
pub struct HandlerDescriptorBuilder {
    description: String,
    types: Vec<String>,
    params: Vec<Param>,
    handler: Option<HandlerFunc>,
}

impl HandlerDescriptorBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Declared method types. An empty list means every standard method.
    pub fn types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Parameters, with path parameters in URL order.
    pub fn params(mut self, params: impl IntoIterator<Item = Param>) -> Self {
        self.params = params.into_iter().collect();
        self
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn handler(mut self, handler: HandlerFunc) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Shorthand for `handler(HandlerFunc::from_fn(f))`.
    #[track_caller]
    pub fn handler_fn<F>(self, f: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.handler(HandlerFunc::from_fn(f))
    }

    pub fn build(self) -> Result<HandlerDescriptor, DeclarationError> {
        check_params(&self.params)?;
        let (types, methods) = normalize_types(&self.types)?;
        let (suffix, params) = derive_suffix_and_required(&self.params);

        let symbol = self
            .handler
            .as_ref()
            .map(HandlerFunc::symbol)
            .unwrap_or(NIL_SYMBOL);
        let id = operation_identity(symbol, &suffix, &self.description, &types);

        Ok(HandlerDescriptor {
            id,
            description: self.description,
            types,
            methods,
            params,
            suffix,
            handler: self.handler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> HandlerFunc {
        HandlerFunc::new("app::noop", |_: &mut Context<'_>| Ok(()))
    }

    #[test]
    fn test_case_variants_collapse() {
        let d = HandlerDescriptor::builder()
            .types(["GET", "get", "POST"])
            .handler(noop())
            .build()
            .unwrap();

        assert_eq!(d.types(), ["GET", "POST"]);
        assert_eq!(d.methods(), [Method::GET, Method::POST]);
    }

    #[test]
    fn test_empty_types_default_to_standard_set() {
        let d = HandlerDescriptor::builder().handler(noop()).build().unwrap();
        assert_eq!(d.types().len(), STANDARD_TYPES.len());
        assert_eq!(d.methods()[0], Method::CONNECT);
        assert_eq!(d.methods()[8], Method::TRACE);
    }

    #[test]
    fn test_suffix_and_required_applied() {
        let d = HandlerDescriptor::builder()
            .description("show user")
            .types(["GET"])
            .params([Param::path("id"), Param::query("name")])
            .handler(noop())
            .build()
            .unwrap();

        assert_eq!(d.suffix(), "/:id");
        assert!(d.params()[0].required);
        assert!(!d.params()[1].required);
        assert_eq!(d.id(), "app::noop[/:id][show user][GET]");
    }

    #[test]
    fn test_identity_is_deterministic() {
        let build = || {
            HandlerDescriptor::builder()
                .description("d")
                .types(["post", "GET"])
                .param(Param::path("id"))
                .handler(noop())
                .build()
                .unwrap()
        };
        assert_eq!(build().id(), build().id());
        assert_eq!(build().id(), "app::noop[/:id][d][GET][POST]");
    }

    #[test]
    fn test_invalid_declarations_rejected() {
        let err = HandlerDescriptor::builder().types(["G E T"]).build().unwrap_err();
        assert_eq!(err, DeclarationError::InvalidMethod("G E T".into()));

        let err = HandlerDescriptor::builder()
            .params([Param::query("ok"), Param::path(" ")])
            .build()
            .unwrap_err();
        assert_eq!(err, DeclarationError::EmptyParamName { index: 1 });
    }

    #[test]
    fn test_nil_descriptor() {
        let d = HandlerDescriptor::nil("placeholder");
        assert_eq!(d.id(), "nil[][placeholder]");
        assert!(d.handler().is_none());
        assert!(d.methods().is_empty());
    }

    #[test]
    fn test_serializes_methods_as_strings() {
        let d = HandlerDescriptor::builder()
            .types(["PUT"])
            .handler(noop())
            .build()
            .unwrap();
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["methods"], serde_json::json!(["PUT"]));
        assert!(json.get("handler").is_none());
    }
}
