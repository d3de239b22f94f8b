//! Prefix-bound route descriptors.
//!
//! A route binds a callback to a URL prefix. Its identity is derived from the
//! callback symbol, the cleaned prefix and the methods, and deliberately
//! leaves out description and parameters.

use axum::http::Method;
use serde::Serialize;

use crate::handler::HandlerFunc;
use crate::registry::descriptor::{check_params, resolve_method, serialize_methods, DeclarationError};
use crate::registry::identity::route_identity;
use crate::registry::param::{derive_suffix_and_required, Param};
use crate::registry::prefix::decompose_prefix;

/// Canonical description of a declared route.
#[derive(Debug, Clone, Serialize)]
pub struct RouteDescriptor {
    id: String,
    #[serde(serialize_with = "serialize_methods")]
    methods: Vec<Method>,
    prefix: String,
    prefix_path: String,
    prefix_param: String,
    description: String,
    produces: Vec<String>,
    params: Vec<Param>,
}

impl RouteDescriptor {
    /// Assemble a descriptor from already resolved methods.
    pub(crate) fn assemble(
        handler: &HandlerFunc,
        prefix: &str,
        methods: Vec<Method>,
        description: String,
        produces: Vec<String>,
        params: &[Param],
    ) -> Self {
        let parts = decompose_prefix(prefix);
        let (_, params) = derive_suffix_and_required(params);
        let id = route_identity(handler.symbol(), &parts.prefix, &methods);

        Self {
            id,
            methods,
            prefix: parts.prefix,
            prefix_path: parts.path,
            prefix_param: parts.param,
            description,
            produces,
            params,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Methods the route answers to. Empty means any method.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn allows(&self, method: &Method) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }

    /// The full cleaned prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Static part of the prefix, free of parameters.
    pub fn prefix_path(&self) -> &str {
        &self.prefix_path
    }

    /// Parametrized part of the prefix, from the first `/:` on.
    pub fn prefix_param(&self) -> &str {
        &self.prefix_param
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Content types the route produces.
    pub fn produces(&self) -> &[String] {
        &self.produces
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }
}

/// A route declaration awaiting validation.
#[derive(Debug)]
pub struct RouteSpec {
    prefix: String,
    handler: HandlerFunc,
    methods: Vec<String>,
    description: String,
    produces: Vec<String>,
    params: Vec<Param>,
}

impl RouteSpec {
    pub fn new(prefix: impl Into<String>, handler: HandlerFunc) -> Self {
        Self {
            prefix: prefix.into(),
            handler,
            methods: Vec::new(),
            description: String::new(),
            produces: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Methods in declaration order. Leave empty to accept any method.
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn produces<I, S>(mut self, produces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.produces = produces.into_iter().map(Into::into).collect();
        self
    }

    pub fn params(mut self, params: impl IntoIterator<Item = Param>) -> Self {
        self.params = params.into_iter().collect();
        self
    }

    /// Validate and normalize into a declaration ready for registration.
    pub fn build(self) -> Result<RouteDeclaration, DeclarationError> {
        check_params(&self.params)?;

        let mut methods: Vec<Method> = Vec::with_capacity(self.methods.len());
        for token in &self.methods {
            let method = resolve_method(token)?;
            if !methods.contains(&method) {
                methods.push(method);
            }
        }

        let descriptor = RouteDescriptor::assemble(
            &self.handler,
            &self.prefix,
            methods,
            self.description,
            self.produces,
            &self.params,
        );
        Ok(RouteDeclaration::from_parts(descriptor, self.handler))
    }
}

/// A validated route descriptor together with its callback.
#[derive(Debug, Clone)]
pub struct RouteDeclaration {
    descriptor: RouteDescriptor,
    handler: HandlerFunc,
}

impl RouteDeclaration {
    pub(crate) fn from_parts(descriptor: RouteDescriptor, handler: HandlerFunc) -> Self {
        Self {
            descriptor,
            handler,
        }
    }

    pub fn descriptor(&self) -> &RouteDescriptor {
        &self.descriptor
    }

    pub fn handler(&self) -> &HandlerFunc {
        &self.handler
    }

    pub fn into_parts(self) -> (RouteDescriptor, HandlerFunc) {
        (self.descriptor, self.handler)
    }
}
