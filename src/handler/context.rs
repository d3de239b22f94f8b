//! Per-request framework context.

use std::sync::Arc;

use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::engine::{Request, Response};
use crate::handler::{HandlerError, HandlerResult};
use crate::registry::RouteDescriptor;

/// Path parameters captured while matching a route template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The request/response pair handed to framework handlers.
///
/// Borrows the pooled wrappers for the current dispatch cycle only.
pub struct Context<'a> {
    request: &'a mut Request,
    response: &'a mut Response,
    params: PathParams,
    route: Option<Arc<RouteDescriptor>>,
}

impl<'a> Context<'a> {
    pub fn new(request: &'a mut Request, response: &'a mut Response) -> Self {
        Self {
            request,
            response,
            params: PathParams::new(),
            route: None,
        }
    }

    pub fn with_route(mut self, route: Arc<RouteDescriptor>, params: PathParams) -> Self {
        self.route = Some(route);
        self.params = params;
        self
    }

    pub fn request(&self) -> &Request {
        &*self.request
    }

    pub fn request_mut(&mut self) -> &mut Request {
        &mut *self.request
    }

    pub fn response(&self) -> &Response {
        &*self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut *self.response
    }

    /// Both wrappers at once, for code that needs to touch the pair.
    pub(crate) fn parts_mut(&mut self) -> (&mut Request, &mut Response) {
        (&mut *self.request, &mut *self.response)
    }

    /// Value of path parameter `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Descriptor of the matched route, if the request was routed.
    pub fn route(&self) -> Option<&Arc<RouteDescriptor>> {
        self.route.as_ref()
    }

    /// First decoded value of query parameter `name`.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.request.url().query_param(name)
    }

    /// Decode the request body as JSON.
    pub fn bind_json<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        Ok(serde_json::from_slice(self.request.body())?)
    }

    pub fn json<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) -> HandlerResult {
        self.response
            .write_json(status, value)
            .map_err(|e| HandlerError::internal(e.to_string()))
    }

    pub fn string(&mut self, status: StatusCode, text: &str) -> HandlerResult {
        self.response.write_text(status, text);
        Ok(())
    }

    pub fn no_content(&mut self, status: StatusCode) -> HandlerResult {
        self.response.write_header(status);
        Ok(())
    }
}
