//! Transport-native request/response context.
//!
//! This is the representation the transport layer hands to the dispatcher:
//! a fully read request and a response under construction. Framework code
//! never sees it directly; it is bound to pooled wrappers for the length of
//! one dispatch cycle.

use std::net::SocketAddr;

use axum::body::{Body, Bytes};
use axum::http::{header, request, HeaderMap, Method, StatusCode, Uri, Version};
use axum::response::Response as AxumResponse;
use bytes::BytesMut;

/// The request half of a native context.
#[derive(Debug, Clone, Default)]
pub struct NativeRequest {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub remote_addr: Option<SocketAddr>,
}

/// The response half of a native context.
#[derive(Debug, Clone, Default)]
pub struct NativeResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: BytesMut,
}

impl NativeResponse {
    /// Declared content length, falling back to the buffered body length.
    pub fn content_length(&self) -> u64 {
        self.headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(self.body.len() as u64)
    }
}

/// A native request/response pair for one inbound request.
#[derive(Debug, Clone, Default)]
pub struct NativeContext {
    pub request: NativeRequest,
    pub response: NativeResponse,
}

impl NativeContext {
    /// Build a context from request parts and an already collected body.
    pub fn from_parts(parts: request::Parts, body: Bytes, remote_addr: Option<SocketAddr>) -> Self {
        Self {
            request: NativeRequest {
                method: parts.method,
                uri: parts.uri,
                version: parts.version,
                headers: parts.headers,
                body,
                remote_addr,
            },
            response: NativeResponse::default(),
        }
    }

    /// Build a context from a buffered request. Mostly useful in tests.
    pub fn from_request(request: axum::http::Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        Self::from_parts(parts, body, None)
    }

    /// Turn the response half into a transport response.
    pub fn into_response(self) -> AxumResponse {
        let NativeResponse {
            status,
            headers,
            body,
        } = self.response;

        let mut response = AxumResponse::new(Body::from(body.freeze()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_length_prefers_header() {
        let mut rs = NativeResponse::default();
        rs.body.extend_from_slice(b"hello");
        assert_eq!(rs.content_length(), 5);

        rs.headers.insert(header::CONTENT_LENGTH, "42".parse().unwrap());
        assert_eq!(rs.content_length(), 42);
    }

    #[test]
    fn test_from_request_keeps_fields() {
        let req = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/items?id=7")
            .header("x-test", "1")
            .body(Bytes::from_static(b"payload"))
            .unwrap();
        let ctx = NativeContext::from_request(req);

        assert_eq!(ctx.request.method, Method::POST);
        assert_eq!(ctx.request.uri.path(), "/items");
        assert_eq!(ctx.request.headers["x-test"], "1");
        assert_eq!(&ctx.request.body[..], b"payload");
        assert_eq!(ctx.response.status, StatusCode::OK);
    }

    #[test]
    fn test_into_response() {
        let mut ctx = NativeContext::default();
        ctx.response.status = StatusCode::CREATED;
        ctx.response.headers.insert("x-id", "9".parse().unwrap());
        ctx.response.body.extend_from_slice(b"done");

        let response = ctx.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["x-id"], "9");
    }
}
