//! Framework-level request wrappers.
//!
//! `Request`, `RequestHeader` and `Url` are pooled. For one dispatch cycle they
//! own the corresponding fields of the native request; outside a cycle they
//! hold nothing.

use std::net::SocketAddr;
use std::sync::OnceLock;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, Uri, Version};

use crate::engine::native::NativeRequest;
use crate::engine::pool::Recycle;

/// Request header view bound to the native header map.
#[derive(Debug, Default)]
pub struct RequestHeader {
    headers: HeaderMap,
}

impl RequestHeader {
    pub(crate) fn reset(&mut self, native: HeaderMap) {
        self.headers = native;
    }

    pub(crate) fn take_native(&mut self) -> HeaderMap {
        std::mem::take(&mut self.headers)
    }

    /// First value of `name` as a string, if present and valid UTF-8.
    pub fn get(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn get_all(&self, name: impl header::AsHeaderName) -> impl Iterator<Item = &HeaderValue> {
        self.headers.get_all(name).into_iter()
    }

    pub fn contains(&self, name: impl header::AsHeaderName) -> bool {
        self.headers.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &HeaderName> {
        self.headers.keys()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn as_map(&self) -> &HeaderMap {
        &self.headers
    }
}

impl Recycle for RequestHeader {
    fn recycle(&mut self) {
        self.headers.clear();
    }
}

/// URL view bound to the native request URI.
///
/// Query pairs are decoded on first use and cached until the next reset.
#[derive(Debug, Default)]
pub struct Url {
    uri: Uri,
    query: OnceLock<Vec<(String, String)>>,
}

impl Url {
    pub(crate) fn reset(&mut self, native: Uri) {
        self.uri = native;
        self.query = OnceLock::new();
    }

    pub(crate) fn take_native(&mut self) -> Uri {
        self.query = OnceLock::new();
        std::mem::take(&mut self.uri)
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn raw_query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Decoded query pairs in their original order.
    pub fn query_pairs(&self) -> &[(String, String)] {
        self.query.get_or_init(|| {
            self.uri
                .query()
                .map(|q| {
                    url::form_urlencoded::parse(q.as_bytes())
                        .into_owned()
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    /// First decoded value of query parameter `name`.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_pairs()
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl Recycle for Url {
    fn recycle(&mut self) {
        self.uri = Uri::default();
        self.query = OnceLock::new();
    }
}

/// Framework-level request capability.
#[derive(Debug, Default)]
pub struct Request {
    method: Method,
    version: Version,
    body: Bytes,
    remote_addr: Option<SocketAddr>,
    header: Option<Box<RequestHeader>>,
    url: Option<Box<Url>>,
}

impl Request {
    /// Bind to a native request, composing the already reset header and URL.
    pub(crate) fn reset(
        &mut self,
        native: &mut NativeRequest,
        header: Box<RequestHeader>,
        url: Box<Url>,
    ) {
        self.method = native.method.clone();
        self.version = native.version;
        self.body = std::mem::take(&mut native.body);
        self.remote_addr = native.remote_addr;
        self.header = Some(header);
        self.url = Some(url);
    }

    /// Detach the composed wrappers so they can be returned to their pools.
    pub(crate) fn unbind(&mut self) -> (Option<Box<RequestHeader>>, Option<Box<Url>>) {
        (self.header.take(), self.url.take())
    }

    /// Move the bound native fields out for a native callback.
    pub(crate) fn lend_native(&mut self) -> NativeRequest {
        NativeRequest {
            method: self.method.clone(),
            uri: self.url.as_mut().map(|u| u.take_native()).unwrap_or_default(),
            version: self.version,
            headers: self
                .header
                .as_mut()
                .map(|h| h.take_native())
                .unwrap_or_default(),
            body: self.body.clone(),
            remote_addr: self.remote_addr,
        }
    }

    /// Rebind the native fields after a native callback ran.
    pub(crate) fn restore_native(&mut self, native: NativeRequest) {
        self.method = native.method;
        self.version = native.version;
        self.body = native.body;
        self.remote_addr = native.remote_addr;
        if let Some(header) = self.header.as_mut() {
            header.reset(native.headers);
        }
        if let Some(url) = self.url.as_mut() {
            url.reset(native.uri);
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    pub fn header(&self) -> &RequestHeader {
        self.header
            .as_deref()
            .expect("request header is bound for the whole dispatch cycle")
    }

    pub fn url(&self) -> &Url {
        self.url
            .as_deref()
            .expect("request url is bound for the whole dispatch cycle")
    }

    pub fn path(&self) -> &str {
        self.url().path()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header().get(header::CONTENT_TYPE)
    }
}

impl Recycle for Request {
    fn recycle(&mut self) {
        self.method = Method::default();
        self.version = Version::default();
        self.body = Bytes::new();
        self.remote_addr = None;
        self.header = None;
        self.url = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native(uri: &str) -> NativeRequest {
        let mut headers = HeaderMap::new();
        headers.insert("x-user", "alice".parse().unwrap());
        NativeRequest {
            method: Method::PUT,
            uri: uri.parse().unwrap(),
            body: Bytes::from_static(b"{}"),
            headers,
            ..Default::default()
        }
    }

    fn bound(native: &mut NativeRequest) -> Request {
        let mut header = Box::<RequestHeader>::default();
        header.reset(std::mem::take(&mut native.headers));
        let mut url = Box::<Url>::default();
        url.reset(std::mem::take(&mut native.uri));
        let mut request = Request::default();
        request.reset(native, header, url);
        request
    }

    #[test]
    fn test_reset_binds_native_fields() {
        let mut n = native("/items?id=3&tag=a%20b");
        let request = bound(&mut n);

        assert_eq!(request.method(), Method::PUT);
        assert_eq!(request.path(), "/items");
        assert_eq!(request.header().get("x-user"), Some("alice"));
        assert_eq!(request.url().query_param("id"), Some("3"));
        assert_eq!(request.url().query_param("tag"), Some("a b"));
        assert_eq!(&request.body()[..], b"{}");
    }

    #[test]
    fn test_url_reset_drops_cached_query() {
        let mut url = Url::default();
        url.reset("/a?x=1".parse().unwrap());
        assert_eq!(url.query_param("x"), Some("1"));

        url.reset("/b?y=2".parse().unwrap());
        assert_eq!(url.query_param("x"), None);
        assert_eq!(url.query_param("y"), Some("2"));
    }

    #[test]
    fn test_lend_and_restore_round_trip() {
        let mut n = native("/a?x=1");
        let mut request = bound(&mut n);
        assert_eq!(request.url().query_param("x"), Some("1"));

        let mut lent = request.lend_native();
        assert!(request.header().is_empty());
        lent.uri = "/b?x=2".parse().unwrap();
        request.restore_native(lent);

        assert_eq!(request.path(), "/b");
        assert_eq!(request.url().query_param("x"), Some("2"));
        assert_eq!(request.header().get("x-user"), Some("alice"));
    }

    #[test]
    fn test_recycle_clears_everything() {
        let mut n = native("/a");
        let mut request = bound(&mut n);
        let (header, url) = request.unbind();
        assert!(header.is_some() && url.is_some());

        request.recycle();
        assert!(request.body().is_empty());
        assert_eq!(request.method(), Method::GET);
        assert!(request.remote_addr().is_none());
    }
}
