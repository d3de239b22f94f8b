//! Framework-level response wrappers.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use bytes::BytesMut;
use serde::Serialize;

use crate::engine::native::NativeResponse;
use crate::engine::pool::Recycle;

/// Response header view bound to the native header map.
#[derive(Debug, Default)]
pub struct ResponseHeader {
    headers: HeaderMap,
}

impl ResponseHeader {
    pub(crate) fn reset(&mut self, native: HeaderMap) {
        self.headers = native;
    }

    pub(crate) fn take_native(&mut self) -> HeaderMap {
        std::mem::take(&mut self.headers)
    }

    /// Replace all values of `name` with `value`.
    pub fn set(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Append `value` to the values of `name`.
    pub fn add(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.append(name, value);
    }

    pub fn remove(&mut self, name: impl header::AsHeaderName) -> Option<HeaderValue> {
        self.headers.remove(name)
    }

    pub fn get(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn contains(&self, name: impl header::AsHeaderName) -> bool {
        self.headers.contains_key(name)
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

impl Recycle for ResponseHeader {
    fn recycle(&mut self) {
        self.headers.clear();
    }
}

/// Framework-level response capability.
///
/// Caches the status, the number of body bytes written and whether the
/// status line has been committed.
#[derive(Debug, Default)]
pub struct Response {
    status: StatusCode,
    size: u64,
    committed: bool,
    body: BytesMut,
    header: Option<Box<ResponseHeader>>,
}

impl Response {
    /// Bind to a native response, composing the already reset header.
    pub(crate) fn reset(&mut self, native: &mut NativeResponse, header: Box<ResponseHeader>) {
        self.status = native.status;
        self.size = 0;
        self.committed = false;
        self.body = std::mem::take(&mut native.body);
        self.header = Some(header);
    }

    pub(crate) fn unbind(&mut self) -> Option<Box<ResponseHeader>> {
        self.header.take()
    }

    /// Move status, headers and body back into the native response.
    pub(crate) fn complete(&mut self, native: &mut NativeResponse) {
        native.status = self.status;
        native.body = std::mem::take(&mut self.body);
        if let Some(header) = self.header.as_mut() {
            native.headers = header.take_native();
        }
    }

    pub(crate) fn lend_native(&mut self) -> NativeResponse {
        NativeResponse {
            status: self.status,
            headers: self
                .header
                .as_mut()
                .map(|h| h.take_native())
                .unwrap_or_default(),
            body: std::mem::take(&mut self.body),
        }
    }

    /// Rebind after a native callback, refreshing the cached status and size.
    pub(crate) fn restore_native(&mut self, native: NativeResponse) {
        self.status = native.status;
        self.size = native.content_length();
        self.body = native.body;
        if let Some(header) = self.header.as_mut() {
            header.reset(native.headers);
        }
    }

    pub fn header(&self) -> &ResponseHeader {
        self.header
            .as_deref()
            .expect("response header is bound for the whole dispatch cycle")
    }

    pub fn header_mut(&mut self) -> &mut ResponseHeader {
        self.header
            .as_deref_mut()
            .expect("response header is bound for the whole dispatch cycle")
    }

    /// Set the status. Ignored with a warning once the response is committed.
    pub fn write_header(&mut self, status: StatusCode) {
        if self.committed {
            tracing::warn!(
                current = %self.status,
                attempted = %status,
                "response already committed"
            );
            return;
        }
        self.status = status;
        self.committed = true;
    }

    /// Append body bytes, committing a 200 status first if needed.
    pub fn write(&mut self, data: &[u8]) -> usize {
        if !self.committed {
            self.write_header(StatusCode::OK);
        }
        self.body.extend_from_slice(data);
        self.size += data.len() as u64;
        data.len()
    }

    /// Write a plain text body with the given status.
    pub fn write_text(&mut self, status: StatusCode, text: &str) {
        self.header_mut().set(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        self.write_header(status);
        self.write(text.as_bytes());
    }

    /// Serialize `value` as the JSON body with the given status.
    pub fn write_json<T: Serialize + ?Sized>(
        &mut self,
        status: StatusCode,
        value: &T,
    ) -> Result<(), serde_json::Error> {
        let encoded = serde_json::to_vec(value)?;
        self.header_mut().set(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.write_header(status);
        self.write(&encoded);
        Ok(())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Body bytes written so far, or the content length reported by a native
    /// callback.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn committed(&self) -> bool {
        self.committed
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

impl Recycle for Response {
    fn recycle(&mut self) {
        self.status = StatusCode::OK;
        self.size = 0;
        self.committed = false;
        self.body = BytesMut::new();
        self.header = None;
    }
}
