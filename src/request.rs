//! Incoming HTTP request type.

use bytes::Bytes;

use crate::params::{ParamRecorder, RouteParams};

/// An incoming HTTP request, with its body already collected and the path
/// parameters captured by the router.
pub struct Request {
    parts: http::request::Parts,
    body: Bytes,
    params: RouteParams,
}

impl Request {
    pub(crate) fn new(parts: http::request::Parts, body: Bytes, params: RouteParams) -> Self {
        Self { parts, body, params }
    }

    /// Assembles a request from pre-split pieces. Intended for exercising
    /// handlers in tests without a listening server.
    pub fn from_parts(parts: http::request::Parts, body: Bytes, params: RouteParams) -> Self {
        Self::new(parts, body, params)
    }

    pub fn method(&self) -> &http::Method {
        &self.parts.method
    }

    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Header lookup by name (case-insensitive). Values that are not valid
    /// UTF-8 read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name)?.to_str().ok()
    }

    /// A named path parameter.
    ///
    /// For a route `/users/:id`, `req.param("id")` on `/users/42` returns
    /// `Some("42")`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.lookup(name)
    }

    /// All captured path parameters.
    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    #[cfg(test)]
    pub(crate) fn test(path: &str) -> Self {
        let (parts, ()) = http::Request::builder()
            .uri(path)
            .body(())
            .expect("test request")
            .into_parts();
        Self::new(parts, Bytes::new(), RouteParams::new())
    }
}
