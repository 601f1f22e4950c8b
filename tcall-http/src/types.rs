use std::collections::BTreeMap;

use bytes::Bytes;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// Procedure name, sent as `RPC-Procedure`.
    pub method: String,
    pub body: Bytes,
    /// Extra headers passed through as-is. Names are case-insensitive on the wire.
    pub headers: BTreeMap<String, String>,
}

impl Request {
    #[must_use]
    pub fn new(method: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            method: method.into(),
            body: body.into(),
            headers: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub body: Bytes,
    /// Response headers (lowercased header names). Multiple values are joined with ", ".
    pub headers: BTreeMap<String, String>,
}

impl Response {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}
