//! Unified error type.
//!
//! Only *registration-time* and *infrastructure* failures are errors. A path
//! that matches nothing, or a matched path without a handler for the request
//! method, is an ordinary [`RouteMatch`](crate::RouteMatch) variant — those
//! outcomes happen on every stray request and must stay cheap.

use thiserror::Error;

/// The error type returned by byway's fallible operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Registration used a method name outside the nine recognized ones
    /// (plus the `"ALL"` sentinel).
    #[error("unknown HTTP method `{0}`")]
    UnknownMethod(String),

    /// Registration used a pattern the trie refuses: a catch-all before the
    /// final segment, an unnamed `:` parameter, or a malformed regex group.
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Server infrastructure failure: binding a port or accepting a connection.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern { pattern: pattern.to_owned(), reason: reason.into() }
    }
}
