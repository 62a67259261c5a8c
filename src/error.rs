//! Construction-time error types for the link.
//!
//! Errors in this module are raised synchronously while building an
//! [`HttpLink`](crate::HttpLink), before any request is ever made. Every
//! failure that happens during request execution flows through the stream
//! contract instead; see [`LinkError`](crate::LinkError).

use thiserror::Error;

/// Errors that can occur while constructing an [`HttpLink`](crate::HttpLink).
///
/// This is the only failure in the crate that escapes the result-stream
/// contract: it reflects a misconfiguration discoverable before any request
/// is made, so it is returned directly from
/// [`HttpLinkBuilder::build`](crate::HttpLinkBuilder::build).
#[derive(Debug, Error)]
pub enum ConstructionError {
    /// No fetch implementation is available.
    ///
    /// Returned when no custom [`Fetcher`](crate::Fetcher) was injected and
    /// the default HTTP client could not be created (for example, TLS
    /// initialization failure).
    #[error("No fetch implementation available: {0}")]
    Fetcher(#[source] reqwest::Error),
}
