//! The transport boundary: the injected fetch capability and its wire types.
//!
//! This link never talks to the network directly. It hands a fully resolved
//! [`FetchRequest`] to a [`Fetcher`] — an opaque `send(url, options)`
//! capability injected at link construction — and receives back a
//! [`FetchResponse`] or a [`FetchError`]. The default implementation,
//! [`ReqwestFetcher`], is backed by `reqwest`; tests and embedders can
//! substitute their own.
//!
//! # Cancellation
//!
//! Whether in-flight requests can be aborted is a property of the fetcher,
//! reported through [`Fetcher::supports_abort`]. When supported, the
//! executor creates a controller/signal token pair per invocation via
//! [`create_abort`] and attaches the signal to the request; a fetcher that
//! observes the signal fire must settle with [`FetchError::Aborted`].
//! Without support the link degrades gracefully: requests run to
//! completion and any post-unsubscribe result is discarded.

mod default;

pub use default::ReqwestFetcher;

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// A fully resolved outbound request, ready for the transport.
#[derive(Clone, Debug, Default)]
pub struct FetchRequest {
    /// The HTTP method.
    pub method: String,
    /// The merged request headers.
    pub headers: HashMap<String, String>,
    /// The serialized request body.
    pub body: String,
    /// The resolved credentials mode, if any.
    ///
    /// Advisory for fetchers whose credential policy is client-scoped;
    /// passed through verbatim otherwise.
    pub credentials: Option<String>,
    /// Custom transport flags from the configuration layers, passed through
    /// unchanged.
    pub extra: BTreeMap<String, Value>,
    /// The abort signal for this invocation, when the fetcher supports
    /// cancellation.
    pub signal: Option<CancellationToken>,
}

/// The raw transport response: status, headers, and the body as text.
///
/// This is the value written back into the operation context after the
/// transport settles, before any translation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchResponse {
    /// The HTTP status code.
    pub status: u16,
    /// Response headers, names lowercased.
    pub headers: HashMap<String, String>,
    /// The response body, undecoded.
    pub body: String,
}

impl FetchResponse {
    /// Returns `true` when the status code is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Failures settled by a fetcher.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The invocation's abort signal fired before the request settled.
    ///
    /// Recognized by the executor as an already-handled outcome: the
    /// aborting caller performed its own cleanup, so nothing is delivered
    /// to the subscriber.
    #[error("Request was aborted.")]
    Aborted,

    /// The transport failed for any reason other than cancellation.
    #[error("Network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl FetchError {
    /// Wraps an arbitrary transport failure, preserving the original cause.
    pub fn network(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Network(Box::new(source))
    }

    /// Returns `true` for the recognized abort cause.
    #[must_use]
    pub const fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(source: reqwest::Error) -> Self {
        Self::network(source)
    }
}

/// The injected transport capability: `send(url, options)` settling with a
/// response or a failure.
///
/// Implementations must be safe to share across concurrent invocations;
/// the link holds one fetcher for its lifetime and issues exactly one
/// `fetch` call per invocation.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Reports whether this fetcher can abort in-flight requests.
    ///
    /// When `true`, every [`FetchRequest`] carries an abort signal and the
    /// implementation must settle with [`FetchError::Aborted`] once the
    /// signal fires.
    fn supports_abort(&self) -> bool;

    /// Performs the request.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Aborted`] when the request's signal fired
    /// first, and [`FetchError::Network`] for every other transport
    /// failure. Non-success HTTP statuses are not errors at this boundary;
    /// they settle as a normal [`FetchResponse`].
    async fn fetch(&self, url: &str, request: FetchRequest) -> Result<FetchResponse, FetchError>;
}

/// Creates the per-invocation cancellation handle, if the fetcher supports
/// abort.
///
/// Returns `(controller, signal)`: the executor keeps the controller for
/// teardown and attaches the signal to the outbound request. Cancelling the
/// controller is idempotent and safe after the request has already settled.
/// `None` means the link proceeds without cancellation support — degraded
/// but functional, never an error.
#[must_use]
pub fn create_abort(fetcher: &dyn Fetcher) -> Option<(CancellationToken, CancellationToken)> {
    if !fetcher.supports_abort() {
        return None;
    }
    let controller = CancellationToken::new();
    let signal = controller.child_token();
    Some((controller, signal))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoAbort;

    #[async_trait]
    impl Fetcher for NoAbort {
        fn supports_abort(&self) -> bool {
            false
        }

        async fn fetch(
            &self,
            _url: &str,
            _request: FetchRequest,
        ) -> Result<FetchResponse, FetchError> {
            Ok(FetchResponse::default())
        }
    }

    #[test]
    fn test_no_handle_without_abort_support() {
        assert!(create_abort(&NoAbort).is_none());
    }

    #[test]
    fn test_controller_cancel_fires_signal() {
        let fetcher = ReqwestFetcher::new().unwrap();
        let (controller, signal) = create_abort(&fetcher).unwrap();

        assert!(!signal.is_cancelled());
        controller.cancel();
        assert!(signal.is_cancelled());
    }

    #[test]
    fn test_controller_cancel_is_idempotent() {
        let fetcher = ReqwestFetcher::new().unwrap();
        let (controller, signal) = create_abort(&fetcher).unwrap();

        controller.cancel();
        controller.cancel();
        assert!(signal.is_cancelled());
    }

    #[test]
    fn test_success_status_range() {
        let mut response = FetchResponse::default();
        for status in [200, 204, 299] {
            response.status = status;
            assert!(response.is_success());
        }
        for status in [199, 301, 400, 500] {
            response.status = status;
            assert!(!response.is_success());
        }
    }

    #[test]
    fn test_abort_recognition() {
        assert!(FetchError::Aborted.is_abort());
        let network = FetchError::network(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert!(!network.is_abort());
    }
}
