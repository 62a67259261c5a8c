//! Execution-time error types for the link.
//!
//! Every failure that occurs after construction flows through the result
//! stream as a single delivered [`LinkError`]; nothing here is ever thrown
//! past the subscriber. A recognized abort is deliberately absent from this
//! taxonomy — it produces silence, not a delivery, because the
//! unsubscribing caller already performed its own cleanup.

use serde_json::Value;
use thiserror::Error;

use crate::transport::FetchError;

/// A request body that cannot be serialized.
///
/// Surfaced synchronously at subscription time, before any transport call
/// is attempted, and delivered through the stream's error channel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// The query document is absent or empty.
    #[error("Cannot serialize request: query is missing.")]
    MissingQuery,

    /// The variables are not representable as a flat mapping.
    #[error("Variables must be a mapping from name to value, found {found}.")]
    Variables {
        /// A description of the shape that was provided.
        found: &'static str,
    },

    /// The body failed to encode.
    #[error("Failed to encode request body: {message}")]
    Encode {
        /// The encoder's message.
        message: String,
    },
}

/// A transport response that does not translate to a result.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// The server responded with a non-success status.
    ///
    /// Carries the status and any parsed body content for diagnostics; a
    /// body is reported even when present alongside the failing status.
    #[error("Server responded with status {status}.")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// Best-effort parsed response body, when one was decodable.
        body: Option<Value>,
    },

    /// The response body could not be decoded.
    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Unified error type delivered to the subscriber.
///
/// Exactly one `LinkError` is delivered per failed invocation. Construction
/// failures are not represented here; see
/// [`ConstructionError`](crate::ConstructionError).
#[derive(Debug, Error)]
pub enum LinkError {
    /// The request body failed validation or encoding (no transport call
    /// was made).
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// The transport rejected for a reason other than cancellation; the
    /// original cause is preserved as the source.
    #[error(transparent)]
    Transport(#[from] FetchError),

    /// The response was received but is not acceptable.
    #[error(transparent)]
    Response(#[from] ResponseError),
}

impl LinkError {
    /// Returns the HTTP status carried by a response failure, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Response(ResponseError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accessor_on_response_failure() {
        let error = LinkError::from(ResponseError::Status {
            status: 400,
            body: None,
        });
        assert_eq!(error.status(), Some(400));
    }

    #[test]
    fn test_status_accessor_absent_elsewhere() {
        let error = LinkError::from(SerializationError::MissingQuery);
        assert_eq!(error.status(), None);
    }

    #[test]
    fn test_serialization_error_messages() {
        assert_eq!(
            SerializationError::MissingQuery.to_string(),
            "Cannot serialize request: query is missing."
        );
        assert_eq!(
            SerializationError::Variables { found: "an array" }.to_string(),
            "Variables must be a mapping from name to value, found an array."
        );
    }

    #[test]
    fn test_transport_error_preserves_cause() {
        let source = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let error = LinkError::from(FetchError::network(source));

        let cause = std::error::Error::source(&error).expect("cause preserved");
        assert!(cause.to_string().contains("reset"));
    }
}
