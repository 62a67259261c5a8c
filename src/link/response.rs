//! Response translation: transport outcome to delivered result.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::link::ResponseError;
use crate::transport::FetchResponse;

/// A decoded GraphQL execution result.
///
/// Validation beyond decoding is an outer stage's concern; `errors` and
/// `extensions` are passed through undecoded-in-shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQlResponse {
    /// The execution result data, if the server produced any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Execution errors reported by the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
    /// Server-provided extensions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

/// Classifies a settled transport response into a result or a typed
/// failure.
///
/// The transport-level status is checked first: a non-success status is a
/// failure even when a body is present, and the failure carries both the
/// status and any parseable body content for diagnostics. On a success
/// status the body is decoded; a decoding failure is surfaced, not
/// swallowed.
///
/// # Errors
///
/// Returns [`ResponseError::Status`] for non-2xx responses and
/// [`ResponseError::Decode`] when a success response carries an
/// undecodable body.
pub fn translate(response: &FetchResponse) -> Result<GraphQlResponse, ResponseError> {
    if !response.is_success() {
        tracing::warn!(status = response.status, "server responded with non-success status");
        let body = serde_json::from_str(&response.body).ok();
        return Err(ResponseError::Status {
            status: response.status,
            body,
        });
    }

    serde_json::from_str(&response.body).map_err(ResponseError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: &str) -> FetchResponse {
        FetchResponse {
            status,
            headers: std::collections::HashMap::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_translate_success_with_data() {
        let result =
            translate(&response(200, r#"{"data": {"hero": {"name": "R2-D2"}}}"#)).unwrap();

        assert_eq!(result.data, Some(json!({"hero": {"name": "R2-D2"}})));
        assert!(result.errors.is_none());
    }

    #[test]
    fn test_translate_success_with_errors_field() {
        let result =
            translate(&response(200, r#"{"errors": [{"message": "boom"}]}"#)).unwrap();

        assert!(result.data.is_none());
        assert_eq!(result.errors, Some(json!([{"message": "boom"}])));
    }

    #[test]
    fn test_translate_non_success_carries_status_and_body() {
        let result = translate(&response(400, r#"{"errors": [{"message": "bad"}]}"#));

        match result {
            Err(ResponseError::Status { status, body }) => {
                assert_eq!(status, 400);
                assert_eq!(body, Some(json!({"errors": [{"message": "bad"}]})));
            }
            other => panic!("expected status failure, got {other:?}"),
        }
    }

    #[test]
    fn test_translate_non_success_with_unparseable_body() {
        let result = translate(&response(502, "<html>bad gateway</html>"));

        match result {
            Err(ResponseError::Status { status, body }) => {
                assert_eq!(status, 502);
                assert!(body.is_none());
            }
            other => panic!("expected status failure, got {other:?}"),
        }
    }

    #[test]
    fn test_translate_undecodable_success_body_is_a_failure() {
        let result = translate(&response(200, "not json"));
        assert!(matches!(result, Err(ResponseError::Decode(_))));
    }
}
