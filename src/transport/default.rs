//! The default `reqwest`-backed fetcher.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::transport::{FetchError, FetchRequest, FetchResponse, Fetcher};

/// The default transport, backed by a shared [`reqwest::Client`].
///
/// Supports cooperative abort: the HTTP round-trip is raced against the
/// invocation's cancellation signal, settling with [`FetchError::Aborted`]
/// when the signal fires first.
///
/// # Credential modes
///
/// `reqwest` scopes cookie policy to the client rather than the request, so
/// the resolved `credentials` value is advisory here and logged at debug
/// level. Custom [`Fetcher`] implementations receive it verbatim.
#[derive(Clone, Debug)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

// Verify the default fetcher is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ReqwestFetcher>();
};

impl ReqwestFetcher {
    /// Creates a fetcher with a freshly built client (rustls TLS).
    ///
    /// # Errors
    ///
    /// Returns the underlying `reqwest` error when the client cannot be
    /// created, for example on TLS initialization failure. The link builder
    /// surfaces this as a construction error.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;
        Ok(Self { client })
    }
}

impl From<reqwest::Client> for ReqwestFetcher {
    /// Wraps an existing client, keeping its connection pool and settings.
    fn from(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    fn supports_abort(&self) -> bool {
        true
    }

    async fn fetch(&self, url: &str, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        if let Some(credentials) = &request.credentials {
            tracing::debug!(
                credentials = %credentials,
                "credential mode is client-scoped in reqwest; ignoring per-request value"
            );
        }
        if !request.extra.is_empty() {
            tracing::debug!(
                flags = ?request.extra.keys().collect::<Vec<_>>(),
                "custom fetch options are not interpreted by the default fetcher"
            );
        }

        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(FetchError::network)?;

        let mut builder = self.client.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        builder = builder.body(request.body);

        let round_trip = async {
            let response = builder.send().await?;

            let status = response.status().as_u16();
            let mut headers = std::collections::HashMap::new();
            for (name, value) in response.headers() {
                headers.insert(
                    name.as_str().to_lowercase(),
                    value.to_str().unwrap_or_default().to_string(),
                );
            }
            let body = response.text().await?;

            tracing::debug!(status, url, "transport settled");
            Ok(FetchResponse {
                status,
                headers,
                body,
            })
        };

        match request.signal {
            Some(signal) => race_abort(signal, round_trip).await,
            None => round_trip.await,
        }
    }
}

/// Races the round-trip against the abort signal.
async fn race_abort<F>(signal: CancellationToken, round_trip: F) -> Result<FetchResponse, FetchError>
where
    F: std::future::Future<Output = Result<FetchResponse, FetchError>>,
{
    tokio::select! {
        () = signal.cancelled() => Err(FetchError::Aborted),
        result = round_trip => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fetcher_reports_abort_support() {
        let fetcher = ReqwestFetcher::new().unwrap();
        assert!(fetcher.supports_abort());
    }

    #[tokio::test]
    async fn test_invalid_method_is_a_network_error() {
        let fetcher = ReqwestFetcher::new().unwrap();
        let request = FetchRequest {
            method: "NOT A METHOD".to_string(),
            ..FetchRequest::default()
        };

        let result = fetcher.fetch("http://localhost/graphql", request).await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }

    #[tokio::test]
    async fn test_pre_cancelled_signal_settles_aborted() {
        let fetcher = ReqwestFetcher::new().unwrap();
        let signal = CancellationToken::new();
        signal.cancel();

        let request = FetchRequest {
            method: "POST".to_string(),
            signal: Some(signal),
            ..FetchRequest::default()
        };

        let result = fetcher.fetch("http://localhost:1/graphql", request).await;
        assert!(matches!(result, Err(FetchError::Aborted)));
    }
}
