//! The HTTP link: the terminal, network-performing stage of a link chain.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`HttpLink`]: the request handler, constructed once and shared
//! - [`HttpLinkBuilder`]: construction-time configuration and validation
//! - [`ResultStream`] / [`Subscription`]: one cold stream per operation
//! - [`Subscriber`]: the single downstream consumer
//! - [`GraphQlResponse`]: the translated result
//! - [`LinkError`]: the unified execution-time failure
//!
//! # Example
//!
//! ```rust,ignore
//! use graphql_http_link::{HttpLink, Operation};
//!
//! let link = HttpLink::builder()
//!     .uri("https://api.example.com/graphql")
//!     .header("authorization", "Bearer token")
//!     .build()?;
//!
//! let operation = Operation::builder("{ hero { name } }").build();
//! let subscription = link.request(operation).subscribe(my_subscriber);
//! // ... later, to cancel:
//! subscription.unsubscribe();
//! ```

mod errors;
mod executor;
mod response;

pub use errors::{LinkError, ResponseError, SerializationError};
pub use executor::{ResultStream, Subscriber, Subscription};
pub use response::{translate, GraphQlResponse};

use std::fmt;
use std::sync::Arc;

use crate::config::{fallback_config, Endpoint, RequestConfig};
use crate::error::ConstructionError;
use crate::operation::Operation;
use crate::transport::{Fetcher, ReqwestFetcher};

/// Immutable per-link state shared by every invocation.
pub(crate) struct LinkState {
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) endpoint: Endpoint,
    pub(crate) config: RequestConfig,
    pub(crate) fallback: RequestConfig,
}

impl fmt::Debug for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkState")
            .field("endpoint", &self.endpoint)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// The terminal HTTP transport stage of a request-processing chain.
///
/// Turns one [`Operation`] into exactly one outbound request and delivers
/// the translated outcome to exactly one subscriber. Cheap to clone; all
/// clones share the same fetcher and construction-time configuration, which
/// are immutable for the link's lifetime.
///
/// # Thread Safety
///
/// `HttpLink` is `Send + Sync`; concurrent invocations are fully
/// independent.
#[derive(Clone, Debug)]
pub struct HttpLink {
    inner: Arc<LinkState>,
}

// Verify HttpLink is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpLink>();
};

impl HttpLink {
    /// Creates a new builder for constructing an `HttpLink`.
    #[must_use]
    pub fn builder() -> HttpLinkBuilder {
        HttpLinkBuilder::new()
    }

    /// Produces the cold result stream for one operation.
    ///
    /// Nothing is resolved or dispatched until the stream is subscribed;
    /// see [`ResultStream::subscribe`].
    #[must_use]
    pub fn request(&self, operation: Operation) -> ResultStream {
        ResultStream::new(Arc::clone(&self.inner), operation)
    }
}

/// Builder for constructing [`HttpLink`] instances.
///
/// Everything set here forms the link-construction-time configuration
/// layer, fixed for the link's lifetime; per-call overrides on an
/// operation's context take precedence over it, and the crate's fallback
/// defaults sit below it.
///
/// # Example
///
/// ```rust
/// use graphql_http_link::HttpLink;
///
/// let link = HttpLink::builder()
///     .uri("https://api.example.com/graphql")
///     .include_extensions(true)
///     .header("authorization", "Bearer token")
///     .credentials("include")
///     .build()
///     .unwrap();
/// ```
#[derive(Default)]
pub struct HttpLinkBuilder {
    endpoint: Option<Endpoint>,
    fetcher: Option<Arc<dyn Fetcher>>,
    config: RequestConfig,
}

impl fmt::Debug for HttpLinkBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpLinkBuilder")
            .field("endpoint", &self.endpoint)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpLinkBuilder {
    fn new() -> Self {
        Self {
            endpoint: None,
            fetcher: None,
            config: RequestConfig::new(),
        }
    }

    /// Sets a static request URI. Defaults to `/graphql` when neither this
    /// nor [`uri_fn`](Self::uri_fn) is set.
    #[must_use]
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.endpoint = Some(Endpoint::Uri(uri.into()));
        self
    }

    /// Sets a URI computed per operation.
    #[must_use]
    pub fn uri_fn(
        mut self,
        resolver: impl Fn(&Operation) -> String + Send + Sync + 'static,
    ) -> Self {
        self.endpoint = Some(Endpoint::Resolver(Arc::new(resolver)));
        self
    }

    /// Injects a custom fetch implementation.
    ///
    /// When absent, a [`ReqwestFetcher`] is built at
    /// [`build`](Self::build) time.
    #[must_use]
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Sets whether operation extensions are included in request bodies.
    #[must_use]
    pub const fn include_extensions(mut self, include: bool) -> Self {
        self.config.include_extensions = Some(include);
        self
    }

    /// Sets the HTTP method for this link's requests.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.config.options.method = Some(method.into());
        self
    }

    /// Sets the credentials mode for this link's requests.
    #[must_use]
    pub fn credentials(mut self, credentials: impl Into<String>) -> Self {
        self.config.credentials = Some(credentials.into());
        self
    }

    /// Adds a header sent with every request through this link.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(name.into(), value.into());
        self
    }

    /// Adds a custom transport flag passed through to the fetcher.
    #[must_use]
    pub fn fetch_option(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.config.options.extra.insert(key.into(), value.into());
        self
    }

    /// Builds the [`HttpLink`], creating the default fetcher when none was
    /// injected.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::Fetcher`] when no fetch implementation
    /// was provided and the default client cannot be created. This is the
    /// only failure in the crate that is not delivered through a result
    /// stream.
    pub fn build(self) -> Result<HttpLink, ConstructionError> {
        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(ReqwestFetcher::new().map_err(ConstructionError::Fetcher)?),
        };

        Ok(HttpLink {
            inner: Arc::new(LinkState {
                fetcher,
                endpoint: self.endpoint.unwrap_or_default(),
                config: self.config,
                fallback: fallback_config(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_to_graphql_endpoint() {
        let link = HttpLink::builder().build().unwrap();
        assert!(matches!(&link.inner.endpoint, Endpoint::Uri(uri) if uri == "/graphql"));
    }

    #[test]
    fn test_builder_collects_link_layer_config() {
        let link = HttpLink::builder()
            .uri("https://api.example.com/graphql")
            .include_extensions(true)
            .header("authorization", "Bearer token")
            .credentials("include")
            .method("POST")
            .build()
            .unwrap();

        let config = &link.inner.config;
        assert_eq!(config.include_extensions, Some(true));
        assert_eq!(config.credentials.as_deref(), Some("include"));
        assert_eq!(
            config.headers.get("authorization").map(String::as_str),
            Some("Bearer token")
        );
    }

    #[test]
    fn test_link_clones_share_state() {
        let link = HttpLink::builder()
            .uri("https://api.example.com/graphql")
            .build()
            .unwrap();
        let clone = link.clone();

        assert!(Arc::ptr_eq(&link.inner, &clone.inner));
    }

    #[test]
    fn test_fallback_layer_is_fixed_at_construction() {
        let link = HttpLink::builder().build().unwrap();
        assert_eq!(link.inner.fallback, fallback_config());
    }
}
