//! Configuration layers and resolution for the HTTP link.
//!
//! This module provides the core configuration types used to shape a single
//! outbound request:
//!
//! - [`RequestConfig`]: one configuration layer (fallback, link, or per-call)
//! - [`FetchOptions`]: transport options carried by a layer
//! - [`ResolvedOptions`] / [`RequestDescriptor`]: the merged result of all
//!   three layers for one invocation
//! - [`Endpoint`]: the configured request URI, static or computed
//!
//! # Precedence
//!
//! Three layers are merged per invocation, lowest to highest precedence:
//! the crate's fallback defaults, the link's construction-time
//! configuration, and the per-call overrides read from the operation's
//! context. Scalar fields (method, credentials, `include_extensions`) take
//! the highest-precedence layer that defines them; an unset field never
//! overrides a lower layer. Mapping fields (headers, extra fetch options)
//! merge shallow-additively: later layers add or override individual keys
//! without discarding keys only present in earlier layers.
//!
//! Resolution is pure: no layer is ever mutated, and resolving the same
//! layers twice yields identical descriptors.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::operation::Operation;
use crate::request::RequestBody;

/// Default request path used when no endpoint is configured.
pub const DEFAULT_URI: &str = "/graphql";

/// Transport options carried by a configuration layer.
///
/// `method` is a scalar field; `extra` holds custom flags that are passed
/// through to the fetch implementation unchanged and merge key-by-key
/// across layers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// The HTTP method, if this layer defines one.
    pub method: Option<String>,
    /// Custom transport flags, passed through to the fetcher verbatim.
    pub extra: BTreeMap<String, Value>,
}

/// One configuration layer for outbound requests.
///
/// Every field is optional per layer; see the [module docs](self) for the
/// merge rules. The same type serves as the process-wide fallback, the
/// link's construction-time configuration, and the per-call overrides on
/// an operation's context.
///
/// # Example
///
/// ```rust
/// use graphql_http_link::RequestConfig;
///
/// let config = RequestConfig::new()
///     .header("authorization", "Bearer token")
///     .credentials("include");
///
/// assert_eq!(config.headers.get("authorization").map(String::as_str), Some("Bearer token"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestConfig {
    /// Whether to include operation extensions in the request body.
    pub include_extensions: Option<bool>,
    /// Transport options for this layer.
    pub options: FetchOptions,
    /// The credentials mode (for example `"include"` or `"omit"`).
    pub credentials: Option<String>,
    /// Headers contributed by this layer.
    pub headers: HashMap<String, String>,
}

impl RequestConfig {
    /// Creates an empty layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether operation extensions are included in the body.
    #[must_use]
    pub const fn include_extensions(mut self, include: bool) -> Self {
        self.include_extensions = Some(include);
        self
    }

    /// Sets the HTTP method for this layer.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.options.method = Some(method.into());
        self
    }

    /// Sets the credentials mode for this layer.
    #[must_use]
    pub fn credentials(mut self, credentials: impl Into<String>) -> Self {
        self.credentials = Some(credentials.into());
        self
    }

    /// Adds a single header to this layer.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds a single custom transport flag to this layer.
    #[must_use]
    pub fn fetch_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.extra.insert(key.into(), value.into());
        self
    }
}

/// The process-wide fallback layer: lowest-precedence defaults applied to
/// every request.
///
/// Defaults: method `POST`, `accept: */*`, `content-type: application/json`,
/// extensions excluded, no explicit credentials.
#[must_use]
pub fn fallback_config() -> RequestConfig {
    RequestConfig::new()
        .include_extensions(false)
        .method("POST")
        .header("accept", "*/*")
        .header("content-type", "application/json")
}

/// The fully merged transport options for one invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedOptions {
    /// The HTTP method to use.
    pub method: String,
    /// The merged header mapping.
    pub headers: HashMap<String, String>,
    /// The resolved credentials mode, if any layer defined one.
    pub credentials: Option<String>,
    /// The merged custom transport flags.
    pub extra: BTreeMap<String, Value>,
}

/// The effective request descriptor for one invocation: merged transport
/// options plus the request body derived from the operation.
///
/// Scoped to a single execution; never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// The merged transport options.
    pub options: ResolvedOptions,
    /// The request body record, not yet serialized.
    pub body: RequestBody,
}

/// Merges the three configuration layers and derives the request body from
/// the operation.
///
/// Precedence, lowest to highest: `fallback` < `link` < `context`. Scalars
/// take the highest defined layer; mappings merge shallow-additively. The
/// body carries the operation's `extensions` only when the resolved
/// `include_extensions` is true and the operation has any.
///
/// This function never fails; absent fields resolve to documented defaults
/// (method `POST`, empty headers, no explicit credentials).
#[must_use]
pub fn resolve(
    fallback: &RequestConfig,
    link: &RequestConfig,
    context: &RequestConfig,
    operation: &Operation,
) -> RequestDescriptor {
    let include_extensions = context
        .include_extensions
        .or(link.include_extensions)
        .or(fallback.include_extensions)
        .unwrap_or(false);

    let method = context
        .options
        .method
        .clone()
        .or_else(|| link.options.method.clone())
        .or_else(|| fallback.options.method.clone())
        .unwrap_or_else(|| "POST".to_string());

    let credentials = context
        .credentials
        .clone()
        .or_else(|| link.credentials.clone())
        .or_else(|| fallback.credentials.clone());

    let mut headers = fallback.headers.clone();
    headers.extend(link.headers.clone());
    headers.extend(context.headers.clone());

    let mut extra = fallback.options.extra.clone();
    extra.extend(link.options.extra.clone());
    extra.extend(context.options.extra.clone());

    let extensions = if include_extensions {
        operation.extensions().filter(|map| !map.is_empty()).cloned()
    } else {
        None
    };

    RequestDescriptor {
        options: ResolvedOptions {
            method,
            headers,
            credentials,
            extra,
        },
        body: RequestBody {
            query: operation.query().to_string(),
            variables: operation.variables().cloned(),
            operation_name: operation.operation_name().map(String::from),
            extensions,
        },
    }
}

/// The configured request URI: a fixed string or a function of the
/// operation.
///
/// A per-call URI override on the operation's context takes precedence over
/// either form; see [`select_uri`].
#[derive(Clone)]
pub enum Endpoint {
    /// A fixed URI used verbatim.
    Uri(String),
    /// A function invoked with the operation to compute the URI.
    Resolver(Arc<dyn Fn(&Operation) -> String + Send + Sync>),
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::Uri(DEFAULT_URI.to_string())
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uri(uri) => f.debug_tuple("Uri").field(uri).finish(),
            Self::Resolver(_) => f.debug_tuple("Resolver").field(&"<fn>").finish(),
        }
    }
}

impl From<&str> for Endpoint {
    fn from(uri: &str) -> Self {
        Self::Uri(uri.to_string())
    }
}

impl From<String> for Endpoint {
    fn from(uri: String) -> Self {
        Self::Uri(uri)
    }
}

/// Selects the request URI for one invocation.
///
/// The operation context's URI override wins; otherwise a
/// [`Endpoint::Resolver`] is invoked with the operation; otherwise the
/// static URI is used verbatim.
#[must_use]
pub fn select_uri(operation: &Operation, endpoint: &Endpoint) -> String {
    if let Some(uri) = operation.context().uri() {
        return uri;
    }
    match endpoint {
        Endpoint::Uri(uri) => uri.clone(),
        Endpoint::Resolver(resolver) => resolver(operation),
    }
}
