//! GraphQL operation types.
//!
//! This module provides the [`Operation`] type — one logical request flowing
//! through a link chain — and its per-invocation [`OperationContext`], the
//! typed side-channel that upstream stages use to override transport
//! configuration and that this link writes the raw response back into.

use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use crate::config::RequestConfig;
use crate::transport::FetchResponse;

/// One logical GraphQL request: a query document, its variables, and a
/// mutable per-invocation context.
///
/// An `Operation` is created once per chain invocation and is immutable for
/// the lifetime of that invocation, with one exception: the link writes the
/// raw transport response into the [`OperationContext`] after the request
/// settles, so outer stages that still hold the operation can observe it.
///
/// # Example
///
/// ```rust
/// use graphql_http_link::Operation;
/// use serde_json::json;
///
/// let operation = Operation::builder("query Hero($id: ID!) { hero(id: $id) { name } }")
///     .operation_name("Hero")
///     .variables(json!({"id": "1000"}))
///     .build();
///
/// assert_eq!(operation.operation_name(), Some("Hero"));
/// ```
#[derive(Clone, Debug)]
pub struct Operation {
    query: String,
    variables: Option<Value>,
    operation_name: Option<String>,
    extensions: Option<Map<String, Value>>,
    context: OperationContext,
}

impl Operation {
    /// Creates a new builder for constructing an `Operation`.
    #[must_use]
    pub fn builder(query: impl Into<String>) -> OperationBuilder {
        OperationBuilder::new(query)
    }

    /// Returns the query document.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the operation variables, if any.
    #[must_use]
    pub const fn variables(&self) -> Option<&Value> {
        self.variables.as_ref()
    }

    /// Returns the operation name, if any.
    #[must_use]
    pub fn operation_name(&self) -> Option<&str> {
        self.operation_name.as_deref()
    }

    /// Returns the operation extensions, if any.
    #[must_use]
    pub const fn extensions(&self) -> Option<&Map<String, Value>> {
        self.extensions.as_ref()
    }

    /// Returns a handle to the operation's context.
    ///
    /// The context is a shared handle; clones observe each other's writes.
    #[must_use]
    pub const fn context(&self) -> &OperationContext {
        &self.context
    }
}

/// Builder for constructing [`Operation`] instances.
///
/// Structural validation of the resulting request body (query presence,
/// variable shape) happens at subscription time and is reported through the
/// stream's error channel, so the builder itself is infallible.
#[derive(Debug)]
pub struct OperationBuilder {
    query: String,
    variables: Option<Value>,
    operation_name: Option<String>,
    extensions: Option<Map<String, Value>>,
    context: OperationContext,
}

impl OperationBuilder {
    fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: None,
            operation_name: None,
            extensions: None,
            context: OperationContext::default(),
        }
    }

    /// Sets the operation variables.
    ///
    /// Must serialize to a flat mapping from variable name to value; any
    /// other shape is rejected when the request body is serialized.
    #[must_use]
    pub fn variables(mut self, variables: impl Into<Value>) -> Self {
        self.variables = Some(variables.into());
        self
    }

    /// Sets the operation name.
    #[must_use]
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Adds a single extension entry.
    #[must_use]
    pub fn extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Sets the operation context.
    ///
    /// Useful when an upstream stage has already populated per-call
    /// configuration overrides.
    #[must_use]
    pub fn context(mut self, context: OperationContext) -> Self {
        self.context = context;
        self
    }

    /// Builds the [`Operation`].
    #[must_use]
    pub fn build(self) -> Operation {
        Operation {
            query: self.query,
            variables: self.variables,
            operation_name: self.operation_name,
            extensions: self.extensions,
            context: self.context,
        }
    }
}

/// Typed per-invocation side-channel shared between chain stages.
///
/// Upstream stages write configuration overrides and an optional endpoint
/// override before the operation reaches this link; the link reads both at
/// subscription time and, after the transport settles, writes the raw
/// [`FetchResponse`] back so outer stages can observe it.
///
/// The context is a cheaply cloneable shared handle: all clones refer to
/// the same underlying data.
#[derive(Clone, Debug, Default)]
pub struct OperationContext {
    inner: Arc<Mutex<ContextData>>,
}

#[derive(Debug, Default)]
struct ContextData {
    overrides: RequestConfig,
    uri: Option<String>,
    response: Option<FetchResponse>,
}

impl OperationContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the per-call configuration overrides.
    ///
    /// These form the highest-precedence configuration layer; see
    /// [`resolve`](crate::config::resolve) for the precedence rules.
    #[must_use]
    pub fn overrides(&self) -> RequestConfig {
        self.lock().overrides.clone()
    }

    /// Replaces the per-call configuration overrides.
    pub fn set_overrides(&self, overrides: RequestConfig) {
        self.lock().overrides = overrides;
    }

    /// Returns the per-call endpoint override, if any.
    #[must_use]
    pub fn uri(&self) -> Option<String> {
        self.lock().uri.clone()
    }

    /// Sets a per-call endpoint override.
    ///
    /// Takes precedence over the link's configured endpoint, static or
    /// computed.
    pub fn set_uri(&self, uri: impl Into<String>) {
        self.lock().uri = Some(uri.into());
    }

    /// Returns the raw transport response, if the request has settled.
    #[must_use]
    pub fn response(&self) -> Option<FetchResponse> {
        self.lock().response.clone()
    }

    /// Records the raw transport response.
    ///
    /// Called by the link exactly once per invocation, after the transport
    /// settles successfully and before translation.
    pub(crate) fn set_response(&self, response: FetchResponse) {
        self.lock().response = Some(response);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ContextData> {
        // A poisoned context means a panic mid-write in another stage;
        // the data itself is plain-old-data, so recover the guard.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_minimal_operation() {
        let operation = Operation::builder("{ hero { name } }").build();

        assert_eq!(operation.query(), "{ hero { name } }");
        assert!(operation.variables().is_none());
        assert!(operation.operation_name().is_none());
        assert!(operation.extensions().is_none());
    }

    #[test]
    fn test_builder_with_all_fields() {
        let operation = Operation::builder("query Hero($id: ID!) { hero(id: $id) { name } }")
            .operation_name("Hero")
            .variables(json!({"id": "1000"}))
            .extension("persistedQuery", json!({"version": 1}))
            .build();

        assert_eq!(operation.operation_name(), Some("Hero"));
        assert_eq!(operation.variables(), Some(&json!({"id": "1000"})));
        assert!(operation.extensions().unwrap().contains_key("persistedQuery"));
    }

    #[test]
    fn test_context_clones_share_data() {
        let context = OperationContext::new();
        let clone = context.clone();

        clone.set_uri("https://example.com/graphql");

        assert_eq!(context.uri().as_deref(), Some("https://example.com/graphql"));
    }

    #[test]
    fn test_context_starts_without_response() {
        let context = OperationContext::new();
        assert!(context.response().is_none());
    }

    #[test]
    fn test_operation_clone_shares_context() {
        let operation = Operation::builder("{ hero { name } }").build();
        let clone = operation.clone();

        clone.context().set_uri("https://example.com/graphql");

        assert_eq!(
            operation.context().uri().as_deref(),
            Some("https://example.com/graphql")
        );
    }

    #[test]
    fn test_context_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OperationContext>();
    }
}
