//! # graphql-http-link
//!
//! The terminal HTTP transport stage for composable GraphQL request
//! chains: it turns an [`Operation`] (query + variables + per-call
//! context) into exactly one outbound HTTP request and delivers the
//! translated result to exactly one subscriber.
//!
//! ## Overview
//!
//! This crate provides:
//! - Three-tier configuration resolution (fallback defaults, link
//!   construction-time options, per-operation context overrides) with a
//!   single documented precedence function
//! - Request body construction with pre-flight structural validation
//! - Cancellable asynchronous execution over an injected transport
//!   capability, with a strict exactly-once terminal-delivery guarantee
//! - Response-to-result translation with typed failures
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use graphql_http_link::{
//!     GraphQlResponse, HttpLink, LinkError, Operation, Subscriber,
//! };
//! use serde_json::json;
//!
//! struct Print;
//!
//! impl Subscriber for Print {
//!     fn next(&mut self, result: GraphQlResponse) {
//!         println!("data: {:?}", result.data);
//!     }
//!     fn error(&mut self, error: LinkError) {
//!         eprintln!("failed: {error}");
//!     }
//!     fn complete(&mut self) {}
//! }
//!
//! # async fn run() -> Result<(), graphql_http_link::ConstructionError> {
//! let link = HttpLink::builder()
//!     .uri("https://api.example.com/graphql")
//!     .header("authorization", "Bearer token")
//!     .build()?;
//!
//! let operation = Operation::builder("query Hero($id: ID!) { hero(id: $id) { name } }")
//!     .operation_name("Hero")
//!     .variables(json!({"id": "1000"}))
//!     .build();
//!
//! let subscription = link.request(operation).subscribe(Print);
//! subscription.settled().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Cancellation
//!
//! [`Subscription::unsubscribe`] is the teardown: it aborts the in-flight
//! request when the transport supports it and guarantees that nothing is
//! delivered afterwards. An aborted invocation produces silence rather than
//! an error; the cancelling caller already knows it cancelled.
//!
//! ## Configuration precedence
//!
//! Per-call context overrides beat link construction-time options, which
//! beat the built-in fallback defaults. Scalar fields take the highest
//! layer that defines them; header and option mappings merge key-by-key.
//! See [`config::resolve`] for the full rules.
//!
//! ## Design Principles
//!
//! - **No global state**: configuration is instance-based and immutable
//!   after link construction
//! - **One call, one delivery**: at most one outbound request and one
//!   terminal signal per invocation
//! - **Failures flow downstream**: everything after construction is
//!   delivered through the stream's error channel, never thrown
//! - **Transport is a capability**: the fetcher (and whether it can abort)
//!   is injected, not detected

pub mod config;
pub mod error;
pub mod link;
pub mod operation;
pub mod request;
pub mod transport;

// Re-export public types at crate root for convenience
pub use config::{
    fallback_config, resolve, select_uri, Endpoint, FetchOptions, RequestConfig,
    RequestDescriptor, ResolvedOptions, DEFAULT_URI,
};
pub use error::ConstructionError;
pub use link::{
    GraphQlResponse, HttpLink, HttpLinkBuilder, LinkError, ResponseError, ResultStream,
    SerializationError, Subscriber, Subscription,
};
pub use operation::{Operation, OperationBuilder, OperationContext};
pub use request::{serialize, RequestBody};
pub use transport::{
    create_abort, FetchError, FetchRequest, FetchResponse, Fetcher, ReqwestFetcher,
};
