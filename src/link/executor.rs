//! The request executor: one cold result stream per invocation.
//!
//! Nothing runs until [`ResultStream::subscribe`] is called. Subscription
//! performs the synchronous phase — URI selection, configuration
//! resolution, body serialization — then spawns a single transport task
//! and returns a [`Subscription`] whose `unsubscribe` is the teardown.
//!
//! # Delivery invariant
//!
//! For one invocation the subscriber observes at most one terminal signal:
//! `next` followed by `complete`, a single `error`, or nothing at all when
//! the invocation was aborted. Teardown never triggers a delivery, and any
//! late transport settlement after unsubscribe is discarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{resolve, select_uri};
use crate::link::response::{translate, GraphQlResponse};
use crate::link::{LinkError, LinkState};
use crate::operation::Operation;
use crate::request::serialize;
use crate::transport::{create_abort, FetchRequest};

/// The single consumer of a request's result stream.
///
/// Callback order is guaranteed: at most one of
/// `next`-then-`complete` / `error` per subscription, and silence when the
/// invocation is aborted through [`Subscription::unsubscribe`].
pub trait Subscriber: Send + 'static {
    /// Receives the translated result. Called at most once, and only
    /// before `complete`.
    fn next(&mut self, result: GraphQlResponse);

    /// Receives the single failure of this invocation. Never called after
    /// `next`.
    fn error(&mut self, error: LinkError);

    /// Signals normal completion, immediately after `next`.
    fn complete(&mut self);
}

/// A cold, single-subscriber stream for one operation.
///
/// Produced by [`HttpLink::request`](crate::HttpLink::request); the request
/// is not dispatched until [`subscribe`](Self::subscribe) is called.
#[derive(Debug)]
pub struct ResultStream {
    link: Arc<LinkState>,
    operation: Operation,
}

impl ResultStream {
    pub(crate) fn new(link: Arc<LinkState>, operation: Operation) -> Self {
        Self { link, operation }
    }

    /// Dispatches the request and attaches the single subscriber.
    ///
    /// Synchronously selects the URI, resolves the three configuration
    /// layers, and serializes the body; a serialization failure is
    /// delivered through the subscriber's error channel without any
    /// transport call. Otherwise one transport task is spawned and the
    /// returned [`Subscription`] controls its teardown.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe<S: Subscriber>(self, mut subscriber: S) -> Subscription {
        let Self { link, operation } = self;

        let url = select_uri(&operation, &link.endpoint);
        let context_config = operation.context().overrides();
        let descriptor = resolve(&link.fallback, &link.config, &context_config, &operation);

        let body = match serialize(&descriptor.body) {
            Ok(body) => body,
            Err(error) => {
                subscriber.error(LinkError::Serialization(error));
                return Subscription::terminal();
            }
        };

        let handle = create_abort(link.fetcher.as_ref());
        let (controller, signal) = match handle {
            Some((controller, signal)) => (Some(controller), Some(signal)),
            None => (None, None),
        };

        let request = FetchRequest {
            method: descriptor.options.method,
            headers: descriptor.options.headers,
            body,
            credentials: descriptor.options.credentials,
            extra: descriptor.options.extra,
            signal,
        };

        tracing::debug!(
            url = %url,
            operation_name = operation.operation_name().unwrap_or("anonymous"),
            "dispatching operation"
        );

        let active = Arc::new(AtomicBool::new(true));
        let task = tokio::spawn(run(
            Arc::clone(&link),
            operation,
            url,
            request,
            subscriber,
            Arc::clone(&active),
        ));

        Subscription {
            active,
            controller,
            task: Some(task),
        }
    }
}

/// Drives one transport call and delivers its outcome.
async fn run<S: Subscriber>(
    link: Arc<LinkState>,
    operation: Operation,
    url: String,
    request: FetchRequest,
    mut subscriber: S,
    active: Arc<AtomicBool>,
) {
    match link.fetcher.fetch(&url, request).await {
        Ok(response) => {
            // Raw response goes into the context regardless of delivery,
            // for any outer stage that still observes the operation.
            operation.context().set_response(response.clone());

            match translate(&response) {
                Ok(result) => {
                    if active.load(Ordering::SeqCst) {
                        subscriber.next(result);
                        subscriber.complete();
                    }
                }
                Err(error) => {
                    if active.load(Ordering::SeqCst) {
                        subscriber.error(LinkError::Response(error));
                    }
                }
            }
        }
        Err(error) if error.is_abort() => {
            // The aborting caller already performed its cleanup through
            // the teardown; deliver nothing.
            tracing::debug!(url = %url, "operation aborted before settlement");
        }
        Err(error) => {
            if active.load(Ordering::SeqCst) {
                subscriber.error(LinkError::Transport(error));
            }
        }
    }
}

/// The handle controlling one subscription's teardown.
#[derive(Debug)]
pub struct Subscription {
    active: Arc<AtomicBool>,
    controller: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// A subscription whose invocation already reached a terminal state
    /// during the synchronous phase.
    fn terminal() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(false)),
            controller: None,
            task: None,
        }
    }

    /// Tears down the subscription.
    ///
    /// Marks the subscriber gone — any later settlement delivers nothing —
    /// and aborts the in-flight request when the transport supports it.
    /// Safe to call at any point relative to settlement: aborting an
    /// already-settled request is a no-op and never causes a second
    /// delivery. Without abort support the transport call runs to
    /// completion and its result is discarded.
    pub fn unsubscribe(self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(controller) = &self.controller {
            controller.cancel();
        }
    }

    /// Waits until the invocation's transport task has finished.
    ///
    /// Resolves immediately when the invocation terminated during the
    /// synchronous phase. This is a join point only; it implies nothing
    /// about what, if anything, was delivered.
    pub async fn settled(mut self) {
        if let Some(task) = self.task.take() {
            // Join errors only arise from task panics; there is nothing
            // left to deliver either way.
            let _ = task.await;
        }
    }
}
