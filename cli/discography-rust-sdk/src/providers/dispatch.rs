//! Running aggregator pipelines in the background.
//!
//! A [`Dispatcher`] spawns every request as one task on a tokio runtime.
//! When the task settles, its completion callback is queued on a
//! [`CompletionQueue`], and the callback runs on whichever context drains
//! that queue. Every request completes exactly once, with either a result or
//! an error, also when the runtime shuts down before the pipeline finishes.
//! Completions of concurrent requests are delivered in the order
//! the requests finish, not the order they were made.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use discography_catalog::CatalogClientError;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tracing::debug;

use super::aggregator::CatalogAggregator;
use crate::models::album::Album;
use crate::models::artist::Artist;
use crate::models::storefront::{Storefront, StorefrontId};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Catalog(#[from] CatalogClientError),

    /// The pipeline task panicked or was aborted.
    #[error("catalog request did not complete")]
    Worker(#[source] JoinError),

    /// The runtime shut down before the pipeline finished.
    #[error("catalog request was cancelled")]
    Cancelled,
}

type Completion = Box<dyn FnOnce() + Send>;

/// Runs aggregator queries on a worker pool.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    aggregator: Arc<CatalogAggregator>,
    runtime: Handle,
    completions: mpsc::UnboundedSender<Completion>,
}

/// Delivers completions of dispatched requests on the draining context.
pub struct CompletionQueue {
    receiver: mpsc::UnboundedReceiver<Completion>,
}

impl std::fmt::Debug for CompletionQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionQueue").finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Create a dispatcher running on `runtime` and the queue its completions arrive on.
    pub fn new(aggregator: CatalogAggregator, runtime: Handle) -> (Self, CompletionQueue) {
        let (completions, receiver) = mpsc::unbounded_channel();
        let dispatcher = Self {
            aggregator: Arc::new(aggregator),
            runtime,
            completions,
        };
        (dispatcher, CompletionQueue { receiver })
    }

    pub fn search_for_artists<F>(&self, term: impl Into<String>, storefront: StorefrontId, complete: F)
    where
        F: FnOnce(Result<Vec<Artist>, DispatchError>) + Send + 'static,
    {
        let aggregator = self.aggregator.clone();
        let term = term.into();
        self.dispatch(
            async move { aggregator.search_for_artists(&term, &storefront).await },
            complete,
        );
    }

    pub fn get_albums_for_artist<F>(&self, artist: Artist, storefront: StorefrontId, complete: F)
    where
        F: FnOnce(Result<Vec<Album>, DispatchError>) + Send + 'static,
    {
        let aggregator = self.aggregator.clone();
        self.dispatch(
            async move { aggregator.get_albums_for_artist(&artist, &storefront).await },
            complete,
        );
    }

    pub fn home_storefront<F>(&self, complete: F)
    where
        F: FnOnce(Result<Option<StorefrontId>, DispatchError>) + Send + 'static,
    {
        let aggregator = self.aggregator.clone();
        self.dispatch(async move { aggregator.home_storefront().await }, complete);
    }

    pub fn storefronts<F>(&self, complete: F)
    where
        F: FnOnce(Result<Vec<Storefront>, DispatchError>) + Send + 'static,
    {
        let aggregator = self.aggregator.clone();
        self.dispatch(async move { aggregator.storefronts().await }, complete);
    }

    /// Run `pipeline` as one unit of work and queue `complete` with its outcome.
    ///
    /// The pipeline runs in its own task so that a panic is caught by the
    /// join handle and still produces exactly one completion. If the runtime
    /// drops the waiting task first, the completion is queued with
    /// [`DispatchError::Cancelled`].
    fn dispatch<T, P, F>(&self, pipeline: P, complete: F)
    where
        T: Send + 'static,
        P: Future<Output = Result<T, CatalogClientError>> + Send + 'static,
        F: FnOnce(Result<T, DispatchError>) + Send + 'static,
    {
        let pending = PendingCompletion::new(complete, self.completions.clone());
        let worker = self.runtime.spawn(pipeline);
        self.runtime.spawn(async move {
            let result = match worker.await {
                Ok(result) => result.map_err(DispatchError::from),
                Err(join_error) => Err(DispatchError::Worker(join_error)),
            };
            pending.complete(result);
        });
    }
}

/// A completion that has not been queued yet.
///
/// Dropping it unqueued queues it with [`DispatchError::Cancelled`].
struct PendingCompletion<T, F>
where
    T: Send + 'static,
    F: FnOnce(Result<T, DispatchError>) + Send + 'static,
{
    complete: Option<F>,
    completions: mpsc::UnboundedSender<Completion>,
    result: PhantomData<fn(T)>,
}

impl<T, F> PendingCompletion<T, F>
where
    T: Send + 'static,
    F: FnOnce(Result<T, DispatchError>) + Send + 'static,
{
    fn new(complete: F, completions: mpsc::UnboundedSender<Completion>) -> Self {
        Self {
            complete: Some(complete),
            completions,
            result: PhantomData,
        }
    }

    fn complete(mut self, result: Result<T, DispatchError>) {
        if let Some(complete) = self.complete.take() {
            self.queue(complete, result);
        }
    }

    fn queue(&self, complete: F, result: Result<T, DispatchError>) {
        if self
            .completions
            .send(Box::new(move || complete(result)))
            .is_err()
        {
            debug!("completion queue dropped, discarding result");
        }
    }
}

impl<T, F> Drop for PendingCompletion<T, F>
where
    T: Send + 'static,
    F: FnOnce(Result<T, DispatchError>) + Send + 'static,
{
    fn drop(&mut self) {
        if let Some(complete) = self.complete.take() {
            debug!("catalog request dropped before completing");
            self.queue(complete, Err(DispatchError::Cancelled));
        }
    }
}

impl CompletionQueue {
    /// Wait for the next completion and run it on the current context.
    ///
    /// Returns `false` once every dispatcher is gone and nothing is in flight.
    pub async fn run_next(&mut self) -> bool {
        match self.receiver.recv().await {
            Some(completion) => {
                completion();
                true
            },
            None => false,
        }
    }

    /// Run every completion that has already arrived, without waiting.
    ///
    /// Returns the number of completions run.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(completion) = self.receiver.try_recv() {
            completion();
            ran += 1;
        }
        ran
    }
}
