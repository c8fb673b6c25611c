//! Transport capabilities injected into the source adapters.
//!
//! Adapters never perform I/O themselves. They are handed an
//! `Arc<dyn ProviderClient>` that knows how to reach each provider, and the
//! SerpAPI adapter additionally receives a [`TopicOptimizer`].

use std::future::Future;
use std::pin::Pin;

use crate::error::{ProviderError, ProviderResult};
use crate::wire::{ProviderRequest, ProviderResponse};

/// A boxed future for async trait methods.
///
/// Boxing keeps the traits object-safe so they can be shared as
/// `Arc<dyn ...>` across concurrently running adapters.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Sends a [`ProviderRequest`] to the provider named by its `source` and
/// returns the provider's reply envelope.
///
/// Implementations are responsible for per-request timeouts. A reply with
/// `success: false` is returned as `Ok`; the adapter decides what it means.
pub trait ProviderClient: Send + Sync {
    /// Performs one provider query.
    fn query<'a>(
        &'a self,
        request: &'a ProviderRequest,
    ) -> BoxFuture<'a, ProviderResult<ProviderResponse>>;
}

/// Rewrites a free-text topic into a better web-search query.
pub trait TopicOptimizer: Send + Sync {
    /// Returns the optimized query for `topic` within `industry`.
    fn optimize<'a>(&'a self, topic: &'a str, industry: &'a str)
    -> BoxFuture<'a, ProviderResult<String>>;
}

/// An optimizer that only normalizes whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTopicOptimizer;

impl TopicOptimizer for PassthroughTopicOptimizer {
    fn optimize<'a>(
        &'a self,
        topic: &'a str,
        _industry: &'a str,
    ) -> BoxFuture<'a, ProviderResult<String>> {
        let normalized = topic.split_whitespace().collect::<Vec<_>>().join(" ");
        Box::pin(async move { Ok(normalized) })
    }
}

/// A client that fails every request.
///
/// Stands in for a transport that could not be configured, so the search
/// still runs and degrades to fallback data.
#[derive(Debug)]
pub struct UnavailableClient {
    error: ProviderError,
}

impl UnavailableClient {
    /// Creates a client that reports `error` for every request.
    pub fn new(error: ProviderError) -> Self {
        Self { error }
    }
}

impl ProviderClient for UnavailableClient {
    fn query<'a>(
        &'a self,
        request: &'a ProviderRequest,
    ) -> BoxFuture<'a, ProviderResult<ProviderResponse>> {
        let error = ProviderError::new(self.error.code(), self.error.message())
            .with_provider(request.source.as_str());
        Box::pin(async move { Err(error) })
    }
}

impl TopicOptimizer for UnavailableClient {
    fn optimize<'a>(
        &'a self,
        _topic: &'a str,
        _industry: &'a str,
    ) -> BoxFuture<'a, ProviderResult<String>> {
        let error = ProviderError::new(self.error.code(), self.error.message());
        Box::pin(async move { Err(error) })
    }
}
