//! The [`EventSource`] trait and the plumbing shared by its implementations.
//!
//! An event source wraps one provider: it builds the provider's query,
//! calls the injected [`ProviderClient`], converts raw records into
//! [`CanonicalEvent`]s and splits them into a `top` and a `more` slice.
//!
//! Sources never fail. Transport and parse errors are logged and reported
//! as a [`PartialResult`] with `success == false` and no events.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use eventscout_core::{CanonicalEvent, SearchInput, SourceKind};

use crate::client::{BoxFuture, ProviderClient};
use crate::error::{ProviderError, ProviderResult};
use crate::wire::{ProviderRequest, ProviderResponse};

/// Number of events every source places in its `top` slice.
pub const TOP_SLICE: usize = 20;

/// How many events after the `top` slice go into `more`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoreLimit {
    /// At most this many.
    Next(usize),
    /// Everything that is left.
    Rest,
}

/// The outcome of one source's search.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialResult {
    pub source: SourceKind,
    pub success: bool,
    pub top: Vec<CanonicalEvent>,
    pub more: Vec<CanonicalEvent>,
    /// Failure reason, if the search failed.
    pub message: Option<String>,
}

impl PartialResult {
    /// Creates a successful result.
    pub fn succeeded(source: SourceKind, top: Vec<CanonicalEvent>, more: Vec<CanonicalEvent>) -> Self {
        Self {
            source,
            success: true,
            top,
            more,
            message: None,
        }
    }

    /// Creates a failed result, logging the error.
    pub fn failed(source: SourceKind, error: &ProviderError) -> Self {
        warn!(provider = %source, code = %error.code(), "search failed: {}", error.message());
        Self {
            source,
            success: false,
            top: Vec::new(),
            more: Vec::new(),
            message: Some(error.to_string()),
        }
    }

    /// Wraps the outcome of a fallible search.
    pub fn from_outcome(
        source: SourceKind,
        outcome: ProviderResult<(Vec<CanonicalEvent>, Vec<CanonicalEvent>)>,
    ) -> Self {
        match outcome {
            Ok((top, more)) => {
                info!(provider = %source, top = top.len(), more = more.len(), "search completed");
                Self::succeeded(source, top, more)
            }
            Err(e) => Self::failed(source, &e),
        }
    }

    /// Returns the number of events across both slices.
    pub fn event_count(&self) -> usize {
        self.top.len() + self.more.len()
    }

    /// Returns true if the search succeeded with at least one event.
    pub fn has_events(&self) -> bool {
        self.success && self.event_count() > 0
    }
}

/// A provider adapter.
///
/// Implementations are `Send + Sync` and held as `Arc<dyn EventSource>` so
/// that the aggregator can run all of them concurrently.
pub trait EventSource: Send + Sync {
    /// Returns which provider this source wraps.
    fn kind(&self) -> SourceKind;

    /// Returns the provider name used in logs.
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Searches the provider, using `now` to anchor synthetic dates.
    fn search_at<'a>(&'a self, input: &'a SearchInput, now: DateTime<Utc>)
    -> BoxFuture<'a, PartialResult>;

    /// Searches the provider at the current time.
    fn search<'a>(&'a self, input: &'a SearchInput) -> BoxFuture<'a, PartialResult> {
        self.search_at(input, Utc::now())
    }
}

/// Sends `request` and treats a `success: false` reply as an error.
pub async fn fetch(
    client: &dyn ProviderClient,
    request: &ProviderRequest,
) -> ProviderResult<ProviderResponse> {
    debug!(provider = %request.source, ?request, "querying provider");
    let response = client
        .query(request)
        .await
        .map_err(|e| e.with_provider(request.source.as_str()))?;

    if !response.success {
        let message = if response.message.trim().is_empty() {
            "provider reported failure".to_string()
        } else {
            response.message
        };
        return Err(ProviderError::upstream(message).with_provider(request.source.as_str()));
    }

    debug!(
        provider = %request.source,
        records = response.record_count(),
        "provider replied"
    );
    Ok(response)
}

/// Decodes raw records, keeping each record's position in the list.
///
/// Records that do not match `T` are skipped with a warning; the rest of the
/// batch survives.
pub fn decode_records<T: DeserializeOwned>(
    source: SourceKind,
    records: Vec<Value>,
) -> Vec<(usize, T)> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(decoded) => Some((index, decoded)),
            Err(e) => {
                warn!(provider = %source, index, "skipping malformed record: {}", e);
                None
            }
        })
        .collect()
}

/// Splits converted events into the `top` slice and a bounded `more` slice.
pub fn split(
    mut events: Vec<CanonicalEvent>,
    more_limit: MoreLimit,
) -> (Vec<CanonicalEvent>, Vec<CanonicalEvent>) {
    let mut more = events.split_off(TOP_SLICE.min(events.len()));
    if let MoreLimit::Next(n) = more_limit {
        more.truncate(n);
    }
    (events, more)
}

#[cfg(test)]
pub(crate) mod testing {
    //! A scripted in-memory transport.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replies with queued responses in order and records every request.
    #[derive(Default)]
    pub(crate) struct ScriptedClient {
        replies: Mutex<VecDeque<ProviderResult<ProviderResponse>>>,
        requests: Mutex<Vec<ProviderRequest>>,
    }

    impl ScriptedClient {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn reply(self, reply: ProviderResult<ProviderResponse>) -> Self {
            self.replies.lock().unwrap().push_back(reply);
            self
        }

        pub(crate) fn requests(&self) -> Vec<ProviderRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl ProviderClient for ScriptedClient {
        fn query<'a>(
            &'a self,
            request: &'a ProviderRequest,
        ) -> BoxFuture<'a, ProviderResult<ProviderResponse>> {
            self.requests.lock().unwrap().push(request.clone());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::internal("no scripted reply")));
            Box::pin(async move { reply })
        }
    }
}
