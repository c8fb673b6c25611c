//! Concurrent fan-out over every event source.
//!
//! All sources run at once and the aggregator waits for every one of them
//! to settle. A failing or slow source never cancels the others; sources
//! cannot fail past their own boundary, so there is nothing to short-circuit
//! on.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, info};

use eventscout_core::{CanonicalEvent, SearchInput, SourceKind};
use eventscout_providers::{EventSource, PartialResult};

/// Per-source summary of one aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOutcome {
    pub source: SourceKind,
    pub success: bool,
    pub event_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&PartialResult> for SourceOutcome {
    fn from(result: &PartialResult) -> Self {
        Self {
            source: result.source,
            success: result.success,
            event_count: result.event_count(),
            message: result.message.clone(),
        }
    }
}

/// The merged, not yet post-processed buckets.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// Every source's `top` slice, concatenated in source order.
    pub top: Vec<CanonicalEvent>,
    /// Every source's `more` slice, concatenated in source order.
    pub more: Vec<CanonicalEvent>,
    pub outcomes: Vec<SourceOutcome>,
}

impl Aggregation {
    /// Returns false when every source failed or returned zero events.
    pub fn has_data(&self) -> bool {
        self.outcomes.iter().any(|o| o.success && o.event_count > 0)
    }

    /// Returns the number of sources that succeeded.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }
}

/// Runs every source concurrently and merges their results.
pub struct Aggregator {
    sources: Vec<Arc<dyn EventSource>>,
}

impl Aggregator {
    /// Creates an aggregator over `sources`.
    pub fn new(sources: Vec<Arc<dyn EventSource>>) -> Self {
        Self { sources }
    }

    /// Returns the sources this aggregator fans out to.
    pub fn sources(&self) -> &[Arc<dyn EventSource>] {
        &self.sources
    }

    /// Searches every source and concatenates their slices.
    pub async fn aggregate(&self, input: &SearchInput, now: DateTime<Utc>) -> Aggregation {
        debug!(sources = self.sources.len(), topic = input.topic(), industry = input.industry(), "fanning out");

        let results = join_all(self.sources.iter().map(|s| s.search_at(input, now))).await;

        let mut aggregation = Aggregation::default();
        for result in results {
            aggregation.outcomes.push(SourceOutcome::from(&result));
            aggregation.top.extend(result.top);
            aggregation.more.extend(result.more);
        }

        info!(
            sources = aggregation.outcomes.len(),
            succeeded = aggregation.succeeded(),
            top = aggregation.top.len(),
            more = aggregation.more.len(),
            "aggregation finished"
        );
        aggregation
    }
}
