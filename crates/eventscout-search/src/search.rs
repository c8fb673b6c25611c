//! The search entry point.
//!
//! [`EventSearch`] ties the pieces together: fan out through the
//! [`Aggregator`], post-process both buckets, and fall back to synthetic data
//! when nothing usable is left. A search never fails.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use eventscout_core::{CanonicalEvent, MorePager, SearchInput};
use eventscout_providers::EventSource;

use crate::aggregator::{Aggregation, Aggregator, SourceOutcome};
use crate::config::SearchConfig;
use crate::fallback::FallbackGenerator;

/// The final response of a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// Up to 20 events, ordered by date.
    pub top20: Vec<CanonicalEvent>,
    /// Up to 100 further events, ordered by date.
    pub more100: Vec<CanonicalEvent>,
    /// Whether the events are synthetic.
    pub used_fallback: bool,
    /// What each source reported.
    pub outcomes: Vec<SourceOutcome>,
}

impl SearchResults {
    /// Returns a load-more cursor over `more100`.
    pub fn more_pager(&self) -> MorePager {
        MorePager::new(self.more100.clone())
    }

    /// Returns the total number of events in both buckets.
    pub fn len(&self) -> usize {
        self.top20.len() + self.more100.len()
    }

    /// Returns true if both buckets are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Aggregating search over a fixed set of sources.
pub struct EventSearch {
    aggregator: Aggregator,
    fallback: FallbackGenerator,
    config: SearchConfig,
}

impl EventSearch {
    /// Creates a search over `sources`.
    pub fn new(sources: Vec<Arc<dyn EventSource>>, config: SearchConfig) -> Self {
        Self {
            aggregator: Aggregator::new(sources),
            fallback: FallbackGenerator::new(config.fallback_latency),
            config,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Searches at the current time.
    pub async fn search(&self, input: &SearchInput) -> SearchResults {
        self.search_at(input, Utc::now()).await
    }

    /// Searches, using `now` for expiry, synthetic dates and the fallback
    /// anchor day.
    pub async fn search_at(&self, input: &SearchInput, now: DateTime<Utc>) -> SearchResults {
        let aggregation = self.aggregator.aggregate(input, now).await;
        let outcomes = aggregation.outcomes.clone();

        if aggregation.has_data() {
            let (top20, more100) = self.post_process(aggregation, now);
            if !top20.is_empty() || !more100.is_empty() {
                info!(top = top20.len(), more = more100.len(), "search finished");
                return SearchResults {
                    top20,
                    more100,
                    used_fallback: false,
                    outcomes,
                };
            }
            info!("post-processing left no events, using fallback data");
        } else {
            info!("no source returned events, using fallback data");
        }

        let data = self.fallback.produce(input, now.date_naive()).await;
        SearchResults {
            top20: data.verified,
            more100: data.unverified,
            used_fallback: true,
            outcomes,
        }
    }

    /// Runs the pipeline over both buckets.
    ///
    /// The buckets are not processed independently, on purpose. Top events
    /// beyond `top_size` move to the front of the more bucket, and the more
    /// bucket drops dedup keys already shown in top so that paging never
    /// repeats a top event.
    fn post_process(
        &self,
        aggregation: Aggregation,
        now: DateTime<Utc>,
    ) -> (Vec<CanonicalEvent>, Vec<CanonicalEvent>) {
        let processor = self.config.post_processor();

        let mut top = processor.process(aggregation.top, now, usize::MAX);
        let spill = top.split_off(self.config.top_size.min(top.len()));

        let shown: HashSet<String> = top.iter().map(CanonicalEvent::dedup_key).collect();
        let more = spill
            .into_iter()
            .chain(aggregation.more)
            .filter(|e| !shown.contains(&e.dedup_key()))
            .collect();
        let more = processor.process(more, now, self.config.more_size);

        (top, more)
    }
}

/// Runs one search over `sources` with the default configuration.
///
/// Always returns results: when every source fails the synthetic fallback
/// set is returned.
pub async fn combined_search(
    sources: Vec<Arc<dyn EventSource>>,
    input: &SearchInput,
) -> SearchResults {
    EventSearch::new(sources, SearchConfig::default())
        .search(input)
        .await
}
