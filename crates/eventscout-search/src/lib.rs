//! Aggregator: concurrent fan-out, post-processing, fallback data.
//!
//! This crate runs one search across every event source:
//! - Concurrent fan-out that waits for every source to settle
//! - Date ordering, deduplication and optional expiry of both buckets
//! - Deterministic synthetic results when no source returns anything
//!
//! # Example
//!
//! ```rust,no_run
//! use eventscout_core::SearchInput;
//! use eventscout_providers::{PassthroughTopicOptimizer, ProviderError, UnavailableClient, all_sources};
//! use eventscout_search::{EventSearch, SearchConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Arc::new(UnavailableClient::new(ProviderError::configuration("offline")));
//!     let sources = all_sources(client, Arc::new(PassthroughTopicOptimizer));
//!     let search = EventSearch::new(sources, SearchConfig::default());
//!
//!     let results = search.search(&SearchInput::new("AI", "Technology")).await;
//!     println!("{} events", results.len());
//! }
//! ```

mod aggregator;
mod config;
mod fallback;
mod search;

pub use aggregator::{Aggregation, Aggregator, SourceOutcome};
pub use config::{
    DEFAULT_FALLBACK_LATENCY, DEFAULT_MORE_SIZE, DEFAULT_TOP_SIZE, SearchConfig,
};
pub use fallback::{FallbackData, FallbackGenerator, UNVERIFIED_COUNT, VERIFIED_COUNT};
pub use search::{EventSearch, SearchResults, combined_search};

#[cfg(test)]
mod scenario_tests;
