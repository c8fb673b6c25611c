//! Event sources and the transports they query.
//!
//! This crate turns a [`SearchInput`](eventscout_core::SearchInput) into
//! canonical events, one provider at a time:
//!
//! - [`EventSource`] - The trait every provider adapter implements
//! - [`ProviderClient`] - The injected transport that reaches a provider
//! - [`TopicOptimizer`] - Rewrites topics into web-search queries
//! - [`adapters`] - Ticketmaster, Eventbrite, CallForSpeakers, Pretalx,
//!   SerpAPI and OpenWebNinja
//! - [`ProviderError`] - Error types for provider operations
//!
//! # Architecture
//!
//! ```text
//!          ┌──────────────────────────┐
//!          │   ProviderClient (HTTP)  │
//!          └────────────┬─────────────┘
//!                       │ ProviderResponse { success, data }
//!     ┌────────┬────────┼────────┬────────┬────────┐
//!     ▼        ▼        ▼        ▼        ▼        ▼
//!    tm       eb       cfs    pretalx   serp      own
//!     │        │        │        │        │        │
//!     └────────┴────────┴───┬────┴────────┴────────┘
//!                           ▼ convert_*()
//!                 PartialResult { top, more }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use eventscout_providers::{EventSource, HttpProviderClient, all_sources};
//!
//! let client = Arc::new(HttpProviderClient::new("https://api.example.com", DEFAULT_TIMEOUT)?);
//! for source in all_sources(client.clone(), client) {
//!     let result = source.search(&input).await;
//!     println!("{}: {} events", source.name(), result.event_count());
//! }
//! ```

pub mod adapters;
pub mod client;
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod source;
pub mod wire;

// Re-export main types at crate root
pub use adapters::{
    CallForSpeakersSource, EventbriteSource, OpenWebNinjaSource, PretalxSource, SerpApiSource,
    TicketmasterSource, all_sources,
};
pub use client::{
    BoxFuture, PassthroughTopicOptimizer, ProviderClient, TopicOptimizer, UnavailableClient,
};
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
#[cfg(feature = "http")]
pub use http::{DEFAULT_TIMEOUT, HttpProviderClient};
pub use source::{EventSource, MoreLimit, PartialResult, TOP_SLICE};
pub use wire::{ProviderRequest, ProviderResponse, ResponseData, ScrapeOptions};
