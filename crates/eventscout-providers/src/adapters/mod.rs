//! The six provider adapters.
//!
//! Each adapter module holds the provider's raw record types, a pure
//! `convert_*` function mapping one raw record to a [`CanonicalEvent`], and
//! the [`EventSource`] implementation that queries the provider.
//!
//! [`CanonicalEvent`]: eventscout_core::CanonicalEvent

pub mod call_for_speakers;
pub mod eventbrite;
pub mod openwebninja;
pub mod pretalx;
pub mod serpapi;
pub mod ticketmaster;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};

use eventscout_core::EventImage;

use crate::client::{ProviderClient, TopicOptimizer};
use crate::source::EventSource;

pub use call_for_speakers::CallForSpeakersSource;
pub use eventbrite::EventbriteSource;
pub use openwebninja::OpenWebNinjaSource;
pub use pretalx::PretalxSource;
pub use serpapi::SerpApiSource;
pub use ticketmaster::TicketmasterSource;

/// Builds the full provider set, all sharing one transport.
pub fn all_sources(
    client: Arc<dyn ProviderClient>,
    optimizer: Arc<dyn TopicOptimizer>,
) -> Vec<Arc<dyn EventSource>> {
    vec![
        Arc::new(TicketmasterSource::new(Arc::clone(&client))),
        Arc::new(EventbriteSource::new(Arc::clone(&client))),
        Arc::new(CallForSpeakersSource::new(Arc::clone(&client))),
        Arc::new(PretalxSource::new(Arc::clone(&client))),
        Arc::new(SerpApiSource::new(Arc::clone(&client), optimizer)),
        Arc::new(OpenWebNinjaSource::new(client)),
    ]
}

/// A provider identifier that may arrive as a string or a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    /// Returns the id, or `None` if it is a blank string.
    pub(crate) fn non_blank(&self) -> Option<String> {
        let id = self.to_string();
        let id = id.trim();
        (!id.is_empty()).then(|| id.to_string())
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Returns the provider id, or the record's position when it has none.
pub(crate) fn local_id(id: Option<&RawId>, index: usize) -> String {
    id.and_then(RawId::non_blank)
        .unwrap_or_else(|| index.to_string())
}

/// Decodes a defaulted field, reading an explicit `null` as the default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Builds a single-entry image list from an optional URL.
pub(crate) fn single_image(url: Option<&str>) -> Vec<EventImage> {
    url.map(str::trim)
        .filter(|u| eventscout_core::is_resolvable_url(u))
        .map(|u| vec![EventImage::new(u)])
        .unwrap_or_default()
}
