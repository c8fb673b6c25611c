//! Pretalx adapter.
//!
//! Pretalx has no search API; the transport scrapes the public event
//! listing. The scrape controls in [`ScrapeOptions`] are passed through
//! untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use eventscout_core::{
    CanonicalEvent, ContactParts, EventDetails, SearchInput, SourceKind, SyntheticSchedule,
    first_non_blank, is_resolvable_url, resolve_url, strip_html,
};

use crate::client::{BoxFuture, ProviderClient};
use crate::error::ProviderResult;
use crate::source::{EventSource, MoreLimit, PartialResult, decode_records, fetch, split};
use crate::wire::{ProviderRequest, ScrapeOptions};

use super::{RawId, local_id, single_image};

/// Number of events after the top slice kept in `more`.
pub const MORE_LIMIT: usize = 30;

const PREFERRED_LANGUAGE: &str = "en";

/// A Pretalx text that is either a plain string or a map of language codes
/// to translations.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Multilingual {
    Plain(String),
    Translated(BTreeMap<String, String>),
}

impl Multilingual {
    /// Returns the English text if present, otherwise the first non-blank
    /// translation in language-code order.
    pub fn resolve(&self) -> Option<String> {
        match self {
            Self::Plain(s) => first_non_blank([Some(s.as_str())]),
            Self::Translated(map) => first_non_blank(
                std::iter::once(map.get(PREFERRED_LANGUAGE).map(String::as_str))
                    .chain(map.values().map(|v| Some(v.as_str()))),
            ),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPretalxEvent {
    pub slug: Option<RawId>,
    pub name: Option<Multilingual>,
    pub url: Option<String>,
    pub cfp_url: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub timezone: Option<String>,
    pub location: Option<Multilingual>,
    pub description: Option<Multilingual>,
    pub organiser: Option<String>,
    pub organizer: Option<String>,
    pub email: Option<String>,
    pub logo: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub tracks: Vec<String>,
}

/// Converts one scraped Pretalx event.
pub fn convert_pretalx(raw: RawPretalxEvent, index: usize, now: DateTime<Utc>) -> CanonicalEvent {
    let local = local_id(raw.slug.as_ref(), index);
    let main_url = resolve_url([raw.url.as_deref()], || {
        format!("https://pretalx.com/{}/", local)
    });
    let application_url = raw
        .cfp_url
        .as_deref()
        .map(str::trim)
        .filter(|u| is_resolvable_url(u))
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}/cfp", main_url.trim_end_matches('/')));

    let (start_date, end_date) = match first_non_blank([raw.date_from.as_deref()]) {
        Some(start) => (Some(start), first_non_blank([raw.date_to.as_deref()])),
        None => {
            let schedule = SyntheticSchedule::for_index(index, now);
            (Some(schedule.start_string()), Some(schedule.end_string()))
        }
    };

    let description = raw
        .description
        .as_ref()
        .and_then(Multilingual::resolve)
        .map(|d| strip_html(&d));
    let organiser = first_non_blank([raw.organiser.as_deref(), raw.organizer.as_deref()]);
    let contact = ContactParts::new()
        .email(raw.email.as_deref())
        .organizer(organiser.as_deref())
        .mine(description.clone())
        .build();

    let details = EventDetails {
        topics: raw
            .tracks
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        features: raw
            .timezone
            .as_deref()
            .and_then(|tz| first_non_blank([Some(tz)]))
            .map(|tz| vec![format!("Timezone: {}", tz)])
            .unwrap_or_default(),
        ..Default::default()
    };

    CanonicalEvent::new(
        SourceKind::Pretalx,
        SourceKind::Pretalx.event_id(&local),
        raw.name.as_ref().and_then(Multilingual::resolve).unwrap_or_default(),
        main_url,
    )
    .with_application_url(application_url)
    .with_organizer(organiser.unwrap_or_default())
    .with_contact(contact)
    .with_description(description)
    .with_dates(None, start_date, end_date)
    .with_place(raw.location.as_ref().and_then(Multilingual::resolve), None)
    .with_images(single_image(raw.logo.as_deref()))
    .with_details(details)
}

/// Pretalx source.
pub struct PretalxSource {
    client: Arc<dyn ProviderClient>,
    scrape: ScrapeOptions,
}

impl PretalxSource {
    /// Creates a source with the default scrape controls.
    pub fn new(client: Arc<dyn ProviderClient>) -> Self {
        Self {
            client,
            scrape: ScrapeOptions::default(),
        }
    }

    /// Builder method to override the scrape controls.
    pub fn with_scrape(mut self, scrape: ScrapeOptions) -> Self {
        self.scrape = scrape;
        self
    }

    async fn try_search(
        &self,
        input: &SearchInput,
        now: DateTime<Utc>,
    ) -> ProviderResult<(Vec<CanonicalEvent>, Vec<CanonicalEvent>)> {
        let request = ProviderRequest::new(SourceKind::Pretalx)
            .with_subject(input.industry(), input.topic())
            .with_scrape(self.scrape.clone());
        let response = fetch(self.client.as_ref(), &request).await?;
        let events = decode_records::<RawPretalxEvent>(SourceKind::Pretalx, response.data.events)
            .into_iter()
            .map(|(index, raw)| convert_pretalx(raw, index, now))
            .collect();
        Ok(split(events, MoreLimit::Next(MORE_LIMIT)))
    }
}

impl EventSource for PretalxSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Pretalx
    }

    fn search_at<'a>(
        &'a self,
        input: &'a SearchInput,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, PartialResult> {
        Box::pin(async move {
            PartialResult::from_outcome(self.kind(), self.try_search(input, now).await)
        })
    }
}
