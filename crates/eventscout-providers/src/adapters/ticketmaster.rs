//! Ticketmaster Discovery adapter.
//!
//! Ticketmaster is keyword driven. The primary keyword is synthesized from
//! topic and industry; if that query fails the adapter walks an ordered list
//! of alternate keywords and stops at the first one that succeeds.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use eventscout_core::{
    CanonicalEvent, ContactParts, EventDetails, EventImage, Pricing, SearchInput, SourceKind,
    SyntheticSchedule, first_non_blank, join_location, resolve_url, strip_html,
};

use crate::client::{BoxFuture, ProviderClient};
use crate::error::{ProviderError, ProviderResult};
use crate::source::{EventSource, MoreLimit, PartialResult, decode_records, fetch, split};
use crate::wire::{ProviderRequest, ProviderResponse};

use super::{RawId, local_id};

/// Number of records requested per query.
pub const REQUEST_SIZE: usize = 120;

/// Keyword used when neither topic nor industry is set.
pub const DEFAULT_KEYWORD: &str = "conference";

const UNDEFINED_CLASSIFICATION: &str = "Undefined";

/// Query parameters derived from the search subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketmasterParams {
    pub keyword: String,
    /// Not mapped yet; always `None`.
    pub classification_id: Option<String>,
    /// Not mapped yet; always `None`.
    pub segment_id: Option<String>,
}

/// Builds the primary query parameters.
///
/// The keyword is the non-blank values of `[topic, industry]` joined by a
/// space, or [`DEFAULT_KEYWORD`] when both are blank.
pub fn ticketmaster_params(industry: &str, topic: &str) -> TicketmasterParams {
    let parts: Vec<&str> = [topic.trim(), industry.trim()]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect();
    let keyword = if parts.is_empty() {
        DEFAULT_KEYWORD.to_string()
    } else {
        parts.join(" ")
    };

    TicketmasterParams {
        keyword,
        classification_id: None,
        segment_id: None,
    }
}

/// Returns the alternate keywords tried after the primary one fails.
///
/// Order is fixed; blanks, duplicates and the primary keyword are removed.
pub fn search_strategies(industry: &str, topic: &str) -> Vec<String> {
    let topic = topic.trim();
    let industry = industry.trim();
    let primary = ticketmaster_params(industry, topic).keyword;

    let candidates = [
        topic.to_string(),
        industry.to_string(),
        suffixed(topic, "conference"),
        suffixed(industry, "conference"),
        suffixed(topic, "summit"),
        suffixed(industry, "expo"),
        DEFAULT_KEYWORD.to_string(),
    ];

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| !c.is_empty() && *c != primary)
        .filter(|c| seen.insert(c.to_lowercase()))
        .collect()
}

fn suffixed(base: &str, suffix: &str) -> String {
    if base.is_empty() {
        String::new()
    } else {
        format!("{} {}", base, suffix)
    }
}

/// Position in the keyword retry chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchAttempt {
    Primary,
    /// Index into the alternate list.
    Alternate(usize),
    Exhausted,
}

impl SearchAttempt {
    /// Moves to the next attempt after a failure.
    pub fn next(self, alternates: usize) -> Self {
        let next = match self {
            Self::Primary => 0,
            Self::Alternate(i) => i + 1,
            Self::Exhausted => return Self::Exhausted,
        };
        if next < alternates {
            Self::Alternate(next)
        } else {
            Self::Exhausted
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTicketmasterEvent {
    pub id: Option<RawId>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub info: Option<String>,
    pub please_note: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub images: Vec<RawImage>,
    pub dates: Option<RawDates>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub classifications: Vec<RawClassification>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub price_ranges: Vec<RawPriceRange>,
    pub promoter: Option<RawNamed>,
    #[serde(rename = "_embedded")]
    pub embedded: Option<RawEmbedded>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawImage {
    pub url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub ratio: Option<String>,
    pub fallback: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDates {
    pub start: Option<RawInstant>,
    pub end: Option<RawInstant>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInstant {
    pub local_date: Option<String>,
    pub date_time: Option<String>,
}

impl RawInstant {
    fn best(&self) -> Option<String> {
        first_non_blank([self.date_time.as_deref(), self.local_date.as_deref()])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNamed {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawClassification {
    pub segment: Option<RawNamed>,
    pub genre: Option<RawNamed>,
    #[serde(rename = "subGenre")]
    pub sub_genre: Option<RawNamed>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPriceRange {
    pub currency: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEmbedded {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub venues: Vec<RawVenue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVenue {
    pub name: Option<String>,
    pub url: Option<String>,
    pub address: Option<RawAddress>,
    pub city: Option<RawNamed>,
    pub state: Option<RawNamed>,
    pub country: Option<RawNamed>,
    pub box_office_info: Option<RawBoxOffice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAddress {
    pub line1: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBoxOffice {
    pub phone_number_detail: Option<String>,
}

fn name_of(named: Option<&RawNamed>) -> Option<&str> {
    named.and_then(|n| n.name.as_deref())
}

/// Converts one Discovery record.
pub fn convert_ticketmaster(
    raw: RawTicketmasterEvent,
    index: usize,
    now: DateTime<Utc>,
) -> CanonicalEvent {
    let local = local_id(raw.id.as_ref(), index);
    let main_url = resolve_url([raw.url.as_deref()], || {
        format!("https://www.ticketmaster.com/event/{}", local)
    });

    let start = raw.dates.as_ref().and_then(|d| d.start.as_ref());
    let end = raw.dates.as_ref().and_then(|d| d.end.as_ref());
    let (date, start_date, end_date) = match start.and_then(RawInstant::best) {
        Some(start_date) => (
            start.and_then(|s| s.local_date.clone()),
            Some(start_date),
            end.and_then(RawInstant::best),
        ),
        None => {
            let schedule = SyntheticSchedule::for_index(index, now);
            (None, Some(schedule.start_string()), Some(schedule.end_string()))
        }
    };

    let venue = raw.embedded.as_ref().and_then(|e| e.venues.first());
    let location = venue.and_then(|v| {
        join_location([
            v.address.as_ref().and_then(|a| a.line1.as_deref()),
            name_of(v.city.as_ref()),
            name_of(v.state.as_ref()),
            name_of(v.country.as_ref()),
        ])
    });
    let venue_name = venue.and_then(|v| first_non_blank([v.name.as_deref()]));

    let description = first_non_blank([
        raw.description.as_deref(),
        raw.info.as_deref(),
        raw.please_note.as_deref(),
    ])
    .map(|d| strip_html(&d));

    let promoter = name_of(raw.promoter.as_ref());
    let contact = ContactParts::new()
        .phone(venue.and_then(|v| v.box_office_info.as_ref()?.phone_number_detail.clone()))
        .website(venue.and_then(|v| v.url.clone()))
        .organizer(promoter)
        .mine(description.clone())
        .build();

    let images = raw
        .images
        .iter()
        .filter_map(|img| {
            let url = img.url.as_deref()?;
            let mut image = EventImage::new(url).with_size(img.width, img.height);
            image.ratio = img.ratio.clone();
            image.fallback = img.fallback;
            Some(image)
        })
        .collect();

    CanonicalEvent::new(
        SourceKind::Ticketmaster,
        SourceKind::Ticketmaster.event_id(&local),
        raw.name.unwrap_or_default(),
        main_url,
    )
    .with_organizer(promoter.unwrap_or_default())
    .with_contact(contact)
    .with_description(description)
    .with_dates(date, start_date, end_date)
    .with_place(location, venue_name)
    .with_images(images)
    .with_details(details(&raw.price_ranges, &raw.classifications))
}

fn details(prices: &[RawPriceRange], classifications: &[RawClassification]) -> EventDetails {
    let pricing = prices.first().map(|p| Pricing {
        min: p.min,
        max: p.max,
        currency: p.currency.clone(),
        is_free: p.max == Some(0.0),
        display: match (p.min, p.max) {
            (Some(min), Some(max)) if min != max => Some(format!(
                "{:.2} - {:.2} {}",
                min,
                max,
                p.currency.as_deref().unwrap_or_default()
            )),
            (Some(price), _) | (None, Some(price)) => Some(format!(
                "{:.2} {}",
                price,
                p.currency.as_deref().unwrap_or_default()
            )),
            (None, None) => None,
        }
        .map(|d| d.trim().to_string()),
    });

    let mut topics: Vec<String> = Vec::new();
    for c in classifications {
        for name in [
            name_of(c.segment.as_ref()),
            name_of(c.genre.as_ref()),
            name_of(c.sub_genre.as_ref()),
        ]
        .into_iter()
        .flatten()
        {
            let name = name.trim();
            if !name.is_empty()
                && name != UNDEFINED_CLASSIFICATION
                && !topics.iter().any(|t| t == name)
            {
                topics.push(name.to_string());
            }
        }
    }

    EventDetails {
        pricing,
        topics,
        ..Default::default()
    }
}

/// Ticketmaster source with the alternate-keyword retry chain.
pub struct TicketmasterSource {
    client: Arc<dyn ProviderClient>,
}

impl TicketmasterSource {
    /// Creates a source that queries through `client`.
    pub fn new(client: Arc<dyn ProviderClient>) -> Self {
        Self { client }
    }

    fn request(&self, input: &SearchInput, params: &TicketmasterParams, keyword: &str) -> ProviderRequest {
        let mut request = ProviderRequest::new(SourceKind::Ticketmaster)
            .with_subject(input.industry(), input.topic())
            .with_keyword(keyword)
            .with_size(REQUEST_SIZE);
        request.classification_id = params.classification_id.clone();
        request.segment_id = params.segment_id.clone();
        request
    }

    async fn query_with_retries(&self, input: &SearchInput) -> ProviderResult<ProviderResponse> {
        let params = ticketmaster_params(input.industry(), input.topic());
        let alternates = search_strategies(input.industry(), input.topic());

        let mut attempt = SearchAttempt::Primary;
        let mut last_error = None;
        loop {
            let keyword = match attempt {
                SearchAttempt::Primary => params.keyword.as_str(),
                SearchAttempt::Alternate(i) => alternates[i].as_str(),
                SearchAttempt::Exhausted => {
                    return Err(last_error.unwrap_or_else(|| {
                        ProviderError::internal("no search strategy was attempted")
                    }));
                }
            };

            debug!(?attempt, keyword, "trying ticketmaster keyword");
            match fetch(self.client.as_ref(), &self.request(input, &params, keyword)).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    debug!(?attempt, keyword, "keyword failed: {}", e);
                    last_error = Some(e);
                    attempt = attempt.next(alternates.len());
                }
            }
        }
    }

    async fn try_search(
        &self,
        input: &SearchInput,
        now: DateTime<Utc>,
    ) -> ProviderResult<(Vec<CanonicalEvent>, Vec<CanonicalEvent>)> {
        let response = self.query_with_retries(input).await?;
        let events = decode_records::<RawTicketmasterEvent>(SourceKind::Ticketmaster, response.data.events)
            .into_iter()
            .map(|(index, raw)| convert_ticketmaster(raw, index, now))
            .collect();
        Ok(split(events, MoreLimit::Next(100)))
    }
}

impl EventSource for TicketmasterSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Ticketmaster
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
