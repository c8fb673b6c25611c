//! CallForSpeakers adapter.
//!
//! Every record is an open call for papers. Its CFP link becomes the
//! application URL; records without one have no application URL.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use eventscout_core::{
    CanonicalEvent, ContactParts, EventDetails, ONLINE_EVENT, SearchInput, SourceKind,
    SyntheticSchedule, first_non_blank, is_resolvable_url, join_location, resolve_url, strip_html,
};

use crate::client::{BoxFuture, ProviderClient};
use crate::error::ProviderResult;
use crate::source::{EventSource, MoreLimit, PartialResult, decode_records, fetch, split};
use crate::wire::ProviderRequest;

use super::{RawId, local_id, single_image};

/// Number of records requested per query.
pub const REQUEST_LIMIT: usize = 120;

/// One call-for-speakers record.
///
/// The feed mixes snake_case and camelCase keys, sometimes both in one
/// record, so each spelling gets its own field and the first non-blank wins.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCallForSpeakersEvent {
    pub id: Option<RawId>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub website: Option<String>,
    pub cfp_url: Option<String>,
    #[serde(rename = "cfpUrl")]
    pub cfp_url_camel: Option<String>,
    pub cfp_end_date: Option<String>,
    #[serde(rename = "cfpEndDate")]
    pub cfp_end_date_camel: Option<String>,
    pub start_date: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date_camel: Option<String>,
    pub event_start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date_camel: Option<String>,
    pub event_end_date: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub is_virtual: Option<bool>,
    #[serde(rename = "isVirtual")]
    pub is_virtual_camel: Option<bool>,
    pub online: Option<bool>,
    pub organizer: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub logo: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub tags: Vec<String>,
    pub travel_covered: Option<bool>,
    #[serde(rename = "travelCovered")]
    pub travel_covered_camel: Option<bool>,
    pub hotel_covered: Option<bool>,
    #[serde(rename = "hotelCovered")]
    pub hotel_covered_camel: Option<bool>,
    pub fee_covered: Option<bool>,
    #[serde(rename = "feeCovered")]
    pub fee_covered_camel: Option<bool>,
}

impl RawCallForSpeakersEvent {
    fn is_virtual(&self) -> bool {
        self.is_virtual
            .or(self.is_virtual_camel)
            .or(self.online)
            .unwrap_or(false)
    }
}

/// Converts one call-for-speakers record.
pub fn convert_call_for_speakers(
    raw: RawCallForSpeakersEvent,
    index: usize,
    now: DateTime<Utc>,
) -> CanonicalEvent {
    let local = local_id(raw.id.as_ref(), index);
    let application_url = first_non_blank([raw.cfp_url.as_deref(), raw.cfp_url_camel.as_deref()])
        .filter(|u| is_resolvable_url(u));
    let main_url = resolve_url(
        [
            raw.url.as_deref(),
            raw.website.as_deref(),
            application_url.as_deref(),
        ],
        || format!("https://callforspeakers.com/events/{}", local),
    );

    let start = first_non_blank([
        raw.start_date.as_deref(),
        raw.start_date_camel.as_deref(),
        raw.event_start_date.as_deref(),
    ]);
    let (start_date, end_date) = match start {
        Some(start) => (
            Some(start),
            first_non_blank([
                raw.end_date.as_deref(),
                raw.end_date_camel.as_deref(),
                raw.event_end_date.as_deref(),
            ]),
        ),
        None => {
            let schedule = SyntheticSchedule::for_index(index, now);
            (Some(schedule.start_string()), Some(schedule.end_string()))
        }
    };

    let is_virtual = raw.is_virtual();
    let location = if is_virtual {
        Some(ONLINE_EVENT.to_string())
    } else {
        first_non_blank([raw.location.as_deref()])
            .or_else(|| join_location([raw.city.as_deref(), raw.country.as_deref()]))
    };

    let description = raw.description.as_deref().map(strip_html);
    let contact = ContactParts::new()
        .email(raw.email.as_deref())
        .organizer(raw.organizer.as_deref())
        .mine(description.clone())
        .build();

    let mut features = Vec::new();
    let benefits = [
        (raw.travel_covered.or(raw.travel_covered_camel), "Travel covered"),
        (raw.hotel_covered.or(raw.hotel_covered_camel), "Hotel covered"),
        (raw.fee_covered.or(raw.fee_covered_camel), "Speaker fee"),
    ];
    for (covered, label) in benefits {
        if covered == Some(true) {
            features.push(label.to_string());
        }
    }
    if let Some(deadline) =
        first_non_blank([raw.cfp_end_date.as_deref(), raw.cfp_end_date_camel.as_deref()])
    {
        features.push(format!("CFP closes {}", deadline));
    }

    let details = EventDetails {
        format: Some(if is_virtual { "Virtual" } else { "In person" }.to_string()),
        topics: raw
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        features,
        ..Default::default()
    };

    let name = first_non_blank([raw.name.as_deref(), raw.title.as_deref()]).unwrap_or_default();
    let mut event = CanonicalEvent::new(
        SourceKind::CallForSpeakers,
        SourceKind::CallForSpeakers.event_id(&local),
        name,
        main_url,
    );
    if let Some(application_url) = application_url {
        event = event.with_application_url(application_url);
    }
    event
        .with_organizer(raw.organizer.unwrap_or_default())
        .with_contact(contact)
        .with_description(description)
        .with_dates(None, start_date, end_date)
        .with_place(location, None)
        .with_images(single_image(
            first_non_blank([raw.image.as_deref(), raw.logo.as_deref()]).as_deref(),
        ))
        .with_details(details)
}

/// CallForSpeakers source.
pub struct CallForSpeakersSource {
    client: Arc<dyn ProviderClient>,
}

impl CallForSpeakersSource {
    /// Creates a source that queries through `client`.
    pub fn new(client: Arc<dyn ProviderClient>) -> Self {
        Self { client }
    }

    async fn try_search(
        &self,
        input: &SearchInput,
        now: DateTime<Utc>,
    ) -> ProviderResult<(Vec<CanonicalEvent>, Vec<CanonicalEvent>)> {
        let request = ProviderRequest::new(SourceKind::CallForSpeakers)
            .with_subject(input.industry(), input.topic())
            .with_limit(REQUEST_LIMIT);
        let response = fetch(self.client.as_ref(), &request).await?;
        let events = decode_records::<RawCallForSpeakersEvent>(
            SourceKind::CallForSpeakers,
            response.data.events,
        )
        .into_iter()
        .map(|(index, raw)| convert_call_for_speakers(raw, index, now))
        .collect();
        Ok(split(events, MoreLimit::Next(100)))
    }
}

impl EventSource for CallForSpeakersSource {
    fn kind(&self) -> SourceKind {
        SourceKind::CallForSpeakers
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
