//! OpenWebNinja real-time events adapter.
//!
//! The transport answers one combined topic/industry request with results
//! that are already split into `top20` and `more100`, so this adapter does
//! not split on its own unless it receives a flat list.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use eventscout_core::{
    CanonicalEvent, ContactParts, EventDetails, EventImage, ONLINE_EVENT, SearchInput, SourceKind,
    SyntheticSchedule, first_non_blank, is_resolvable_url, join_location, resolve_url, strip_html,
};

use crate::client::{BoxFuture, ProviderClient};
use crate::error::ProviderResult;
use crate::source::{EventSource, MoreLimit, PartialResult, TOP_SLICE, decode_records, fetch, split};
use crate::wire::{ProviderRequest, ProviderResponse};

use super::{RawId, local_id};

/// Maximum size of the `more` slice.
pub const MORE_LIMIT: usize = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOpenWebNinjaEvent {
    pub event_id: Option<RawId>,
    pub name: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<String>,
    pub start_time_utc: Option<String>,
    pub end_time: Option<String>,
    pub end_time_utc: Option<String>,
    pub date_human_readable: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub is_virtual: bool,
    pub thumbnail: Option<String>,
    pub publisher: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub ticket_links: Vec<RawLink>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub info_links: Vec<RawLink>,
    pub venue: Option<RawVenue>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLink {
    pub source: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVenue {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub website: Option<String>,
    pub full_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Converts one OpenWebNinja record.
pub fn convert_openwebninja(
    raw: RawOpenWebNinjaEvent,
    index: usize,
    now: DateTime<Utc>,
) -> CanonicalEvent {
    let local = local_id(raw.event_id.as_ref(), index);
    let main_url = resolve_url([raw.link.as_deref()], || {
        format!(
            "https://www.google.com/search?ibp=htl;events&htidocid={}",
            urlencoding::encode(&local)
        )
    });
    let application_url = raw
        .ticket_links
        .iter()
        .chain(raw.info_links.iter())
        .filter_map(|l| l.link.as_deref())
        .map(str::trim)
        .find(|l| is_resolvable_url(l))
        .map(str::to_string);

    let (start_date, end_date) =
        match first_non_blank([raw.start_time_utc.as_deref(), raw.start_time.as_deref()]) {
            Some(start) => (
                Some(start),
                first_non_blank([raw.end_time_utc.as_deref(), raw.end_time.as_deref()]),
            ),
            None => {
                let schedule = SyntheticSchedule::for_index(index, now);
                (Some(schedule.start_string()), Some(schedule.end_string()))
            }
        };

    let venue = raw.venue.as_ref();
    let location = if raw.is_virtual {
        Some(ONLINE_EVENT.to_string())
    } else {
        venue.and_then(|v| {
            first_non_blank([v.full_address.as_deref()]).or_else(|| {
                join_location([v.city.as_deref(), v.state.as_deref(), v.country.as_deref()])
            })
        })
    };
    let venue_name = venue.and_then(|v| first_non_blank([v.name.as_deref()]));

    let description = raw.description.as_deref().map(strip_html);
    let contact = ContactParts::new()
        .phone(venue.and_then(|v| v.phone_number.clone()))
        .website(venue.and_then(|v| v.website.clone()))
        .mine(description.clone())
        .build();

    let details = EventDetails {
        format: raw.is_virtual.then(|| "Virtual".to_string()),
        topics: raw
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        ..Default::default()
    };

    let images = first_non_blank([raw.thumbnail.as_deref()])
        .map(EventImage::new)
        .into_iter()
        .collect();

    let mut event = CanonicalEvent::new(
        SourceKind::OpenWebNinja,
        SourceKind::OpenWebNinja.event_id(&local),
        raw.name.unwrap_or_default(),
        main_url,
    );
    if let Some(application_url) = application_url {
        event = event.with_application_url(application_url);
    }
    event
        .with_organizer(raw.publisher.unwrap_or_default())
        .with_contact(contact)
        .with_description(description)
        .with_dates(raw.date_human_readable, start_date, end_date)
        .with_place(location, venue_name)
        .with_images(images)
        .with_details(details)
}

fn convert_all(
    records: Vec<serde_json::Value>,
    offset: usize,
    now: DateTime<Utc>,
) -> Vec<CanonicalEvent> {
    decode_records::<RawOpenWebNinjaEvent>(SourceKind::OpenWebNinja, records)
        .into_iter()
        .map(|(index, raw)| convert_openwebninja(raw, offset + index, now))
        .collect()
}

/// Splits a reply into top and more slices.
///
/// Pre-split replies are taken as they are; a flat `events` list is split
/// locally.
pub fn pages_from_response(
    response: ProviderResponse,
    now: DateTime<Utc>,
) -> (Vec<CanonicalEvent>, Vec<CanonicalEvent>) {
    let data = response.data;
    if data.top20.is_empty() && data.more100.is_empty() {
        return split(convert_all(data.events, 0, now), MoreLimit::Next(MORE_LIMIT));
    }

    let offset = data.top20.len();
    let mut top = convert_all(data.top20, 0, now);
    let mut more = convert_all(data.more100, offset, now);
    if top.len() > TOP_SLICE {
        let overflow = top.split_off(TOP_SLICE);
        more.splice(0..0, overflow);
    }
    more.truncate(MORE_LIMIT);
    (top, more)
}

/// OpenWebNinja source.
pub struct OpenWebNinjaSource {
    client: Arc<dyn ProviderClient>,
}

impl OpenWebNinjaSource {
    /// Creates a source that queries through `client`.
    pub fn new(client: Arc<dyn ProviderClient>) -> Self {
        Self { client }
    }

    async fn try_search(
        &self,
        input: &SearchInput,
        now: DateTime<Utc>,
    ) -> ProviderResult<(Vec<CanonicalEvent>, Vec<CanonicalEvent>)> {
        let request = ProviderRequest::new(SourceKind::OpenWebNinja)
            .with_subject(input.industry(), input.topic());
        let response = fetch(self.client.as_ref(), &request).await?;
        Ok(pages_from_response(response, now))
    }
}

impl EventSource for OpenWebNinjaSource {
    fn kind(&self) -> SourceKind {
        SourceKind::OpenWebNinja
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::ScriptedClient;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn converts_venue_contact_and_ticket_link() {
        let raw = serde_json::from_value(json!({
            "event_id": "L2F1dGhvcml0eS9ob3Jpem9u",
            "name": "Cloud Native Day",
            "link": "https://cloudnative.example/day",
            "start_time": "2030-06-12 09:00:00",
            "end_time": "2030-06-12 18:00:00",
            "date_human_readable": "Thu, Jun 12",
            "publisher": "cloudnative.example",
            "ticket_links": [{ "source": "Eventbrite", "link": "https://eventbrite.example/cnd" }],
            "venue": {
                "name": "Convention Hall",
                "phone_number": "+1 206-555-0199",
                "website": "https://hall.example",
                "city": "Seattle",
                "state": "WA",
                "country": "US"
            },
            "tags": ["cloud", "kubernetes"]
        }))
        .unwrap();
        let event = convert_openwebninja(raw, 0, now());

        assert_eq!(event.id, "own-L2F1dGhvcml0eS9ob3Jpem9u");
        assert!(event.verified_apply_link);
        assert_eq!(event.application_url.as_deref(), Some("https://eventbrite.example/cnd"));
        assert_eq!(event.organizer, "cloudnative.example");
        assert_eq!(event.location.as_deref(), Some("Seattle, WA, US"));
        assert_eq!(event.venue.as_deref(), Some("Convention Hall"));
        assert_eq!(
            event.contact.as_deref(),
            Some("Phone: +1 206-555-0199 | Website: https://hall.example")
        );
        assert_eq!(event.start_date.as_deref(), Some("2030-06-12 09:00:00"));
        assert_eq!(event.date.as_deref(), Some("Thu, Jun 12"));
        assert_eq!(event.event_details.unwrap().topics, vec!["cloud", "kubernetes"]);
    }

    #[test]
    fn virtual_event_without_links() {
        let raw = serde_json::from_value(json!({
            "event_id": "abc",
            "name": "Online Workshop",
            "is_virtual": true
        }))
        .unwrap();
        let event = convert_openwebninja(raw, 0, now());

        assert_eq!(event.location.as_deref(), Some(ONLINE_EVENT));
        assert!(event.main_url.starts_with("https://www.google.com/search?ibp=htl;events"));
        assert!(event.application_url.is_none());
        assert_eq!(event.event_details.unwrap().format.as_deref(), Some("Virtual"));
    }

    #[test]
    fn null_links_tags_and_flag_keep_the_record() {
        let raw = serde_json::from_value(json!({
            "event_id": "n",
            "name": "Nulls",
            "link": "https://nulls.example",
            "is_virtual": null,
            "ticket_links": null,
            "info_links": [{ "source": "Site", "link": "https://nulls.example/info" }],
            "tags": null
        }))
        .unwrap();
        let event = convert_openwebninja(raw, 0, now());

        assert_eq!(event.id, "own-n");
        assert_eq!(event.application_url.as_deref(), Some("https://nulls.example/info"));
        assert_ne!(event.location.as_deref(), Some(ONLINE_EVENT));
        assert!(event.event_details.is_none());
    }

    mod pages {
        use super::*;

        fn records(prefix: &str, n: usize) -> Vec<serde_json::Value> {
            (0..n)
                .map(|i| json!({ "name": format!("{} {}", prefix, i) }))
                .collect()
        }

        #[test]
        fn pre_split_reply_is_kept() {
            let response = ProviderResponse::with_pages(records("top", 20), records("more", 100));
            let (top, more) = pages_from_response(response, now());
            assert_eq!(top.len(), 20);
            assert_eq!(more.len(), 100);
            assert_eq!(more[0].id, "own-20");
        }

        #[test]
        fn flat_reply_is_split_locally() {
            let response = ProviderResponse::with_events(records("e", 45));
            let (top, more) = pages_from_response(response, now());
            assert_eq!(top.len(), 20);
            assert_eq!(more.len(), 25);
        }

        #[test]
        fn oversized_top_spills_into_more() {
            let response = ProviderResponse::with_pages(records("top", 25), records("more", 100));
            let (top, more) = pages_from_response(response, now());
            assert_eq!(top.len(), 20);
            assert_eq!(more.len(), 100);
            assert_eq!(more[0].name, "top 20");
        }
    }

    #[tokio::test]
    async fn search_sends_combined_request() {
        let client = Arc::new(
            ScriptedClient::new().reply(Ok(ProviderResponse::with_pages(
                vec![json!({ "event_id": "1", "name": "One" })],
                vec![],
            ))),
        );
        let result = OpenWebNinjaSource::new(client.clone())
            .search_at(&SearchInput::new("AI", "Technology"), now())
            .await;

        assert!(result.success);
        assert_eq!(result.top.len(), 1);
        let requests = client.requests();
        assert_eq!(requests[0].topic.as_deref(), Some("AI"));
        assert_eq!(requests[0].industry.as_deref(), Some("Technology"));
        assert!(requests[0].limit.is_none());
    }
}
