//! SerpAPI Google Events adapter.
//!
//! Results come from a generic web search, so they have no stable ids and
//! their dates are loose strings like `"Dec 7"`. The topic is rewritten by
//! a [`TopicOptimizer`] before querying.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use eventscout_core::{
    CanonicalEvent, ContactParts, EventImage, SearchInput, SourceKind, SyntheticSchedule,
    first_non_blank, format_date, join_location, resolve_month_day, resolve_url,
};

use crate::client::{BoxFuture, ProviderClient, TopicOptimizer};
use crate::error::ProviderResult;
use crate::source::{EventSource, MoreLimit, PartialResult, decode_records, fetch, split};
use crate::wire::ProviderRequest;

/// Number of results requested per query.
pub const REQUEST_NUM: usize = 100;

/// Query used when topic and industry are both blank.
const DEFAULT_QUERY: &str = "events";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSerpEvent {
    pub title: Option<String>,
    pub date: Option<RawSerpDate>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub address: Vec<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub ticket_info: Vec<RawTicketInfo>,
    pub venue: Option<RawSerpVenue>,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSerpDate {
    pub start_date: Option<String>,
    pub when: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTicketInfo {
    pub source: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSerpVenue {
    pub name: Option<String>,
    pub link: Option<String>,
}

/// Converts one search result.
///
/// `now` anchors both month/day resolution and synthetic dates.
pub fn convert_serpapi(raw: RawSerpEvent, index: usize, now: DateTime<Utc>) -> CanonicalEvent {
    let title = raw.title.unwrap_or_default();
    let main_url = resolve_url(
        std::iter::once(raw.link.as_deref())
            .chain(raw.ticket_info.iter().map(|t| t.link.as_deref())),
        || {
            format!(
                "https://www.google.com/search?q={}",
                urlencoding::encode(title.trim())
            )
        },
    );

    let when = raw
        .date
        .as_ref()
        .and_then(|d| first_non_blank([d.when.as_deref()]));
    let resolved = raw
        .date
        .as_ref()
        .and_then(|d| d.start_date.as_deref())
        .and_then(|s| resolve_month_day(s, now.date_naive()));
    let (start_date, end_date) = match resolved {
        Some(day) => (Some(format_date(day)), None),
        None => {
            let schedule = SyntheticSchedule::for_index(index, now);
            (Some(schedule.start_string()), Some(schedule.end_string()))
        }
    };

    let venue_name = raw
        .venue
        .as_ref()
        .and_then(|v| first_non_blank([v.name.as_deref()]));
    let location = join_location(raw.address.iter().map(|a| Some(a.as_str())));

    let description = first_non_blank([raw.description.as_deref()]);
    let contact = ContactParts::new()
        .website(raw.venue.as_ref().and_then(|v| v.link.clone()))
        .mine(description.clone())
        .build();

    let images = first_non_blank([raw.image.as_deref(), raw.thumbnail.as_deref()])
        .map(EventImage::new)
        .into_iter()
        .collect();

    let organizer = raw
        .ticket_info
        .iter()
        .find_map(|t| first_non_blank([t.source.as_deref()]))
        .unwrap_or_default();

    CanonicalEvent::new(
        SourceKind::SerpApi,
        SourceKind::SerpApi.event_id(index),
        title,
        main_url,
    )
    .with_organizer(organizer)
    .with_contact(contact)
    .with_description(description)
    .with_dates(when, start_date, end_date)
    .with_place(location, venue_name)
    .with_images(images)
}

/// SerpAPI source.
pub struct SerpApiSource {
    client: Arc<dyn ProviderClient>,
    optimizer: Arc<dyn TopicOptimizer>,
}

impl SerpApiSource {
    /// Creates a source that rewrites topics through `optimizer`.
    pub fn new(client: Arc<dyn ProviderClient>, optimizer: Arc<dyn TopicOptimizer>) -> Self {
        Self { client, optimizer }
    }

    async fn query_text(&self, input: &SearchInput) -> String {
        let optimized = match self.optimizer.optimize(input.topic(), input.industry()).await {
            Ok(q) => Some(q),
            Err(e) => {
                warn!(provider = %self.kind(), "topic optimizer failed, using raw topic: {}", e);
                None
            }
        };
        let query = first_non_blank([optimized.as_deref(), Some(input.topic()), Some(input.industry())])
            .unwrap_or_else(|| DEFAULT_QUERY.to_string());
        debug!(query = %query, "serpapi query");
        query
    }

    async fn try_search(
        &self,
        input: &SearchInput,
        now: DateTime<Utc>,
    ) -> ProviderResult<(Vec<CanonicalEvent>, Vec<CanonicalEvent>)> {
        let query = self.query_text(input).await;
        let request = ProviderRequest::new(SourceKind::SerpApi)
            .with_subject(input.industry(), input.topic())
            .with_query(query)
            .with_num(REQUEST_NUM);
        let response = fetch(self.client.as_ref(), &request).await?;
        let events = decode_records::<RawSerpEvent>(SourceKind::SerpApi, response.data.events)
            .into_iter()
            .map(|(index, raw)| convert_serpapi(raw, index, now))
            .collect();
        Ok(split(events, MoreLimit::Rest))
    }
}

impl EventSource for SerpApiSource {
    fn kind(&self) -> SourceKind {
        SourceKind::SerpApi
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
    use crate::client::{PassthroughTopicOptimizer, UnavailableClient};
    use crate::error::ProviderError;
    use crate::source::testing::ScriptedClient;
    use crate::wire::ProviderResponse;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 11, 20, 0, 0, 0).unwrap()
    }

    mod convert {
        use super::*;

        #[test]
        fn month_day_resolves_to_next_occurrence() {
            let raw = serde_json::from_value(json!({
                "title": "AI Meetup",
                "date": { "start_date": "Jan 15", "when": "Wed, Jan 15, 6 – 9 PM" },
                "address": ["Tech Hub, 1 Main St", "Austin, TX"],
                "link": "https://meetup.example/ai",
                "venue": { "name": "Tech Hub", "link": "https://techhub.example" },
                "ticket_info": [{ "source": "Meetup", "link": "https://meetup.example/ai/rsvp" }],
                "thumbnail": "https://img.example/t.jpg"
            }))
            .unwrap();
            let event = convert_serpapi(raw, 3, now());

            assert_eq!(event.id, "serp-3");
            assert_eq!(event.start_date.as_deref(), Some("2031-01-15"));
            assert_eq!(event.date.as_deref(), Some("Wed, Jan 15, 6 – 9 PM"));
            assert!(event.end_date.is_none());
            assert_eq!(event.location.as_deref(), Some("Tech Hub, 1 Main St, Austin, TX"));
            assert_eq!(event.venue.as_deref(), Some("Tech Hub"));
            assert_eq!(event.organizer, "Meetup");
            assert_eq!(event.contact.as_deref(), Some("Website: https://techhub.example"));
            assert!(!event.verified_apply_link);
            assert!(event.event_details.is_none());
        }

        #[test]
        fn unresolvable_date_gets_synthetic_schedule() {
            let raw = serde_json::from_value(json!({
                "title": "Mystery Event",
                "date": { "start_date": "Sometime soon" }
            }))
            .unwrap();
            let event = convert_serpapi(raw, 0, now());
            assert_eq!(event.start_date.as_deref(), Some("2030-11-27T00:00:00.000Z"));
            assert_eq!(event.end_date.as_deref(), Some("2030-11-29T00:00:00.000Z"));
        }

        #[test]
        fn null_address_and_ticket_info() {
            let raw = serde_json::from_value(json!({
                "title": "Null Lists",
                "link": "https://nulls.example",
                "address": null,
                "ticket_info": null
            }))
            .unwrap();
            let event = convert_serpapi(raw, 0, now());
            assert_eq!(event.name, "Null Lists");
            assert_eq!(event.main_url, "https://nulls.example");
            assert!(event.location.is_none());
        }

        #[test]
        fn missing_link_falls_back_to_search_url() {
            let raw = serde_json::from_value(json!({
                "title": "Data & AI Day",
                "ticket_info": [{ "link": "#" }]
            }))
            .unwrap();
            let event = convert_serpapi(raw, 0, now());
            assert_eq!(
                event.main_url,
                "https://www.google.com/search?q=Data%20%26%20AI%20Day"
            );
        }
    }

    mod search {
        use super::*;

        fn records(n: usize) -> Vec<serde_json::Value> {
            (0..n).map(|i| json!({ "title": format!("Result {}", i) })).collect()
        }

        #[tokio::test]
        async fn optimized_topic_and_all_remaining_in_more() {
            let client = Arc::new(ScriptedClient::new().reply(Ok(ProviderResponse::with_events(records(150)))));
            let source = SerpApiSource::new(client.clone(), Arc::new(PassthroughTopicOptimizer));
            let result = source
                .search_at(&SearchInput::new("  machine   learning ", "Technology"), now())
                .await;

            assert_eq!(result.top.len(), 20);
            assert_eq!(result.more.len(), 130);
            let requests = client.requests();
            assert_eq!(requests[0].q.as_deref(), Some("machine learning"));
            assert_eq!(requests[0].num, Some(100));
        }

        #[tokio::test]
        async fn optimizer_failure_uses_raw_topic() {
            let client = Arc::new(ScriptedClient::new().reply(Ok(ProviderResponse::with_events(records(1)))));
            let optimizer = Arc::new(UnavailableClient::new(ProviderError::network("down")));
            let source = SerpApiSource::new(client.clone(), optimizer);
            let result = source.search_at(&SearchInput::new("AI", "Technology"), now()).await;

            assert!(result.success);
            assert_eq!(client.requests()[0].q.as_deref(), Some("AI"));
        }
    }
}
