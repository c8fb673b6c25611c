//! Eventbrite adapter.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use eventscout_core::{
    CanonicalEvent, ContactParts, EventDetails, EventImage, ONLINE_EVENT, Pricing, SearchInput,
    SourceKind, SyntheticSchedule, first_non_blank, join_location, resolve_url, strip_html,
};

use crate::client::{BoxFuture, ProviderClient};
use crate::error::ProviderResult;
use crate::source::{EventSource, MoreLimit, PartialResult, decode_records, fetch, split};
use crate::wire::ProviderRequest;

use super::{RawId, local_id};

/// Number of records requested per query.
pub const REQUEST_LIMIT: usize = 120;

/// Eventbrite text fields come either as a plain string or as
/// `{ "text": ..., "html": ... }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RichText {
    Plain(String),
    Rich {
        text: Option<String>,
        html: Option<String>,
    },
}

impl RichText {
    /// Returns the plain text, stripping markup if only HTML is present.
    pub fn to_plain(&self) -> Option<String> {
        match self {
            Self::Plain(s) => first_non_blank([Some(s.as_str())]),
            Self::Rich { text, html } => first_non_blank([text.as_deref()])
                .or_else(|| html.as_deref().map(strip_html))
                .filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEventbriteEvent {
    pub id: Option<RawId>,
    pub name: Option<RichText>,
    pub description: Option<RichText>,
    pub summary: Option<String>,
    pub url: Option<String>,
    pub start: Option<RawMoment>,
    pub end: Option<RawMoment>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub online_event: bool,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub is_free: bool,
    pub capacity: Option<u32>,
    pub logo: Option<RawLogo>,
    pub venue: Option<RawVenue>,
    pub organizer: Option<RawOrganizer>,
    pub format: Option<RawLabel>,
    pub category: Option<RawLabel>,
    pub ticket_availability: Option<RawTicketAvailability>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMoment {
    pub utc: Option<String>,
    pub local: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLogo {
    pub url: Option<String>,
    pub original: Option<RawLogoOriginal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLogoOriginal {
    pub url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVenue {
    pub name: Option<String>,
    pub address: Option<RawAddress>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAddress {
    pub address_1: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub localized_address_display: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOrganizer {
    pub name: Option<String>,
    pub website: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLabel {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTicketAvailability {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub is_free: bool,
    pub minimum_ticket_price: Option<RawPrice>,
    pub maximum_ticket_price: Option<RawPrice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPrice {
    pub major_value: Option<String>,
    pub currency: Option<String>,
    pub display: Option<String>,
}

impl RawPrice {
    fn amount(&self) -> Option<f64> {
        self.major_value.as_deref()?.trim().parse().ok()
    }
}

/// Converts one Eventbrite record.
pub fn convert_eventbrite(raw: RawEventbriteEvent, index: usize, now: DateTime<Utc>) -> CanonicalEvent {
    let local = local_id(raw.id.as_ref(), index);
    let main_url = resolve_url([raw.url.as_deref()], || {
        format!("https://www.eventbrite.com/e/{}", local)
    });

    let moment = |m: Option<&RawMoment>| {
        m.and_then(|m| first_non_blank([m.utc.as_deref(), m.local.as_deref()]))
    };
    let (start_date, end_date) = match moment(raw.start.as_ref()) {
        Some(start) => (Some(start), moment(raw.end.as_ref())),
        None => {
            let schedule = SyntheticSchedule::for_index(index, now);
            (Some(schedule.start_string()), Some(schedule.end_string()))
        }
    };

    let (location, venue) = if raw.online_event {
        (Some(ONLINE_EVENT.to_string()), Some(ONLINE_EVENT.to_string()))
    } else {
        let venue = raw.venue.as_ref();
        let address = venue.and_then(|v| v.address.as_ref());
        let location = address.and_then(|a| {
            first_non_blank([a.localized_address_display.as_deref()]).or_else(|| {
                join_location([
                    a.address_1.as_deref(),
                    a.city.as_deref(),
                    a.region.as_deref(),
                    a.country.as_deref(),
                ])
            })
        });
        (location, venue.and_then(|v| first_non_blank([v.name.as_deref()])))
    };

    let description = raw
        .description
        .as_ref()
        .and_then(RichText::to_plain)
        .or_else(|| first_non_blank([raw.summary.as_deref()]));

    let organizer = raw.organizer.as_ref();
    let organizer_name = organizer.and_then(|o| first_non_blank([o.name.as_deref()]));
    let contact = ContactParts::new()
        .website(organizer.and_then(|o| first_non_blank([o.website.as_deref(), o.url.as_deref()])))
        .organizer(organizer_name.clone())
        .mine(description.clone())
        .build();

    let images = raw
        .logo
        .as_ref()
        .and_then(|logo| {
            let original = logo.original.as_ref();
            let url = first_non_blank([original.and_then(|o| o.url.as_deref()), logo.url.as_deref()])?;
            Some(EventImage::new(url).with_size(
                original.and_then(|o| o.width),
                original.and_then(|o| o.height),
            ))
        })
        .into_iter()
        .collect();

    let details = details(&raw);

    CanonicalEvent::new(
        SourceKind::Eventbrite,
        SourceKind::Eventbrite.event_id(&local),
        raw.name.as_ref().and_then(RichText::to_plain).unwrap_or_default(),
        main_url,
    )
    .with_organizer(organizer_name.unwrap_or_default())
    .with_contact(contact)
    .with_description(description)
    .with_dates(None, start_date, end_date)
    .with_place(location, venue)
    .with_images(images)
    .with_details(details)
}

fn details(raw: &RawEventbriteEvent) -> EventDetails {
    let availability = raw.ticket_availability.as_ref();
    let is_free = raw.is_free || availability.is_some_and(|a| a.is_free);
    let min = availability.and_then(|a| a.minimum_ticket_price.as_ref());
    let max = availability.and_then(|a| a.maximum_ticket_price.as_ref());

    let pricing = if min.is_some() || max.is_some() || is_free {
        Some(Pricing {
            min: min.and_then(RawPrice::amount),
            max: max.and_then(RawPrice::amount),
            currency: min.or(max).and_then(|p| p.currency.clone()),
            is_free,
            display: if is_free {
                Some("Free".to_string())
            } else {
                min.and_then(|p| p.display.clone())
            },
        })
    } else {
        None
    };

    let mut features = Vec::new();
    if raw.online_event {
        features.push("Online event".to_string());
    }
    if is_free {
        features.push("Free".to_string());
    }

    EventDetails {
        pricing,
        capacity: raw.capacity,
        format: raw.format.as_ref().and_then(|f| first_non_blank([f.name.as_deref()])),
        topics: raw
            .category
            .as_ref()
            .and_then(|c| first_non_blank([c.name.as_deref()]))
            .into_iter()
            .collect(),
        features,
    }
}

/// Eventbrite source.
pub struct EventbriteSource {
    client: Arc<dyn ProviderClient>,
}

impl EventbriteSource {
    /// Creates a source that queries through `client`.
    pub fn new(client: Arc<dyn ProviderClient>) -> Self {
        Self { client }
    }

    async fn try_search(
        &self,
        input: &SearchInput,
        now: DateTime<Utc>,
    ) -> ProviderResult<(Vec<CanonicalEvent>, Vec<CanonicalEvent>)> {
        let request = ProviderRequest::new(SourceKind::Eventbrite)
            .with_subject(input.industry(), input.topic())
            .with_limit(REQUEST_LIMIT);
        let response = fetch(self.client.as_ref(), &request).await?;
        let events = decode_records::<RawEventbriteEvent>(SourceKind::Eventbrite, response.data.events)
            .into_iter()
            .map(|(index, raw)| convert_eventbrite(raw, index, now))
            .collect();
        Ok(split(events, MoreLimit::Next(100)))
    }
}

impl EventSource for EventbriteSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Eventbrite
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
    use crate::error::ProviderError;
    use crate::source::testing::ScriptedClient;
    use crate::wire::ProviderResponse;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    fn convert(value: serde_json::Value, index: usize) -> CanonicalEvent {
        convert_eventbrite(serde_json::from_value(value).unwrap(), index, now())
    }

    #[test]
    fn rich_text_name_and_venue_address() {
        let event = convert(
            json!({
                "id": "778899",
                "name": { "text": "Rust Nation", "html": "<b>Rust Nation</b>" },
                "description": { "html": "<p>Talks &amp; workshops</p>" },
                "url": "https://www.eventbrite.com/e/rust-nation-778899",
                "start": { "utc": "2030-02-14T09:00:00Z", "local": "2030-02-14T09:00:00" },
                "end": { "utc": "2030-02-15T17:00:00Z" },
                "capacity": 400,
                "venue": {
                    "name": "The Brewery",
                    "address": { "address_1": "52 Chiswell St", "city": "London", "region": "London", "country": "GB" }
                },
                "organizer": { "name": "Rust Nation Ltd", "website": "https://rustnation.example" },
                "format": { "name": "Conference" },
                "category": { "name": "Science & Technology" },
                "ticket_availability": {
                    "minimum_ticket_price": { "major_value": "99.00", "currency": "GBP", "display": "£99.00" },
                    "maximum_ticket_price": { "major_value": "499.00", "currency": "GBP" }
                }
            }),
            0,
        );

        assert_eq!(event.id, "eb-778899");
        assert_eq!(event.name, "Rust Nation");
        assert_eq!(event.description.as_deref(), Some("Talks &amp; workshops"));
        assert_eq!(event.organizer, "Rust Nation Ltd");
        assert_eq!(event.venue.as_deref(), Some("The Brewery"));
        assert_eq!(event.location.as_deref(), Some("52 Chiswell St, London, GB"));
        assert_eq!(
            event.contact.as_deref(),
            Some("Website: https://rustnation.example | Organizer: Rust Nation Ltd")
        );
        assert_eq!(event.start_date.as_deref(), Some("2030-02-14T09:00:00Z"));

        let details = event.event_details.unwrap();
        assert_eq!(details.capacity, Some(400));
        assert_eq!(details.format.as_deref(), Some("Conference"));
        assert_eq!(details.topics, vec!["Science & Technology"]);
        let pricing = details.pricing.unwrap();
        assert_eq!(pricing.min, Some(99.0));
        assert_eq!(pricing.max, Some(499.0));
        assert_eq!(pricing.currency.as_deref(), Some("GBP"));
        assert_eq!(pricing.display.as_deref(), Some("£99.00"));
    }

    #[test]
    fn online_event_uses_sentinel() {
        let event = convert(
            json!({ "id": 5, "name": "Webinar", "online_event": true, "is_free": true }),
            0,
        );
        assert_eq!(event.id, "eb-5");
        assert_eq!(event.location.as_deref(), Some(ONLINE_EVENT));
        let details = event.event_details.unwrap();
        assert_eq!(details.features, vec!["Online event", "Free"]);
        assert!(details.pricing.unwrap().is_free);
    }

    #[test]
    fn plain_name_placeholder_url_and_missing_dates() {
        let event = convert(json!({ "id": "e1", "name": "  Plain  ", "url": "" }), 0);
        assert_eq!(event.name, "Plain");
        assert_eq!(event.main_url, "https://www.eventbrite.com/e/e1");
        assert_eq!(event.start_date.as_deref(), Some("2030-01-08T00:00:00.000Z"));
        assert!(event.event_details.is_none());
        assert_eq!(event.images.unwrap()[0].fallback, Some(true));
    }

    #[test]
    fn null_flags_read_as_false() {
        let event = convert(
            json!({
                "id": "n",
                "name": "Nulls",
                "online_event": null,
                "is_free": null,
                "ticket_availability": { "is_free": null }
            }),
            0,
        );
        assert_eq!(event.id, "eb-n");
        assert_ne!(event.location.as_deref(), Some(ONLINE_EVENT));
        assert!(event.event_details.is_none());
    }

    #[tokio::test]
    async fn malformed_records_are_skipped() {
        let client = Arc::new(ScriptedClient::new().reply(Ok(ProviderResponse::with_events(vec![
            json!({ "id": "ok", "name": "Good" }),
            json!({ "id": "bad", "start": "not an object" }),
        ]))));
        let result = EventbriteSource::new(client.clone())
            .search_at(&SearchInput::new("AI", "Technology"), now())
            .await;

        assert!(result.success);
        assert_eq!(result.top.len(), 1);
        assert_eq!(client.requests()[0].limit, Some(120));
    }

    #[tokio::test]
    async fn transport_error_becomes_failed_result() {
        let client = Arc::new(ScriptedClient::new().reply(Err(ProviderError::server("502"))));
        let result = EventbriteSource::new(client)
            .search_at(&SearchInput::new("AI", "Technology"), now())
            .await;
        assert!(!result.success);
        assert!(result.top.is_empty() && result.more.is_empty());
    }
}
