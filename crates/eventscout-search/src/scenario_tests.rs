//! End-to-end scenarios for the full search.
//!
//! These tests drive the real adapters from `all_sources` through a fake
//! transport that answers each provider with records in that provider's own
//! wire shape.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};

use eventscout_core::{CanonicalEvent, ExpiryPolicy, SearchInput, SourceKind, parse_event_date};
use eventscout_providers::{
    BoxFuture, PassthroughTopicOptimizer, ProviderClient, ProviderError, ProviderRequest,
    ProviderResponse, ProviderResult, all_sources,
};

use crate::config::SearchConfig;
use crate::search::{EventSearch, SearchResults};

/// How the fake backend answers one provider.
#[derive(Clone)]
enum Reply {
    Events(Vec<Value>),
    Down,
}

/// Fake backend keyed by provider; unlisted providers answer with no events.
#[derive(Default)]
struct FakeBackend {
    replies: Vec<(SourceKind, Reply)>,
}

impl FakeBackend {
    fn with(mut self, source: SourceKind, reply: Reply) -> Self {
        self.replies.retain(|(s, _)| *s != source);
        self.replies.push((source, reply));
        self
    }

    fn everything_down() -> Self {
        SourceKind::PROVIDERS
            .into_iter()
            .fold(Self::default(), |backend, source| backend.with(source, Reply::Down))
    }

    fn five_each() -> Self {
        SourceKind::PROVIDERS
            .into_iter()
            .fold(Self::default(), |backend, source| {
                let records = (0..5).map(|i| record(source, i)).collect();
                backend.with(source, Reply::Events(records))
            })
    }
}

impl ProviderClient for FakeBackend {
    fn query<'a>(
        &'a self,
        request: &'a ProviderRequest,
    ) -> BoxFuture<'a, ProviderResult<ProviderResponse>> {
        Box::pin(async move {
            match self.replies.iter().find(|(s, _)| *s == request.source) {
                Some((_, Reply::Events(records))) => Ok(ProviderResponse::with_events(records.clone())),
                Some((_, Reply::Down)) => Err(ProviderError::network("connection refused")),
                None => Ok(ProviderResponse::with_events(Vec::new())),
            }
        })
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
}

/// An ISO timestamp `offset` days into February 2030.
fn iso(offset: usize) -> String {
    format!("2030-02-{:02}T09:00:00Z", offset + 1)
}

/// One record for `source`, in that provider's wire shape.
fn record(source: SourceKind, i: usize) -> Value {
    let name = format!("{} Event {}", source.as_str(), i);
    // Spread providers over different days so the merged order interleaves.
    let day = i * 5 + SourceKind::PROVIDERS.iter().position(|s| *s == source).unwrap_or(0);
    match source {
        SourceKind::Ticketmaster => json!({
            "id": format!("t{}", i),
            "name": name,
            "url": format!("https://ticketmaster.example/{}", i),
            "dates": { "start": { "dateTime": iso(day) } }
        }),
        SourceKind::Eventbrite => json!({
            "id": format!("e{}", i),
            "name": { "text": name },
            "url": format!("https://eventbrite.example/{}", i),
            "start": { "utc": iso(day) }
        }),
        SourceKind::CallForSpeakers => json!({
            "id": format!("c{}", i),
            "title": name,
            "website": format!("https://cfs.example/{}", i),
            "startDate": iso(day)
        }),
        SourceKind::Pretalx => json!({
            "slug": format!("conf{}", i),
            "name": { "en": name },
            "url": format!("https://pretalx.example/conf{}/", i),
            "date_from": format!("2030-02-{:02}", day + 1)
        }),
        SourceKind::SerpApi => json!({
            "title": name,
            "link": format!("https://serp.example/{}", i),
            "date": { "start_date": format!("Feb {}", day + 1) }
        }),
        SourceKind::OpenWebNinja | SourceKind::Fallback => json!({
            "event_id": format!("w{}", i),
            "name": name,
            "link": format!("https://own.example/{}", i),
            "start_time_utc": iso(day)
        }),
    }
}

fn search_over(backend: FakeBackend, config: SearchConfig) -> EventSearch {
    let sources = all_sources(Arc::new(backend), Arc::new(PassthroughTopicOptimizer));
    EventSearch::new(sources, config)
}

fn instant_config() -> SearchConfig {
    SearchConfig::default().with_fallback_latency(std::time::Duration::ZERO)
}

fn all_events(results: &SearchResults) -> Vec<&CanonicalEvent> {
    results.top20.iter().chain(&results.more100).collect()
}

fn assert_sorted(events: &[CanonicalEvent]) {
    let instants: Vec<_> = events
        .iter()
        .map(|e| {
            parse_event_date(e.effective_date().unwrap())
                .unwrap()
                .to_utc_datetime()
        })
        .collect();
    assert!(
        instants.windows(2).all(|w| w[0] <= w[1]),
        "bucket not sorted: {:?}",
        instants
    );
}

#[tokio::test]
async fn five_events_per_provider_fill_top_and_spill_into_more() {
    let search = search_over(FakeBackend::five_each(), instant_config());
    let results = search.search_at(&SearchInput::new("AI", "Technology"), now()).await;

    assert!(!results.used_fallback);
    assert_eq!(results.top20.len(), 20);
    assert_eq!(results.more100.len(), 10);
    assert_sorted(&results.top20);
    assert_sorted(&results.more100);

    // Every top event starts no later than any more event.
    let last_top = parse_event_date(results.top20[19].effective_date().unwrap()).unwrap();
    let first_more = parse_event_date(results.more100[0].effective_date().unwrap()).unwrap();
    assert!(last_top.to_utc_datetime() <= first_more.to_utc_datetime());

    assert_eq!(results.outcomes.len(), 6);
    assert!(results.outcomes.iter().all(|o| o.success && o.event_count == 5));
}

#[tokio::test]
async fn failing_provider_does_not_block_others() {
    let backend = FakeBackend::five_each().with(SourceKind::Eventbrite, Reply::Down);
    let search = search_over(backend, instant_config());
    let results = search.search_at(&SearchInput::new("AI", "Technology"), now()).await;

    assert!(!results.used_fallback);
    let events = all_events(&results);
    assert_eq!(events.len(), 25);
    assert!(events.iter().all(|e| !e.id.starts_with("eb-")));

    let prefixes: HashSet<_> = events
        .iter()
        .filter_map(|e| e.id.split('-').next())
        .collect();
    assert_eq!(prefixes, HashSet::from(["tm", "cfs", "pretalx", "serp", "own"]));

    let eventbrite = results
        .outcomes
        .iter()
        .find(|o| o.source == SourceKind::Eventbrite)
        .unwrap();
    assert!(!eventbrite.success);
    assert!(eventbrite.message.as_deref().unwrap().contains("connection refused"));
}

#[tokio::test(start_paused = true)]
async fn total_failure_returns_reproducible_fallback() {
    let search = search_over(FakeBackend::everything_down(), SearchConfig::default());
    let input = SearchInput::new("AI", "Technology");

    let started = tokio::time::Instant::now();
    let first = search.search_at(&input, now()).await;
    assert!(started.elapsed() >= std::time::Duration::from_millis(400));

    assert!(first.used_fallback);
    assert_eq!(first.top20.len(), 20);
    assert_eq!(first.more100.len(), 100);
    assert!(all_events(&first).iter().all(|e| e.name.contains("AI")));
    assert!(first.top20.iter().all(|e| e.verified_apply_link));
    assert!(first.outcomes.iter().all(|o| !o.success));

    let second = search.search_at(&input, now()).await;
    assert_eq!(first.top20, second.top20);
    assert_eq!(first.more100, second.more100);
}

#[tokio::test]
async fn all_empty_replies_also_fall_back() {
    let search = search_over(FakeBackend::default(), instant_config());
    let results = search.search_at(&SearchInput::new("Rust", ""), now()).await;

    assert!(results.used_fallback);
    assert_eq!(results.len(), 120);
    assert!(results.outcomes.iter().all(|o| o.success && o.event_count == 0));
}

#[tokio::test]
async fn same_event_from_two_providers_appears_once() {
    let backend = FakeBackend::default()
        .with(
            SourceKind::Ticketmaster,
            Reply::Events(vec![json!({
                "id": "tm1",
                "name": "AI Summit",
                "url": "https://ticketmaster.example/tm1",
                "dates": { "start": { "dateTime": "2030-03-01T09:00:00Z" } }
            })]),
        )
        .with(
            SourceKind::Eventbrite,
            Reply::Events(vec![json!({
                "id": "eb1",
                "name": { "text": "ai summit " },
                "url": "https://eventbrite.example/eb1",
                "start": { "utc": "2030-03-01T09:00:00Z" }
            })]),
        );
    let search = search_over(backend, instant_config());
    let results = search.search_at(&SearchInput::new("AI", "Technology"), now()).await;

    let summits: Vec<_> = all_events(&results)
        .into_iter()
        .filter(|e| e.name.trim().eq_ignore_ascii_case("ai summit"))
        .collect();
    assert_eq!(summits.len(), 1);
    assert_eq!(summits[0].id, "tm-tm1");
}

#[tokio::test]
async fn more_bucket_drops_events_already_in_top() {
    let mut cfs: Vec<Value> = (0..20).map(|i| record(SourceKind::CallForSpeakers, i)).collect();
    cfs.push(json!({ "id": "dup", "title": "AI Summit", "startDate": "2030-03-01T09:00:00Z" }));
    let backend = FakeBackend::default()
        .with(SourceKind::CallForSpeakers, Reply::Events(cfs))
        .with(
            SourceKind::Ticketmaster,
            Reply::Events(vec![json!({
                "id": "tm1",
                "name": "AI Summit",
                "dates": { "start": { "dateTime": "2030-03-01T09:00:00Z" } }
            })]),
        );
    let config = instant_config().with_sizes(50, 100);
    let results = search_over(backend, config)
        .search_at(&SearchInput::new("AI", "Technology"), now())
        .await;

    assert_eq!(results.top20.len(), 21);
    assert!(results.top20.iter().any(|e| e.id == "tm-tm1"));
    assert!(results.more100.is_empty());
}

#[tokio::test]
async fn expired_events_are_dropped_when_enabled() {
    let backend = FakeBackend::default().with(
        SourceKind::CallForSpeakers,
        Reply::Events(vec![
            json!({ "id": "old", "title": "Last Year", "startDate": "2029-06-01T09:00:00Z" }),
            json!({ "id": "new", "title": "Next Month", "startDate": "2030-02-01T09:00:00Z" }),
        ]),
    );
    let config = SearchConfig::new(ExpiryPolicy::Enabled).with_fallback_latency(std::time::Duration::ZERO);
    let search = search_over(backend, config);
    let results = search.search_at(&SearchInput::new("AI", ""), now()).await;

    assert!(!results.used_fallback);
    let ids: Vec<_> = all_events(&results).iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["cfs-new"]);
}

#[tokio::test]
async fn paging_more_reveals_every_event_once() {
    let search = search_over(FakeBackend::everything_down(), instant_config());
    let results = search.search_at(&SearchInput::new("AI", "Technology"), now()).await;

    let mut pager = results.more_pager();
    let mut seen = HashSet::new();
    for number in 1..=5 {
        let page = pager.load_more();
        assert_eq!(page.number, number);
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.has_more, number < 5);
        for event in page.items {
            assert!(seen.insert(event.id.clone()), "duplicate {}", event.id);
        }
    }
    assert!(pager.load_more().items.is_empty());
    assert_eq!(seen.len(), results.more100.len());
}

#[tokio::test]
async fn results_serialize_in_camel_case() {
    let search = search_over(FakeBackend::five_each(), instant_config());
    let results = search.search_at(&SearchInput::new("AI", "Technology"), now()).await;

    let value = serde_json::to_value(&results).unwrap();
    assert_eq!(value["top20"].as_array().unwrap().len(), 20);
    assert_eq!(value["more100"].as_array().unwrap().len(), 10);
    assert_eq!(value["usedFallback"], json!(false));
    assert_eq!(value["outcomes"][0]["source"], json!("ticketmaster"));
    assert_eq!(value["outcomes"][0]["eventCount"], json!(5));
}
