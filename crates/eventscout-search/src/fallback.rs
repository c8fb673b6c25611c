//! Deterministic synthetic results used when no provider returns anything.
//!
//! The generated set depends only on the search input and the calendar day
//! it is anchored on: the same input on the same day always yields the same
//! events. Every field that varies is picked from a fixed table using
//! `seed = len(topic) + len(industry)` combined with the item index.

use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use tracing::info;

use eventscout_core::{
    CanonicalEvent, EventDetails, ONLINE_EVENT, SearchInput, SourceKind, format_timestamp,
};

use crate::config::DEFAULT_FALLBACK_LATENCY;

/// Number of events with a verified application link.
pub const VERIFIED_COUNT: usize = 20;

/// Number of events without one.
pub const UNVERIFIED_COUNT: usize = 100;

const FALLBACK_BASE_URL: &str = "https://eventscout.example/opportunities";

const ORGANIZERS: [&str; 8] = [
    "TechForward Events",
    "Global Industry Summit Group",
    "Innovation Collective",
    "Future Leaders Network",
    "Open Stage Conferences",
    "Speaker Circuit",
    "Horizon Expo Partners",
    "Community Tech Alliance",
];

const LOCATIONS: [&str; 10] = [
    "San Francisco, CA, USA",
    "New York, NY, USA",
    "London, United Kingdom",
    "Berlin, Germany",
    "Austin, TX, USA",
    "Toronto, Canada",
    "Singapore",
    "Amsterdam, Netherlands",
    "Sydney, Australia",
    ONLINE_EVENT,
];

const FORMATS: [&str; 6] = [
    "Conference",
    "Summit",
    "Workshop",
    "Meetup",
    "Panel",
    "Expo",
];

const THEMES: [&str; 10] = [
    "Innovation",
    "Leaders",
    "Future",
    "Builders",
    "Strategy",
    "Frontiers",
    "Practitioners",
    "Insights",
    "Connect",
    "Horizons",
];

/// The two synthetic buckets.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackData {
    /// Events with a verified application link.
    pub verified: Vec<CanonicalEvent>,
    /// Events pointing at a general event page only.
    pub unverified: Vec<CanonicalEvent>,
}

/// Produces [`FallbackData`] for a search input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackGenerator {
    latency: Duration,
}

impl Default for FallbackGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_LATENCY)
    }
}

impl FallbackGenerator {
    /// Creates a generator that waits `latency` before answering.
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// Returns the seed derived from the input.
    pub fn seed(input: &SearchInput) -> usize {
        input.topic().chars().count() + input.industry().chars().count()
    }

    /// Generates the synthetic buckets anchored on `today`.
    pub fn generate(&self, input: &SearchInput, today: NaiveDate) -> FallbackData {
        let seed = Self::seed(input);
        let subject = subject(input);

        let verified = (0..VERIFIED_COUNT)
            .map(|i| synthetic_event(input, &subject, seed, i, true, today))
            .collect();
        let unverified = (0..UNVERIFIED_COUNT)
            .map(|i| synthetic_event(input, &subject, seed, i, false, today))
            .collect();

        FallbackData {
            verified,
            unverified,
        }
    }

    /// Waits for the configured latency, then generates.
    pub async fn produce(&self, input: &SearchInput, today: NaiveDate) -> FallbackData {
        tokio::time::sleep(self.latency).await;
        let data = self.generate(input, today);
        info!(
            verified = data.verified.len(),
            unverified = data.unverified.len(),
            "generated fallback events"
        );
        data
    }
}

/// The text embedded in every event name.
fn subject(input: &SearchInput) -> String {
    [input.topic(), input.industry()]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or("Industry")
        .to_string()
}

fn pick<'a>(table: &[&'a str], seed: usize, index: usize, stride: usize) -> &'a str {
    table[(seed + index * stride) % table.len()]
}

fn synthetic_event(
    input: &SearchInput,
    subject: &str,
    seed: usize,
    index: usize,
    verified: bool,
    today: NaiveDate,
) -> CanonicalEvent {
    let kind = if verified { "v" } else { "u" };
    let local = format!("{}{}", kind, index + 1);
    let main_url = format!("{}/{}", FALLBACK_BASE_URL, local);

    let format = pick(&FORMATS, seed, index, 1);
    let theme = pick(&THEMES, seed, index, 3);
    let organizer = pick(&ORGANIZERS, seed, index, 5);
    let location = pick(&LOCATIONS, seed, index, 7);

    // Verified events are spread weekly, the rest every few days.
    let spacing = if verified { 7 } else { 3 };
    let offset = (index as u64 + 1) * spacing + (seed as u64 % 5);
    let start_day = today + chrono::Days::new(offset);
    let start = start_day.and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default());
    let end = start + chrono::Duration::days(1) + chrono::Duration::hours(8);

    let mut topics = vec![subject.to_string()];
    if !input.industry().is_empty() && input.industry() != subject {
        topics.push(input.industry().to_string());
    }

    let mut event = CanonicalEvent::new(
        SourceKind::Fallback,
        SourceKind::Fallback.event_id(&local),
        format!("{} {} {}", subject, theme, format),
        main_url.clone(),
    )
    .with_organizer(organizer)
    .with_contact(Some(format!(
        "Email: speakers@eventscout.example | Organizer: {}",
        organizer
    )))
    .with_description(Some(format!(
        "A {} for {} professionals. Speaker applications are open.",
        format.to_lowercase(),
        subject
    )))
    .with_dates(
        None,
        Some(format_timestamp(start.and_utc())),
        Some(format_timestamp(end.and_utc())),
    )
    .with_place(Some(location.to_string()), None)
    .with_images(Vec::new())
    .with_details(EventDetails {
        format: Some(format.to_string()),
        topics,
        ..Default::default()
    });

    event.verified_apply_link = verified;
    if verified {
        event = event.with_application_url(format!("{}/apply", main_url));
    }
    event
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventscout_core::parse_event_date;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()
    }

    #[test]
    fn exact_counts_and_verification() {
        let data = FallbackGenerator::default().generate(&SearchInput::new("AI", "Technology"), today());
        assert_eq!(data.verified.len(), 20);
        assert_eq!(data.unverified.len(), 100);
        assert!(data.verified.iter().all(|e| e.verified_apply_link && e.application_url.is_some()));
        assert!(data.unverified.iter().all(|e| !e.verified_apply_link && e.application_url.is_none()));
    }

    #[test]
    fn names_embed_topic() {
        let data = FallbackGenerator::default().generate(&SearchInput::new("AI", "Technology"), today());
        assert!(data.verified.iter().chain(&data.unverified).all(|e| e.name.contains("AI")));
    }

    #[test]
    fn reproducible_for_identical_input() {
        let generator = FallbackGenerator::default();
        let input = SearchInput::new("Rust", "Software");
        assert_eq!(generator.generate(&input, today()), generator.generate(&input, today()));
    }

    #[test]
    fn seed_changes_output() {
        let generator = FallbackGenerator::default();
        let a = generator.generate(&SearchInput::new("AI", "Tech"), today());
        let b = generator.generate(&SearchInput::new("AI", "Technology"), today());
        assert_eq!(FallbackGenerator::seed(&SearchInput::new("AI", "Tech")), 6);
        assert_ne!(a.verified[0].organizer, b.verified[0].organizer);
    }

    #[test]
    fn blank_topic_uses_industry() {
        let data = FallbackGenerator::default().generate(&SearchInput::new(" ", "Healthcare"), today());
        assert!(data.verified[0].name.starts_with("Healthcare "));

        let data = FallbackGenerator::default().generate(&SearchInput::default(), today());
        assert!(data.verified[0].name.starts_with("Industry "));
    }

    #[test]
    fn dates_are_future_and_ascending() {
        let data = FallbackGenerator::default().generate(&SearchInput::new("AI", "Technology"), today());
        for bucket in [&data.verified, &data.unverified] {
            let dates: Vec<_> = bucket
                .iter()
                .map(|e| parse_event_date(e.start_date.as_deref().unwrap()).unwrap())
                .collect();
            assert!(dates.windows(2).all(|w| w[0] <= w[1]));
            assert!(dates[0].date() > today());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn produce_waits_for_latency() {
        let generator = FallbackGenerator::new(Duration::from_millis(400));
        let started = tokio::time::Instant::now();
        let data = generator.produce(&SearchInput::new("AI", ""), today()).await;
        assert!(started.elapsed() >= Duration::from_millis(400));
        assert_eq!(data.verified.len(), 20);
    }
}
