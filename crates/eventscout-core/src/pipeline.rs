//! Post-processing applied to each merged result bucket.
//!
//! Three order-dependent stages run on a bucket:
//! 1. Expiry filter (gated by [`ExpiryPolicy`])
//! 2. Deduplication on [`CanonicalEvent::dedup_key`], first occurrence wins
//! 3. Stable ascending sort by effective date
//!
//! Events with a missing or unparsable date are never dropped: the expiry
//! filter keeps them and the sort places them after every dated event, in
//! the order they arrived.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::CanonicalEvent;
use crate::time::parse_event_date;

/// How far in the past an event may start before it counts as expired.
pub const DEFAULT_EXPIRY_GRACE: Duration = Duration::days(1);

/// Whether the expiry stage removes past events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryPolicy {
    /// Keep every event regardless of date.
    #[default]
    Disabled,
    /// Drop events whose effective date is older than `now - grace`.
    Enabled,
}

/// Returns true if `event` started before `cutoff`.
///
/// Events without a parsable effective date are never expired.
pub fn is_expired(event: &CanonicalEvent, cutoff: DateTime<Utc>) -> bool {
    event
        .effective_date()
        .and_then(parse_event_date)
        .is_some_and(|date| date.to_utc_datetime() < cutoff)
}

/// Removes events that started before `now - grace`.
pub fn filter_expired(
    events: Vec<CanonicalEvent>,
    now: DateTime<Utc>,
    grace: Duration,
) -> Vec<CanonicalEvent> {
    let cutoff = now - grace;
    let before = events.len();
    let kept: Vec<_> = events
        .into_iter()
        .filter(|e| !is_expired(e, cutoff))
        .collect();
    if kept.len() != before {
        debug!(removed = before - kept.len(), "Dropped expired events");
    }
    kept
}

/// Drops every event whose dedup key was already seen.
pub fn dedup(events: Vec<CanonicalEvent>) -> Vec<CanonicalEvent> {
    let mut seen = HashSet::with_capacity(events.len());
    events
        .into_iter()
        .filter(|e| seen.insert(e.dedup_key()))
        .collect()
}

/// Sorts events by effective date, ascending.
///
/// The sort is stable; undated or unparsable events go last.
pub fn sort_by_date(events: &mut [CanonicalEvent]) {
    events.sort_by_cached_key(|e| {
        let parsed = e
            .effective_date()
            .and_then(parse_event_date)
            .map(|d| d.to_utc_datetime());
        (parsed.is_none(), parsed)
    });
}

/// The three-stage bucket processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostProcessor {
    /// Whether the expiry stage is active.
    pub expiry: ExpiryPolicy,
    /// Grace period for the expiry stage.
    pub grace: Duration,
}

impl Default for PostProcessor {
    fn default() -> Self {
        Self {
            expiry: ExpiryPolicy::Disabled,
            grace: DEFAULT_EXPIRY_GRACE,
        }
    }
}

impl PostProcessor {
    /// Creates a processor with the given expiry policy.
    pub fn new(expiry: ExpiryPolicy) -> Self {
        Self {
            expiry,
            ..Default::default()
        }
    }

    /// Builder: set the expiry grace period.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Runs expiry, dedup and sort, then truncates to `limit` entries.
    pub fn process(
        &self,
        events: Vec<CanonicalEvent>,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Vec<CanonicalEvent> {
        let events = match self.expiry {
            ExpiryPolicy::Enabled => filter_expired(events, now, self.grace),
            ExpiryPolicy::Disabled => events,
        };
        let mut events = dedup(events);
        sort_by_date(&mut events);
        events.truncate(limit);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SourceKind;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap()
    }

    fn event(id: &str, name: &str, start: Option<&str>) -> CanonicalEvent {
        CanonicalEvent::new(SourceKind::Eventbrite, id, name, "https://example.com").with_dates(
            None,
            start.map(str::to_string),
            None,
        )
    }

    fn ids(events: &[CanonicalEvent]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    mod expiry {
        use super::*;

        #[test]
        fn removes_events_older_than_grace() {
            let events = vec![
                event("old", "Old", Some("2030-05-20")),
                event("yesterday", "Yesterday", Some("2030-05-31T13:00:00Z")),
                event("future", "Future", Some("2030-07-01")),
            ];
            let kept = filter_expired(events, now(), DEFAULT_EXPIRY_GRACE);
            assert_eq!(ids(&kept), vec!["yesterday", "future"]);
        }

        #[test]
        fn keeps_undated_and_unparsable() {
            let events = vec![event("none", "None", None), event("tba", "Tba", Some("TBA"))];
            let kept = filter_expired(events, now(), DEFAULT_EXPIRY_GRACE);
            assert_eq!(kept.len(), 2);
        }

        #[test]
        fn falls_back_to_date_field() {
            let e = CanonicalEvent::new(SourceKind::SerpApi, "d", "D", "https://x.io").with_dates(
                Some("2020-01-01".to_string()),
                None,
                None,
            );
            assert!(is_expired(&e, now()));
        }

        #[test]
        fn disabled_policy_keeps_past_events() {
            let events = vec![event("old", "Old", Some("2001-01-01"))];
            let kept = PostProcessor::default().process(events, now(), 20);
            assert_eq!(kept.len(), 1);

            let events = vec![event("old", "Old", Some("2001-01-01"))];
            let kept = PostProcessor::new(ExpiryPolicy::Enabled).process(events, now(), 20);
            assert!(kept.is_empty());
        }
    }

    mod deduplication {
        use super::*;

        #[test]
        fn first_occurrence_wins() {
            let events = vec![
                event("a", "AI Summit", Some("2030-07-01")),
                event("b", "  ai summit ", Some("2030-07-01")),
                event("c", "AI Summit", Some("2030-08-01")),
            ];
            let deduped = dedup(events);
            assert_eq!(ids(&deduped), vec!["a", "c"]);
        }

        #[test]
        fn undated_events_share_empty_date_key() {
            let events = vec![event("a", "Meetup", None), event("b", "meetup", None)];
            assert_eq!(dedup(events).len(), 1);
        }
    }

    mod sorting {
        use super::*;

        #[test]
        fn ascending_by_effective_date() {
            let mut events = vec![
                event("c", "C", Some("2030-09-01")),
                event("a", "A", Some("2030-07-01T08:00:00Z")),
                event("b", "B", Some("2030-07-01T09:00:00+00:00")),
            ];
            sort_by_date(&mut events);
            assert_eq!(ids(&events), vec!["a", "b", "c"]);
        }

        #[test]
        fn invalid_dates_go_last_in_arrival_order() {
            let mut events = vec![
                event("x", "X", Some("TBA")),
                event("b", "B", Some("2030-08-01")),
                event("y", "Y", None),
                event("a", "A", Some("2030-07-01")),
            ];
            sort_by_date(&mut events);
            assert_eq!(ids(&events), vec!["a", "b", "x", "y"]);
        }
    }

    #[test]
    fn process_truncates_after_sorting() {
        let events: Vec<_> = (0..30)
            .rev()
            .map(|i| {
                event(
                    &format!("e{}", i),
                    &format!("Event {}", i),
                    Some(&format!("2030-07-{:02}", i + 1)),
                )
            })
            .collect();
        let processed = PostProcessor::default().process(events, now(), 20);
        assert_eq!(processed.len(), 20);
        assert_eq!(processed[0].id, "e0");
        assert_eq!(processed[19].id, "e19");
    }
}
