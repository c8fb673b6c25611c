//! Output rendering for search results.
//!
//! - **Text**: one block per event, top bucket first, then the requested
//!   number of load-more pages
//! - **JSON**: the same selection, machine-readable

use std::borrow::Cow;

use serde::Serialize;

use eventscout_core::{CanonicalEvent, MorePager, parse_event_date};
use eventscout_search::{SearchResults, SourceOutcome};

/// What to show of a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Number of load-more pages revealed after the top bucket.
    pub pages: usize,
    /// Events per load-more page.
    pub page_size: usize,
    /// Maximum event name length.
    pub max_title_length: Option<usize>,
}

/// JSON output document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonOutput<'a> {
    pub top20: &'a [CanonicalEvent],
    pub more: Vec<&'a CanonicalEvent>,
    pub has_more: bool,
    pub more_total: usize,
    pub used_fallback: bool,
    pub outcomes: &'a [SourceOutcome],
}

/// Reveals up to `pages` load-more pages of the more bucket.
fn reveal(results: &SearchResults, options: &RenderOptions) -> MorePager {
    let mut pager = MorePager::with_page_size(results.more100.clone(), options.page_size);
    for _ in 0..options.pages {
        if pager.load_more().items.is_empty() {
            break;
        }
    }
    pager
}

/// Renders results as JSON.
pub fn render_json(results: &SearchResults, options: &RenderOptions) -> serde_json::Result<String> {
    let pager = reveal(results, options);
    let output = JsonOutput {
        top20: &results.top20,
        more: results.more100.iter().take(pager.displayed().len()).collect(),
        has_more: pager.has_more(),
        more_total: pager.total(),
        used_fallback: results.used_fallback,
        outcomes: &results.outcomes,
    };
    serde_json::to_string_pretty(&output)
}

/// Renders results as human-readable text.
pub fn render_text(results: &SearchResults, options: &RenderOptions) -> String {
    let mut out = String::new();

    if results.used_fallback {
        out.push_str("No provider returned events; showing suggested opportunities.\n\n");
    }

    out.push_str(&format!("Top events ({})\n", results.top20.len()));
    for event in &results.top20 {
        out.push_str(&format_event(event, options.max_title_length));
    }

    let mut pager = MorePager::with_page_size(results.more100.clone(), options.page_size);
    for _ in 0..options.pages {
        let page = pager.load_more();
        if page.items.is_empty() {
            break;
        }
        out.push_str(&format!("\nMore events, page {}\n", page.number));
        for event in page.items {
            out.push_str(&format_event(event, options.max_title_length));
        }
    }
    if pager.has_more() {
        let hidden = pager.total() - pager.displayed().len();
        out.push_str(&format!("\n{} more events (use --pages to show them)\n", hidden));
    }

    let failed: Vec<_> = results
        .outcomes
        .iter()
        .filter(|o| !o.success)
        .map(|o| o.source.as_str())
        .collect();
    if !failed.is_empty() {
        out.push_str(&format!("\nUnavailable sources: {}\n", failed.join(", ")));
    }

    out
}

/// Formats one event as a short text block.
pub fn format_event(event: &CanonicalEvent, max_title_length: Option<usize>) -> String {
    let name = match max_title_length {
        Some(max) => ellipsis(&event.name, max),
        None => Cow::Borrowed(event.name.as_str()),
    };

    let mut block = format!("  {}  {}", display_date(event), name);
    if let Some(ref location) = event.location {
        block.push_str(&format!(" ({})", location));
    }
    block.push_str(&format!(" [{}]\n", event.source));

    let link = event.application_url.as_deref().unwrap_or(&event.main_url);
    block.push_str(&format!("      {}\n", link));
    block
}

/// Returns the event date for display.
fn display_date(event: &CanonicalEvent) -> String {
    let Some(raw) = event.effective_date() else {
        return "date TBA".to_string();
    };
    match parse_event_date(raw) {
        Some(date) if date.is_date_only() => date.date().format("%Y-%m-%d").to_string(),
        Some(date) => date.to_utc_datetime().format("%Y-%m-%d %H:%M UTC").to_string(),
        None => raw.to_string(),
    }
}

/// Truncates a string with ellipsis if it exceeds the given length.
pub fn ellipsis(s: &str, max_len: usize) -> Cow<'_, str> {
    if max_len == 0 {
        return Cow::Borrowed("");
    }
    if s.chars().count() <= max_len {
        return Cow::Borrowed(s);
    }
    let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
    Cow::Owned(format!("{}...", truncated))
}
