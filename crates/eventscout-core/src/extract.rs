//! Field extraction heuristics shared by the source adapters.
//!
//! Providers disagree on where they keep contact details, addresses and
//! links. This module provides:
//! - Regex mining of emails and phone numbers from free text
//! - [`ContactParts`] to assemble a contact line in a fixed priority order
//! - [`join_location`] to build location strings from structured parts
//! - URL checks so that every event keeps a resolvable `mainUrl`
//!
//! # Example
//!
//! ```
//! use eventscout_core::extract::{ContactParts, find_email};
//!
//! let text = "Questions? Write to cfp@devconf.example";
//! assert_eq!(find_email(text).as_deref(), Some("cfp@devconf.example"));
//!
//! let contact = ContactParts::new().email(find_email(text)).build();
//! assert_eq!(contact.as_deref(), Some("Email: cfp@devconf.example"));
//! ```

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Regex for email addresses in free text.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("Invalid email regex")
});

/// Regex for phone numbers in free text (NANP-style and international prefixes).
static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+\d{1,3}[\s.-]?)?\(?\b\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}\b")
        .expect("Invalid phone regex")
});

/// Regex for HTML tags.
static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid tag regex"));

/// Separator between contact entries.
pub const CONTACT_SEPARATOR: &str = " | ";

/// Separator between location parts.
pub const LOCATION_SEPARATOR: &str = ", ";

/// Returns the first email address found in `text`.
pub fn find_email(text: &str) -> Option<String> {
    EMAIL_REGEX
        .find(text)
        .map(|m| m.as_str().trim_end_matches('.').to_string())
}

/// Returns the first phone number found in `text`.
pub fn find_phone(text: &str) -> Option<String> {
    PHONE_REGEX.find(text).map(|m| m.as_str().trim().to_string())
}

/// Removes HTML tags and collapses whitespace.
pub fn strip_html(text: &str) -> String {
    let without_tags = TAG_REGEX.replace_all(text, " ");
    without_tags.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns the first value that is present and not blank, trimmed.
pub fn first_non_blank<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    values
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// Returns true if `candidate` is an absolute http(s) URL with a host.
///
/// Placeholders such as `"#"`, `"N/A"` or relative paths are rejected.
pub fn is_resolvable_url(candidate: &str) -> bool {
    match Url::parse(candidate.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// Picks the first resolvable URL from `candidates`, or `fallback` if none is.
pub fn resolve_url<'a, I>(candidates: I, fallback: impl FnOnce() -> String) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|c| is_resolvable_url(c))
        .map(str::to_string)
        .unwrap_or_else(fallback)
}

/// Joins location parts with `", "`.
///
/// Blank parts are skipped and a part equal (case-insensitively) to the one
/// before it is collapsed, so `["Berlin", "Berlin", "Germany"]` becomes
/// `"Berlin, Germany"`. Returns `None` when nothing remains.
pub fn join_location<'a, I>(parts: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut kept: Vec<&str> = Vec::new();
    for part in parts.into_iter().flatten() {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if kept
            .last()
            .is_some_and(|last| last.eq_ignore_ascii_case(part))
        {
            continue;
        }
        kept.push(part);
    }

    if kept.is_empty() {
        None
    } else {
        Some(kept.join(LOCATION_SEPARATOR))
    }
}

/// Builder for a human-readable contact line.
///
/// Entries are emitted in the fixed order email, phone, website, organizer,
/// regardless of the order the setters are called in. When no structured
/// entry is present, [`ContactParts::mine`] falls back to an email and then a
/// phone number found in free text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactParts {
    email: Option<String>,
    phone: Option<String>,
    website: Option<String>,
    organizer: Option<String>,
    mined_from: Option<String>,
}

impl ContactParts {
    /// Creates an empty contact builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the email entry.
    pub fn email(mut self, email: Option<impl Into<String>>) -> Self {
        self.email = non_blank(email);
        self
    }

    /// Sets the phone entry.
    pub fn phone(mut self, phone: Option<impl Into<String>>) -> Self {
        self.phone = non_blank(phone);
        self
    }

    /// Sets the website entry.
    pub fn website(mut self, website: Option<impl Into<String>>) -> Self {
        self.website = non_blank(website);
        self
    }

    /// Sets the embedded organizer entry.
    pub fn organizer(mut self, organizer: Option<impl Into<String>>) -> Self {
        self.organizer = non_blank(organizer);
        self
    }

    /// Sets free text to mine when no structured entry exists.
    pub fn mine(mut self, text: Option<impl Into<String>>) -> Self {
        self.mined_from = non_blank(text);
        self
    }

    /// Returns true if no structured entry has been set.
    pub fn is_structured_empty(&self) -> bool {
        self.email.is_none()
            && self.phone.is_none()
            && self.website.is_none()
            && self.organizer.is_none()
    }

    /// Assembles the contact line.
    pub fn build(self) -> Option<String> {
        if self.is_structured_empty() {
            let text = self.mined_from?;
            if let Some(email) = find_email(&text) {
                return Some(format!("Email: {}", email));
            }
            return find_phone(&text).map(|phone| format!("Phone: {}", phone));
        }

        let entries: Vec<String> = [
            self.email.map(|v| format!("Email: {}", v)),
            self.phone.map(|v| format!("Phone: {}", v)),
            self.website.map(|v| format!("Website: {}", v)),
            self.organizer.map(|v| format!("Organizer: {}", v)),
        ]
        .into_iter()
        .flatten()
        .collect();

        Some(entries.join(CONTACT_SEPARATOR))
    }
}

fn non_blank(value: Option<impl Into<String>>) -> Option<String> {
    value
        .map(Into::into)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
