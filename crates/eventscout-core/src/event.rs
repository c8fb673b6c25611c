//! Event types for discovered speaking opportunities.
//!
//! This module provides the canonical, provider-agnostic records:
//! - [`SearchInput`]: What the user asked for
//! - [`CanonicalEvent`]: A normalized event produced by a source adapter
//! - [`EventImage`]: An image reference attached to an event
//! - [`EventDetails`]: Optional structured extras (pricing, capacity, topics)
//! - [`SourceKind`]: The provider an event came from

use std::fmt;

use serde::{Deserialize, Serialize};

/// Title used when a provider omits the event name.
pub const UNTITLED_EVENT: &str = "Untitled Event";

/// Organizer used when a provider does not name one.
pub const UNKNOWN_ORGANIZER: &str = "Unknown Organizer";

/// Location sentinel for virtual events.
pub const ONLINE_EVENT: &str = "Online Event";

/// Stock photo substituted when a provider returns no image.
pub const FALLBACK_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1540575467063-178a50c2df87?w=1024&h=576&fit=crop";

/// The user's search request.
///
/// Only `topic` and `industry` influence provider queries; `name` and `email`
/// are carried along as context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchInput {
    pub name: String,
    pub email: String,
    pub topic: String,
    pub industry: String,
}

impl SearchInput {
    /// Creates a search input for the given topic and industry.
    pub fn new(topic: impl Into<String>, industry: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            industry: industry.into(),
            ..Default::default()
        }
    }

    /// Builder method to set the requester's name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder method to set the requester's email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Returns the trimmed topic.
    pub fn topic(&self) -> &str {
        self.topic.trim()
    }

    /// Returns the trimmed industry.
    pub fn industry(&self) -> &str {
        self.industry.trim()
    }

    /// Returns true if either the topic or the industry is non-blank.
    pub fn has_query(&self) -> bool {
        !self.topic().is_empty() || !self.industry().is_empty()
    }
}

/// The provider an event was discovered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Ticketmaster,
    Eventbrite,
    CallForSpeakers,
    Pretalx,
    SerpApi,
    OpenWebNinja,
    /// Synthetic data produced when no provider returned anything.
    Fallback,
}

impl SourceKind {
    /// The six live providers, in their canonical fan-out order.
    pub const PROVIDERS: [SourceKind; 6] = [
        Self::Ticketmaster,
        Self::Eventbrite,
        Self::CallForSpeakers,
        Self::Pretalx,
        Self::SerpApi,
        Self::OpenWebNinja,
    ];

    /// Returns the short identifier used in logs and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ticketmaster => "ticketmaster",
            Self::Eventbrite => "eventbrite",
            Self::CallForSpeakers => "callforspeakers",
            Self::Pretalx => "pretalx",
            Self::SerpApi => "serpapi",
            Self::OpenWebNinja => "openwebninja",
            Self::Fallback => "fallback",
        }
    }

    /// Returns the prefix used to namespace event ids from this source.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Ticketmaster => "tm",
            Self::Eventbrite => "eb",
            Self::CallForSpeakers => "cfs",
            Self::Pretalx => "pretalx",
            Self::SerpApi => "serp",
            Self::OpenWebNinja => "own",
            Self::Fallback => "fallback",
        }
    }

    /// Returns true if this source guarantees an application endpoint.
    pub fn has_verified_apply_link(&self) -> bool {
        matches!(
            self,
            Self::CallForSpeakers | Self::Pretalx | Self::OpenWebNinja
        )
    }

    /// Builds a namespaced event id from a provider-local id.
    pub fn event_id(&self, local_id: impl fmt::Display) -> String {
        format!("{}-{}", self.id_prefix(), local_id)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An image attached to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventImage {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
}

impl EventImage {
    /// Creates an image with just a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            width: None,
            height: None,
            ratio: None,
            fallback: None,
        }
    }

    /// Builder method to set the pixel dimensions.
    pub fn with_size(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Builder method to set the aspect ratio label (e.g. "16_9").
    pub fn with_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.ratio = Some(ratio.into());
        self
    }

    /// The generic stock photo used when a provider has no image.
    pub fn stock_fallback() -> Self {
        Self {
            url: FALLBACK_IMAGE_URL.to_string(),
            width: Some(1024),
            height: Some(576),
            ratio: Some("16_9".to_string()),
            fallback: Some(true),
        }
    }
}

/// Ticket or attendance pricing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub is_free: bool,
    /// Human-readable price as the provider displays it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// Structured extras carried through for providers that supply them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl EventDetails {
    /// Returns true if no detail field carries information.
    pub fn is_empty(&self) -> bool {
        self.pricing.is_none()
            && self.capacity.is_none()
            && self.format.is_none()
            && self.topics.is_empty()
            && self.features.is_empty()
    }
}

/// A normalized event, independent of the provider it came from.
///
/// Events are created once per search inside an adapter's conversion
/// function and are not mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEvent {
    /// Provider-namespaced identifier (e.g. `tm-G5vzZ4...`).
    pub id: String,
    pub name: String,
    /// Always a resolvable URL.
    pub main_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    pub organizer: String,
    pub verified_apply_link: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<EventImage>>,
    pub event_details: Option<EventDetails>,
    pub source: SourceKind,
}

impl CanonicalEvent {
    /// Creates a new event with the minimum required fields.
    ///
    /// A blank name becomes [`UNTITLED_EVENT`]; the organizer starts as
    /// [`UNKNOWN_ORGANIZER`] and `verified_apply_link` follows the source.
    pub fn new(
        source: SourceKind,
        id: impl Into<String>,
        name: impl Into<String>,
        main_url: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let name = if name.trim().is_empty() {
            UNTITLED_EVENT.to_string()
        } else {
            name.trim().to_string()
        };

        Self {
            id: id.into(),
            name,
            main_url: main_url.into(),
            application_url: None,
            contact: None,
            organizer: UNKNOWN_ORGANIZER.to_string(),
            verified_apply_link: source.has_verified_apply_link(),
            description: None,
            date: None,
            start_date: None,
            end_date: None,
            location: None,
            venue: None,
            images: None,
            event_details: None,
            source,
        }
    }

    /// Returns `startDate`, falling back to `date`.
    pub fn effective_date(&self) -> Option<&str> {
        self.start_date.as_deref().or(self.date.as_deref())
    }

    /// Returns the key used to collapse duplicates across providers.
    ///
    /// `lowercase(trim(name)) + "-" + (startDate ?? date ?? "")`
    pub fn dedup_key(&self) -> String {
        format!(
            "{}-{}",
            self.name.trim().to_lowercase(),
            self.effective_date().unwrap_or_default()
        )
    }

    /// Builder method to set the application URL.
    pub fn with_application_url(mut self, url: impl Into<String>) -> Self {
        self.application_url = Some(url.into());
        self
    }

    /// Builder method to set the organizer; blank values are ignored.
    pub fn with_organizer(mut self, organizer: impl Into<String>) -> Self {
        let organizer = organizer.into();
        if !organizer.trim().is_empty() {
            self.organizer = organizer.trim().to_string();
        }
        self
    }

    /// Builder method to set the contact line.
    pub fn with_contact(mut self, contact: Option<String>) -> Self {
        self.contact = contact;
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.trim().is_empty());
        self
    }

    /// Builder method to set the date fields.
    pub fn with_dates(
        mut self,
        date: Option<String>,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> Self {
        self.date = date;
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }

    /// Builder method to set location and venue.
    pub fn with_place(mut self, location: Option<String>, venue: Option<String>) -> Self {
        self.location = location;
        self.venue = venue;
        self
    }

    /// Builder method to set the images, substituting the stock photo when empty.
    pub fn with_images(mut self, images: Vec<EventImage>) -> Self {
        self.images = if images.is_empty() {
            Some(vec![EventImage::stock_fallback()])
        } else {
            Some(images)
        };
        self
    }

    /// Builder method to set structured details; empty details are dropped.
    pub fn with_details(mut self, details: EventDetails) -> Self {
        self.event_details = if details.is_empty() {
            None
        } else {
            Some(details)
        };
        self
    }
}
