//! Request and response shapes exchanged with provider transports.
//!
//! Every provider is reached through the same envelope: a
//! [`ProviderRequest`] carrying the query parameters a provider understands,
//! and a [`ProviderResponse`] of the form
//! `{ success, message, data: { events: [...], ...metadata } }`.
//! Records inside `data` stay as provider-native JSON until an adapter
//! decodes them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use eventscout_core::SourceKind;

/// Scraping controls forwarded to the Pretalx transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeOptions {
    pub max_events: usize,
    pub headless: bool,
    /// Delay between page loads, in milliseconds.
    #[serde(rename = "delay")]
    pub delay_ms: u64,
    pub include_page_details: bool,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            max_events: 50,
            headless: true,
            delay_ms: 1000,
            include_page_details: true,
        }
    }
}

/// Query parameters for one provider call.
///
/// Serializes to the flat camelCase parameter set the transports expect;
/// unset fields are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRequest {
    /// Which provider this request is for. Not part of the parameter set.
    #[serde(skip)]
    pub source: SourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(flatten)]
    pub scrape: Option<ScrapeOptions>,
}

impl ProviderRequest {
    /// Creates an empty request for `source`.
    pub fn new(source: SourceKind) -> Self {
        Self {
            source,
            industry: None,
            topic: None,
            q: None,
            keyword: None,
            classification_id: None,
            segment_id: None,
            country: None,
            size: None,
            limit: None,
            num: None,
            page: None,
            scrape: None,
        }
    }

    /// Builder method to set industry and topic; blank values are left unset.
    pub fn with_subject(mut self, industry: &str, topic: &str) -> Self {
        self.industry = non_blank(industry);
        self.topic = non_blank(topic);
        self
    }

    /// Builder method to set the free-text query.
    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    /// Builder method to set the keyword.
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Builder method to set the `size` parameter.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Builder method to set the `limit` parameter.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Builder method to set the `num` parameter.
    pub fn with_num(mut self, num: usize) -> Self {
        self.num = Some(num);
        self
    }

    /// Builder method to attach scraping controls.
    pub fn with_scrape(mut self, scrape: ScrapeOptions) -> Self {
        self.scrape = Some(scrape);
        self
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Payload of a provider reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    /// Raw records for providers that return a flat list.
    #[serde(default)]
    pub events: Vec<Value>,
    /// First page for providers that pre-split their results.
    #[serde(default)]
    pub top20: Vec<Value>,
    /// Remainder for providers that pre-split their results.
    #[serde(default)]
    pub more100: Vec<Value>,
    /// Pagination and any other metadata, kept verbatim.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// A provider reply envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: ResponseData,
}

impl ProviderResponse {
    /// Creates a successful reply carrying a flat record list.
    pub fn with_events(events: Vec<Value>) -> Self {
        Self {
            success: true,
            message: String::new(),
            data: ResponseData {
                events,
                ..Default::default()
            },
        }
    }

    /// Creates a successful reply carrying pre-split pages.
    pub fn with_pages(top20: Vec<Value>, more100: Vec<Value>) -> Self {
        Self {
            success: true,
            message: String::new(),
            data: ResponseData {
                top20,
                more100,
                ..Default::default()
            },
        }
    }

    /// Creates a `success: false` reply.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: ResponseData::default(),
        }
    }

    /// Returns the total number of raw records carried.
    pub fn record_count(&self) -> usize {
        self.data.events.len() + self.data.top20.len() + self.data.more100.len()
    }
}
