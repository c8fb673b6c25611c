//! Core types: canonical events, dates, field extraction, post-processing, paging

pub mod event;
pub mod extract;
pub mod pager;
pub mod pipeline;
pub mod time;
pub mod tracing;

pub use event::{
    CanonicalEvent, EventDetails, EventImage, FALLBACK_IMAGE_URL, ONLINE_EVENT, Pricing,
    SearchInput, SourceKind, UNKNOWN_ORGANIZER, UNTITLED_EVENT,
};
pub use extract::{
    ContactParts, find_email, find_phone, first_non_blank, is_resolvable_url, join_location,
    resolve_url, strip_html,
};
pub use pager::{DEFAULT_PAGE_SIZE, MorePager, Page};
pub use pipeline::{
    DEFAULT_EXPIRY_GRACE, ExpiryPolicy, PostProcessor, dedup, filter_expired, is_expired,
    sort_by_date,
};
pub use time::{
    EventDate, SyntheticSchedule, format_date, format_timestamp, parse_event_date,
    resolve_month_day,
};
pub use tracing::{LogFormat, LogSettings, TracingError, init_tracing};
