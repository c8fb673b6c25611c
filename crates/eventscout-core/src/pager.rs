//! Load-more paging over an already computed result bucket.
//!
//! The `more` bucket is computed once per search; paging only moves a cursor
//! over it and never goes back to the providers.

use crate::event::CanonicalEvent;

/// Number of events revealed per load-more step.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// One load-more step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page<'a> {
    /// 1-based page number.
    pub number: usize,
    /// The events revealed by this step.
    pub items: &'a [CanonicalEvent],
    /// Whether another step would reveal more events.
    pub has_more: bool,
}

/// Cursor over the `more` bucket.
#[derive(Debug, Clone)]
pub struct MorePager {
    items: Vec<CanonicalEvent>,
    page_size: usize,
    pages_loaded: usize,
}

impl MorePager {
    /// Creates a pager with the default page size of 20.
    pub fn new(items: Vec<CanonicalEvent>) -> Self {
        Self::with_page_size(items, DEFAULT_PAGE_SIZE)
    }

    /// Creates a pager with a custom page size (minimum 1).
    pub fn with_page_size(items: Vec<CanonicalEvent>, page_size: usize) -> Self {
        Self {
            items,
            page_size: page_size.max(1),
            pages_loaded: 0,
        }
    }

    /// Reveals the next page.
    ///
    /// The first call yields the page shown with the initial response. Once
    /// exhausted, further calls return an empty page with `has_more == false`.
    pub fn load_more(&mut self) -> Page<'_> {
        let start = self.displayed_len();
        if start < self.items.len() {
            self.pages_loaded += 1;
        }
        let end = self.displayed_len();

        Page {
            number: self.pages_loaded,
            items: &self.items[start..end],
            has_more: end < self.items.len(),
        }
    }

    /// Returns every event revealed so far.
    pub fn displayed(&self) -> &[CanonicalEvent] {
        &self.items[..self.displayed_len()]
    }

    /// Returns true while some events are still hidden.
    pub fn has_more(&self) -> bool {
        self.displayed_len() < self.items.len()
    }

    /// Returns the total number of events in the bucket.
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Returns the number of pages needed to reveal everything.
    pub fn page_count(&self) -> usize {
        self.items.len().div_ceil(self.page_size)
    }

    /// Hides everything again.
    pub fn reset(&mut self) {
        self.pages_loaded = 0;
    }

    fn displayed_len(&self) -> usize {
        (self.pages_loaded * self.page_size).min(self.items.len())
    }
}
