//! Search configuration.

use std::time::Duration;

use eventscout_core::{DEFAULT_EXPIRY_GRACE, ExpiryPolicy, PostProcessor};

/// Size of the top bucket.
pub const DEFAULT_TOP_SIZE: usize = 20;

/// Size of the more bucket.
pub const DEFAULT_MORE_SIZE: usize = 100;

/// Simulated latency of the fallback generator.
pub const DEFAULT_FALLBACK_LATENCY: Duration = Duration::from_millis(400);

/// Search configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Maximum number of events in the top bucket.
    pub top_size: usize,

    /// Maximum number of events in the more bucket.
    pub more_size: usize,

    /// How long the fallback generator waits before answering.
    pub fallback_latency: Duration,

    /// Whether past events are filtered out.
    pub expiry: ExpiryPolicy,

    /// How far in the past an event may start before it counts as expired.
    pub expiry_grace: chrono::Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_size: DEFAULT_TOP_SIZE,
            more_size: DEFAULT_MORE_SIZE,
            fallback_latency: DEFAULT_FALLBACK_LATENCY,
            expiry: ExpiryPolicy::Disabled,
            expiry_grace: DEFAULT_EXPIRY_GRACE,
        }
    }
}

impl SearchConfig {
    /// Creates a new search configuration with the given expiry policy.
    pub fn new(expiry: ExpiryPolicy) -> Self {
        Self {
            expiry,
            ..Default::default()
        }
    }

    /// Builder: set bucket sizes.
    pub fn with_sizes(mut self, top_size: usize, more_size: usize) -> Self {
        self.top_size = top_size;
        self.more_size = more_size;
        self
    }

    /// Builder: set fallback latency.
    pub fn with_fallback_latency(mut self, latency: Duration) -> Self {
        self.fallback_latency = latency;
        self
    }

    /// Builder: set expiry grace period.
    pub fn with_expiry_grace(mut self, grace: chrono::Duration) -> Self {
        self.expiry_grace = grace;
        self
    }

    /// Returns the bucket processor for this configuration.
    pub fn post_processor(&self) -> PostProcessor {
        PostProcessor::new(self.expiry).with_grace(self.expiry_grace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.top_size, 20);
        assert_eq!(config.more_size, 100);
        assert_eq!(config.fallback_latency, Duration::from_millis(400));
        assert_eq!(config.expiry, ExpiryPolicy::Disabled);
        assert_eq!(config.expiry_grace, chrono::Duration::days(1));
    }

    #[test]
    fn custom_config() {
        let config = SearchConfig::new(ExpiryPolicy::Enabled)
            .with_sizes(10, 50)
            .with_fallback_latency(Duration::ZERO)
            .with_expiry_grace(chrono::Duration::hours(6));

        assert_eq!(config.top_size, 10);
        assert_eq!(config.more_size, 50);
        assert_eq!(config.fallback_latency, Duration::ZERO);

        let processor = config.post_processor();
        assert_eq!(processor.expiry, ExpiryPolicy::Enabled);
        assert_eq!(processor.grace, chrono::Duration::hours(6));
    }
}
