//! The `search` command.

use std::sync::Arc;

use tracing::warn;

use eventscout_core::SearchInput;
use eventscout_providers::{
    ProviderClient, ProviderError, TopicOptimizer, UnavailableClient, all_sources,
};
use eventscout_search::{EventSearch, SearchResults};

use crate::cli::SearchArgs;
use crate::config::{ClientConfig, ProviderSettings};
use crate::error::ClientResult;
use crate::render::{RenderOptions, render_json, render_text};

/// Provider transport and topic optimizer shared by all adapters.
pub struct Transport {
    pub client: Arc<dyn ProviderClient>,
    pub optimizer: Arc<dyn TopicOptimizer>,
}

impl Transport {
    /// A transport on which every call fails with `error`.
    fn unavailable(error: ProviderError) -> Self {
        let unavailable = Arc::new(UnavailableClient::new(error));
        Self {
            client: unavailable.clone(),
            optimizer: unavailable,
        }
    }
}

/// Builds the transport described by the provider settings.
///
/// Without a base URL the transport fails every call, so searches return
/// fallback data.
pub fn transport(settings: &ProviderSettings) -> ClientResult<Transport> {
    #[cfg(feature = "http")]
    if let Some(base_url) = settings.base_url() {
        let mut client = eventscout_providers::HttpProviderClient::new(base_url, settings.timeout())?;
        if let Some(key) = settings.resolve_api_key()? {
            client = client.with_api_key(key);
        }
        tracing::info!(base_url, "using provider backend");
        let client = Arc::new(client);
        return Ok(Transport {
            client: client.clone(),
            optimizer: client,
        });
    }

    #[cfg(not(feature = "http"))]
    if settings.base_url().is_some() {
        warn!("built without the http feature, ignoring providers.base_url");
    }

    warn!("no provider backend configured, every provider will fail");
    Ok(Transport::unavailable(ProviderError::configuration(
        "no provider base_url configured",
    )))
}

/// Builds the search input from the command arguments.
pub fn search_input(args: &SearchArgs) -> SearchInput {
    SearchInput::new(&args.topic, &args.industry)
        .with_name(&args.name)
        .with_email(&args.email)
}

/// Runs a search with the configured transport.
pub async fn execute(args: &SearchArgs, config: &ClientConfig) -> ClientResult<SearchResults> {
    let input = search_input(args);
    if !input.has_query() {
        warn!("neither topic nor industry given, results will be generic");
    }

    let transport = transport(&config.providers)?;
    let sources = all_sources(transport.client, transport.optimizer);
    let search = EventSearch::new(sources, config.search.to_search_config());
    Ok(search.search(&input).await)
}

/// Runs a search and prints the results.
pub async fn run(args: &SearchArgs, config: &ClientConfig) -> ClientResult<()> {
    let results = execute(args, config).await?;

    let options = RenderOptions {
        pages: args.pages,
        page_size: config.display.page_size,
        max_title_length: config.display.max_title_length,
    };
    if args.json || config.display.json {
        println!("{}", render_json(&results, &options)?);
    } else {
        print!("{}", render_text(&results, &options));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(topic: &str, industry: &str) -> SearchArgs {
        SearchArgs {
            topic: topic.to_string(),
            industry: industry.to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            pages: 1,
            json: false,
        }
    }

    fn offline_config() -> ClientConfig {
        let mut config = ClientConfig::default();
        config.search.fallback_latency_ms = 0;
        config
    }

    #[test]
    fn input_carries_context() {
        let input = search_input(&args("AI", "Technology"));
        assert_eq!(input.topic(), "AI");
        assert_eq!(input.industry(), "Technology");
        assert_eq!(input.name, "Ada");
        assert_eq!(input.email, "ada@example.com");
    }

    #[tokio::test]
    async fn unconfigured_backend_falls_back() {
        let results = execute(&args("AI", "Technology"), &offline_config()).await.unwrap();
        assert!(results.used_fallback);
        assert_eq!(results.top20.len(), 20);
        assert_eq!(results.more100.len(), 100);
        assert_eq!(results.outcomes.len(), 6);
        assert!(results.outcomes.iter().all(|o| !o.success));
    }

    #[cfg(feature = "http")]
    #[test]
    fn invalid_base_url_is_an_error() {
        let settings = ProviderSettings {
            base_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(transport(&settings).is_err());
    }

    #[test]
    fn unresolvable_api_key_is_an_error_only_with_backend() {
        let settings = ProviderSettings {
            api_key: Some("env::_EVENTSCOUT_SEARCH_UNSET_KEY".to_string()),
            ..Default::default()
        };
        assert!(transport(&settings).is_ok());
    }
}
