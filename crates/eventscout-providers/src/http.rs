//! HTTP transport for a provider proxy backend.
//!
//! Every provider sits behind the same backend: `GET {base_url}/{provider}/events`
//! with the request serialized as query parameters, answering with the
//! common `{ success, message, data }` envelope. The SerpAPI topic optimizer
//! lives at `{base_url}/serpapi/optimize-topic`.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;
use url::Url;

use eventscout_core::SourceKind;

use crate::client::{BoxFuture, ProviderClient, TopicOptimizer};
use crate::error::{ProviderError, ProviderResult};
use crate::wire::{ProviderRequest, ProviderResponse};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const OPTIMIZE_PATH: &str = "serpapi/optimize-topic";

/// Returns the backend path serving `source`.
pub fn endpoint_path(source: SourceKind) -> String {
    format!("{}/events", source.as_str())
}

/// A [`ProviderClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpProviderClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpProviderClient {
    /// Creates a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `base_url` is not an absolute http(s)
    /// URL or the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> ProviderResult<Self> {
        let parsed = Url::parse(base_url.trim()).map_err(|e| {
            ProviderError::configuration(format!("invalid base URL {:?}", base_url)).with_source(e)
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProviderError::configuration(format!(
                "base URL must be http or https, got {}",
                parsed.scheme()
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::configuration("failed to create HTTP client").with_source(e))?;

        Ok(Self {
            http_client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    /// Builder method to send a bearer API key with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Returns the full URL for a backend path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get<Q: Serialize + ?Sized>(&self, path: &str, query: &Q) -> ProviderResult<ProviderResponse> {
        let url = self.url_for(path);
        debug!("GET {}", url);

        let mut request = self.http_client.get(&url).query(query);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::network("request timeout")
            } else if e.is_connect() {
                ProviderError::network(format!("connection failed: {}", e))
            } else {
                ProviderError::network(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(ProviderError::rate_limited(format!(
                "rate limit exceeded{}",
                retry_after
                    .map(|s| format!(", retry after {} seconds", s))
                    .unwrap_or_default()
            )));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::authentication(format!("API key rejected ({})", status)));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::not_found(format!("no endpoint at {}", url)));
        }

        if status == reqwest::StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::bad_request(body));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::server(format!("API error ({}): {}", status, body)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse response: {}", e)).with_source(e)
        })
    }
}

impl ProviderClient for HttpProviderClient {
    fn query<'a>(
        &'a self,
        request: &'a ProviderRequest,
    ) -> BoxFuture<'a, ProviderResult<ProviderResponse>> {
        Box::pin(async move { self.get(&endpoint_path(request.source), request).await })
    }
}

#[derive(Serialize)]
struct OptimizeQuery<'a> {
    topic: &'a str,
    industry: &'a str,
}

/// Reads the optimized topic out of an optimizer reply.
pub fn optimized_topic(response: &ProviderResponse) -> ProviderResult<String> {
    if !response.success {
        return Err(ProviderError::upstream(response.message.clone()));
    }
    response
        .data
        .metadata
        .get("optimizedTopic")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ProviderError::invalid_response("reply has no optimizedTopic"))
}

impl TopicOptimizer for HttpProviderClient {
    fn optimize<'a>(
        &'a self,
        topic: &'a str,
        industry: &'a str,
    ) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move {
            let response = self.get(OPTIMIZE_PATH, &OptimizeQuery { topic, industry }).await?;
            optimized_topic(&response)
        })
    }
}
