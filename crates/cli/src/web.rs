use crate::config::WebSection;
use anyhow::{Context as AnyhowContext, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use vana_search::{SearchError, UnconfiguredWebSearch, WebBackend};

const API_KEY_HEADER: &str = "X-Subscription-Token";

/// Web search over a JSON HTTP endpoint: `GET <endpoint>?q=<query>&count=<n>`.
pub struct HttpWebSearch {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpWebSearch {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

#[async_trait]
impl WebBackend for HttpWebSearch {
    async fn web_search(&self, query: &str, max_results: usize) -> vana_search::Result<String> {
        let count = max_results.to_string();
        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("count", count.as_str())]);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| SearchError::Web(format!("GET {}: {err}", self.endpoint)))?;

        response.text().await.map_err(|err| {
            SearchError::Web(format!("Failed to read body from {}: {err}", self.endpoint))
        })
    }
}

/// Build the configured web backend. Without an endpoint every web call fails.
pub fn build_web_backend(section: &WebSection) -> Result<Arc<dyn WebBackend>> {
    let Some(endpoint) = section.endpoint.as_deref() else {
        log::debug!("No [web] endpoint configured; web tier will fail");
        return Ok(Arc::new(UnconfiguredWebSearch));
    };

    let api_key = section.api_key_env.as_deref().and_then(|var| match env::var(var) {
        Ok(key) if !key.trim().is_empty() => Some(key),
        _ => {
            log::warn!("Web API key variable {var} is not set; sending requests without a key");
            None
        }
    });

    let backend = HttpWebSearch::new(endpoint, api_key, Duration::from_secs(section.timeout_secs))?;
    Ok(Arc::new(backend))
}
