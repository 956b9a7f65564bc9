use crate::search::SearchBackend;
use crate::types::{AppError, Result, SearchHit};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "https://api.bing.microsoft.com/v7.0/custom/search";

/// Bing Custom Search client.
///
/// The query is sent as a single quoted term (`q='<query>'`); reqwest takes
/// care of URL encoding.
pub struct BingSearch {
    client: reqwest::Client,
    endpoint: String,
    subscription_key: String,
    custom_config: String,
    max_results: Option<u32>,
}

impl BingSearch {
    pub fn new(
        endpoint: impl Into<String>,
        subscription_key: impl Into<String>,
        custom_config: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            subscription_key: subscription_key.into(),
            custom_config: custom_config.into(),
            max_results: None,
        })
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }
}

#[derive(Deserialize)]
struct BingResponse {
    #[serde(rename = "webPages")]
    web_pages: Option<WebPages>,
}

#[derive(Deserialize)]
struct WebPages {
    #[serde(default)]
    value: Vec<WebPage>,
}

#[derive(Deserialize)]
struct WebPage {
    name: String,
    url: String,
    #[serde(default)]
    snippet: String,
}

#[async_trait]
impl SearchBackend for BingSearch {
    fn name(&self) -> &str {
        "bing"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let quoted = format!("'{}'", query);
        let mut params: Vec<(&str, String)> = vec![
            ("q", quoted),
            ("customconfig", self.custom_config.clone()),
        ];
        if let Some(count) = self.max_results {
            params.push(("count", count.to_string()));
        }
        debug!(query, "bing request");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .header("Ocp-Apim-Subscription-Key", &self.subscription_key)
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Bing request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Search(format!("Bing API error ({}): {}", status, body)));
        }

        let body: BingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Failed to parse Bing response: {}", e)))?;

        Ok(body
            .web_pages
            .map(|pages| pages.value)
            .unwrap_or_default()
            .into_iter()
            .map(|page| SearchHit {
                title: page.name,
                url: page.url,
                snippet: page.snippet,
            })
            .collect())
    }
}
