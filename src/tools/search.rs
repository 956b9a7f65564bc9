//! Web search tool
//!
//! One tool call runs a three-stage pipeline:
//!
//! 1. **Query generation** - the model rewrites the free-form request into one
//!    or more short queries separated by `;`.
//! 2. **Retrieval** - every query goes to the [`SearchBackend`] concurrently,
//!    each under its own timeout. A failing query yields a marker block
//!    instead of sinking the others.
//! 3. **Synthesis** - the labelled result blocks go back to the model, which
//!    writes the answer returned to the calling assistant.

use crate::llm::{LLMClient, DEFAULT_SYSTEM_PROMPT};
use crate::search::{format_hits, SearchBackend};
use crate::tools::registry::Tool;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Prefix of every answer produced by the tool.
pub const ANALYSIS_BANNER: &str =
    "HERE IS THE ANALYSIS OF THE WEB SEARCH RESULTS BASED ON THE USER'S REQUEST:\n";

const QUERY_PROMPT: &str = "Based on the user's request, generate one or several (but non-redundant) short web search queries. \
If the request covers multiple topics, provide separate queries for each topic, using semicolons to separate them.\n\
For example, if the user asks about the population of Paris, Beijing, and Baghdad, give only the response: \
'population Paris;current population Beijing;Baghdad population estimate'.\n\
Similarly, if asked about both the height of the Eiffel Tower and historical events in 1923 in England, give only the response: \
'Eiffel Tower height;historical events in 1923 England'.\n\
Here is the user request: ";

/// Split a `;`-separated model reply into trimmed, non-empty queries.
pub fn split_queries(reply: &str) -> Vec<String> {
    reply
        .split(';')
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(String::from)
        .collect()
}

/// Label each query's block with its 1-based position, in input order.
/// The closing fence follows the block text directly.
pub fn format_results(queries: &[String], blocks: &[String]) -> String {
    queries
        .iter()
        .zip(blocks)
        .enumerate()
        .map(|(i, (query, block))| {
            format!("SEARCH QUERY {}: '{}'\n'''\n{}'''\n\n", i + 1, query, block)
        })
        .collect()
}

pub struct SearchTool {
    llm: Arc<dyn LLMClient>,
    backend: Arc<dyn SearchBackend>,
    model: String,
    query_timeout: Duration,
}

impl SearchTool {
    pub fn new(llm: Arc<dyn LLMClient>, backend: Arc<dyn SearchBackend>) -> Self {
        let model = llm.model_name().to_string();
        Self {
            llm,
            backend,
            model,
            query_timeout: Duration::from_secs(10),
        }
    }

    /// Model used for query generation and synthesis.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    /// Run the whole pipeline for one request.
    pub async fn search(&self, user_request: &str) -> Result<String> {
        let queries = self.generate_queries(user_request).await?;
        let blocks = self.retrieve(&queries).await;
        let formatted = format_results(&queries, &blocks);
        debug!(results = %formatted, "formatted search results");

        let analysis = self.synthesize(user_request, &formatted).await?;
        Ok(format!("{}{}", ANALYSIS_BANNER, analysis))
    }

    /// Stage 1. Falls back to the raw request when the model returns nothing usable.
    pub async fn generate_queries(&self, user_request: &str) -> Result<Vec<String>> {
        info!("Generating search queries for the user's request");
        let prompt = format!("{}{}", QUERY_PROMPT, user_request);
        let reply = self
            .llm
            .complete(DEFAULT_SYSTEM_PROMPT, &prompt, &self.model)
            .await?;

        let mut queries = split_queries(&reply);
        if queries.is_empty() {
            warn!("Model produced no search queries; using the request itself");
            queries.push(user_request.trim().to_string());
        }
        debug!(?queries, "search queries");
        Ok(queries)
    }

    /// Stage 2. One block per query, same order as `queries`.
    pub async fn retrieve(&self, queries: &[String]) -> Vec<String> {
        let lookups = queries.iter().map(|query| self.retrieve_one(query));
        join_all(lookups).await
    }

    async fn retrieve_one(&self, query: &str) -> String {
        info!(backend = self.backend.name(), query, "Running web search");
        match timeout(self.query_timeout, self.backend.search(query)).await {
            Ok(Ok(hits)) => format_hits(&hits),
            Ok(Err(e)) => {
                warn!(query, error = %e, "search query failed");
                format!("Search failed: {}", e)
            }
            Err(_) => {
                warn!(query, "search query timed out");
                format!(
                    "Search failed: timed out after {}s",
                    self.query_timeout.as_secs_f32()
                )
            }
        }
    }

    /// Stage 3.
    pub async fn synthesize(&self, user_request: &str, formatted: &str) -> Result<String> {
        info!("Processing search results");
        let prompt = format!(
            "Analyze these web search results below to give a short answer to this user request '{}'\n\n'{}'",
            user_request, formatted
        );
        self.llm
            .complete(DEFAULT_SYSTEM_PROMPT, &prompt, &self.model)
            .await
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Perform a web search based on the user's request and analyze the results"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "user_request": {
                    "type": "string",
                    "description": "The user's request(s) to search for"
                }
            },
            "required": ["user_request"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let request = args
            .get("user_request")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AppError::InvalidInput("Missing 'user_request' parameter".to_string()))?;
        self.search(request).await
    }
}
