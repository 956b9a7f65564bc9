//! Search backend using daedra
//!
//! daedra scrapes DuckDuckGo, so no credential is needed.

use crate::search::SearchBackend;
use crate::types::{AppError, Result, SearchHit};
use async_trait::async_trait;

/// Web search backend powered by daedra
pub struct DuckDuckGoSearch {
    num_results: usize,
}

impl DuckDuckGoSearch {
    pub fn new(num_results: usize) -> Self {
        Self { num_results }
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new(10)
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: self.num_results,
                ..Default::default()
            }),
        };

        match daedra::tools::search::perform_search(&search_args).await {
            Ok(response) => Ok(response
                .data
                .iter()
                .map(|r| SearchHit {
                    title: r.title.clone(),
                    url: r.url.clone(),
                    snippet: r.description.clone(),
                })
                .collect()),
            Err(e) => Err(AppError::Search(format!("Search failed: {}", e))),
        }
    }
}
