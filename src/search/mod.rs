//! Web search backends
//!
//! A backend turns one query into ranked hits. The order a backend returns is
//! the relevance order and is preserved through [`format_hits`].

/// Bing Custom Search over HTTP.
pub mod bing;
/// Keyless DuckDuckGo search via daedra.
#[cfg(feature = "duckduckgo")]
pub mod duckduckgo;

use crate::types::{Result, SearchHit};
use async_trait::async_trait;

pub use bing::BingSearch;
#[cfg(feature = "duckduckgo")]
pub use duckduckgo::DuckDuckGoSearch;

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

/// Render hits as `Title:` / `URL:` / `Snippet:` lines, one blank line
/// between hits, no trailing whitespace.
pub fn format_hits(hits: &[SearchHit]) -> String {
    let mut out = String::new();
    for hit in hits {
        out.push_str("Title: ");
        out.push_str(&hit.title);
        out.push_str("\nURL: ");
        out.push_str(&hit.url);
        out.push_str("\nSnippet: ");
        out.push_str(&hit.snippet);
        out.push_str("\n\n");
    }
    out.truncate(out.trim_end().len());
    out
}
