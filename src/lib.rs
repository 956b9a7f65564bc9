//! # Scout - tool-calling assistant with web search
//!
//! Scout drives a hosted assistant through a conversation. While answering, the
//! assistant may ask for tools; Scout runs them locally and hands the outputs
//! back until the assistant produces a final reply.
//!
//! ## Overview
//!
//! Scout can be used in two ways:
//!
//! 1. **As a CLI** - Run the `scout` binary in punctual or continuous mode
//! 2. **As a library** - Wire the registry, driver and session yourself
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use scout::{
//!     llm::OpenAIClient, search::DuckDuckGoSearch, session::AssistantsBackend,
//!     tools::{Adder, SearchTool}, ConversationSession, ModelParams, ToolCallingDriver,
//!     ToolRegistry,
//! };
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! let llm = Arc::new(OpenAIClient::new(&key, "https://api.openai.com/v1", "gpt-4o")?);
//! let registry = ToolRegistry::new()
//!     .with(Arc::new(SearchTool::new(llm, Arc::new(DuckDuckGoSearch::default()))))?
//!     .with(Arc::new(Adder))?;
//!
//! let driver = ToolCallingDriver::new(Arc::new(registry), "You are a helpful assistant", ModelParams::new("gpt-4o"));
//! let conversation = ConversationSession::create(Arc::new(AssistantsBackend::openai(&key)?)).await?;
//! let turn = driver.run_turn(&conversation, "What is 2 plus 3?", &CancellationToken::new()).await?;
//! println!("{}", turn.reply);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `duckduckgo` | DuckDuckGo search backend via daedra (default) |
//!
//! ## Modules
//!
//! - [`cli`] - Argument parsing, colored output, the interaction loop
//! - [`llm`] - Single-shot completion client
//! - [`search`] - Web search backends
//! - [`session`] - Conversation sessions and the tool-calling driver
//! - [`tools`] - Tool trait, registry and built-in tools
//! - [`types`] - Common types and error handling
//! - [`utils`] - Configuration and logging

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Command-line surface and interaction loop.
pub mod cli;
/// Language-model completion clients.
pub mod llm;
/// Web search backends (Bing, DuckDuckGo).
pub mod search;
/// Conversation sessions and the turn driver.
pub mod session;
/// Built-in tools (web search, arithmetic).
pub mod tools;
/// Core types (runs, tool calls, errors).
pub mod types;
/// Configuration and tracing setup.
pub mod utils;

// Re-export commonly used types
pub use cli::interactive::InteractionLoop;
pub use llm::LLMClient;
pub use search::SearchBackend;
pub use session::{ConversationSession, ModelParams, SessionBackend, ToolCallingDriver};
pub use tools::registry::{Tool, ToolRegistry};
pub use types::{AppError, Result};
pub use utils::config::ScoutConfig;
