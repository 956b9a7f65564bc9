//! LLM Provider Clients and Abstractions
//!
//! - [`LLMClient`] - The core trait: one completion, system + user prompt in, text out
//! - [`OpenAIClient`] - OpenAI chat completions (and compatible endpoints)
//!
//! # Example
//!
//! ```ignore
//! use scout::llm::{LLMClient, OpenAIClient};
//!
//! let client = OpenAIClient::new(&api_key, "https://api.openai.com/v1", "gpt-3.5-turbo")?;
//! let answer = client.generate("What is 2+2?").await?;
//! ```

/// Core LLM client trait.
pub mod client;
/// OpenAI chat-completions client.
pub mod openai;

pub use client::{LLMClient, DEFAULT_SYSTEM_PROMPT};
pub use openai::OpenAIClient;
