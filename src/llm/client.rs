//! Language-model client abstraction
//!
//! The search pipeline only needs "system prompt + user prompt in, text out",
//! so the trait is kept to that single operation. Providers implement
//! [`LLMClient::complete`]; callers that do not care about the model use
//! [`LLMClient::generate_with_system`].

use crate::types::Result;
use async_trait::async_trait;

/// Default system prompt used for single-shot completions.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant";

/// Generic LLM client trait for provider abstraction
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Run one completion with an explicit model. Transport errors propagate
    /// as-is; no retries are attempted.
    async fn complete(&self, system: &str, prompt: &str, model: &str) -> Result<String>;

    /// Model used when the caller does not pick one.
    fn model_name(&self) -> &str;

    /// Generate with system prompt on the default model
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.complete(system, prompt, self.model_name()).await
    }

    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system(DEFAULT_SYSTEM_PROMPT, prompt).await
    }
}
