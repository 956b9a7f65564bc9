//! Conversation sessions
//!
//! A session lives on the backend; this side only keeps its identity. Every
//! user message becomes a [`Run`] that the
//! [`ToolCallingDriver`](crate::session::driver::ToolCallingDriver) drives to a
//! terminal status.
//!
//! - [`SessionBackend`] - stateless request/response operations against the backend
//! - [`ConversationSession`] - one conversation bound to a backend
//! - [`AssistantsBackend`] - OpenAI Assistants (threads and runs)

/// OpenAI Assistants API backend.
pub mod assistants;
/// Turn-completion state machine.
pub mod driver;

use crate::types::{Result, Run, Session, ToolDefinition, ToolOutput};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

pub use assistants::AssistantsBackend;
pub use driver::{DriverConfig, ToolCallRecord, ToolCallingDriver, TurnResult};

/// Pass-through knobs sent with every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_prompt_tokens: u32,
    pub max_completion_tokens: u32,
}

impl ModelParams {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 1.0,
            top_p: 1.0,
            max_prompt_tokens: 32768,
            max_completion_tokens: 32768,
        }
    }
}

/// Operations a conversational backend exposes.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    async fn create_session(&self) -> Result<Session>;

    async fn post_user_message(&self, session: &Session, text: &str) -> Result<()>;

    /// Text of the newest assistant-authored message in the history.
    async fn latest_assistant_reply(&self, session: &Session) -> Result<String>;

    async fn create_run(
        &self,
        session: &Session,
        instructions: &str,
        tools: &[ToolDefinition],
        params: &ModelParams,
    ) -> Result<Run>;

    async fn fetch_run(&self, session: &Session, run_id: &str) -> Result<Run>;

    async fn submit_tool_outputs(
        &self,
        session: &Session,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run>;

    /// Ask the backend to stop a run that is still queued or in progress.
    async fn cancel_run(&self, session: &Session, run_id: &str) -> Result<Run>;
}

/// One logical conversation. Lives as long as the process; never torn down.
#[derive(Clone)]
pub struct ConversationSession {
    backend: Arc<dyn SessionBackend>,
    session: Session,
}

impl ConversationSession {
    /// Open a new conversation on `backend`.
    pub async fn create(backend: Arc<dyn SessionBackend>) -> Result<Self> {
        let session = backend.create_session().await?;
        info!(session_id = %session.id, "Conversation created");
        Ok(Self { backend, session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn id(&self) -> &str {
        &self.session.id
    }

    pub async fn post_user_message(&self, text: &str) -> Result<()> {
        self.backend.post_user_message(&self.session, text).await
    }

    pub async fn latest_assistant_reply(&self) -> Result<String> {
        self.backend.latest_assistant_reply(&self.session).await
    }

    pub async fn create_run(
        &self,
        instructions: &str,
        tools: &[ToolDefinition],
        params: &ModelParams,
    ) -> Result<Run> {
        self.backend
            .create_run(&self.session, instructions, tools, params)
            .await
    }

    pub async fn fetch_run(&self, run_id: &str) -> Result<Run> {
        self.backend.fetch_run(&self.session, run_id).await
    }

    pub async fn submit_tool_outputs(&self, run_id: &str, outputs: &[ToolOutput]) -> Result<Run> {
        self.backend
            .submit_tool_outputs(&self.session, run_id, outputs)
            .await
    }

    pub async fn cancel_run(&self, run_id: &str) -> Result<Run> {
        self.backend.cancel_run(&self.session, run_id).await
    }
}
