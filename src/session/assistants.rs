//! OpenAI Assistants backend
//!
//! A session is a thread; each turn is a run on that thread. The assistant
//! object is created lazily on the first run and reused for the rest of the
//! process. Per-run instructions, tools and sampling knobs are sent as run
//! overrides so a single assistant serves every configuration.

use crate::llm::openai::{http_client, DEFAULT_API_BASE};
use crate::session::{ModelParams, SessionBackend};
use crate::types::{AppError, Result, Run, RunStatus, Session, ToolCall, ToolDefinition, ToolOutput};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

pub struct AssistantsBackend {
    client: reqwest::Client,
    api_base: String,
    assistant_id: OnceCell<String>,
}

impl AssistantsBackend {
    pub fn new(api_key: &str, api_base: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client(api_key, true, Duration::from_secs(60))?,
            api_base: api_base.into(),
            assistant_id: OnceCell::new(),
        })
    }

    pub fn openai(api_key: &str) -> Result<Self> {
        Self::new(api_key, DEFAULT_API_BASE)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), path)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T> {
        debug!(path, %body, "assistants POST");
        let response = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Session(format!("POST {} failed: {}", path, e)))?;
        Self::decode(path, response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Session(format!("GET {} failed: {}", path, e)))?;
        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Session(format!(
                "{} returned {}: {}",
                path, status, text
            )));
        }
        response
            .json()
            .await
            .map_err(|e| AppError::Session(format!("Failed to parse {} response: {}", path, e)))
    }

    async fn assistant(
        &self,
        instructions: &str,
        tools: &[ToolDefinition],
        params: &ModelParams,
    ) -> Result<&str> {
        let id = self
            .assistant_id
            .get_or_try_init(|| async {
                let created: IdOnly = self
                    .post(
                        "assistants",
                        json!({
                            "model": params.model,
                            "instructions": instructions,
                            "tools": manifest(tools),
                        }),
                    )
                    .await?;
                info!(assistant_id = %created.id, "Assistant created");
                Ok::<_, AppError>(created.id)
            })
            .await?;
        Ok(id.as_str())
    }
}

fn manifest(tools: &[ToolDefinition]) -> Vec<Value> {
    tools.iter().map(ToolDefinition::to_function_manifest).collect()
}

// ============= Wire Types =============

#[derive(Deserialize)]
struct IdOnly {
    id: String,
}

#[derive(Deserialize)]
struct ThreadObject {
    id: String,
    created_at: i64,
}

#[derive(Deserialize)]
struct MessageList {
    data: Vec<MessageObject>,
}

#[derive(Deserialize)]
struct MessageObject {
    role: String,
    #[serde(default)]
    content: Vec<MessageContent>,
}

#[derive(Deserialize)]
struct MessageContent {
    #[serde(default)]
    text: Option<TextContent>,
}

#[derive(Deserialize)]
struct TextContent {
    value: String,
}

#[derive(Deserialize)]
struct RunObject {
    id: String,
    status: RunStatus,
    required_action: Option<RequiredAction>,
    last_error: Option<LastError>,
    incomplete_details: Option<IncompleteDetails>,
}

#[derive(Deserialize)]
struct RequiredAction {
    submit_tool_outputs: SubmitToolOutputs,
}

#[derive(Deserialize)]
struct SubmitToolOutputs {
    tool_calls: Vec<WireToolCall>,
}

#[derive(Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
struct LastError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct IncompleteDetails {
    #[serde(default)]
    reason: String,
}

impl From<RunObject> for Run {
    fn from(wire: RunObject) -> Self {
        let pending_tool_calls = wire
            .required_action
            .map(|action| {
                action
                    .submit_tool_outputs
                    .tool_calls
                    .into_iter()
                    .map(|call| ToolCall {
                        id: call.id,
                        name: call.function.name,
                        arguments: call.function.arguments,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let error_detail = match wire.status {
            RunStatus::Failed => wire
                .last_error
                .map(|e| format!("{}: {}", e.code, e.message)),
            RunStatus::Incomplete => wire.incomplete_details.map(|d| d.reason),
            _ => None,
        };

        Run {
            id: wire.id,
            status: wire.status,
            pending_tool_calls,
            error_detail,
        }
    }
}

#[async_trait]
impl SessionBackend for AssistantsBackend {
    async fn create_session(&self) -> Result<Session> {
        let thread: ThreadObject = self.post("threads", json!({})).await?;
        Ok(Session {
            id: thread.id,
            created_at: DateTime::<Utc>::from_timestamp(thread.created_at, 0)
                .unwrap_or_else(Utc::now),
        })
    }

    async fn post_user_message(&self, session: &Session, text: &str) -> Result<()> {
        let _: IdOnly = self
            .post(
                &format!("threads/{}/messages", session.id),
                json!({"role": "user", "content": text}),
            )
            .await?;
        Ok(())
    }

    async fn latest_assistant_reply(&self, session: &Session) -> Result<String> {
        let list: MessageList = self
            .get(
                &format!("threads/{}/messages", session.id),
                &[("order", "desc"), ("limit", "20")],
            )
            .await?;

        list.data
            .into_iter()
            .find(|m| m.role == "assistant")
            .map(|m| {
                m.content
                    .into_iter()
                    .filter_map(|c| c.text.map(|t| t.value))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .ok_or_else(|| AppError::NotFound(format!("No assistant reply in {}", session.id)))
    }

    async fn create_run(
        &self,
        session: &Session,
        instructions: &str,
        tools: &[ToolDefinition],
        params: &ModelParams,
    ) -> Result<Run> {
        let assistant_id = self.assistant(instructions, tools, params).await?.to_string();
        let run: RunObject = self
            .post(
                &format!("threads/{}/runs", session.id),
                json!({
                    "assistant_id": assistant_id,
                    "model": params.model,
                    "instructions": instructions,
                    "tools": manifest(tools),
                    "temperature": params.temperature,
                    "top_p": params.top_p,
                    "max_prompt_tokens": params.max_prompt_tokens,
                    "max_completion_tokens": params.max_completion_tokens,
                }),
            )
            .await?;
        Ok(run.into())
    }

    async fn fetch_run(&self, session: &Session, run_id: &str) -> Result<Run> {
        let run: RunObject = self
            .get(&format!("threads/{}/runs/{}", session.id, run_id), &[])
            .await?;
        Ok(run.into())
    }

    async fn submit_tool_outputs(
        &self,
        session: &Session,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run> {
        let run: RunObject = self
            .post(
                &format!("threads/{}/runs/{}/submit_tool_outputs", session.id, run_id),
                json!({ "tool_outputs": outputs }),
            )
            .await?;
        Ok(run.into())
    }

    async fn cancel_run(&self, session: &Session, run_id: &str) -> Result<Run> {
        let run: RunObject = self
            .post(
                &format!("threads/{}/runs/{}/cancel", session.id, run_id),
                json!({}),
            )
            .await?;
        Ok(run.into())
    }
}
