use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============= Tool Types =============

/// Declarative description of a tool, as announced to the model.
///
/// `parameters` follows the JSON-schema subset every function-calling model
/// understands: `{"type": "object", "properties": {...}, "required": [...]}`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Wire shape expected by OpenAI-style tool manifests.
    pub fn to_function_manifest(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

/// A tool invocation requested by the model while a run is waiting.
///
/// `arguments` is kept as the raw JSON text sent by the backend; it is only
/// parsed when the call is dispatched.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

/// Output submitted back for one [`ToolCall`], matched by `tool_call_id`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: Option<String>,
}

// ============= Session Types =============

/// A server-side conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle status of a [`Run`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Completed,
    Failed,
    Incomplete,
    Expired,
}

impl RunStatus {
    /// Statuses after which the run never changes again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Completed
                | RunStatus::Failed
                | RunStatus::Incomplete
                | RunStatus::Cancelled
                | RunStatus::Expired
        )
    }

    /// Statuses that end a polling wait: terminal ones plus `requires_action`.
    pub fn stops_polling(self) -> bool {
        self.is_terminal() || self == RunStatus::RequiresAction
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
        };
        f.write_str(s)
    }
}

/// The backend's view of one turn being processed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
    /// Populated only while `status == RequiresAction`.
    #[serde(default)]
    pub pending_tool_calls: Vec<ToolCall>,
    /// Error or incomplete reason, for `Failed` / `Incomplete` runs.
    #[serde(default)]
    pub error_detail: Option<String>,
}

impl Run {
    pub fn new(id: impl Into<String>, status: RunStatus) -> Self {
        Self {
            id: id.into(),
            status,
            pending_tool_calls: Vec::new(),
            error_detail: None,
        }
    }

    pub fn requiring(id: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            pending_tool_calls: calls,
            ..Self::new(id, RunStatus::RequiresAction)
        }
    }

    pub fn with_error(mut self, detail: impl Into<String>) -> Self {
        self.error_detail = Some(detail.into());
        self
    }
}

// ============= Search Types =============

/// One ranked hit returned by a search backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    #[error("Run {run_id} failed: {detail}")]
    ToolRunFailed { run_id: String, detail: String },

    #[error("Run {run_id} incomplete: {reason}")]
    ToolRunIncomplete { run_id: String, reason: String },

    #[error("Run {run_id} timed out after {polls} polls")]
    TimedOut { run_id: String, polls: u32 },

    #[error("Turn cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Errors that end the current turn but leave the conversation usable.
    pub fn is_turn_error(&self) -> bool {
        matches!(
            self,
            AppError::ToolRunFailed { .. }
                | AppError::ToolRunIncomplete { .. }
                | AppError::TimedOut { .. }
                | AppError::Cancelled
                | AppError::LLM(_)
                | AppError::Session(_)
                | AppError::Search(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
