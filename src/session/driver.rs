//! Tool-calling driver
//!
//! Runs one user turn to completion against a [`ConversationSession`]:
//!
//! ```text
//! Created -> Submitted -> Polling -> { RequiresAction <-> ToolsDispatched }
//!                                 -> { Completed | Failed | Incomplete }
//! ```
//!
//! 1. Post the user message and create a run with the tool manifest
//! 2. Poll the run at a fixed interval until it needs tools or ends
//! 3. If it needs tools, dispatch every pending call through the
//!    [`ToolRegistry`], submit the outputs, and go back to polling
//! 4. Repeat until the run reaches a terminal status
//!
//! Polling is bounded by [`DriverConfig::max_polls`] and every wait and
//! backend call observes a [`CancellationToken`].
//!
//! # Example
//!
//! ```rust,ignore
//! let driver = ToolCallingDriver::new(registry, "You are a helpful assistant", ModelParams::new("gpt-4o"));
//! let conversation = ConversationSession::create(backend).await?;
//! let turn = driver.run_turn(&conversation, "What's 2 + 3?", &CancellationToken::new()).await?;
//! println!("{}", turn.reply);
//! ```

use crate::session::{ConversationSession, ModelParams};
use crate::tools::registry::ToolRegistry;
use crate::types::{AppError, Result, Run, RunStatus, ToolCall, ToolOutput};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Fetches allowed while waiting for a cancelled run to become terminal.
const ABORT_SETTLE_POLLS: u32 = 50;

/// Polling and dispatch behaviour of the driver.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Delay before each status fetch.
    pub poll_interval: Duration,

    /// Fetches allowed in one wait before giving up with `TimedOut`.
    pub max_polls: u32,

    /// Timeout for individual tool execution.
    pub tool_timeout: Duration,

    /// Run the calls of one batch concurrently. Output order is unchanged.
    pub parallel_tools: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            max_polls: 3000,
            tool_timeout: Duration::from_secs(120),
            parallel_tools: true,
        }
    }
}

/// Record of a single tool call execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Call id assigned by the backend.
    pub id: String,
    pub name: String,
    pub arguments: String,
    pub output: String,
    pub success: bool,
    pub duration_ms: u64,
}

/// Outcome of a completed turn.
#[derive(Debug, Clone)]
pub struct TurnResult {
    /// Latest assistant reply once the run completed.
    pub reply: String,
    pub run_id: String,
    /// Number of `requires_action` rounds served.
    pub tool_rounds: usize,
    /// Every tool call made during the turn, in dispatch order.
    pub tool_calls: Vec<ToolCallRecord>,
}

pub struct ToolCallingDriver {
    registry: Arc<ToolRegistry>,
    instructions: String,
    params: ModelParams,
    config: DriverConfig,
}

impl ToolCallingDriver {
    pub fn new(
        registry: Arc<ToolRegistry>,
        instructions: impl Into<String>,
        params: ModelParams,
    ) -> Self {
        debug!(tools = ?registry.tool_names(), "Tool-calling driver ready");
        Self {
            registry,
            instructions: instructions.into(),
            params,
            config: DriverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DriverConfig) -> Self {
        self.config = config;
        self
    }

    /// Submit `message` and drive the resulting run to a terminal status.
    ///
    /// If the turn is abandoned while the run is still live (poll budget
    /// exhausted, cancellation, transport error) the run is cancelled on the
    /// backend so the conversation accepts the next message.
    pub async fn run_turn(
        &self,
        conversation: &ConversationSession,
        message: &str,
        cancel: &CancellationToken,
    ) -> Result<TurnResult> {
        cancellable(cancel, conversation.post_user_message(message)).await?;

        let tools = self.registry.describe_all();
        let created = cancellable(
            cancel,
            conversation.create_run(&self.instructions, &tools, &self.params),
        )
        .await?;
        info!(run_id = %created.id, session_id = conversation.id(), "Run created");

        let mut tool_rounds = 0;
        let mut tool_calls = Vec::new();
        let run = match self
            .drive(conversation, &created.id, cancel, &mut tool_rounds, &mut tool_calls)
            .await
        {
            Ok(run) => run,
            Err(e) => {
                let settle = !matches!(e, AppError::Cancelled);
                self.abort_run(conversation, &created.id, settle).await;
                return Err(e);
            }
        };

        match run.status {
            RunStatus::Completed => {
                let reply = cancellable(cancel, conversation.latest_assistant_reply()).await?;
                debug!(run_id = %run.id, %reply, "Run completed");
                Ok(TurnResult {
                    reply,
                    run_id: run.id,
                    tool_rounds,
                    tool_calls,
                })
            }
            RunStatus::Incomplete => Err(AppError::ToolRunIncomplete {
                reason: run
                    .error_detail
                    .unwrap_or_else(|| "unknown reason".to_string()),
                run_id: run.id,
            }),
            status => Err(AppError::ToolRunFailed {
                detail: run
                    .error_detail
                    .unwrap_or_else(|| format!("run ended with status {}", status)),
                run_id: run.id,
            }),
        }
    }

    /// Serve `requires_action` rounds until the run is terminal.
    async fn drive(
        &self,
        conversation: &ConversationSession,
        run_id: &str,
        cancel: &CancellationToken,
        tool_rounds: &mut usize,
        tool_calls: &mut Vec<ToolCallRecord>,
    ) -> Result<Run> {
        let mut run = self.wait_for_run(conversation, run_id, cancel).await?;

        while run.status == RunStatus::RequiresAction {
            if run.pending_tool_calls.is_empty() {
                return Err(AppError::Session(format!(
                    "Run {} requires action but lists no tool calls",
                    run.id
                )));
            }
            *tool_rounds += 1;
            info!(
                run_id = %run.id,
                round = *tool_rounds,
                calls = run.pending_tool_calls.len(),
                "Tools to call"
            );

            let records = cancellable(cancel, async {
                Ok(self.dispatch(&run.pending_tool_calls).await)
            })
            .await?;
            let outputs: Vec<ToolOutput> = records
                .iter()
                .map(|r| ToolOutput {
                    tool_call_id: r.id.clone(),
                    output: Some(r.output.clone()),
                })
                .collect();
            tool_calls.extend(records);

            let submitted =
                cancellable(cancel, conversation.submit_tool_outputs(&run.id, &outputs)).await?;
            run = self.wait_for_run(conversation, &submitted.id, cancel).await?;
        }

        Ok(run)
    }

    /// Best-effort cancel of a run the turn gave up on. With `settle`, wait
    /// (bounded) until the backend reports it terminal.
    async fn abort_run(&self, conversation: &ConversationSession, run_id: &str, settle: bool) {
        match conversation.cancel_run(run_id).await {
            Ok(run) => info!(run_id, status = %run.status, "Run cancelled"),
            Err(e) => {
                warn!(run_id, error = %e, "Could not cancel run");
                return;
            }
        }
        if !settle {
            return;
        }
        for _ in 0..ABORT_SETTLE_POLLS {
            sleep(self.config.poll_interval).await;
            match conversation.fetch_run(run_id).await {
                Ok(run) if run.status.is_terminal() => return,
                Ok(_) => {}
                Err(e) => {
                    warn!(run_id, error = %e, "Could not confirm run cancellation");
                    return;
                }
            }
        }
        warn!(run_id, "Run still active after cancellation");
    }

    /// Poll `run_id` until it needs tools or reaches a terminal status.
    ///
    /// Never returns a run that is still queued or in progress. A run that is
    /// already terminal comes back after a single fetch.
    pub async fn wait_for_run(
        &self,
        conversation: &ConversationSession,
        run_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Run> {
        for poll in 1..=self.config.max_polls {
            cancellable(cancel, async {
                sleep(self.config.poll_interval).await;
                Ok(())
            })
            .await?;

            let run = cancellable(cancel, conversation.fetch_run(run_id)).await?;
            if run.status.stops_polling() {
                debug!(run_id, status = %run.status, polls = poll, "Run settled");
                return Ok(run);
            }
        }

        warn!(run_id, polls = self.config.max_polls, "Run did not settle");
        Err(AppError::TimedOut {
            run_id: run_id.to_string(),
            polls: self.config.max_polls,
        })
    }

    /// Execute one batch of tool calls. One record per call, in request order.
    pub async fn dispatch(&self, calls: &[ToolCall]) -> Vec<ToolCallRecord> {
        if self.config.parallel_tools {
            join_all(calls.iter().map(|call| self.invoke(call))).await
        } else {
            let mut records = Vec::with_capacity(calls.len());
            for call in calls {
                records.push(self.invoke(call).await);
            }
            records
        }
    }

    /// Resolve and run a single call. Failures become an `Error: ...` output
    /// so the rest of the batch still goes through.
    async fn invoke(&self, call: &ToolCall) -> ToolCallRecord {
        let start = Instant::now();
        info!(tool = %call.name, call_id = %call.id, "Calling tool");
        debug!(tool = %call.name, arguments = %call.arguments, "Tool arguments");

        let outcome = match self.registry.resolve(&call.name) {
            None => {
                warn!(tool = %call.name, "Model requested an unknown tool");
                Err(format!("tool '{}' not found", call.name))
            }
            Some(tool) => match parse_arguments(&call.arguments) {
                Err(e) => Err(format!("invalid arguments for tool '{}': {}", call.name, e)),
                Ok(args) => match timeout(self.config.tool_timeout, tool.execute(args)).await {
                    Ok(Ok(output)) => Ok(output),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(_) => Err(format!(
                        "tool '{}' timed out after {}s",
                        call.name,
                        self.config.tool_timeout.as_secs()
                    )),
                },
            },
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        let (output, success) = match outcome {
            Ok(output) => (output, true),
            Err(message) => {
                warn!(tool = %call.name, call_id = %call.id, error = %message, "Tool call failed");
                (format!("Error: {}", message), false)
            }
        };
        debug!(tool = %call.name, %output, duration_ms, "Tool output");

        ToolCallRecord {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments: call.arguments.clone(),
            output,
            success,
            duration_ms,
        }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }
}

/// Empty argument text is treated as `{}`.
fn parse_arguments(raw: &str) -> std::result::Result<Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw)
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AppError::Cancelled),
        result = fut => result,
    }
}
