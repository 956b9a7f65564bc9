//! Mock implementations for testing.
//!
//! Scripted stand-ins for the three external collaborators so driver and
//! search behaviour can be tested without network access.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use scout::search::SearchBackend;
use scout::session::{ModelParams, SessionBackend};
use scout::types::{AppError, Result, Run, RunStatus, SearchHit, Session, ToolCall, ToolDefinition, ToolOutput};
use scout::LLMClient;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

pub fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: arguments.to_string(),
    }
}

// ============= Session backend =============

/// Session backend that replays a fixed sequence of run states.
///
/// Each `fetch_run` pops the next scripted run. Once the script is exhausted
/// the last run is repeated, which is how a terminal run behaves on a real
/// backend.
pub struct ScriptedSessionBackend {
    script: Mutex<VecDeque<Run>>,
    last: Mutex<Option<Run>>,
    reply: String,
    pub posted: Mutex<Vec<String>>,
    pub submitted: Mutex<Vec<Vec<ToolOutput>>>,
    pub runs_created: Mutex<Vec<(String, Vec<String>, ModelParams)>>,
    pub fetches: Mutex<u32>,
    pub cancelled: Mutex<Vec<String>>,
    fail_submit: bool,
}

impl ScriptedSessionBackend {
    pub fn new(script: Vec<Run>, reply: &str) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            reply: reply.to_string(),
            posted: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            runs_created: Mutex::new(Vec::new()),
            fetches: Mutex::new(0),
            cancelled: Mutex::new(Vec::new()),
            fail_submit: false,
        }
    }

    /// Every `submit_tool_outputs` call fails with a transport error.
    pub fn with_failing_submit(mut self) -> Self {
        self.fail_submit = true;
        self
    }

    /// A run that stays `in_progress` forever.
    pub fn never_settles() -> Self {
        Self::new(vec![Run::new("run_stuck", RunStatus::InProgress)], "")
    }

    pub fn fetch_count(&self) -> u32 {
        *self.fetches.lock().unwrap()
    }

    pub fn submissions(&self) -> Vec<Vec<ToolOutput>> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn posted_messages(&self) -> Vec<String> {
        self.posted.lock().unwrap().clone()
    }

    pub fn cancelled_runs(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionBackend for ScriptedSessionBackend {
    async fn create_session(&self) -> Result<Session> {
        Ok(Session {
            id: "thread_test".to_string(),
            created_at: Utc::now(),
        })
    }

    async fn post_user_message(&self, _session: &Session, text: &str) -> Result<()> {
        self.posted.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn latest_assistant_reply(&self, _session: &Session) -> Result<String> {
        Ok(self.reply.clone())
    }

    async fn create_run(
        &self,
        _session: &Session,
        instructions: &str,
        tools: &[ToolDefinition],
        params: &ModelParams,
    ) -> Result<Run> {
        let names = tools.iter().map(|t| t.name.clone()).collect();
        self.runs_created
            .lock()
            .unwrap()
            .push((instructions.to_string(), names, params.clone()));
        let id = self
            .script
            .lock()
            .unwrap()
            .front()
            .map(|r| r.id.clone())
            .unwrap_or_else(|| "run_1".to_string());
        Ok(Run::new(id, RunStatus::Queued))
    }

    async fn fetch_run(&self, _session: &Session, _run_id: &str) -> Result<Run> {
        *self.fetches.lock().unwrap() += 1;
        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(run) => {
                *last = Some(run.clone());
                Ok(run)
            }
            None => last
                .clone()
                .ok_or_else(|| AppError::Session("no scripted run".to_string())),
        }
    }

    async fn submit_tool_outputs(
        &self,
        _session: &Session,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run> {
        if self.fail_submit {
            return Err(AppError::Session("connection reset".to_string()));
        }
        self.submitted.lock().unwrap().push(outputs.to_vec());
        Ok(Run::new(run_id, RunStatus::Queued))
    }

    /// The next fetch reports the run as cancelled; the rest of the script is kept.
    async fn cancel_run(&self, _session: &Session, run_id: &str) -> Result<Run> {
        self.cancelled.lock().unwrap().push(run_id.to_string());
        self.script
            .lock()
            .unwrap()
            .push_front(Run::new(run_id, RunStatus::Cancelled));
        Ok(Run::new(run_id, RunStatus::Cancelling))
    }
}

// ============= LLM client =============

/// LLM client that answers from a queue and records every prompt it saw.
pub struct ScriptedLLMClient {
    replies: Mutex<VecDeque<String>>,
    pub prompts: Mutex<Vec<String>>,
    pub models: Mutex<Vec<String>>,
}

impl ScriptedLLMClient {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
            models: Mutex::new(Vec::new()),
        }
    }

    pub fn prompt(&self, index: usize) -> String {
        self.prompts.lock().unwrap()[index].clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LLMClient for ScriptedLLMClient {
    async fn complete(&self, _system: &str, prompt: &str, model: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.models.lock().unwrap().push(model.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::LLM("no scripted reply left".to_string()))
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

// ============= Search backend =============

/// Search backend serving canned hits per query.
///
/// Unknown queries fail; queries listed in `slow` take `delay` before answering.
pub struct CannedSearchBackend {
    hits: HashMap<String, Vec<SearchHit>>,
    slow: Vec<String>,
    delay: Duration,
    pub queries: Mutex<Vec<String>>,
}

impl CannedSearchBackend {
    pub fn new() -> Self {
        Self {
            hits: HashMap::new(),
            slow: Vec::new(),
            delay: Duration::ZERO,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_hits(mut self, query: &str, hits: &[(&str, &str, &str)]) -> Self {
        let hits = hits
            .iter()
            .map(|(title, url, snippet)| SearchHit {
                title: title.to_string(),
                url: url.to_string(),
                snippet: snippet.to_string(),
            })
            .collect();
        self.hits.insert(query.to_string(), hits);
        self
    }

    pub fn with_slow(mut self, query: &str, delay: Duration) -> Self {
        self.slow.push(query.to_string());
        self.delay = delay;
        self
    }
}

#[async_trait]
impl SearchBackend for CannedSearchBackend {
    fn name(&self) -> &str {
        "canned"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.slow.iter().any(|q| q == query) {
            tokio::time::sleep(self.delay).await;
        }
        self.hits
            .get(query)
            .cloned()
            .ok_or_else(|| AppError::Search(format!("backend unavailable for '{}'", query)))
    }
}
