//! Punctual and continuous interaction on top of the driver
//!
//! Punctual mode runs one turn and hands the reply back. Continuous mode reads
//! lines until `exit` (any case) or end of input, running one turn per line.
//! A failed turn is reported and the loop moves on to the next prompt.

use crate::cli::output::Output;
use crate::session::{ConversationSession, SessionBackend, ToolCallingDriver};
use crate::types::{AppError, Result};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const EXIT_SENTINEL: &str = "exit";

pub struct InteractionLoop {
    conversation: ConversationSession,
    driver: ToolCallingDriver,
    output: Output,
}

impl InteractionLoop {
    pub fn new(conversation: ConversationSession, driver: ToolCallingDriver, output: Output) -> Self {
        Self {
            conversation,
            driver,
            output,
        }
    }

    /// Open a fresh conversation on `backend`.
    pub async fn start(
        backend: Arc<dyn SessionBackend>,
        driver: ToolCallingDriver,
        output: Output,
    ) -> Result<Self> {
        let conversation = ConversationSession::create(backend).await?;
        Ok(Self::new(conversation, driver, output))
    }

    pub fn conversation(&self) -> &ConversationSession {
        &self.conversation
    }

    /// Run exactly one turn and return the assistant's reply.
    pub async fn run_once(&self, message: &str, cancel: &CancellationToken) -> Result<String> {
        let turn = self
            .driver
            .run_turn(&self.conversation, message, cancel)
            .await?;
        info!(
            run_id = %turn.run_id,
            tool_rounds = turn.tool_rounds,
            tool_calls = turn.tool_calls.len(),
            "Turn finished"
        );
        Ok(turn.reply)
    }

    /// Run one turn and print its reply. A failed turn is printed instead of
    /// returned. `Ok(false)` means the turn was cancelled and no more should run.
    pub async fn respond<W: Write>(
        &self,
        message: &str,
        out: &mut W,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        match self.run_once(message, cancel).await {
            Ok(reply) => out.write_all(self.output.reply(&reply).as_bytes())?,
            Err(AppError::Cancelled) => {
                out.write_all(self.output.info("Cancelled").as_bytes())?;
                out.flush()?;
                return Ok(false);
            }
            Err(e) if e.is_turn_error() => {
                warn!(error = %e, "Turn failed");
                out.write_all(self.output.error(&e.to_string()).as_bytes())?;
            }
            Err(e) => return Err(e),
        }
        out.flush()?;
        Ok(true)
    }

    /// Prompt, read, answer, repeat. Returns the number of turns executed.
    pub async fn run_interactive<R: BufRead, W: Write>(
        &self,
        mut input: R,
        out: &mut W,
        cancel: &CancellationToken,
    ) -> Result<usize> {
        let mut turns = 0;

        loop {
            if cancel.is_cancelled() {
                break;
            }
            out.write_all(self.output.prompt().as_bytes())?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.eq_ignore_ascii_case(EXIT_SENTINEL) {
                break;
            }

            turns += 1;
            if !self.respond(line, out, cancel).await? {
                break;
            }
        }

        Ok(turns)
    }
}
