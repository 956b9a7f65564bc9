//! CLI module for Scout
//!
//! Argument parsing for the `scout` binary. Uses clap for parsing and
//! owo-colors (in [`output`]) for colored terminal output. Flags override
//! the matching `scout.toml` keys.

pub mod interactive;
pub mod output;

use crate::utils::config::{Mode, ScoutConfig, SearchBackendKind};
use crate::utils::logging::LogFormat;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Scout - a tool-calling assistant with web search
#[derive(Parser, Debug)]
#[command(
    name = "scout",
    version,
    about = "Scout - a tool-calling assistant with web search",
    long_about = "Scout drives an assistant that may call tools (web search, arithmetic) while\n\
                  answering. Give a message to ask once, or use --mode continuous for a\n\
                  conversation that keeps going until you type 'exit'.",
    after_help = "EXAMPLES:\n    \
                  scout \"What is the population of Paris?\"\n    \
                  scout --mode continuous -v\n    \
                  scout --search-backend bing --model gpt-4o \"Latest Rust release?\""
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "scout.toml")]
    pub config: PathBuf,

    /// Increase verbosity (-v logs tool calls, -vv logs full payloads)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Interaction mode
    #[arg(short, long, value_enum)]
    pub mode: Option<Mode>,

    /// Model identifier
    #[arg(long)]
    pub model: Option<String>,

    /// Sampling temperature (0.0 - 2.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Nucleus sampling (0.0 - 1.0)
    #[arg(long)]
    pub top_p: Option<f32>,

    #[arg(long)]
    pub max_prompt_tokens: Option<u32>,

    #[arg(long)]
    pub max_completion_tokens: Option<u32>,

    /// Instructions given to the assistant for every run
    #[arg(long)]
    pub system_prompt: Option<String>,

    /// Web search backend
    #[arg(long, value_enum)]
    pub search_backend: Option<SearchBackendKind>,

    /// Log format
    #[arg(long, value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Message to send (punctual mode)
    pub message: Vec<String>,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Message words joined back together, if any were given.
    pub fn message(&self) -> Option<String> {
        let message = self.message.join(" ");
        let message = message.trim();
        (!message.is_empty()).then(|| message.to_string())
    }

    /// Write flag values over the loaded configuration.
    pub fn apply_overrides(&self, config: &mut ScoutConfig) {
        if let Some(model) = &self.model {
            config.model.model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            config.model.temperature = temperature;
        }
        if let Some(top_p) = self.top_p {
            config.model.top_p = top_p;
        }
        if let Some(tokens) = self.max_prompt_tokens {
            config.model.max_prompt_tokens = tokens;
        }
        if let Some(tokens) = self.max_completion_tokens {
            config.model.max_completion_tokens = tokens;
        }
        if let Some(prompt) = &self.system_prompt {
            config.model.system_prompt = prompt.clone();
        }
        if let Some(backend) = self.search_backend {
            config.search.backend = backend;
        }
        if let Some(mode) = self.mode {
            config.output.mode = mode;
        }
        if self.verbose > 0 {
            config.output.verbosity = self.verbose.min(2);
        }
    }
}
