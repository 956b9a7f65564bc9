//! Scout CLI Entry Point
//!
//! - `scout <message>` - ask once and print the reply (punctual mode)
//! - `scout --mode continuous` - keep the conversation going until `exit`

use anyhow::Context;
use owo_colors::OwoColorize;
use scout::{
    cli::{output::Output, Cli},
    llm::OpenAIClient,
    session::AssistantsBackend,
    tools::{Adder, Calculator, SearchTool},
    utils::{config::Mode, logging::init_tracing},
    InteractionLoop, ScoutConfig, ToolCallingDriver, ToolRegistry,
};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let mut config = ScoutConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    init_tracing(config.output.verbosity, cli.log_format);

    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let api_key = config.model.api_key()?;
    let llm = Arc::new(OpenAIClient::new(
        &api_key,
        config.model.api_base.clone(),
        config.search_model(),
    )?);
    let search_backend = config.search.build_backend()?;
    info!(backend = search_backend.name(), "Search backend ready");

    let search = SearchTool::new(llm, search_backend)
        .with_model(config.search_model())
        .with_query_timeout(config.search.query_timeout());
    let registry = ToolRegistry::new()
        .with(Arc::new(search))?
        .with(Arc::new(Adder))?
        .with(Arc::new(Calculator))?;

    let driver = ToolCallingDriver::new(
        Arc::new(registry),
        config.model.system_prompt.clone(),
        config.model_params(),
    )
    .with_config(config.driver_config());

    let backend = Arc::new(AssistantsBackend::new(&api_key, config.model.api_base.clone())?);
    let interaction = InteractionLoop::start(backend, driver, output).await?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
        // Second interrupt while blocked on stdin.
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });

    match config.output.mode {
        Mode::Punctual => {
            let message = match cli.message() {
                Some(message) => message,
                None => read_message(&output)?,
            };
            let reply = interaction.run_once(&message, &cancel).await?;
            println!("{}", reply);
        }
        Mode::Continuous => {
            print!("{}", output.banner());
            let mut stdout = io::stdout();
            let keep_going = match cli.message() {
                Some(first) => interaction.respond(&first, &mut stdout, &cancel).await?,
                None => true,
            };
            if keep_going {
                let stdin = io::stdin();
                let turns = interaction
                    .run_interactive(stdin.lock(), &mut stdout, &cancel)
                    .await?;
                info!(turns, "Conversation ended");
            }
        }
    }

    Ok(())
}

/// Read a single request from stdin when none was passed as arguments.
fn read_message(output: &Output) -> anyhow::Result<String> {
    let mut stdout = io::stdout();
    stdout.write_all(output.prompt().as_bytes())?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let message = line.trim().to_string();
    anyhow::ensure!(!message.is_empty(), "no request given");
    Ok(message)
}
