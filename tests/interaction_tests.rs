//! Punctual and continuous interaction tests

mod common;

use common::mocks::{tool_call, ScriptedSessionBackend};
use scout::cli::output::Output;
use scout::session::{DriverConfig, ModelParams, ToolCallingDriver};
use scout::tools::Adder;
use scout::types::{AppError, Run, RunStatus};
use scout::{InteractionLoop, ToolRegistry};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn driver() -> ToolCallingDriver {
    let registry = ToolRegistry::new().with(Arc::new(Adder)).unwrap();
    ToolCallingDriver::new(Arc::new(registry), "", ModelParams::new("gpt-test")).with_config(
        DriverConfig {
            poll_interval: Duration::from_millis(1),
            max_polls: 20,
            ..DriverConfig::default()
        },
    )
}

async fn interaction(backend: &Arc<ScriptedSessionBackend>) -> InteractionLoop {
    InteractionLoop::start(backend.clone(), driver(), Output::no_color())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_hello_then_exit_runs_one_turn() {
    let backend = Arc::new(ScriptedSessionBackend::new(
        vec![Run::new("run_1", RunStatus::Completed)],
        "Hello! How can I help?",
    ));
    let interaction = interaction(&backend).await;

    let mut out = Vec::new();
    let turns = interaction
        .run_interactive(Cursor::new("hello\nexit\n"), &mut out, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(turns, 1);
    assert_eq!(backend.posted_messages(), vec!["hello"]);
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Assistant:\nHello! How can I help?\n"));
    assert_eq!(printed.matches("Your request: ").count(), 2);
}

#[tokio::test]
async fn test_exit_is_case_insensitive_and_blank_lines_skipped() {
    let backend = Arc::new(ScriptedSessionBackend::new(
        vec![Run::new("run_1", RunStatus::Completed)],
        "unused",
    ));
    let interaction = interaction(&backend).await;

    let mut out = Vec::new();
    let turns = interaction
        .run_interactive(Cursor::new("\n   \nEXIT\nhello\n"), &mut out, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(turns, 0);
    assert!(backend.posted_messages().is_empty());
}

#[tokio::test]
async fn test_end_of_input_stops_loop() {
    let backend = Arc::new(ScriptedSessionBackend::new(
        vec![Run::new("run_1", RunStatus::Completed)],
        "hi",
    ));
    let interaction = interaction(&backend).await;

    let mut out = Vec::new();
    let turns = interaction
        .run_interactive(Cursor::new("hello"), &mut out, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(turns, 1);
}

#[tokio::test]
async fn test_failed_turn_keeps_loop_alive() {
    let backend = Arc::new(ScriptedSessionBackend::new(
        vec![
            Run::new("run_1", RunStatus::Failed).with_error("rate_limit_exceeded: slow down"),
            Run::new("run_1", RunStatus::Completed),
        ],
        "second try worked",
    ));
    let interaction = interaction(&backend).await;

    let mut out = Vec::new();
    let turns = interaction
        .run_interactive(
            Cursor::new("first\nsecond\nexit\n"),
            &mut out,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(turns, 2);
    assert_eq!(backend.posted_messages(), vec!["first", "second"]);
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("[ERROR] Run run_1 failed: rate_limit_exceeded: slow down"));
    assert!(printed.contains("second try worked"));
}

#[tokio::test]
async fn test_run_once_returns_reply() {
    let backend = Arc::new(ScriptedSessionBackend::new(
        vec![
            Run::requiring(
                "run_1",
                vec![tool_call("call_1", "adder", json!({"a": 2, "b": 3}))],
            ),
            Run::new("run_1", RunStatus::Completed),
        ],
        "5",
    ));
    let interaction = interaction(&backend).await;

    let reply = interaction
        .run_once("what is 2 plus 3?", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(reply, "5");
    assert_eq!(backend.posted_messages().len(), 1);
    assert_eq!(interaction.conversation().id(), "thread_test");
}

#[tokio::test]
async fn test_cancelled_loop_runs_nothing() {
    let backend = Arc::new(ScriptedSessionBackend::new(
        vec![Run::new("run_1", RunStatus::Completed)],
        "hi",
    ));
    let interaction = interaction(&backend).await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut out = Vec::new();
    let turns = interaction
        .run_interactive(Cursor::new("hello\n"), &mut out, &cancel)
        .await
        .unwrap();

    assert_eq!(turns, 0);
    assert!(matches!(
        interaction.run_once("hello", &cancel).await,
        Err(AppError::Cancelled)
    ));
}

#[tokio::test]
async fn test_timed_out_turn_frees_conversation_for_next_turn() {
    let mut script = vec![Run::new("run_1", RunStatus::InProgress); 20];
    script.push(Run::new("run_1", RunStatus::Completed));
    let backend = Arc::new(ScriptedSessionBackend::new(script, "finally"));
    let interaction = interaction(&backend).await;

    let mut out = Vec::new();
    let turns = interaction
        .run_interactive(
            Cursor::new("first\nsecond\nexit\n"),
            &mut out,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(turns, 2);
    assert_eq!(backend.cancelled_runs(), vec!["run_1"]);
    assert_eq!(backend.posted_messages(), vec!["first", "second"]);
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Run run_1 timed out after 20 polls"));
    assert!(printed.contains("Assistant:\nfinally\n"));
}

#[tokio::test]
async fn test_respond_prints_failed_turn_and_continues() {
    let backend = Arc::new(ScriptedSessionBackend::new(
        vec![
            Run::new("run_1", RunStatus::Failed).with_error("server_error: try again"),
            Run::new("run_1", RunStatus::Completed),
        ],
        "recovered",
    ));
    let interaction = interaction(&backend).await;
    let cancel = CancellationToken::new();

    let mut out = Vec::new();
    assert!(interaction.respond("first", &mut out, &cancel).await.unwrap());
    let printed = String::from_utf8(out.clone()).unwrap();
    assert!(printed.contains("[ERROR] Run run_1 failed: server_error: try again"));

    let turns = interaction
        .run_interactive(Cursor::new("second\nexit\n"), &mut out, &cancel)
        .await
        .unwrap();
    assert_eq!(turns, 1);
    assert!(String::from_utf8(out).unwrap().contains("recovered"));
}

#[tokio::test]
async fn test_respond_stops_after_cancellation() {
    let backend = Arc::new(ScriptedSessionBackend::never_settles());
    let interaction = interaction(&backend).await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut out = Vec::new();
    let keep_going = interaction.respond("hello", &mut out, &cancel).await.unwrap();

    assert!(!keep_going);
    assert!(String::from_utf8(out).unwrap().contains("Cancelled"));
}
