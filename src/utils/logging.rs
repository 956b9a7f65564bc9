//! Tracing setup driven by the verbosity knob
//!
//! | verbosity | default filter  | what shows up                    |
//! |-----------|-----------------|----------------------------------|
//! | 0         | `warn`          | warnings and errors only         |
//! | 1         | `scout=info`    | runs created, tools called       |
//! | 2         | `scout=debug`   | full tool arguments and outputs  |
//!
//! `RUST_LOG` wins over the verbosity when set.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "scout=info,warn",
        _ => "scout=debug,info",
    }
}

/// Install the global subscriber. Logs go to stderr so replies on stdout stay clean.
pub fn init_tracing(verbosity: u8, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    // A subscriber may already be installed (tests).
    let _ = result;
}
