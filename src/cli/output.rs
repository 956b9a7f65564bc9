//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for Scout. Everything the
//! interaction loop prints goes through a `Write` so it can be captured.

use owo_colors::OwoColorize;

/// Output style configuration
#[derive(Debug, Clone, Copy)]
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    pub fn banner(&self) -> String {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            format!(
                "{} {}\n",
                "Scout".bright_cyan().bold(),
                version.dimmed()
            )
        } else {
            format!("Scout {}\n", version)
        }
    }

    /// Prompt shown before each line in continuous mode.
    pub fn prompt(&self) -> String {
        if self.colored {
            format!(
                "{}\n{} ",
                "Type 'exit' to exit the program.".dimmed(),
                "Your request:".bright_white().bold()
            )
        } else {
            "Type 'exit' to exit the program.\nYour request: ".to_string()
        }
    }

    pub fn reply(&self, text: &str) -> String {
        if self.colored {
            format!("{}\n{}\n", "Assistant:".green().bold(), text)
        } else {
            format!("Assistant:\n{}\n", text)
        }
    }

    pub fn error(&self, message: &str) -> String {
        if self.colored {
            format!("  {} {}\n", "✗".red().bold(), message.red())
        } else {
            format!("  [ERROR] {}\n", message)
        }
    }

    pub fn info(&self, message: &str) -> String {
        if self.colored {
            format!("  {} {}\n", "•".blue(), message)
        } else {
            format!("  [INFO] {}\n", message)
        }
    }
}
