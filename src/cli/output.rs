//! Output formatting for CLI commands

use serde::{Deserialize, Serialize};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Prints `data` as a JSON line, or runs `text` to print the
    /// human-readable form
    pub fn emit<T: Serialize>(&self, data: &T, text: impl FnOnce()) {
        match self.format {
            OutputFormat::Text => text(),
            OutputFormat::Json => match serde_json::to_string(data) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Error: failed to serialize output: {}", e),
            },
        }
    }

    /// Prints a verbose debug message (only when --verbose is set)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Prints a verbose debug message with context (only when --verbose is set)
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}
