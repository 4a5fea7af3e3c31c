//! # Command-Line Interface
//!
//! User-facing commands over a codelist document.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `check` | Validate the hierarchy, count statuses |
//! | `status <code>` | Show a concept's status |
//! | `explain <code>` | Explain a status via significant ancestors |
//! | `set <code> <+\|->` | Include or exclude a concept |
//! | `codes` | List the codes in the codelist |
//! | `tree` | Show the collapsible tree view |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! codelist --verbose tree --depth 1
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod concept;
mod tree;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
