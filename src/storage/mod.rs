//! # Storage Layer
//!
//! File-backed data layer around the hierarchy engine.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Codelist document | JSON | `codelist.json` (or `--file`) |
//! | Project config | TOML | `codelist.toml` next to the document |
//! | Global config | TOML | `~/.config/codelist-cli/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`DocumentStore`] takes a shared lock (`fs2`) for reads and an
//!   exclusive lock for writes
//! - Writes are atomic (temp file + rename)
//!
//! ## Key Types
//!
//! - [`Workspace`] - Entry point: an opened document plus its engine state
//! - [`DocumentStore`] - Read/write codelist documents as JSON
//! - [`Config`] - Project and global configuration

mod config;
mod document;
mod workspace;

pub use config::{Config, ConfigError, GlobalConfig, ProjectConfig, TreeConfig, PROJECT_CONFIG};
pub use document::{CodelistDocument, DocumentStore, DEFAULT_DOCUMENT, DEFAULT_SECTION_TITLE};
pub use workspace::Workspace;
