//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{concept, tree};
use crate::domain::{Code, ConceptPath, Decision, SortOrder};
use crate::storage::{Workspace, DEFAULT_DOCUMENT};

#[derive(Parser)]
#[command(name = "codelist")]
#[command(author, version, about = "Build clinical codelists over a concept hierarchy")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Codelist document to operate on
    #[arg(long, short = 'F', global = true, env = "CODELIST_FILE", default_value = DEFAULT_DOCUMENT)]
    pub file: PathBuf,

    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate the hierarchy and summarize statuses
    Check,

    /// Show a concept's status
    Status {
        /// Concept code
        code: Code,
    },

    /// Explain why a concept has its status
    Explain {
        /// Concept code
        code: Code,
    },

    /// Include (+) or exclude (-) a concept
    Set {
        /// Concept code
        code: Code,

        /// Decision: + (include) or - (exclude)
        #[arg(allow_hyphen_values = true)]
        decision: Decision,

        /// Show the changes without writing the document
        #[arg(long)]
        dry_run: bool,
    },

    /// List the codes in the codelist
    Codes,

    /// Show the hierarchy as a tree
    Tree {
        /// Only show the section with this title
        #[arg(long)]
        section: Option<String>,

        /// Levels to reveal below a settled concept
        #[arg(long)]
        depth: Option<usize>,

        /// Sibling order: term or code
        #[arg(long)]
        sort: Option<SortOrder>,

        /// Expand or collapse the concept at this path (repeatable)
        #[arg(long = "expand", value_name = "PATH")]
        expand: Vec<ConceptPath>,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let early = Output::new(cli.format.unwrap_or_default(), cli.verbose);
    early.verbose_ctx("open", &format!("Opening codelist document: {}", cli.file.display()));

    let mut workspace = Workspace::open(&cli.file)?;
    let format = cli
        .format
        .unwrap_or(workspace.config().global.default_format);
    let output = Output::new(format, cli.verbose);

    output.verbose_ctx(
        "open",
        &format!(
            "Loaded {} concepts, {} statuses",
            workspace.hierarchy().len(),
            workspace.statuses().len()
        ),
    );

    match cli.command {
        Commands::Check => concept::check(&output, &workspace)?,
        Commands::Status { code } => concept::status(&output, &workspace, &code)?,
        Commands::Explain { code } => concept::explain(&output, &workspace, &code)?,
        Commands::Set {
            code,
            decision,
            dry_run,
        } => {
            output.verbose_ctx("set", &format!("Setting {} to {}, dry_run={}", code, decision, dry_run));
            concept::set(&output, &mut workspace, &code, decision, dry_run)?
        }
        Commands::Codes => concept::codes(&output, &workspace),
        Commands::Tree {
            section,
            depth,
            sort,
            expand,
        } => {
            let options = tree::TreeOptions {
                section,
                depth: depth.unwrap_or(workspace.config().project.tree.max_depth),
                sort: sort.unwrap_or(workspace.config().project.tree.sort),
                expand,
            };
            tree::show(&output, &workspace, &options)?
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}
