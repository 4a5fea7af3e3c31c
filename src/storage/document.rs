//! JSON storage for codelist documents
//!
//! A document holds everything the engine needs for one codelist: the
//! hierarchy's adjacency maps, display terms, the current status map and
//! the tree sections to render. Uses file locking for concurrent access
//! safety.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::domain::{Code, Decisions, Hierarchy, StatusMap, TreeSection};

/// Default document file name
pub const DEFAULT_DOCUMENT: &str = "codelist.json";

/// Title of the section used when a document declares none
pub const DEFAULT_SECTION_TITLE: &str = "All concepts";

/// One codelist and the hierarchy it is built from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodelistDocument {
    /// Parents of each concept; derived from `child_map` when empty
    #[serde(default)]
    pub parent_map: HashMap<Code, Vec<Code>>,

    /// Children of each concept
    pub child_map: HashMap<Code, Vec<Code>>,

    /// Display term of each concept
    #[serde(default)]
    pub terms: HashMap<Code, String>,

    /// Current status of each concept
    #[serde(default)]
    pub statuses: StatusMap,

    /// Titled groups of root concepts for tree views
    #[serde(default)]
    pub sections: Vec<TreeSection>,
}

impl CodelistDocument {
    /// Builds the hierarchy index for this document
    pub fn hierarchy(&self) -> Hierarchy {
        if self.parent_map.is_empty() {
            Hierarchy::from_child_map(&self.child_map)
        } else {
            Hierarchy::from_maps(&self.parent_map, &self.child_map)
        }
    }

    /// Returns the stored status map if it covers every concept; otherwise
    /// re-derives a complete map from the explicit decisions it contains
    pub fn complete_statuses(&self, hierarchy: &Hierarchy) -> StatusMap {
        if hierarchy.nodes().all(|code| self.statuses.contains(code.as_str())) {
            return self.statuses.clone();
        }
        hierarchy.resolve_all(&Decisions::from_status_map(&self.statuses))
    }

    /// Declared sections, or a single section over the hierarchy's roots
    pub fn sections_or_default(&self, hierarchy: &Hierarchy) -> Vec<TreeSection> {
        if !self.sections.is_empty() {
            return self.sections.clone();
        }
        vec![TreeSection {
            title: DEFAULT_SECTION_TITLE.to_string(),
            roots: hierarchy.roots().into_iter().cloned().collect(),
        }]
    }
}

/// Store for a codelist document on disk
pub struct DocumentStore {
    path: PathBuf,
}

impl DocumentStore {
    /// Creates a new document store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the document file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the directory holding the document
    pub fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Reads the document
    pub fn read(&self) -> Result<CodelistDocument> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open codelist document: {}", self.path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .context("Failed to acquire read lock on codelist document")?;

        let reader = BufReader::new(&file);
        let document = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse codelist document: {}", self.path.display()))?;

        // Lock is released when file is dropped
        Ok(document)
    }

    /// Writes the document (full rewrite)
    pub fn write(&self, document: &CodelistDocument) -> Result<()> {
        // Ensure parent directory exists
        fs::create_dir_all(self.dir())
            .with_context(|| format!("Failed to create directory: {}", self.dir().display()))?;

        // Round-trip through a Value so map keys come out sorted
        let value = serde_json::to_value(document).context("Failed to serialize codelist document")?;

        // Write to temp file first
        let temp_path = self.path.with_extension("json.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            // Acquire exclusive lock
            file.lock_exclusive()
                .context("Failed to acquire write lock on codelist document")?;

            let mut writer = BufWriter::new(&file);
            serde_json::to_writer_pretty(&mut writer, &value)
                .context("Failed to write codelist document")?;
            writeln!(writer).context("Failed to write codelist document")?;
            writer.flush().context("Failed to flush codelist document")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }
}
