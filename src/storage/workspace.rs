//! Workspace management
//!
//! Opens a codelist document together with its configuration and builds
//! the engine state the commands operate on.

use std::path::PathBuf;

use anyhow::{Context, Result};

use super::{CodelistDocument, Config, DocumentStore};
use crate::domain::{Hierarchy, StatusMap};

/// An opened codelist document
pub struct Workspace {
    store: DocumentStore,
    config: Config,
    document: CodelistDocument,
    hierarchy: Hierarchy,
    statuses: StatusMap,
}

impl Workspace {
    /// Opens the document at `path`, validating its hierarchy
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = DocumentStore::new(path);
        let config = Config::for_project(store.dir())?;
        let document = store.read()?;

        let hierarchy = document.hierarchy();
        hierarchy
            .validate()
            .with_context(|| format!("Invalid hierarchy in {}", store.path().display()))?;

        let statuses = document.complete_statuses(&hierarchy);

        Ok(Self {
            store,
            config,
            document,
            hierarchy,
            statuses,
        })
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document(&self) -> &CodelistDocument {
        &self.document
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Status of every concept
    pub fn statuses(&self) -> &StatusMap {
        &self.statuses
    }

    /// Replaces the status map and writes the document
    pub fn save_statuses(&mut self, statuses: StatusMap) -> Result<()> {
        self.document.statuses = statuses.clone();
        self.store.write(&self.document)?;
        self.statuses = statuses;
        Ok(())
    }
}
