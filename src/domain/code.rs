//! Concept codes and paths
//!
//! A [`Code`] names one concept in the hierarchy. A [`ConceptPath`] names one
//! concrete walk from a root concept down to a descendant, e.g. `a:b:e`.
//! Paths, not codes, address visibility state: a concept with two parents
//! can be shown under one and hidden under the other.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between codes in a [`ConceptPath`]
pub const PATH_DELIMITER: char = ':';

#[derive(Debug, Error, PartialEq)]
pub enum CodeError {
    #[error("Concept code must not be empty")]
    Empty,

    #[error("Concept code must not contain '{delim}': '{0}'", delim = PATH_DELIMITER)]
    ContainsDelimiter(String),

    #[error("Invalid concept path: '{0}'")]
    InvalidPath(String),
}

/// An opaque concept code, e.g. a SNOMED-CT identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Code(String);

impl Code {
    /// Parses a code, trimming whitespace and rejecting empty values and
    /// the path delimiter
    pub fn new(code: impl Into<String>) -> Result<Self, CodeError> {
        let mut code = code.into();
        let trimmed = code.trim();
        if trimmed.len() != code.len() {
            code = trimmed.to_string();
        }
        if code.is_empty() {
            return Err(CodeError::Empty);
        }
        if code.contains(PATH_DELIMITER) {
            return Err(CodeError::ContainsDelimiter(code));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Code {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Code {
    type Error = CodeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Code> for String {
    fn from(code: Code) -> Self {
        code.0
    }
}

impl Borrow<str> for Code {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Code {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A root-to-node walk through the hierarchy, rendered as `root:child:...`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConceptPath(String);

impl ConceptPath {
    /// The single-element path for a root concept
    pub fn root(code: &Code) -> Self {
        Self(code.as_str().to_string())
    }

    /// Extends this path by one child
    pub fn child(&self, code: &Code) -> Self {
        Self(format!("{}{}{}", self.0, PATH_DELIMITER, code))
    }

    /// The code at the end of the path
    pub fn leaf(&self) -> &str {
        self.0
            .rsplit(PATH_DELIMITER)
            .next()
            .unwrap_or(self.0.as_str())
    }

    /// Number of edges walked: 0 for a root path
    pub fn depth(&self) -> usize {
        self.0.matches(PATH_DELIMITER).count()
    }

    /// Codes along the path, root first
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(PATH_DELIMITER)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConceptPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ConceptPath {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.split(PATH_DELIMITER).any(str::is_empty) {
            return Err(CodeError::InvalidPath(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for ConceptPath {
    type Error = CodeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ConceptPath> for String {
    fn from(path: ConceptPath) -> Self {
        path.0
    }
}

impl Borrow<str> for ConceptPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}
