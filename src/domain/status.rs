//! Concept statuses
//!
//! Every concept in a hierarchy carries exactly one [`Status`]. Explicit
//! statuses come from user decisions; the rest are derived by propagating
//! those decisions down the hierarchy.
//!
//! | Status | Token | Meaning |
//! |--------|-------|---------|
//! | `Included` | `+` | explicitly included |
//! | `Excluded` | `-` | explicitly excluded |
//! | `IncludedInherited` | `(+)` | included via an ancestor |
//! | `ExcludedInherited` | `(-)` | excluded via an ancestor |
//! | `Conflict` | `!` | ancestors disagree |
//! | `Unresolved` | `?` | no decision applies |

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::code::Code;

#[derive(Debug, Error, PartialEq)]
pub enum StatusError {
    #[error("Unknown status '{0}': expected one of +, -, (+), (-), !, ?")]
    UnknownToken(String),

    #[error("'{0}' is not a decision: expected + or -")]
    NotADecision(String),
}

/// Effective status of a concept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "+")]
    Included,
    #[serde(rename = "-")]
    Excluded,
    #[serde(rename = "(+)")]
    IncludedInherited,
    #[serde(rename = "(-)")]
    ExcludedInherited,
    #[serde(rename = "!")]
    Conflict,
    #[serde(rename = "?")]
    Unresolved,
}

/// The decision-independent group a status belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusFamily {
    Included,
    Excluded,
    Conflict,
    Unresolved,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Included,
        Status::Excluded,
        Status::IncludedInherited,
        Status::ExcludedInherited,
        Status::Conflict,
        Status::Unresolved,
    ];

    /// Short token used on the wire and in tree rows
    pub fn symbol(&self) -> &'static str {
        match self {
            Status::Included => "+",
            Status::Excluded => "-",
            Status::IncludedInherited => "(+)",
            Status::ExcludedInherited => "(-)",
            Status::Conflict => "!",
            Status::Unresolved => "?",
        }
    }

    pub fn family(&self) -> StatusFamily {
        match self {
            Status::Included | Status::IncludedInherited => StatusFamily::Included,
            Status::Excluded | Status::ExcludedInherited => StatusFamily::Excluded,
            Status::Conflict => StatusFamily::Conflict,
            Status::Unresolved => StatusFamily::Unresolved,
        }
    }

    /// Returns true if this status comes from a user decision
    pub fn is_explicit(&self) -> bool {
        matches!(self, Status::Included | Status::Excluded)
    }

    /// Returns true if a concept with this status belongs in the codelist
    pub fn is_included(&self) -> bool {
        self.family() == StatusFamily::Included
    }

    /// Returns true if a descendant showing `other` tells the reader nothing
    /// beyond what a node showing `self` already does.
    ///
    /// An explicit status covers both statuses of its family; every other
    /// status covers only itself. So `+` covers `(+)`, but `(+)` does not
    /// cover `+`.
    pub fn covers(&self, other: Status) -> bool {
        *self == other || (self.is_explicit() && self.family() == other.family())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Status {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Status::ALL
            .into_iter()
            .find(|status| status.symbol() == s)
            .ok_or_else(|| StatusError::UnknownToken(s.to_string()))
    }
}

/// A user decision on a single concept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Include,
    Exclude,
}

impl Decision {
    /// The explicit status this decision assigns
    pub fn status(&self) -> Status {
        match self {
            Decision::Include => Status::Included,
            Decision::Exclude => Status::Excluded,
        }
    }
}

impl FromStr for Decision {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" | "include" => Ok(Decision::Include),
            "-" | "exclude" => Ok(Decision::Exclude),
            other => Err(StatusError::NotADecision(other.to_string())),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status().symbol())
    }
}

/// Status of every concept in a hierarchy, keyed by code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusMap(HashMap<Code, Status>);

impl StatusMap {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Looks up the status for a code; absent codes yield `None`
    pub fn get(&self, code: &str) -> Option<Status> {
        self.0.get(code).copied()
    }

    pub fn insert(&mut self, code: Code, status: Status) -> Option<Status> {
        self.0.insert(code, status)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Code, Status)> {
        self.0.iter().map(|(code, status)| (code, *status))
    }

    /// Entries whose status differs from `previous`, sorted by code.
    ///
    /// This is the delta a persistence layer needs to store after an update.
    pub fn changes_since(&self, previous: &StatusMap) -> Vec<(Code, Status)> {
        let mut changes: Vec<_> = self
            .iter()
            .filter(|(code, status)| previous.get(code.as_str()) != Some(*status))
            .map(|(code, status)| (code.clone(), status))
            .collect();
        changes.sort_by(|a, b| a.0.cmp(&b.0));
        changes
    }

    /// Codes that end up in the codelist (`+` or `(+)`), sorted
    pub fn included_codes(&self) -> Vec<&Code> {
        let mut codes: Vec<_> = self
            .iter()
            .filter(|(_, status)| status.is_included())
            .map(|(code, _)| code)
            .collect();
        codes.sort();
        codes
    }

    /// Number of concepts per status
    pub fn counts(&self) -> BTreeMap<Status, usize> {
        let mut counts = BTreeMap::new();
        for (_, status) in self.iter() {
            *counts.entry(status).or_insert(0) += 1;
        }
        counts
    }
}

impl FromIterator<(Code, Status)> for StatusMap {
    fn from_iter<I: IntoIterator<Item = (Code, Status)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
