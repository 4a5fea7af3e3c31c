//! Status resolution
//!
//! Derives a concept's effective status from the explicit include/exclude
//! decisions and the hierarchy:
//!
//! 1. An explicit decision on the concept itself always wins.
//! 2. Otherwise only the *significant* decided ancestors count: a decided
//!    ancestor is dropped when another decided ancestor sits below it, since
//!    the closer decision overrides it.
//! 3. Significant included ancestors alone give `(+)`, excluded alone give
//!    `(-)`, both give `!`, none give `?`.

use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use super::code::Code;
use super::graph::{Hierarchy, HierarchyError};
use super::status::{Decision, Status, StatusMap};

/// The explicit include/exclude decisions; a code is in at most one set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decisions {
    included: HashSet<Code>,
    excluded: HashSet<Code>,
}

impl Decisions {
    pub fn new(
        included: impl IntoIterator<Item = Code>,
        excluded: impl IntoIterator<Item = Code>,
    ) -> Self {
        let mut decisions = Self::default();
        for code in included {
            decisions.apply(code, Decision::Include);
        }
        for code in excluded {
            decisions.apply(code, Decision::Exclude);
        }
        decisions
    }

    /// Collects the concepts currently marked `+` or `-`
    pub fn from_status_map(statuses: &StatusMap) -> Self {
        let mut decisions = Self::default();
        for (code, status) in statuses.iter() {
            match status {
                Status::Included => decisions.apply(code.clone(), Decision::Include),
                Status::Excluded => decisions.apply(code.clone(), Decision::Exclude),
                _ => {}
            }
        }
        decisions
    }

    /// Records a decision, replacing any earlier decision on the same code
    pub fn apply(&mut self, code: Code, decision: Decision) {
        match decision {
            Decision::Include => {
                self.excluded.remove(&code);
                self.included.insert(code);
            }
            Decision::Exclude => {
                self.included.remove(&code);
                self.excluded.insert(code);
            }
        }
    }

    /// Forgets any decision on the code
    pub fn remove(&mut self, code: &str) {
        self.included.remove(code);
        self.excluded.remove(code);
    }

    pub fn decision_for(&self, code: &str) -> Option<Decision> {
        if self.included.contains(code) {
            Some(Decision::Include)
        } else if self.excluded.contains(code) {
            Some(Decision::Exclude)
        } else {
            None
        }
    }

    pub fn included(&self) -> impl Iterator<Item = &Code> {
        self.included.iter()
    }

    pub fn excluded(&self) -> impl Iterator<Item = &Code> {
        self.excluded.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.included.is_empty() && self.excluded.is_empty()
    }
}

/// Decided ancestors not overridden by a closer decision, each sorted by code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignificantAncestors {
    pub included: Vec<Code>,
    pub excluded: Vec<Code>,
}

impl SignificantAncestors {
    pub fn is_empty(&self) -> bool {
        self.included.is_empty() && self.excluded.is_empty()
    }
}

/// Why a concept has the status it has
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub code: Code,
    pub status: Status,
    pub ancestors: SignificantAncestors,
}

fn join_codes(codes: &[Code]) -> String {
    let label = if codes.len() == 1 { "ancestor" } else { "ancestors" };
    let joined = codes
        .iter()
        .map(Code::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} {}", label, joined)
}

fn verb(codes: &[Code]) -> &'static str {
    if codes.len() == 1 {
        "is"
    } else {
        "are"
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let included = &self.ancestors.included;
        let excluded = &self.ancestors.excluded;

        match self.status {
            Status::Included => write!(f, "{} is included", self.code),
            Status::Excluded => write!(f, "{} is excluded", self.code),
            Status::IncludedInherited => write!(
                f,
                "{} is included because {} {} included",
                self.code,
                join_codes(included),
                verb(included)
            ),
            Status::ExcludedInherited => write!(
                f,
                "{} is excluded because {} {} excluded",
                self.code,
                join_codes(excluded),
                verb(excluded)
            ),
            Status::Conflict => write!(
                f,
                "{} is in conflict: {} {} included but {} {} excluded",
                self.code,
                join_codes(included),
                verb(included),
                join_codes(excluded),
                verb(excluded)
            ),
            Status::Unresolved => write!(
                f,
                "{} is unresolved: no ancestor is included or excluded",
                self.code
            ),
        }
    }
}

impl Hierarchy {
    /// Computes the effective status of one concept
    pub fn status_of(&self, code: &str, decisions: &Decisions) -> Status {
        if let Some(decision) = decisions.decision_for(code) {
            return decision.status();
        }

        let significant = self.significant_ancestors(code, decisions);
        match (
            significant.included.is_empty(),
            significant.excluded.is_empty(),
        ) {
            (true, true) => Status::Unresolved,
            (false, true) => Status::IncludedInherited,
            (true, false) => Status::ExcludedInherited,
            (false, false) => Status::Conflict,
        }
    }

    /// Returns the decided ancestors of `code` that no closer decided
    /// ancestor overrides
    pub fn significant_ancestors(&self, code: &str, decisions: &Decisions) -> SignificantAncestors {
        let idx = match self.index(code) {
            Some(idx) => idx,
            None => return SignificantAncestors::default(),
        };

        let decided: Vec<(NodeIndex, Decision)> = self
            .ancestor_indices(idx)
            .iter()
            .filter_map(|a| {
                decisions
                    .decision_for(self.code(*a).as_str())
                    .map(|decision| (*a, decision))
            })
            .collect();

        let mut significant = SignificantAncestors::default();
        for &(ancestor, decision) in &decided {
            let below = self.descendant_indices(ancestor);
            let overridden = decided.iter().any(|(other, _)| below.contains(other));
            if overridden {
                continue;
            }

            let code = self.code(ancestor).clone();
            match decision {
                Decision::Include => significant.included.push(code),
                Decision::Exclude => significant.excluded.push(code),
            }
        }

        significant.included.sort();
        significant.excluded.sort();
        significant
    }

    /// Computes the status of every concept from scratch
    pub fn resolve_all(&self, decisions: &Decisions) -> StatusMap {
        self.nodes()
            .map(|code| (code.clone(), self.status_of(code.as_str(), decisions)))
            .collect()
    }

    /// Explains a concept's status in terms of its significant ancestors
    pub fn explain(&self, code: &str, decisions: &Decisions) -> Result<Explanation, HierarchyError> {
        let idx = self
            .index(code)
            .ok_or_else(|| HierarchyError::UnknownConcept(code.to_string()))?;

        let status = self.status_of(code, decisions);
        let ancestors = if status.is_explicit() {
            SignificantAncestors::default()
        } else {
            self.significant_ancestors(code, decisions)
        };

        Ok(Explanation {
            code: self.code(idx).clone(),
            status,
            ancestors,
        })
    }
}
