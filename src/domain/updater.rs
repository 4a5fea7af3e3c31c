//! Incremental status updates
//!
//! Applying a decision to one concept can only change that concept and its
//! descendants, so only those are recomputed. Decisions have "set"
//! semantics: deciding `+` on a concept that is already `+` changes nothing.

use std::iter;

use super::graph::{Hierarchy, HierarchyError};
use super::resolver::Decisions;
use super::status::{Decision, StatusMap};

impl Hierarchy {
    /// Applies `decision` to `code` and returns the updated status map.
    ///
    /// Entries outside `code` and its descendants are copied unchanged from
    /// `statuses`. Use [`StatusMap::changes_since`] on the result to get the
    /// entries that actually changed.
    pub fn update_statuses(
        &self,
        statuses: &StatusMap,
        code: &str,
        decision: Decision,
    ) -> Result<StatusMap, HierarchyError> {
        let idx = self
            .index(code)
            .ok_or_else(|| HierarchyError::UnknownConcept(code.to_string()))?;

        let mut decisions = Decisions::from_status_map(statuses);
        decisions.remove(code);
        decisions.apply(self.code(idx).clone(), decision);

        let mut updated = statuses.clone();
        let affected = iter::once(idx).chain(self.descendant_indices(idx).iter().copied());
        for node in affected {
            let node_code = self.code(node);
            updated.insert(node_code.clone(), self.status_of(node_code.as_str(), &decisions));
        }

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{decisions, reference_hierarchy, statuses};
    use crate::domain::status::Status;

    fn unresolved() -> StatusMap {
        reference_hierarchy().resolve_all(&Decisions::default())
    }

    #[test]
    fn include_root_includes_everything_below() {
        let hierarchy = reference_hierarchy();
        let updated = hierarchy
            .update_statuses(&unresolved(), "a", Decision::Include)
            .unwrap();

        assert_eq!(updated.get("a"), Some(Status::Included));
        for code in ["b", "c", "d", "e", "f", "g", "h", "i", "j"] {
            assert_eq!(updated.get(code), Some(Status::IncludedInherited), "{}", code);
        }
    }

    #[test]
    fn setting_same_decision_twice_is_idempotent() {
        let hierarchy = reference_hierarchy();
        let once = hierarchy
            .update_statuses(&unresolved(), "a", Decision::Include)
            .unwrap();
        let twice = hierarchy
            .update_statuses(&once, "a", Decision::Include)
            .unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.get("a"), Some(Status::Included));
        assert!(twice.changes_since(&once).is_empty());
    }

    #[test]
    fn only_code_and_descendants_change() {
        let hierarchy = reference_hierarchy();
        let before = hierarchy
            .update_statuses(&unresolved(), "a", Decision::Include)
            .unwrap();
        let after = hierarchy
            .update_statuses(&before, "b", Decision::Exclude)
            .unwrap();

        for code in ["a", "c", "f", "j"] {
            assert_eq!(after.get(code), before.get(code), "{}", code);
        }
        assert_eq!(after.get("b"), Some(Status::Excluded));
        for code in ["d", "e", "g", "h", "i"] {
            assert_eq!(after.get(code), Some(Status::ExcludedInherited), "{}", code);
        }

        let changed: Vec<_> = after
            .changes_since(&before)
            .into_iter()
            .map(|(code, _)| code.to_string())
            .collect();
        assert_eq!(changed, vec!["b", "d", "e", "g", "h", "i"]);
    }

    #[test]
    fn non_descendants_are_left_untouched_even_if_stale() {
        let hierarchy = reference_hierarchy();
        // `c` carries a stale status; updating `b` must not repair it
        let before = statuses(&[
            ("a", "?"),
            ("b", "?"),
            ("c", "!"),
            ("d", "?"),
            ("e", "?"),
            ("f", "?"),
            ("g", "?"),
            ("h", "?"),
            ("i", "?"),
            ("j", "?"),
        ]);
        let after = hierarchy
            .update_statuses(&before, "b", Decision::Include)
            .unwrap();

        assert_eq!(after.get("c"), Some(Status::Conflict));
        assert_eq!(after.get("e"), Some(Status::IncludedInherited));
    }

    #[test]
    fn later_decision_creates_conflict() {
        let hierarchy = reference_hierarchy();
        let mut current = unresolved();
        for (code, decision) in [
            ("a", Decision::Include),
            ("b", Decision::Exclude),
            ("c", Decision::Include),
        ] {
            current = hierarchy.update_statuses(&current, code, decision).unwrap();
        }

        assert_eq!(current.get("e"), Some(Status::Conflict));
        assert_eq!(current.get("h"), Some(Status::Conflict));
        assert_eq!(current.get("i"), Some(Status::Conflict));
        assert_eq!(current.get("f"), Some(Status::IncludedInherited));
        assert_eq!(current.get("d"), Some(Status::ExcludedInherited));
    }

    #[test]
    fn switching_decision_replaces_it() {
        let hierarchy = reference_hierarchy();
        let included = hierarchy
            .update_statuses(&unresolved(), "c", Decision::Include)
            .unwrap();
        let excluded = hierarchy
            .update_statuses(&included, "c", Decision::Exclude)
            .unwrap();

        assert_eq!(excluded.get("c"), Some(Status::Excluded));
        assert_eq!(excluded.get("j"), Some(Status::ExcludedInherited));
    }

    #[test]
    fn incremental_matches_full_resolution() {
        let hierarchy = reference_hierarchy();
        let mut current = unresolved();
        for (code, decision) in [
            ("a", Decision::Include),
            ("b", Decision::Exclude),
            ("e", Decision::Include),
            ("f", Decision::Exclude),
        ] {
            current = hierarchy.update_statuses(&current, code, decision).unwrap();
        }

        let full = hierarchy.resolve_all(&decisions(&["a", "e"], &["b", "f"]));
        assert_eq!(current, full);
    }

    #[test]
    fn unknown_concept_is_an_error() {
        let hierarchy = reference_hierarchy();
        assert_eq!(
            hierarchy.update_statuses(&unresolved(), "zzz", Decision::Include),
            Err(HierarchyError::UnknownConcept("zzz".to_string()))
        );
    }
}
