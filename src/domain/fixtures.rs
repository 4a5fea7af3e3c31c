//! Shared test fixtures
//!
//! The reference hierarchy used across the domain tests:
//!
//! ```text
//!         a
//!       /   \
//!      b     c
//!     / \   / \
//!    d   e     f
//!   / \ / \   / \
//!  g   h   i     j
//! ```
//!
//! `e` has parents `b` and `c`, `h` has parents `d` and `e`, and `i` has
//! parents `e` and `f`.

use std::collections::HashMap;

use super::code::Code;
use super::graph::Hierarchy;
use super::resolver::Decisions;
use super::status::{Status, StatusMap};

pub(crate) fn code(s: &str) -> Code {
    Code::new(s).unwrap()
}

fn map(entries: &[(&str, &[&str])]) -> HashMap<Code, Vec<Code>> {
    entries
        .iter()
        .map(|(key, values)| (code(key), values.iter().map(|v| code(v)).collect()))
        .collect()
}

pub(crate) fn reference_child_map() -> HashMap<Code, Vec<Code>> {
    map(&[
        ("a", &["b", "c"]),
        ("b", &["d", "e"]),
        ("c", &["e", "f"]),
        ("d", &["g", "h"]),
        ("e", &["h", "i"]),
        ("f", &["i", "j"]),
    ])
}

pub(crate) fn reference_parent_map() -> HashMap<Code, Vec<Code>> {
    map(&[
        ("b", &["a"]),
        ("c", &["a"]),
        ("d", &["b"]),
        ("e", &["b", "c"]),
        ("f", &["c"]),
        ("g", &["d"]),
        ("h", &["d", "e"]),
        ("i", &["e", "f"]),
        ("j", &["f"]),
    ])
}

pub(crate) fn reference_hierarchy() -> Hierarchy {
    Hierarchy::from_maps(&reference_parent_map(), &reference_child_map())
}

/// Terms sort in the reverse order of their codes
pub(crate) fn reference_terms() -> HashMap<Code, String> {
    [
        ("a", "Zulu"),
        ("b", "Yankee"),
        ("c", "X-ray"),
        ("d", "Whiskey"),
        ("e", "Victor"),
        ("f", "Uniform"),
        ("g", "Tango"),
        ("h", "Sierra"),
        ("i", "Romeo"),
        ("j", "Quebec"),
    ]
    .into_iter()
    .map(|(c, term)| (code(c), term.to_string()))
    .collect()
}

pub(crate) fn decisions(included: &[&str], excluded: &[&str]) -> Decisions {
    Decisions::new(
        included.iter().map(|c| code(c)),
        excluded.iter().map(|c| code(c)),
    )
}

/// Builds a status map from `(code, token)` pairs
pub(crate) fn statuses(entries: &[(&str, &str)]) -> StatusMap {
    entries
        .iter()
        .map(|(c, token)| (code(c), token.parse::<Status>().unwrap()))
        .collect()
}
