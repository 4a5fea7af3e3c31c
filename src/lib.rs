//! Codelist CLI - build clinical codelists over a concept hierarchy
//!
//! A codelist is the set of concepts selected from a terminology hierarchy
//! (such as SNOMED-CT) by a handful of include/exclude decisions. The
//! [`domain`] module propagates those decisions down the hierarchy, explains
//! the result, and builds collapsible tree views of it.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Code, ConceptPath, Decision, Decisions, Hierarchy, Status, StatusMap, TreeRow, VisiblePaths};
