//! Domain models for codelist building
//!
//! The hierarchy engine: status propagation over a concept DAG and the
//! tree views built on top of it. Contains no I/O.

mod code;
mod status;
mod graph;
mod resolver;
mod updater;
mod tree;

#[cfg(test)]
mod fixtures;

pub use code::{Code, CodeError, ConceptPath, PATH_DELIMITER};
pub use status::{Decision, Status, StatusError, StatusFamily, StatusMap};
pub use graph::{Hierarchy, HierarchyError};
pub use resolver::{Decisions, Explanation, SignificantAncestors};
pub use tree::{Pipe, SectionRows, SortOrder, TreeError, TreeRow, TreeSection, VisiblePaths};
