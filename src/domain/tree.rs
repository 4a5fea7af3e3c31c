//! Tree views over the hierarchy
//!
//! A tree view shows one or more root concepts and, below them, only the
//! paths present in a [`VisiblePaths`] set. Because visibility is addressed
//! by path, a concept with several parents may appear expanded under one
//! parent and collapsed under another.
//!
//! Each emitted [`TreeRow`] carries a pipe sequence for ASCII rendering:
//!
//! ```text
//! a
//! ├ b
//! │ ├ d
//! │ └ e
//! └ c
//!   └ f
//! ```

use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use thiserror::Error;

use super::code::{Code, ConceptPath};
use super::graph::Hierarchy;
use super::status::{Status, StatusMap};

#[derive(Debug, Error, PartialEq)]
pub enum TreeError {
    #[error("Unknown sort order '{0}': expected 'term' or 'code'")]
    UnknownSortOrder(String),
}

/// One glyph of a row's tree prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipe {
    /// `├` a sibling follows
    Branch,
    /// `└` last sibling
    Last,
    /// `│` an ancestor's sibling follows
    Continue,
    /// ` ` nothing follows at this level
    Blank,
}

impl Pipe {
    pub fn glyph(&self) -> char {
        match self {
            Pipe::Branch => '├',
            Pipe::Last => '└',
            Pipe::Continue => '│',
            Pipe::Blank => ' ',
        }
    }

    /// The glyph this level shows on rows further down the subtree
    fn continuation(self) -> Pipe {
        match self {
            Pipe::Branch | Pipe::Continue => Pipe::Continue,
            Pipe::Last | Pipe::Blank => Pipe::Blank,
        }
    }
}

impl Serialize for Pipe {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.glyph())
    }
}

/// How siblings are ordered in a tree view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// By display term, ignoring case; siblings with equal or missing terms
    /// keep code order
    #[default]
    Term,
    Code,
}

impl FromStr for SortOrder {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "term" => Ok(SortOrder::Term),
            "code" => Ok(SortOrder::Code),
            other => Err(TreeError::UnknownSortOrder(other.to_string())),
        }
    }
}

/// The set of paths currently shown in a tree view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisiblePaths(BTreeSet<ConceptPath>);

impl VisiblePaths {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    pub fn insert(&mut self, path: ConceptPath) -> bool {
        self.0.insert(path)
    }

    pub fn remove(&mut self, path: &str) -> bool {
        self.0.remove(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConceptPath> {
        self.0.iter()
    }
}

impl FromIterator<ConceptPath> for VisiblePaths {
    fn from_iter<I: IntoIterator<Item = ConceptPath>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One rendered row of a tree view.
///
/// `status` and `term` are `None` when the caller's maps lack the code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeRow {
    pub code: Code,
    pub path: ConceptPath,
    pub status: Option<Status>,
    pub term: Option<String>,
    pub pipes: Vec<Pipe>,
    pub has_descendants: bool,
    pub is_expanded: bool,
}

impl TreeRow {
    /// Depth below the root; equals the number of pipes
    pub fn depth(&self) -> usize {
        self.pipes.len()
    }

    /// The pipe glyphs as a string, one character per level
    pub fn prefix(&self) -> String {
        self.pipes.iter().map(Pipe::glyph).collect()
    }
}

/// A titled group of root concepts shown together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSection {
    pub title: String,
    pub roots: Vec<Code>,
}

/// The rows of one [`TreeSection`], roots in the section's order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionRows {
    pub title: String,
    pub rows: Vec<TreeRow>,
}

struct RowContext<'a> {
    statuses: &'a StatusMap,
    terms: &'a HashMap<Code, String>,
    visible: &'a VisiblePaths,
    sort: SortOrder,
}

impl Hierarchy {
    /// Children of `code` in display order
    pub fn sorted_children(
        &self,
        code: &str,
        terms: &HashMap<Code, String>,
        sort: SortOrder,
    ) -> Vec<&Code> {
        let mut children = self.children(code);
        if sort == SortOrder::Term {
            children.sort_by_cached_key(|child| terms.get(child.as_str()).map(|term| term.to_lowercase()));
        }
        children
    }

    /// Builds the rows of the tree rooted at `root`, depth-first.
    ///
    /// A child row is produced only if its path is in `visible`; hidden
    /// subtrees produce no rows at all. The root row is always produced.
    pub fn tree_rows(
        &self,
        root: &Code,
        statuses: &StatusMap,
        terms: &HashMap<Code, String>,
        visible: &VisiblePaths,
        sort: SortOrder,
    ) -> Vec<TreeRow> {
        let context = RowContext {
            statuses,
            terms,
            visible,
            sort,
        };
        let mut rows = Vec::new();
        self.collect_rows(root, ConceptPath::root(root), Vec::new(), &context, &mut rows);
        rows
    }

    fn collect_rows(
        &self,
        code: &Code,
        path: ConceptPath,
        pipes: Vec<Pipe>,
        context: &RowContext<'_>,
        rows: &mut Vec<TreeRow>,
    ) {
        let children: Vec<(&Code, ConceptPath)> = self
            .sorted_children(code.as_str(), context.terms, context.sort)
            .into_iter()
            .map(|child| (child, path.child(child)))
            .collect();

        let is_expanded = children
            .iter()
            .any(|(_, child_path)| context.visible.contains(child_path.as_str()));

        rows.push(TreeRow {
            code: code.clone(),
            path,
            status: context.statuses.get(code.as_str()),
            term: context.terms.get(code.as_str()).cloned(),
            pipes: pipes.clone(),
            has_descendants: !children.is_empty(),
            is_expanded,
        });

        let last = children.len().saturating_sub(1);
        for (i, (child, child_path)) in children.into_iter().enumerate() {
            if !context.visible.contains(child_path.as_str()) {
                continue;
            }

            let mut child_pipes: Vec<Pipe> = pipes.iter().map(|p| p.continuation()).collect();
            child_pipes.push(if i == last { Pipe::Last } else { Pipe::Branch });

            self.collect_rows(child, child_path, child_pipes, context, rows);
        }
    }

    /// Builds the rows of every section, concatenating each root's tree
    pub fn section_rows(
        &self,
        sections: &[TreeSection],
        statuses: &StatusMap,
        terms: &HashMap<Code, String>,
        visible: &VisiblePaths,
        sort: SortOrder,
    ) -> Vec<SectionRows> {
        sections
            .iter()
            .map(|section| SectionRows {
                title: section.title.clone(),
                rows: section
                    .roots
                    .iter()
                    .flat_map(|root| self.tree_rows(root, statuses, terms, visible, sort))
                    .collect(),
            })
            .collect()
    }

    /// Chooses which paths are visible when a tree is first shown.
    ///
    /// Walking down from each root, expansion continues until it reaches a
    /// *settled* concept: one whose status covers every descendant's status
    /// (see [`Status::covers`]). Below a settled concept only `max_depth`
    /// further levels are revealed, plus the level at which the walk stops.
    pub fn initially_visible_paths(
        &self,
        roots: &[Code],
        statuses: &StatusMap,
        max_depth: usize,
    ) -> VisiblePaths {
        let mut visible = VisiblePaths::new();
        for root in roots {
            self.reveal(root, ConceptPath::root(root), 0, statuses, max_depth, &mut visible);
        }
        visible
    }

    /// `depth` is 0 above the first settled concept, then counts levels below it
    fn reveal(
        &self,
        code: &Code,
        path: ConceptPath,
        depth: usize,
        statuses: &StatusMap,
        max_depth: usize,
        visible: &mut VisiblePaths,
    ) {
        if depth > max_depth {
            visible.insert(path);
            return;
        }

        let child_depth = match depth {
            0 if self.is_settled(code.as_str(), statuses) => 1,
            0 => 0,
            _ => depth + 1,
        };

        for child in self.children(code.as_str()) {
            self.reveal(child, path.child(child), child_depth, statuses, max_depth, visible);
        }
        visible.insert(path);
    }

    /// True if the concept's status covers all of its descendants' statuses
    fn is_settled(&self, code: &str, statuses: &StatusMap) -> bool {
        let status = match statuses.get(code) {
            Some(status) => status,
            None => return false,
        };

        let idx = match self.index(code) {
            Some(idx) => idx,
            None => return true,
        };

        self.descendant_indices(idx).iter().all(|d| {
            statuses
                .get(self.code(*d).as_str())
                .is_some_and(|s| status.covers(s))
        })
    }

    /// Expands or collapses the concept at the end of `path`.
    ///
    /// Each immediate child path is flipped: removed if visible, added if
    /// not. Deeper paths are left alone, so re-expanding a concept restores
    /// whatever its children showed before it was collapsed.
    pub fn toggle_visibility(&self, visible: &mut VisiblePaths, path: &ConceptPath) {
        for child in self.children(path.leaf()) {
            let child_path = path.child(child);
            if !visible.remove(child_path.as_str()) {
                visible.insert(child_path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::{code, reference_hierarchy, reference_terms, statuses};
    use crate::domain::resolver::Decisions;
    use proptest::prelude::*;

    fn paths(items: &[&str]) -> VisiblePaths {
        items.iter().map(|p| p.parse::<ConceptPath>().unwrap()).collect()
    }

    fn path(s: &str) -> ConceptPath {
        s.parse().unwrap()
    }

    fn summary(rows: &[TreeRow]) -> Vec<String> {
        rows.iter()
            .map(|row| format!("{}{}", row.prefix(), row.code))
            .collect()
    }

    #[test]
    fn pipe_glyphs() {
        assert_eq!(Pipe::Branch.glyph(), '├');
        assert_eq!(Pipe::Last.glyph(), '└');
        assert_eq!(Pipe::Continue.glyph(), '│');
        assert_eq!(Pipe::Blank.glyph(), ' ');
        assert_eq!(serde_json::to_string(&Pipe::Last).unwrap(), "\"└\"");
    }

    #[test]
    fn parse_sort_order() {
        assert_eq!("term".parse::<SortOrder>().unwrap(), SortOrder::Term);
        assert_eq!("code".parse::<SortOrder>().unwrap(), SortOrder::Code);
        assert!("size".parse::<SortOrder>().is_err());
    }

    #[test]
    fn root_only() {
        let hierarchy = reference_hierarchy();
        let statuses = hierarchy.resolve_all(&Decisions::default());
        let rows = hierarchy.tree_rows(
            &code("a"),
            &statuses,
            &reference_terms(),
            &paths(&["a"]),
            SortOrder::Code,
        );

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.path.as_str(), "a");
        assert!(row.pipes.is_empty());
        assert!(row.has_descendants);
        assert!(!row.is_expanded);
        assert_eq!(row.term.as_deref(), Some("Zulu"));
        assert_eq!(row.status, Some(Status::Unresolved));
    }

    #[test]
    fn first_level_rows() {
        let hierarchy = reference_hierarchy();
        let statuses = hierarchy.resolve_all(&Decisions::default());
        let rows = hierarchy.tree_rows(
            &code("a"),
            &statuses,
            &reference_terms(),
            &paths(&["a", "a:b", "a:c"]),
            SortOrder::Code,
        );

        assert_eq!(summary(&rows), vec!["a", "├b", "└c"]);
        assert!(rows[0].is_expanded);
        assert!(!rows[1].is_expanded);
        assert!(rows[1].has_descendants);
    }

    #[test]
    fn sort_by_term() {
        let hierarchy = reference_hierarchy();
        let statuses = hierarchy.resolve_all(&Decisions::default());
        let rows = hierarchy.tree_rows(
            &code("a"),
            &statuses,
            &reference_terms(),
            &paths(&["a", "a:b", "a:c"]),
            SortOrder::Term,
        );

        // "X-ray" sorts before "Yankee"
        assert_eq!(summary(&rows), vec!["a", "├c", "└b"]);
    }

    #[test]
    fn equal_terms_keep_code_order() {
        let hierarchy = reference_hierarchy();
        let statuses = hierarchy.resolve_all(&Decisions::default());
        let terms: HashMap<Code, String> = ["b", "c"]
            .into_iter()
            .map(|c| (code(c), "Same".to_string()))
            .collect();
        let rows = hierarchy.tree_rows(
            &code("a"),
            &statuses,
            &terms,
            &paths(&["a:b", "a:c"]),
            SortOrder::Term,
        );

        assert_eq!(summary(&rows), vec!["a", "├b", "└c"]);
        assert_eq!(rows[0].term, None);
    }

    #[test]
    fn term_order_ignores_case() {
        let hierarchy = reference_hierarchy();
        let terms: HashMap<Code, String> = [("b", "apple"), ("c", "Banana")]
            .into_iter()
            .map(|(c, term)| (code(c), term.to_string()))
            .collect();

        let children: Vec<&str> = hierarchy
            .sorted_children("a", &terms, SortOrder::Term)
            .into_iter()
            .map(Code::as_str)
            .collect();
        assert_eq!(children, vec!["b", "c"]);
    }

    #[test]
    fn nested_pipes() {
        let hierarchy = reference_hierarchy();
        let statuses = hierarchy.resolve_all(&Decisions::default());
        let visible = paths(&[
            "a", "a:b", "a:b:d", "a:b:e", "a:c", "a:c:e", "a:c:e:h", "a:c:e:i", "a:c:f",
            "a:c:f:i", "a:c:f:j",
        ]);
        let rows = hierarchy.tree_rows(&code("a"), &statuses, &HashMap::new(), &visible, SortOrder::Code);

        assert_eq!(
            summary(&rows),
            vec![
                "a", "├b", "│├d", "│└e", "└c", " ├e", " │├h", " │└i", " └f", "  ├i", "  └j",
            ]
        );
        // d's children g and h are hidden
        assert!(!rows[2].is_expanded);
        assert!(rows[2].has_descendants);
        // e is expanded under c but not under b
        assert!(!rows[3].is_expanded);
        assert!(rows[5].is_expanded);
        assert!(!rows[9].has_descendants);
    }

    #[test]
    fn hidden_parent_hides_visible_descendants() {
        let hierarchy = reference_hierarchy();
        let statuses = StatusMap::new();
        let rows = hierarchy.tree_rows(
            &code("a"),
            &statuses,
            &HashMap::new(),
            &paths(&["a", "a:b:d"]),
            SortOrder::Code,
        );

        assert_eq!(summary(&rows), vec!["a"]);
        assert_eq!(rows[0].status, None);
    }

    #[test]
    fn section_rows_concatenate_roots() {
        let hierarchy = reference_hierarchy();
        let statuses = hierarchy.resolve_all(&Decisions::default());
        let sections = vec![
            TreeSection {
                title: "Left".to_string(),
                roots: vec![code("b")],
            },
            TreeSection {
                title: "Leaves".to_string(),
                roots: vec![code("j"), code("g")],
            },
        ];
        let result = hierarchy.section_rows(
            &sections,
            &statuses,
            &reference_terms(),
            &paths(&["b", "b:d"]),
            SortOrder::Code,
        );

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].title, "Left");
        assert_eq!(summary(&result[0].rows), vec!["b", "├d"]);
        assert_eq!(summary(&result[1].rows), vec!["j", "g"]);
    }

    #[test]
    fn initially_visible_when_nothing_decided() {
        let hierarchy = reference_hierarchy();
        let statuses = hierarchy.resolve_all(&Decisions::default());
        let visible = hierarchy.initially_visible_paths(&[code("a")], &statuses, 0);

        assert_eq!(visible, paths(&["a", "a:b", "a:c"]));
    }

    #[test]
    fn initially_visible_expands_until_settled() {
        let hierarchy = reference_hierarchy();
        let statuses = statuses(&[
            ("a", "+"),
            ("b", "-"),
            ("c", "(+)"),
            ("d", "(-)"),
            ("e", "(-)"),
            ("f", "(+)"),
            ("g", "(-)"),
            ("h", "(-)"),
            ("i", "(-)"),
            ("j", "(+)"),
        ]);
        let visible = hierarchy.initially_visible_paths(&[code("a")], &statuses, 0);

        assert_eq!(
            visible,
            paths(&[
                "a", "a:b", "a:b:d", "a:b:e", "a:c", "a:c:e", "a:c:e:h", "a:c:e:i", "a:c:f",
                "a:c:f:i", "a:c:f:j",
            ])
        );
    }

    #[test]
    fn initially_visible_respects_max_depth() {
        let hierarchy = reference_hierarchy();
        let statuses = hierarchy.resolve_all(&Decisions::default());
        let visible = hierarchy.initially_visible_paths(&[code("a")], &statuses, 1);

        assert!(visible.contains("a:b:d"));
        assert!(visible.contains("a:c:e"));
        assert!(!visible.contains("a:b:d:g"));
        assert_eq!(visible.len(), 7);
    }

    #[test]
    fn unbounded_max_depth_reveals_every_path() {
        let hierarchy = reference_hierarchy();
        let statuses = hierarchy.resolve_all(&Decisions::default());
        let visible = hierarchy.initially_visible_paths(&[code("a")], &statuses, usize::MAX);

        assert!(visible.contains("a:b:d:g"));
        assert!(visible.contains("a:c:f:j"));
        assert_eq!(visible.len(), 15);
    }

    #[test]
    fn missing_status_is_never_settled() {
        let hierarchy = reference_hierarchy();
        let visible = hierarchy.initially_visible_paths(&[code("c")], &StatusMap::new(), 0);

        // Without statuses the walk never settles and reveals every path
        assert_eq!(
            visible,
            paths(&["c", "c:e", "c:e:h", "c:e:i", "c:f", "c:f:i", "c:f:j"])
        );
    }

    #[test]
    fn toggle_flips_one_level() {
        let hierarchy = reference_hierarchy();
        let mut visible = paths(&["a", "a:b", "a:c"]);

        hierarchy.toggle_visibility(&mut visible, &path("a:b"));
        assert_eq!(visible, paths(&["a", "a:b", "a:c", "a:b:d", "a:b:e"]));

        // Collapsing a leaves a:b's children in place
        hierarchy.toggle_visibility(&mut visible, &path("a"));
        assert_eq!(visible, paths(&["a", "a:b:d", "a:b:e"]));

        // Re-expanding a restores the previous view of b
        hierarchy.toggle_visibility(&mut visible, &path("a"));
        let rows = hierarchy.tree_rows(&code("a"), &StatusMap::new(), &HashMap::new(), &visible, SortOrder::Code);
        assert_eq!(summary(&rows), vec!["a", "├b", "│├d", "│└e", "└c"]);
    }

    #[test]
    fn toggle_on_leaf_is_noop() {
        let hierarchy = reference_hierarchy();
        let mut visible = paths(&["a", "a:b"]);
        hierarchy.toggle_visibility(&mut visible, &path("a:b:d:g"));
        assert_eq!(visible, paths(&["a", "a:b"]));
    }

    /// Random DAG over nodes n0..n{count}; edges only run from lower to higher index
    fn random_hierarchy(count: usize, bits: &[bool]) -> Hierarchy {
        let mut child_map: HashMap<Code, Vec<Code>> = HashMap::new();
        for parent in 0..count {
            let children = (parent + 1..count)
                .filter(|child| bits[parent * count + child])
                .map(|child| code(&format!("n{}", child)))
                .collect();
            child_map.insert(code(&format!("n{}", parent)), children);
        }
        Hierarchy::from_child_map(&child_map)
    }

    fn all_paths(hierarchy: &Hierarchy, path: ConceptPath, out: &mut Vec<ConceptPath>) {
        for child in hierarchy.children(path.leaf()) {
            all_paths(hierarchy, path.child(child), out);
        }
        out.push(path);
    }

    fn dag_strategy() -> impl Strategy<Value = (usize, Vec<bool>, Vec<bool>)> {
        (1usize..7).prop_flat_map(|count| {
            (
                Just(count),
                prop::collection::vec(any::<bool>(), count * count),
                prop::collection::vec(any::<bool>(), 64),
            )
        })
    }

    proptest! {
        #[test]
        fn rows_match_reachable_visible_paths((count, edges, mask) in dag_strategy()) {
            let hierarchy = random_hierarchy(count, &edges);
            let root = code("n0");
            let mut every = Vec::new();
            all_paths(&hierarchy, ConceptPath::root(&root), &mut every);

            let selected: VisiblePaths = every
                .iter()
                .enumerate()
                .filter(|(i, _)| mask[i % mask.len()])
                .map(|(_, p)| p.clone())
                .collect();

            // A path is reached when every proper prefix below the root is visible
            let reachable = every
                .iter()
                .filter(|p| {
                    let segments: Vec<_> = p.segments().collect();
                    (2..=segments.len()).all(|n| selected.contains(&segments[..n].join(":")))
                })
                .count();

            let rows = hierarchy.tree_rows(&root, &StatusMap::new(), &HashMap::new(), &selected, SortOrder::Code);
            prop_assert_eq!(rows.len(), reachable);
            for row in &rows {
                prop_assert_eq!(row.pipes.len(), row.path.depth());
                prop_assert_eq!(row.path.leaf(), row.code.as_str());
            }
        }

        #[test]
        fn initial_paths_are_all_rendered((count, edges, mask) in dag_strategy(), max_depth in 0usize..3) {
            let hierarchy = random_hierarchy(count, &edges);
            let decisions = Decisions::new(
                hierarchy.nodes().enumerate().filter(|(i, _)| mask[*i]).map(|(_, c)| c.clone()),
                hierarchy.nodes().enumerate().filter(|(i, _)| mask[32 + *i]).map(|(_, c)| c.clone()),
            );
            let statuses = hierarchy.resolve_all(&decisions);
            let root = code("n0");

            let visible = hierarchy.initially_visible_paths(&[root.clone()], &statuses, max_depth);
            let rows = hierarchy.tree_rows(&root, &statuses, &HashMap::new(), &visible, SortOrder::Code);
            prop_assert_eq!(rows.len(), visible.len());
        }

        #[test]
        fn toggle_twice_restores((count, edges, mask) in dag_strategy(), pick in 0usize..64) {
            let hierarchy = random_hierarchy(count, &edges);
            let mut every = Vec::new();
            all_paths(&hierarchy, ConceptPath::root(&code("n0")), &mut every);

            let original: VisiblePaths = every
                .iter()
                .enumerate()
                .filter(|(i, _)| mask[i % mask.len()])
                .map(|(_, p)| p.clone())
                .collect();
            let target = &every[pick % every.len()];

            let mut visible = original.clone();
            hierarchy.toggle_visibility(&mut visible, target);
            hierarchy.toggle_visibility(&mut visible, target);
            prop_assert_eq!(visible, original);
        }
    }
}
