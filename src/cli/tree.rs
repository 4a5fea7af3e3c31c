//! Tree command: collapsible hierarchy view rendered as text

use anyhow::{bail, Result};

use super::output::Output;
use crate::domain::{Code, ConceptPath, SortOrder, TreeRow};
use crate::storage::Workspace;

/// Options for `codelist tree`
pub struct TreeOptions {
    pub section: Option<String>,
    pub depth: usize,
    pub sort: SortOrder,
    pub expand: Vec<ConceptPath>,
}

/// Show the tree view of every section (or one)
pub fn show(output: &Output, workspace: &Workspace, options: &TreeOptions) -> Result<()> {
    let hierarchy = workspace.hierarchy();
    let terms = &workspace.document().terms;

    let mut sections = workspace.document().sections_or_default(hierarchy);
    if let Some(title) = &options.section {
        sections.retain(|section| &section.title == title);
        if sections.is_empty() {
            bail!("No section titled '{}'", title);
        }
    }

    let roots: Vec<Code> = sections
        .iter()
        .flat_map(|section| section.roots.iter().cloned())
        .collect();
    let mut visible = hierarchy.initially_visible_paths(&roots, workspace.statuses(), options.depth);
    output.verbose_ctx(
        "tree",
        &format!("{} paths initially visible (depth {})", visible.len(), options.depth),
    );

    for path in &options.expand {
        hierarchy.toggle_visibility(&mut visible, path);
        output.verbose_ctx("tree", &format!("Toggled {}", path));
    }

    let rendered = hierarchy.section_rows(&sections, workspace.statuses(), terms, &visible, options.sort);

    output.emit(&rendered, || {
        for (i, section) in rendered.iter().enumerate() {
            if i > 0 {
                println!();
            }
            println!("{}", section.title);
            for row in &section.rows {
                println!("{}", render_row(row));
            }
        }
    });

    Ok(())
}

/// One text line: pipes, expander, status, term and code
fn render_row(row: &TreeRow) -> String {
    let marker = match (row.has_descendants, row.is_expanded) {
        (false, _) => '·',
        (true, true) => '▾',
        (true, false) => '▸',
    };
    let status = row.status.map(|s| s.symbol()).unwrap_or(" ");

    match &row.term {
        Some(term) => format!("{}{} {} {} ({})", row.prefix(), marker, status, term, row.code),
        None => format!("{}{} {} {}", row.prefix(), marker, status, row.code),
    }
}
