//! Concept commands (check, status, explain, set, codes)

use anyhow::Result;
use serde_json::json;

use super::output::Output;
use crate::domain::{Code, Decision, Decisions, HierarchyError};
use crate::storage::Workspace;

fn require_concept(workspace: &Workspace, code: &Code) -> Result<()> {
    if workspace.hierarchy().contains(code.as_str()) {
        Ok(())
    } else {
        Err(HierarchyError::UnknownConcept(code.to_string()).into())
    }
}

/// Summarize the hierarchy and the status counts
pub fn check(output: &Output, workspace: &Workspace) -> Result<()> {
    let hierarchy = workspace.hierarchy();
    let roots: Vec<&str> = hierarchy.roots().into_iter().map(|c| c.as_str()).collect();
    let counts = workspace.statuses().counts();

    output.verbose_ctx("check", &format!("Found {} roots", roots.len()));

    let data = json!({
        "valid": true,
        "concepts": hierarchy.len(),
        "roots": roots,
        "statuses": counts,
    });

    output.emit(&data, || {
        println!(
            "Hierarchy OK: {} concepts, {} root(s): {}",
            hierarchy.len(),
            roots.len(),
            roots.join(", ")
        );
        println!("Status counts:");
        for (status, count) in &counts {
            println!("  {:<5} {}", status.symbol(), count);
        }
    });

    Ok(())
}

/// Show one concept's status and term
pub fn status(output: &Output, workspace: &Workspace, code: &Code) -> Result<()> {
    require_concept(workspace, code)?;

    let status = workspace.statuses().get(code.as_str());
    let term = workspace.document().terms.get(code.as_str());

    let data = json!({
        "code": code,
        "status": status,
        "term": term,
    });

    output.emit(&data, || {
        println!(
            "{}\t{}\t{}",
            code,
            status.map(|s| s.symbol()).unwrap_or(""),
            term.map(String::as_str).unwrap_or("")
        );
    });

    Ok(())
}

/// Explain a concept's status through its significant ancestors
pub fn explain(output: &Output, workspace: &Workspace, code: &Code) -> Result<()> {
    let decisions = Decisions::from_status_map(workspace.statuses());
    let explanation = workspace.hierarchy().explain(code.as_str(), &decisions)?;

    let data = json!({
        "code": explanation.code,
        "status": explanation.status,
        "included_by": explanation.ancestors.included,
        "excluded_by": explanation.ancestors.excluded,
        "message": explanation.to_string(),
    });

    output.emit(&data, || println!("{}", explanation));

    Ok(())
}

/// Apply a decision and report the concepts whose status changed
pub fn set(
    output: &Output,
    workspace: &mut Workspace,
    code: &Code,
    decision: Decision,
    dry_run: bool,
) -> Result<()> {
    let before = workspace.statuses().clone();
    let updated = workspace
        .hierarchy()
        .update_statuses(&before, code.as_str(), decision)?;
    let changes = updated.changes_since(&before);

    output.verbose_ctx("set", &format!("{} concepts changed", changes.len()));

    let written = !dry_run && !changes.is_empty();
    if written {
        workspace.save_statuses(updated)?;
        output.verbose_ctx(
            "set",
            &format!("Wrote {}", workspace.store().path().display()),
        );
    }

    let items: Vec<_> = changes
        .iter()
        .map(|(code, status)| json!({ "code": code, "status": status }))
        .collect();
    let data = json!({
        "code": code,
        "decision": decision.status(),
        "changes": items,
        "written": written,
    });

    output.emit(&data, || {
        if changes.is_empty() {
            println!("{} is already {}", code, decision);
            return;
        }

        println!("Set {} to {} ({} changed):", code, decision, changes.len());
        for (changed, status) in &changes {
            println!("  {:<5} {}", status.symbol(), changed);
        }
        if dry_run {
            println!("Dry run: document not written.");
        }
    });

    Ok(())
}

/// List the codes in the codelist
pub fn codes(output: &Output, workspace: &Workspace) {
    let terms = &workspace.document().terms;
    let codes = workspace.statuses().included_codes();

    output.verbose_ctx("codes", &format!("Found {} included codes", codes.len()));

    let items: Vec<_> = codes
        .iter()
        .map(|code| json!({ "code": code, "term": terms.get(code.as_str()) }))
        .collect();

    output.emit(&items, || {
        if codes.is_empty() {
            println!("No codes in the codelist.");
            return;
        }
        for code in &codes {
            println!(
                "{}\t{}",
                code,
                terms.get(code.as_str()).map(String::as_str).unwrap_or("")
            );
        }
    });
}
