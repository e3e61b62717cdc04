//! Restack: cascade rebases down a subtree
//!
//! Branches are visited breadth-first from the starting branch, so a parent
//! is always rebased before its children. When a rebase fails it is
//! aborted and that branch's subtree is left alone for this run; siblings
//! that were queued independently still go ahead.

use crate::error::Result;
use crate::graph::BranchGraph;
use crate::repo::{BranchGuard, Vcs};
use crate::types::{BranchResult, BranchScope};
use std::collections::{HashSet, VecDeque};
use tracing::{info, warn};

/// Options for a restack run
#[derive(Debug, Clone, Default)]
pub struct RestackOptions {
    /// Branch to start from (defaults to the root)
    pub start: Option<String>,
    /// Branches to leave untouched, along with their subtrees
    pub skip: HashSet<String>,
}

/// Result of a restack run, in visit order
#[derive(Debug, Clone, Default)]
pub struct RestackReport {
    /// One entry per visited non-root branch
    pub results: Vec<BranchResult>,
}

impl RestackReport {
    /// Branches whose rebase failed
    pub fn failed(&self) -> impl Iterator<Item = &BranchResult> {
        self.results.iter().filter(|r| r.is_failure())
    }

    /// Branches that were rebased
    pub fn rebased(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.is_success())
            .map(|r| r.branch.as_str())
            .collect()
    }

    /// Whether every visited branch was rebased
    pub fn is_success(&self) -> bool {
        self.results.iter().all(BranchResult::is_success)
    }
}

/// Rebase every branch in the subtree onto its parent
///
/// The start branch itself is rebased unless it is the root. The originally
/// checked out branch is restored on every exit path.
pub fn restack(
    vcs: &dyn Vcs,
    graph: &mut BranchGraph,
    options: &RestackOptions,
) -> Result<RestackReport> {
    let start = options
        .start
        .clone()
        .unwrap_or_else(|| graph.root().to_string());
    graph.branch(&start)?;

    let guard = BranchGuard::new(vcs)?;
    let mut report = RestackReport::default();
    let mut queue = VecDeque::from([start]);

    while let Some(name) = queue.pop_front() {
        if options.skip.contains(&name) {
            report
                .results
                .push(BranchResult::skipped(&name, "excluded from this restack"));
            continue;
        }

        let Some(parent) = graph.parent_of(&name).map(ToString::to_string) else {
            queue.extend(graph.children_of(&name).iter().cloned());
            continue;
        };

        info!(branch = %name, onto = %parent, "rebasing");
        let output = vcs.rebase(&name, &parent)?;
        if output.success {
            report.results.push(BranchResult::succeeded(&name));
            queue.extend(graph.children_of(&name).iter().cloned());
            continue;
        }

        let abort = vcs.abort_rebase()?;
        if !abort.success {
            warn!(branch = %name, output = %abort.output(), "rebase --abort failed");
        }
        warn!(branch = %name, onto = %parent, "rebase failed, skipping subtree");
        report
            .results
            .push(BranchResult::failed(&name, output.output()));
        for descendant in graph.descendants(&name)? {
            report.results.push(BranchResult::skipped(
                descendant,
                format!("'{name}' failed to rebase"),
            ));
        }
    }

    drop(guard);
    graph.refresh_heads(&vcs.list_branches(BranchScope::Local)?);
    Ok(report)
}
