//! Sync: reconcile local branches with the remote
//!
//! Fetches, prunes branches whose remote counterpart disappeared, pulls
//! every branch root-to-leaf, offers to delete branches that became empty
//! and finally restacks. A branch that fails to pull takes its subtree out
//! of pruning and restacking for this run.

use crate::error::{Error, Result};
use crate::graph::BranchGraph;
use crate::prompt::Prompter;
use crate::repo::{BranchGuard, Vcs, select_remote};
use crate::restack::{RestackOptions, RestackReport, restack};
use crate::types::{BranchResult, BranchScope};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info, warn};

/// Outcome of a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Remote that was synced against
    pub remote: String,
    /// Remote branches that disappeared during the fetch
    pub deleted_on_remote: Vec<String>,
    /// Local branches removed during this sync
    pub pruned: Vec<String>,
    /// Branches the user chose to keep
    pub kept: Vec<String>,
    /// Per-branch pull results, parent before child
    pub pulls: Vec<BranchResult>,
    /// Final restack
    pub restack: RestackReport,
}

/// Run a full sync
///
/// `persist` is called after every graph mutation and once at the end so an
/// interrupted sync never loses a completed prune.
pub fn sync<F>(
    vcs: &dyn Vcs,
    graph: &mut BranchGraph,
    prompter: &dyn Prompter,
    configured_remote: Option<&str>,
    mut persist: F,
) -> Result<SyncReport>
where
    F: FnMut(&BranchGraph) -> Result<()>,
{
    let remote = select_remote(&vcs.remotes()?, configured_remote, prompter)?;
    let mut report = SyncReport {
        remote: remote.clone(),
        ..SyncReport::default()
    };

    let before = remote_branch_names(vcs, &remote)?;
    info!(remote = %remote, "fetching");
    vcs.fetch(&remote)?
        .into_result(&format!("fetch {remote} --prune"))?;
    let after = remote_branch_names(vcs, &remote)?;
    report.deleted_on_remote = before.difference(&after).cloned().collect();
    debug!(deleted = ?report.deleted_on_remote, "remote branches removed by fetch");

    let mut guard = BranchGuard::new(vcs)?;

    // Branches whose remote counterpart is gone
    for name in report.deleted_on_remote.clone() {
        if name == graph.root() || !graph.contains(&name) {
            continue;
        }
        let message = format!("'{name}' was deleted on {remote}. Delete the local branch?");
        if prompter.confirm(&message, true)? {
            prune_branch(vcs, graph, &mut guard, &name)?;
            persist(graph)?;
            report.pruned.push(name);
        } else {
            report.kept.push(name);
        }
    }

    // Pull root-to-leaf
    let mut broken: HashSet<String> = HashSet::new();
    for name in graph.cascade_order(graph.root())? {
        let parent = graph.parent_of(&name).map(ToString::to_string);
        if parent.as_ref().is_some_and(|p| broken.contains(p)) {
            broken.insert(name.clone());
            report
                .pulls
                .push(BranchResult::skipped(&name, "an ancestor failed to sync"));
            continue;
        }

        let result = pull_branch(vcs, &remote, &name, parent.as_deref(), after.contains(&name))?;
        if !result.is_success() {
            broken.insert(name.clone());
        }
        report.pulls.push(result);
    }

    // Offer to delete branches that are now empty
    let pulled: Vec<String> = report
        .pulls
        .iter()
        .filter(|r| r.is_success())
        .map(|r| r.branch.clone())
        .collect();
    for name in pulled {
        if name == graph.root() || !graph.contains(&name) {
            continue;
        }
        let Some(parent) = graph.parent_of(&name).map(ToString::to_string) else {
            continue;
        };
        if !vcs.diff(&parent, &name)?.trim().is_empty() {
            continue;
        }
        let message = format!("'{name}' has no changes against '{parent}'. Delete it?");
        if prompter.confirm(&message, true)? {
            prune_branch(vcs, graph, &mut guard, &name)?;
            persist(graph)?;
            report.pruned.push(name);
        } else {
            report.kept.push(name);
        }
    }

    broken.retain(|name| graph.contains(name));
    report.restack = restack(
        vcs,
        graph,
        &RestackOptions {
            start: None,
            skip: broken,
        },
    )?;

    drop(guard);
    graph.refresh_heads(&vcs.list_branches(BranchScope::Local)?);
    persist(graph)?;
    Ok(report)
}

fn remote_branch_names(vcs: &dyn Vcs, remote: &str) -> Result<BTreeSet<String>> {
    let prefix = format!("{remote}/");
    Ok(vcs
        .list_branches(BranchScope::Remote)?
        .into_iter()
        .filter_map(|b| b.name.strip_prefix(&prefix).map(ToString::to_string))
        .collect())
}

fn pull_branch(
    vcs: &dyn Vcs,
    remote: &str,
    name: &str,
    parent: Option<&str>,
    on_remote: bool,
) -> Result<BranchResult> {
    let checkout = vcs.checkout(name)?;
    if !checkout.success {
        return Ok(BranchResult::failed(name, checkout.output()));
    }

    let output = if on_remote {
        vcs.pull(Some(remote), Some(name))?
    } else if let Some(parent) = parent {
        vcs.pull(Some("."), Some(parent))?
    } else {
        return Ok(BranchResult::succeeded(name));
    };

    if output.success {
        return Ok(BranchResult::succeeded(name));
    }

    warn!(branch = %name, "pull failed");
    let abort = vcs.abort_merge()?;
    if !abort.success {
        debug!(branch = %name, output = %abort.output(), "nothing to abort after failed pull");
    }
    Ok(BranchResult::failed(name, output.output()))
}

/// Delete a branch locally and splice it out of the graph
///
/// Children move onto the branch's parent, both in the graph and in their
/// VCS tracking references. If the branch is checked out, or is the branch
/// `guard` will restore, the parent takes its place.
pub fn prune_branch(
    vcs: &dyn Vcs,
    graph: &mut BranchGraph,
    guard: &mut BranchGuard<'_>,
    name: &str,
) -> Result<()> {
    let branch = graph.branch(name)?.clone();
    let parent = graph
        .parent_of(name)
        .map(ToString::to_string)
        .ok_or_else(|| Error::RootBranch(name.to_string()))?;

    if vcs.current_branch()?.name == name {
        vcs.checkout(&parent)?
            .into_result(&format!("checkout {parent}"))?;
    }
    if guard.original() == Some(name) {
        guard.retarget(parent.clone());
    }

    // Children first: a failure here leaves the branch in both git and the graph
    for child in &branch.children {
        vcs.set_tracking_parent(child, &parent)?
            .into_result(&format!("branch --set-upstream-to={parent} {child}"))?;
    }
    vcs.delete_branch(name, true)?
        .into_result(&format!("branch -D {name}"))?;
    graph.delete_branch(name)?;
    info!(branch = %name, parent = %parent, "pruned branch");
    Ok(())
}
