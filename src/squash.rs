//! Squash ("squish"): fold a branch into its parent
//!
//! Commits are replayed onto a throwaway branch cut from the parent. The
//! parent only moves, by fast-forward, once every cherry-pick applied and
//! the result matches the squashed branch exactly; any failure deletes the
//! throwaway branch and leaves both real branches untouched.

use crate::error::{Error, Result};
use crate::graph::BranchGraph;
use crate::repo::{BranchGuard, Vcs};
use crate::sync::prune_branch;
use crate::types::BranchScope;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of squashing one branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquashReport {
    /// Branch that was folded and deleted
    pub branch: String,
    /// Branch that received its commits
    pub parent: String,
    /// Number of commits replayed
    pub commits: usize,
}

/// Fold `branch` into its parent and delete it
///
/// Children of `branch` are re-pointed at the parent.
pub fn squash(vcs: &dyn Vcs, graph: &mut BranchGraph, branch: &str) -> Result<SquashReport> {
    let parent = graph
        .branch(branch)?
        .parent
        .clone()
        .ok_or_else(|| Error::RootBranch(branch.to_string()))?;

    let mut commits = vcs.commit_diff(&parent, branch)?;
    commits.reverse();
    debug!(branch, parent = %parent, commits = commits.len(), "squashing");

    let mut guard = BranchGuard::new(vcs)?;
    let temp = temp_branch_name();
    vcs.new_branch(&temp, Some(&parent))?;

    for commit in &commits {
        let output = vcs.cherry_pick(&commit.sha)?;
        if !output.success {
            let abort = vcs.abort_cherry_pick()?;
            if !abort.success {
                warn!(output = %abort.output(), "cherry-pick --abort failed");
            }
            discard_temp(vcs, &parent, &temp);
            return Err(Error::Squash(format!(
                "cherry-pick of {} ({}) onto '{parent}' failed:\n{}",
                short(&commit.sha),
                commit.subject,
                output.output()
            )));
        }
    }

    if !vcs.diff(&temp, branch)?.trim().is_empty() {
        discard_temp(vcs, &parent, &temp);
        return Err(Error::Squash(format!(
            "'{branch}' is not up to date with '{parent}'; run 'gryu restack' first"
        )));
    }

    vcs.checkout(&parent)?
        .into_result(&format!("checkout {parent}"))?;
    let ff = vcs.fast_forward(&temp)?;
    if !ff.success {
        discard_temp(vcs, &parent, &temp);
        return Err(Error::Squash(format!(
            "could not fast-forward '{parent}':\n{}",
            ff.output()
        )));
    }
    discard_temp(vcs, &parent, &temp);

    prune_branch(vcs, graph, &mut guard, branch)?;
    drop(guard);
    graph.refresh_heads(&vcs.list_branches(BranchScope::Local)?);

    info!(branch, parent = %parent, commits = commits.len(), "squashed");
    Ok(SquashReport {
        branch: branch.to_string(),
        parent,
        commits: commits.len(),
    })
}

/// Fold `branch` and each of its ancestors until only the branch directly
/// above the root remains
///
/// `persist` runs after every completed fold, so a later failure never
/// loses the branches already folded.
pub fn squash_all<F>(
    vcs: &dyn Vcs,
    graph: &mut BranchGraph,
    branch: &str,
    mut persist: F,
) -> Result<Vec<SquashReport>>
where
    F: FnMut(&BranchGraph) -> Result<()>,
{
    let mut reports = Vec::new();
    let mut current = branch.to_string();
    loop {
        let Some(parent) = graph.branch(&current)?.parent.clone() else {
            return Err(Error::RootBranch(current));
        };
        if parent == graph.root() {
            break;
        }
        reports.push(squash(vcs, graph, &current)?);
        persist(graph)?;
        current = parent;
    }
    Ok(reports)
}

fn temp_branch_name() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("gryu-squash-{}", &id[..8])
}

fn short(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

/// Leave the temp branch and delete it; failures only warn
fn discard_temp(vcs: &dyn Vcs, parent: &str, temp: &str) {
    if vcs
        .current_branch()
        .is_ok_and(|current| current.name == temp)
        && let Err(e) = vcs.checkout(parent)
    {
        warn!(error = %e, "failed to leave temporary branch");
    }
    match vcs.delete_branch(temp, true) {
        Ok(out) if out.success => debug!(branch = temp, "deleted temporary branch"),
        Ok(out) => warn!(branch = temp, output = %out.output(), "failed to delete temporary branch"),
        Err(e) => warn!(branch = temp, error = %e, "failed to delete temporary branch"),
    }
}
