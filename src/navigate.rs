//! Moving the checkout around the stack
//!
//! Navigation keeps no state of its own: every operation starts from the
//! VCS's current branch and ends with at most one checkout.

use crate::error::{Error, Result};
use crate::graph::BranchGraph;
use crate::prompt::Prompter;
use crate::repo::Vcs;
use crate::restack::{RestackOptions, RestackReport, restack};
use tracing::debug;

/// Check out the child of the current branch
pub fn up(vcs: &dyn Vcs, graph: &BranchGraph, prompter: &dyn Prompter) -> Result<String> {
    let current = graph.resolve_current(&vcs.current_branch()?);
    let target = step_up(graph, &current.branch.name, prompter)?;
    checkout(vcs, &target)?;
    Ok(target)
}

/// Check out the parent of the current branch
pub fn down(vcs: &dyn Vcs, graph: &BranchGraph) -> Result<String> {
    let current = graph.resolve_current(&vcs.current_branch()?);
    let target = current.branch.parent.ok_or(Error::AtRoot)?;
    checkout(vcs, &target)?;
    Ok(target)
}

/// Climb to a leaf, asking at every fork
pub fn top(vcs: &dyn Vcs, graph: &BranchGraph, prompter: &dyn Prompter) -> Result<String> {
    let current = graph.resolve_current(&vcs.current_branch()?);
    let mut target = step_up(graph, &current.branch.name, prompter)?;
    while !graph.children_of(&target).is_empty() {
        target = step_up(graph, &target, prompter)?;
    }
    checkout(vcs, &target)?;
    Ok(target)
}

/// Descend to the branch directly above the root
///
/// The root is only a valid stop when it is the only tracked branch.
pub fn bottom(vcs: &dyn Vcs, graph: &BranchGraph) -> Result<String> {
    let current = graph.resolve_current(&vcs.current_branch()?);
    let name = current.branch.name;

    if name == graph.root() {
        return if graph.is_empty() {
            Ok(name)
        } else {
            Err(Error::AtRoot)
        };
    }
    if !current.tracked {
        return Err(Error::AtRoot);
    }

    let path = graph.path_from_root(&name)?;
    let target = path.get(1).cloned().ok_or(Error::AtRoot)?;
    if target == name {
        return Err(Error::AtRoot);
    }
    checkout(vcs, &target)?;
    Ok(target)
}

/// Reparent `branch` onto `new_parent` and rebase its subtree there
pub fn move_branch(
    vcs: &dyn Vcs,
    graph: &mut BranchGraph,
    branch: &str,
    new_parent: &str,
) -> Result<RestackReport> {
    graph.reparent(branch, new_parent)?;
    vcs.set_tracking_parent(branch, new_parent)?
        .into_result(&format!("branch --set-upstream-to={new_parent} {branch}"))?;
    debug!(branch, new_parent, "moved branch");

    restack(
        vcs,
        graph,
        &RestackOptions {
            start: Some(branch.to_string()),
            ..RestackOptions::default()
        },
    )
}

fn step_up(graph: &BranchGraph, name: &str, prompter: &dyn Prompter) -> Result<String> {
    match graph.children_of(name) {
        [] => Err(Error::AtTop),
        [only] => Ok(only.clone()),
        children => {
            let message = format!("Multiple branches above '{name}', choose one");
            let choice = prompter
                .select(&message, children)?
                .ok_or(Error::Cancelled)?;
            children.get(choice).cloned().ok_or(Error::Cancelled)
        }
    }
}

fn checkout(vcs: &dyn Vcs, name: &str) -> Result<()> {
    vcs.checkout(name)?
        .into_result(&format!("checkout {name}"))?;
    Ok(())
}
