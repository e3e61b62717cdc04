//! Building the graph from the VCS or from persisted state

use super::BranchGraph;
use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::repo::Vcs;
use crate::tracking::StackState;
use crate::types::BranchScope;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Derive the graph from upstream tracking information
///
/// Branches whose upstream is missing, remote, or part of a loop are
/// attached directly to the root.
pub fn build_from_vcs(vcs: &dyn Vcs, root: &str) -> Result<BranchGraph> {
    let listing = vcs.list_branches(BranchScope::Local)?;
    if !listing.iter().any(|b| b.name == root) {
        return Err(Error::BranchNotFound(root.to_string()));
    }

    let mut parents: BTreeMap<String, Option<String>> = BTreeMap::new();
    for branch in &listing {
        let parent = if branch.name == root {
            None
        } else {
            match vcs.parent_of(&branch.name)? {
                Some(p) if p != branch.name && listing.iter().any(|b| b.name == p) => Some(p),
                _ => Some(root.to_string()),
            }
        };
        parents.insert(branch.name.clone(), parent);
    }

    break_cycles(&mut parents, root);

    let records = listing.iter().map(|branch| {
        let parent = parents.get(&branch.name).cloned().flatten();
        (branch.name.clone(), branch.head_sha.clone(), parent)
    });
    let graph = BranchGraph::from_records(root, records)?;
    debug!(branches = graph.len(), root, "built graph from vcs");
    Ok(graph)
}

fn break_cycles(parents: &mut BTreeMap<String, Option<String>>, root: &str) {
    let names: Vec<String> = parents.keys().cloned().collect();
    for name in names {
        let mut cursor = name.clone();
        let mut steps = 0;
        while let Some(Some(parent)) = parents.get(&cursor).cloned() {
            steps += 1;
            if steps > parents.len() {
                // After more steps than branches the cursor is inside the loop.
                warn!(branch = %cursor, "upstream chain loops, attaching to root");
                parents.insert(cursor, Some(root.to_string()));
                break;
            }
            cursor = parent;
        }
    }
}

/// Graph loaded from persisted state
#[derive(Debug)]
pub struct LoadedGraph {
    /// The validated graph
    pub graph: BranchGraph,
    /// Whether dangling parents were repaired (state should be saved)
    pub repaired: bool,
    /// Persisted branches that no longer exist in the VCS
    pub dropped: Vec<String>,
}

impl LoadedGraph {
    /// Whether the persisted state differs from the loaded graph
    pub fn is_dirty(&self) -> bool {
        self.repaired || !self.dropped.is_empty()
    }
}

/// Load the graph from persisted state, reconciling it with the VCS
///
/// Branches deleted outside the tool are dropped. A branch whose parent
/// was dropped gets a new parent chosen by the user; without a terminal
/// this fails with `DanglingParent`.
pub fn load_graph(state: &StackState, vcs: &dyn Vcs, prompter: &dyn Prompter) -> Result<LoadedGraph> {
    let root = state.root_branch.as_str();
    let listing = vcs.list_branches(BranchScope::Local)?;
    let heads: BTreeMap<&str, &str> = listing
        .iter()
        .map(|b| (b.name.as_str(), b.head_sha.as_str()))
        .collect();
    let Some(root_head) = heads.get(root) else {
        return Err(Error::BranchNotFound(root.to_string()));
    };

    let recorded: BTreeMap<String, Option<String>> = state
        .records()
        .into_iter()
        .map(|(name, _, parent)| (name, parent))
        .collect();

    let mut dropped = Vec::new();
    let mut parents: BTreeMap<String, Option<String>> = BTreeMap::new();
    for (name, parent) in &recorded {
        if name == root {
            continue;
        }
        if heads.contains_key(name.as_str()) {
            parents.insert(name.clone(), parent.clone());
        } else {
            warn!(branch = %name, "tracked branch no longer exists, dropping it");
            dropped.push(name.clone());
        }
    }

    let mut repaired = false;
    let names: Vec<String> = parents.keys().cloned().collect();
    for name in names {
        let Some(Some(parent)) = parents.get(&name).cloned() else {
            continue;
        };
        if parent == root || parents.contains_key(&parent) {
            continue;
        }

        let new_parent = choose_parent(&name, &parent, &recorded, &parents, root, prompter)?;
        info!(branch = %name, old = %parent, new = %new_parent, "repaired dangling parent");
        vcs.set_tracking_parent(&name, &new_parent)?
            .into_result(&format!("branch --set-upstream-to={new_parent} {name}"))?;
        parents.insert(name, Some(new_parent));
        repaired = true;
    }

    let mut records = vec![(root.to_string(), (*root_head).to_string(), None)];
    for (name, parent) in parents {
        let head = heads.get(name.as_str()).copied().unwrap_or_default().to_string();
        records.push((name, head, parent));
    }

    let graph = BranchGraph::from_records(root, records)?;
    debug!(branches = graph.len(), repaired, dropped = dropped.len(), "loaded graph");
    Ok(LoadedGraph {
        graph,
        repaired,
        dropped,
    })
}

fn choose_parent(
    name: &str,
    missing: &str,
    recorded: &BTreeMap<String, Option<String>>,
    kept: &BTreeMap<String, Option<String>>,
    root: &str,
    prompter: &dyn Prompter,
) -> Result<String> {
    if !prompter.is_interactive() {
        return Err(Error::DanglingParent {
            branch: name.to_string(),
            parent: missing.to_string(),
        });
    }

    // Nearest surviving ancestor of the missing branch goes first.
    let mut suggested = root.to_string();
    let mut cursor = recorded.get(missing).cloned().flatten();
    for _ in 0..=recorded.len() {
        let Some(candidate) = cursor else {
            break;
        };
        if candidate == root || kept.contains_key(&candidate) {
            suggested = candidate;
            break;
        }
        cursor = recorded.get(&candidate).cloned().flatten();
    }
    if suggested == name || leads_to(kept, &suggested, name) {
        suggested = root.to_string();
    }

    let mut options = vec![suggested.clone()];
    options.extend(
        std::iter::once(root.to_string())
            .chain(kept.keys().cloned())
            .filter(|candidate| {
                candidate != &suggested
                    && candidate != name
                    && !leads_to(kept, candidate, name)
            }),
    );

    let message = format!("Parent '{missing}' of '{name}' no longer exists. Choose a new parent");
    let choice = prompter.select(&message, &options)?.ok_or(Error::Cancelled)?;
    options.get(choice).cloned().ok_or(Error::Cancelled)
}

/// Whether walking up from `from` reaches `target`
fn leads_to(parents: &BTreeMap<String, Option<String>>, from: &str, target: &str) -> bool {
    let mut cursor = parents.get(from).cloned().flatten();
    let mut steps = 0;
    while let Some(name) = cursor {
        if name == target {
            return true;
        }
        steps += 1;
        if steps > parents.len() {
            return false;
        }
        cursor = parents.get(&name).cloned().flatten();
    }
    false
}
