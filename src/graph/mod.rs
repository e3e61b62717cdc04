//! Branch graph: a tree of branches keyed by name
//!
//! Branches live in a flat map and refer to each other by name. `children`
//! is never trusted from outside; it is rebuilt from `parent` pointers after
//! every mutation.

mod build;
mod layout;

pub use build::{LoadedGraph, build_from_vcs, load_graph};
pub use layout::{TreeLine, tree_lines};

use crate::error::{Error, Result};
use crate::types::{Branch, VcsBranch};
use std::collections::{BTreeMap, HashSet, VecDeque};

/// The current branch resolved against the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBranch {
    /// Graph node, or an ephemeral node for untracked branches
    pub branch: Branch,
    /// Whether the branch is part of the graph
    pub tracked: bool,
}

/// In-memory branch tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchGraph {
    root: String,
    branches: BTreeMap<String, Branch>,
}

impl BranchGraph {
    /// Create a graph holding only the root branch
    pub fn new(root: impl Into<String>, head_sha: impl Into<String>) -> Self {
        let root = root.into();
        let mut branches = BTreeMap::new();
        branches.insert(root.clone(), Branch::new(root.clone(), head_sha, None));
        Self { root, branches }
    }

    /// Build a graph from `(name, head, parent)` records
    ///
    /// Non-root records without a parent attach to the root. Every parent
    /// must resolve and every branch must reach the root.
    pub fn from_records<I>(root: impl Into<String>, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String, Option<String>)>,
    {
        let root = root.into();
        let mut branches = BTreeMap::new();
        for (name, head, parent) in records {
            let parent = if name == root {
                None
            } else {
                Some(parent.unwrap_or_else(|| root.clone()))
            };
            branches.insert(name.clone(), Branch::new(name, head, parent));
        }
        if !branches.contains_key(&root) {
            return Err(Error::BranchNotFound(root));
        }

        for branch in branches.values() {
            if let Some(parent) = &branch.parent
                && !branches.contains_key(parent)
            {
                return Err(Error::DanglingParent {
                    branch: branch.name.clone(),
                    parent: parent.clone(),
                });
            }
        }

        let mut graph = Self { root, branches };
        graph.check_acyclic()?;
        graph.relink();
        Ok(graph)
    }

    fn check_acyclic(&self) -> Result<()> {
        for name in self.branches.keys() {
            let mut cursor = name.as_str();
            let mut steps = 0;
            while let Some(parent) = self.parent_of(cursor) {
                steps += 1;
                if steps > self.branches.len() {
                    return Err(Error::Tracking(format!(
                        "branch '{name}' does not lead back to root '{}'",
                        self.root
                    )));
                }
                cursor = parent;
            }
        }
        Ok(())
    }

    /// Recompute every `children` list from `parent` pointers
    pub fn relink(&mut self) {
        let mut children: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for branch in self.branches.values() {
            if let Some(parent) = &branch.parent {
                children
                    .entry(parent.clone())
                    .or_default()
                    .push(branch.name.clone());
            }
        }
        for branch in self.branches.values_mut() {
            let mut kids = children.remove(&branch.name).unwrap_or_default();
            kids.sort();
            branch.children = kids;
        }
    }

    /// Root branch name
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Number of tracked branches, root included
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Whether only the root is tracked
    pub fn is_empty(&self) -> bool {
        self.branches.len() <= 1
    }

    /// Whether a branch is tracked
    pub fn contains(&self, name: &str) -> bool {
        self.branches.contains_key(name)
    }

    /// Look up a branch
    pub fn get(&self, name: &str) -> Option<&Branch> {
        self.branches.get(name)
    }

    /// Look up a branch, failing with `BranchNotFound`
    pub fn branch(&self, name: &str) -> Result<&Branch> {
        self.branches
            .get(name)
            .ok_or_else(|| Error::BranchNotFound(name.to_string()))
    }

    /// All branches in name order
    pub fn branches(&self) -> impl Iterator<Item = &Branch> {
        self.branches.values()
    }

    /// Parent of a branch (None for the root or unknown branches)
    pub fn parent_of(&self, name: &str) -> Option<&str> {
        self.branches.get(name)?.parent.as_deref()
    }

    /// Children of a branch, sorted
    pub fn children_of(&self, name: &str) -> &[String] {
        self.branches
            .get(name)
            .map_or(&[], |branch| branch.children.as_slice())
    }

    /// Insert a new leaf under `parent`
    pub fn add_branch(&mut self, name: &str, parent: &str, head_sha: &str) -> Result<()> {
        if self.branches.contains_key(name) {
            return Err(Error::DuplicateBranch(name.to_string()));
        }
        if !self.branches.contains_key(parent) {
            return Err(Error::BranchNotFound(parent.to_string()));
        }
        self.branches.insert(
            name.to_string(),
            Branch::new(name, head_sha, Some(parent.to_string())),
        );
        self.relink();
        Ok(())
    }

    /// Remove a branch, moving its children onto its parent
    ///
    /// Returns the removed node with its former children.
    pub fn delete_branch(&mut self, name: &str) -> Result<Branch> {
        if name == self.root {
            return Err(Error::RootBranch(name.to_string()));
        }
        let removed = self
            .branches
            .remove(name)
            .ok_or_else(|| Error::BranchNotFound(name.to_string()))?;
        let parent = removed.parent.clone();
        for child in &removed.children {
            if let Some(branch) = self.branches.get_mut(child) {
                branch.parent.clone_from(&parent);
            }
        }
        self.relink();
        Ok(removed)
    }

    /// Point `name` at a new parent
    pub fn reparent(&mut self, name: &str, new_parent: &str) -> Result<()> {
        if name == self.root {
            return Err(Error::RootBranch(name.to_string()));
        }
        self.branch(name)?;
        self.branch(new_parent)?;
        if name == new_parent || self.is_descendant(new_parent, name) {
            return Err(Error::Cycle {
                branch: name.to_string(),
                onto: new_parent.to_string(),
            });
        }
        if let Some(branch) = self.branches.get_mut(name) {
            branch.parent = Some(new_parent.to_string());
        }
        self.relink();
        Ok(())
    }

    /// Whether `candidate` sits somewhere below `ancestor`
    pub fn is_descendant(&self, candidate: &str, ancestor: &str) -> bool {
        let mut cursor = self.parent_of(candidate);
        while let Some(name) = cursor {
            if name == ancestor {
                return true;
            }
            cursor = self.parent_of(name);
        }
        false
    }

    /// Chain from `name` up to the root, `name` first
    pub fn path_to_root(&self, name: &str) -> Result<Vec<String>> {
        self.branch(name)?;
        let mut path = vec![name.to_string()];
        let mut cursor = self.parent_of(name);
        while let Some(parent) = cursor {
            path.push(parent.to_string());
            cursor = self.parent_of(parent);
        }
        Ok(path)
    }

    /// Chain from the root down to `name`, root first
    pub fn path_from_root(&self, name: &str) -> Result<Vec<String>> {
        let mut path = self.path_to_root(name)?;
        path.reverse();
        Ok(path)
    }

    /// Every path from `from` to a leaf below it
    pub fn all_stacks(&self, from: &str) -> Result<Vec<Vec<String>>> {
        self.branch(from)?;
        let mut stacks = Vec::new();
        let mut path = Vec::new();
        self.collect_stacks(from, &mut path, &mut stacks);
        Ok(stacks)
    }

    fn collect_stacks(&self, name: &str, path: &mut Vec<String>, stacks: &mut Vec<Vec<String>>) {
        path.push(name.to_string());
        let children = self.children_of(name);
        if children.is_empty() {
            stacks.push(path.clone());
        }
        for child in children {
            self.collect_stacks(child, path, stacks);
        }
        path.pop();
    }

    /// Breadth-first order of the subtree at `start`, `start` first
    pub fn cascade_order(&self, start: &str) -> Result<Vec<String>> {
        self.branch(start)?;
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([start.to_string()]);
        while let Some(name) = queue.pop_front() {
            if !seen.insert(name.clone()) {
                continue;
            }
            queue.extend(self.children_of(&name).iter().cloned());
            order.push(name);
        }
        Ok(order)
    }

    /// Every branch below `name`, not including `name`
    pub fn descendants(&self, name: &str) -> Result<Vec<String>> {
        let mut order = self.cascade_order(name)?;
        order.remove(0);
        Ok(order)
    }

    /// Update a cached head
    pub fn set_head(&mut self, name: &str, head_sha: &str) -> Result<()> {
        let branch = self
            .branches
            .get_mut(name)
            .ok_or_else(|| Error::BranchNotFound(name.to_string()))?;
        head_sha.clone_into(&mut branch.head_sha);
        Ok(())
    }

    /// Refresh cached heads from a VCS listing, ignoring unknown branches
    pub fn refresh_heads(&mut self, listing: &[VcsBranch]) {
        for entry in listing {
            if let Some(branch) = self.branches.get_mut(&entry.name) {
                entry.head_sha.clone_into(&mut branch.head_sha);
            }
        }
    }

    /// Map the VCS checkout onto the graph
    ///
    /// A branch the graph does not know becomes an ephemeral parentless node.
    pub fn resolve_current(&self, current: &VcsBranch) -> ResolvedBranch {
        self.branches.get(&current.name).map_or_else(
            || ResolvedBranch {
                branch: Branch::new(current.name.clone(), current.head_sha.clone(), None),
                tracked: false,
            },
            |branch| ResolvedBranch {
                branch: branch.clone(),
                tracked: true,
            },
        )
    }
}
