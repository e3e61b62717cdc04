//! In-memory VCS double
//!
//! Models just enough of git for the engines: branch heads, upstreams,
//! remote-tracking branches and a checkout. Every call is logged so tests
//! can assert on ordering.

#![allow(dead_code)]

use git_ryu::error::{Error, Result};
use git_ryu::repo::Vcs;
use git_ryu::types::{BranchScope, CommandOutput, CommitSummary, VcsBranch};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

#[derive(Debug, Clone)]
struct FakeBranch {
    head: String,
    upstream: Option<String>,
}

#[derive(Debug, Default)]
struct FakeState {
    current: String,
    branches: BTreeMap<String, FakeBranch>,
    remote_branches: BTreeSet<String>,
    remote_after_fetch: Option<BTreeSet<String>>,
    remotes: Vec<(String, String)>,
    commits: HashMap<String, Vec<CommitSummary>>,
    messages: HashMap<String, String>,
    empty_diffs: HashSet<(String, String)>,
    squash_mismatch: bool,
    fail_rebase: HashSet<String>,
    fail_pull: HashSet<String>,
    fail_push: HashSet<String>,
    fail_cherry_pick: HashSet<String>,
    fail_fast_forward: bool,
    fail_tracking: HashSet<String>,
    rebases: usize,
    log: Vec<String>,
}

/// In-memory implementation of [`Vcs`]
pub struct FakeVcs {
    state: RefCell<FakeState>,
}

impl FakeVcs {
    /// Repository with only `root` checked out
    pub fn new(root: &str) -> Self {
        let mut state = FakeState {
            current: root.to_string(),
            ..FakeState::default()
        };
        state.branches.insert(
            root.to_string(),
            FakeBranch {
                head: format!("{root}-0"),
                upstream: None,
            },
        );
        Self {
            state: RefCell::new(state),
        }
    }

    /// Repository with `(name, parent)` branches tracking their parents
    pub fn with_branches(root: &str, branches: &[(&str, &str)]) -> Self {
        let vcs = Self::new(root);
        for (name, parent) in branches {
            vcs.add_branch(name, Some(parent));
        }
        vcs
    }

    /// Add a local branch, optionally tracking a local parent
    pub fn add_branch(&self, name: &str, upstream: Option<&str>) {
        self.state.borrow_mut().branches.insert(
            name.to_string(),
            FakeBranch {
                head: format!("{name}-0"),
                upstream: upstream.map(ToString::to_string),
            },
        );
    }

    /// Remove a local branch behind the tool's back
    pub fn remove_branch(&self, name: &str) {
        self.state.borrow_mut().branches.remove(name);
    }

    /// Add a remote
    pub fn add_remote(&self, name: &str, url: &str) {
        self.state
            .borrow_mut()
            .remotes
            .push((name.to_string(), url.to_string()));
    }

    /// Remote-tracking branches before and after the next fetch
    pub fn set_remote_branches(&self, before: &[&str], after: &[&str]) {
        let mut state = self.state.borrow_mut();
        state.remote_branches = before.iter().map(ToString::to_string).collect();
        state.remote_after_fetch = Some(after.iter().map(ToString::to_string).collect());
    }

    /// Commits unique to `branch`, oldest first: `(sha, full message)`
    pub fn set_commits(&self, branch: &str, commits: &[(&str, &str)]) {
        let mut state = self.state.borrow_mut();
        let mut summaries: Vec<CommitSummary> = commits
            .iter()
            .map(|(sha, message)| CommitSummary {
                sha: (*sha).to_string(),
                subject: message.lines().next().unwrap_or_default().to_string(),
            })
            .collect();
        summaries.reverse();
        state.commits.insert(branch.to_string(), summaries);
        for (sha, message) in commits {
            state
                .messages
                .insert((*sha).to_string(), (*message).to_string());
        }
    }

    /// Make `diff(base, head)` empty
    pub fn set_empty_diff(&self, base: &str, head: &str) {
        self.state
            .borrow_mut()
            .empty_diffs
            .insert((base.to_string(), head.to_string()));
    }

    /// Make the squash verification diff non-empty
    pub fn set_squash_mismatch(&self) {
        self.state.borrow_mut().squash_mismatch = true;
    }

    /// Make rebasing `branch` fail
    pub fn fail_rebase(&self, branch: &str) {
        self.state.borrow_mut().fail_rebase.insert(branch.to_string());
    }

    /// Make pulling into `branch` fail
    pub fn fail_pull(&self, branch: &str) {
        self.state.borrow_mut().fail_pull.insert(branch.to_string());
    }

    /// Make pushing `branch` fail
    pub fn fail_push(&self, branch: &str) {
        self.state.borrow_mut().fail_push.insert(branch.to_string());
    }

    /// Make cherry-picking `sha` fail
    pub fn fail_cherry_pick(&self, sha: &str) {
        self.state
            .borrow_mut()
            .fail_cherry_pick
            .insert(sha.to_string());
    }

    /// Make re-pointing the upstream of `branch` fail
    pub fn fail_tracking(&self, branch: &str) {
        self.state
            .borrow_mut()
            .fail_tracking
            .insert(branch.to_string());
    }

    /// Make every fast-forward fail
    pub fn fail_fast_forward(&self) {
        self.state.borrow_mut().fail_fast_forward = true;
    }

    /// Check out a branch directly, bypassing the log
    pub fn set_current(&self, name: &str) {
        self.state.borrow_mut().current = name.to_string();
    }

    /// Name of the checked out branch
    pub fn current(&self) -> String {
        self.state.borrow().current.clone()
    }

    /// Whether a local branch exists
    pub fn has_branch(&self, name: &str) -> bool {
        self.state.borrow().branches.contains_key(name)
    }

    /// Head of a local branch
    pub fn head(&self, name: &str) -> Option<String> {
        self.state.borrow().branches.get(name).map(|b| b.head.clone())
    }

    /// Upstream of a local branch
    pub fn upstream(&self, name: &str) -> Option<String> {
        self.state
            .borrow()
            .branches
            .get(name)
            .and_then(|b| b.upstream.clone())
    }

    /// Every call made so far
    pub fn log(&self) -> Vec<String> {
        self.state.borrow().log.clone()
    }

    /// Calls starting with `prefix`
    pub fn calls(&self, prefix: &str) -> Vec<String> {
        self.log()
            .into_iter()
            .filter(|entry| entry.starts_with(prefix))
            .collect()
    }

    fn record(&self, entry: String) {
        self.state.borrow_mut().log.push(entry);
    }
}

impl Vcs for FakeVcs {
    fn is_repo(&self) -> bool {
        true
    }

    fn root_dir(&self) -> Result<PathBuf> {
        Ok(PathBuf::from("/fake/repo"))
    }

    fn current_branch(&self) -> Result<VcsBranch> {
        let state = self.state.borrow();
        let branch = state
            .branches
            .get(&state.current)
            .ok_or(Error::DetachedHead)?;
        Ok(VcsBranch {
            name: state.current.clone(),
            head_sha: branch.head.clone(),
        })
    }

    fn list_branches(&self, scope: BranchScope) -> Result<Vec<VcsBranch>> {
        let state = self.state.borrow();
        Ok(match scope {
            BranchScope::Local => state
                .branches
                .iter()
                .map(|(name, b)| VcsBranch {
                    name: name.clone(),
                    head_sha: b.head.clone(),
                })
                .collect(),
            BranchScope::Remote => state
                .remote_branches
                .iter()
                .map(|name| VcsBranch {
                    name: name.clone(),
                    head_sha: format!("{name}-remote"),
                })
                .collect(),
        })
    }

    fn parent_of(&self, name: &str) -> Result<Option<String>> {
        let state = self.state.borrow();
        let branch = state
            .branches
            .get(name)
            .ok_or_else(|| Error::BranchNotFound(name.to_string()))?;
        Ok(branch
            .upstream
            .clone()
            .filter(|u| state.branches.contains_key(u)))
    }

    fn checkout(&self, name: &str) -> Result<CommandOutput> {
        self.record(format!("checkout {name}"));
        let mut state = self.state.borrow_mut();
        if !state.branches.contains_key(name) {
            return Ok(CommandOutput::failed(format!(
                "error: pathspec '{name}' did not match"
            )));
        }
        state.current = name.to_string();
        Ok(CommandOutput::ok(""))
    }

    fn new_branch(&self, name: &str, tracking_parent: Option<&str>) -> Result<VcsBranch> {
        self.record(format!("new-branch {name}"));
        let mut state = self.state.borrow_mut();
        let base = tracking_parent.map_or_else(|| state.current.clone(), ToString::to_string);
        let head = state
            .branches
            .get(&base)
            .map(|b| b.head.clone())
            .ok_or_else(|| Error::BranchNotFound(base.clone()))?;
        state.branches.insert(
            name.to_string(),
            FakeBranch {
                head: head.clone(),
                upstream: tracking_parent.map(ToString::to_string),
            },
        );
        state.current = name.to_string();
        Ok(VcsBranch {
            name: name.to_string(),
            head_sha: head,
        })
    }

    fn fetch(&self, remote: &str) -> Result<CommandOutput> {
        self.record(format!("fetch {remote}"));
        let mut state = self.state.borrow_mut();
        if let Some(after) = state.remote_after_fetch.take() {
            state.remote_branches = after;
        }
        Ok(CommandOutput::ok(""))
    }

    fn pull(&self, remote: Option<&str>, remote_branch: Option<&str>) -> Result<CommandOutput> {
        let current = self.current();
        self.record(format!(
            "pull {current} {} {}",
            remote.unwrap_or("-"),
            remote_branch.unwrap_or("-")
        ));
        if self.state.borrow().fail_pull.contains(&current) {
            return Ok(CommandOutput::failed("CONFLICT (content): merge conflict"));
        }
        Ok(CommandOutput::ok("Already up to date."))
    }

    fn abort_merge(&self) -> Result<CommandOutput> {
        self.record("merge --abort".to_string());
        Ok(CommandOutput::ok(""))
    }

    fn push(&self, branch: &str, remote: &str, force: bool) -> Result<CommandOutput> {
        self.record(format!("push {branch} {remote}{}", if force { " --force" } else { "" }));
        if self.state.borrow().fail_push.contains(branch) {
            return Ok(CommandOutput::failed("! [rejected] (stale info)"));
        }
        Ok(CommandOutput::ok(""))
    }

    fn rebase(&self, branch: &str, onto: &str) -> Result<CommandOutput> {
        self.record(format!("rebase {branch} {onto}"));
        let mut state = self.state.borrow_mut();
        state.current = branch.to_string();
        if state.fail_rebase.contains(branch) {
            return Ok(CommandOutput::failed("CONFLICT (content): could not apply"));
        }
        state.rebases += 1;
        let head = format!("{branch}-{}", state.rebases);
        if let Some(b) = state.branches.get_mut(branch) {
            b.head = head;
        }
        Ok(CommandOutput::ok(""))
    }

    fn abort_rebase(&self) -> Result<CommandOutput> {
        self.record("rebase --abort".to_string());
        Ok(CommandOutput::ok(""))
    }

    fn cherry_pick(&self, sha: &str) -> Result<CommandOutput> {
        self.record(format!("cherry-pick {sha}"));
        if self.state.borrow().fail_cherry_pick.contains(sha) {
            return Ok(CommandOutput::failed("error: could not apply"));
        }
        let mut state = self.state.borrow_mut();
        let current = state.current.clone();
        if let Some(b) = state.branches.get_mut(&current) {
            b.head = format!("{current}+{sha}");
        }
        Ok(CommandOutput::ok(""))
    }

    fn abort_cherry_pick(&self) -> Result<CommandOutput> {
        self.record("cherry-pick --abort".to_string());
        Ok(CommandOutput::ok(""))
    }

    fn commit_diff(&self, _base: &str, head: &str) -> Result<Vec<CommitSummary>> {
        Ok(self
            .state
            .borrow()
            .commits
            .get(head)
            .cloned()
            .unwrap_or_default())
    }

    fn commit_message(&self, sha: &str) -> Result<String> {
        Ok(self
            .state
            .borrow()
            .messages
            .get(sha)
            .cloned()
            .unwrap_or_default())
    }

    fn diff(&self, base: &str, head: &str) -> Result<String> {
        let state = self.state.borrow();
        let empty = state
            .empty_diffs
            .contains(&(base.to_string(), head.to_string()))
            || (base.starts_with("gryu-squash-") && !state.squash_mismatch);
        Ok(if empty {
            String::new()
        } else {
            format!("diff --git a/{head} b/{head}\n")
        })
    }

    fn delete_branch(&self, name: &str, force: bool) -> Result<CommandOutput> {
        self.record(format!("delete {name}{}", if force { " --force" } else { "" }));
        let mut state = self.state.borrow_mut();
        if state.current == name {
            return Ok(CommandOutput::failed(format!(
                "error: cannot delete branch '{name}' used by worktree"
            )));
        }
        if state.branches.remove(name).is_none() {
            return Ok(CommandOutput::failed(format!(
                "error: branch '{name}' not found"
            )));
        }
        Ok(CommandOutput::ok(""))
    }

    fn set_tracking_parent(&self, branch: &str, parent: &str) -> Result<CommandOutput> {
        self.record(format!("track {branch} {parent}"));
        let mut state = self.state.borrow_mut();
        if state.fail_tracking.contains(branch) {
            return Ok(CommandOutput::failed("fatal: could not set upstream"));
        }
        match state.branches.get_mut(branch) {
            Some(b) => {
                b.upstream = Some(parent.to_string());
                Ok(CommandOutput::ok(""))
            }
            None => Ok(CommandOutput::failed("error: no such branch")),
        }
    }

    fn fast_forward(&self, target: &str) -> Result<CommandOutput> {
        self.record(format!("ff {target}"));
        let mut state = self.state.borrow_mut();
        if state.fail_fast_forward {
            return Ok(CommandOutput::failed("fatal: Not possible to fast-forward"));
        }
        let Some(head) = state.branches.get(target).map(|b| b.head.clone()) else {
            return Ok(CommandOutput::failed("fatal: unknown revision"));
        };
        let current = state.current.clone();
        if let Some(b) = state.branches.get_mut(&current) {
            b.head = head;
        }
        Ok(CommandOutput::ok(""))
    }

    fn commit(&self, args: &[String]) -> Result<CommandOutput> {
        self.record(format!("commit {}", args.join(" ")));
        Ok(CommandOutput::ok(""))
    }

    fn remotes(&self) -> Result<Vec<String>> {
        Ok(self
            .state
            .borrow()
            .remotes
            .iter()
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn remote_url(&self, remote: &str) -> Result<String> {
        self.state
            .borrow()
            .remotes
            .iter()
            .find(|(name, _)| name == remote)
            .map(|(_, url)| url.clone())
            .ok_or_else(|| Error::RemoteNotFound(remote.to_string()))
    }
}
