//! VCS port and git implementation
//!
//! Engines only talk to the `Vcs` trait so they can run against an
//! in-memory double in tests.

mod git;

pub use git::GitRepo;

use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::types::{BranchScope, CommandOutput, CommitSummary, VcsBranch};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Capability surface the stack engines need from version control
///
/// Mutating operations return `Ok(CommandOutput)` even when the command
/// itself failed; `Err` is reserved for being unable to run it at all.
pub trait Vcs {
    /// Whether the working directory is inside a repository
    fn is_repo(&self) -> bool;

    /// Root of the working tree
    fn root_dir(&self) -> Result<PathBuf>;

    /// Currently checked out branch
    fn current_branch(&self) -> Result<VcsBranch>;

    /// List local or remote-tracking branches
    fn list_branches(&self, scope: BranchScope) -> Result<Vec<VcsBranch>>;

    /// Local branch the given branch tracks, ignoring remote upstreams
    fn parent_of(&self, name: &str) -> Result<Option<String>>;

    /// Check out a branch
    fn checkout(&self, name: &str) -> Result<CommandOutput>;

    /// Create a branch at the tracking parent's tip (or HEAD) and check it out
    fn new_branch(&self, name: &str, tracking_parent: Option<&str>) -> Result<VcsBranch>;

    /// Fetch from a remote, pruning deleted branches
    fn fetch(&self, remote: &str) -> Result<CommandOutput>;

    /// Pull into the checked out branch; `None` pulls from its upstream
    fn pull(&self, remote: Option<&str>, remote_branch: Option<&str>) -> Result<CommandOutput>;

    /// Abort an in-progress merge left behind by a conflicting pull
    fn abort_merge(&self) -> Result<CommandOutput>;

    /// Push a branch to a remote
    ///
    /// `force` rewrites the remote branch with a lease; without it a push that
    /// is not a fast-forward is rejected.
    fn push(&self, branch: &str, remote: &str, force: bool) -> Result<CommandOutput>;

    /// Rebase `branch` onto `onto`
    fn rebase(&self, branch: &str, onto: &str) -> Result<CommandOutput>;

    /// Abort an in-progress rebase
    fn abort_rebase(&self) -> Result<CommandOutput>;

    /// Cherry-pick a commit onto the checked out branch
    fn cherry_pick(&self, sha: &str) -> Result<CommandOutput>;

    /// Abort an in-progress cherry-pick
    fn abort_cherry_pick(&self) -> Result<CommandOutput>;

    /// Commits reachable from `head` but not `base`, newest first
    fn commit_diff(&self, base: &str, head: &str) -> Result<Vec<CommitSummary>>;

    /// Full message of a commit
    fn commit_message(&self, sha: &str) -> Result<String>;

    /// Tree diff between two revisions
    fn diff(&self, base: &str, head: &str) -> Result<String>;

    /// Delete a local branch
    fn delete_branch(&self, name: &str, force: bool) -> Result<CommandOutput>;

    /// Point a branch's upstream at a local parent branch
    fn set_tracking_parent(&self, branch: &str, parent: &str) -> Result<CommandOutput>;

    /// Fast-forward the checked out branch to `target`
    fn fast_forward(&self, target: &str) -> Result<CommandOutput>;

    /// Run a commit with passthrough arguments
    fn commit(&self, args: &[String]) -> Result<CommandOutput>;

    /// Configured remote names
    fn remotes(&self) -> Result<Vec<String>>;

    /// URL of a remote
    fn remote_url(&self, remote: &str) -> Result<String>;
}

/// Restores the originally checked out branch when dropped
///
/// Every engine that checks out other branches holds one of these for the
/// duration of the operation, so errors and early returns still land the
/// user back where they started.
pub struct BranchGuard<'a> {
    vcs: &'a dyn Vcs,
    original: Option<String>,
}

impl<'a> BranchGuard<'a> {
    /// Record the current branch
    pub fn new(vcs: &'a dyn Vcs) -> Result<Self> {
        let current = vcs.current_branch()?;
        debug!(branch = %current.name, "holding checkout");
        Ok(Self {
            vcs,
            original: Some(current.name),
        })
    }

    /// Branch that will be restored
    pub fn original(&self) -> Option<&str> {
        self.original.as_deref()
    }

    /// Restore a different branch instead (the original was deleted)
    pub fn retarget(&mut self, name: impl Into<String>) {
        self.original = Some(name.into());
    }

    /// Leave the working tree wherever it ends up
    pub fn disarm(mut self) {
        self.original = None;
    }
}

impl Drop for BranchGuard<'_> {
    fn drop(&mut self) {
        let Some(name) = self.original.take() else {
            return;
        };
        if self
            .vcs
            .current_branch()
            .is_ok_and(|current| current.name == name)
        {
            return;
        }
        match self.vcs.checkout(&name) {
            Ok(out) if out.success => debug!(branch = %name, "restored checkout"),
            Ok(out) => warn!(branch = %name, output = %out.output(), "failed to restore checkout"),
            Err(e) => warn!(branch = %name, error = %e, "failed to restore checkout"),
        }
    }
}

/// Select a remote from the available remotes
///
/// A configured remote must exist. Otherwise a single remote is used
/// directly and several remotes are offered to the user.
pub fn select_remote(
    remotes: &[String],
    configured: Option<&str>,
    prompter: &dyn Prompter,
) -> Result<String> {
    if let Some(name) = configured {
        return remotes
            .iter()
            .find(|r| *r == name)
            .cloned()
            .ok_or_else(|| Error::RemoteNotFound(name.to_string()));
    }

    match remotes {
        [] => Err(Error::NoRemotes),
        [only] => Ok(only.clone()),
        _ => {
            let choice = prompter
                .select("Remote to sync with", remotes)?
                .ok_or(Error::Cancelled)?;
            remotes.get(choice).cloned().ok_or(Error::Cancelled)
        }
    }
}
