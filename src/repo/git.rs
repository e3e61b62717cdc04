//! Git implementation of the VCS port
//!
//! Reads go through libgit2; anything that touches the working tree shells
//! out to `git` so hooks, rerere and user config behave as usual.

use super::Vcs;
use crate::error::{Error, Result};
use crate::types::{BranchScope, CommandOutput, CommitSummary, VcsBranch};
use git2::{BranchType, ErrorCode, Repository};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, trace};

/// A git working tree
pub struct GitRepo {
    repo: Repository,
    workdir: PathBuf,
}

impl GitRepo {
    /// Discover the repository containing `path`
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|_| Error::NotARepo)?;
        let workdir = repo.workdir().ok_or(Error::NotARepo)?.to_path_buf();
        debug!(workdir = %workdir.display(), "opened repository");
        Ok(Self { repo, workdir })
    }

    fn git(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()?;

        let result = CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(command = %args.join(" "), success = result.success, "ran git");
        trace!(stdout = %result.stdout, stderr = %result.stderr, "git output");
        Ok(result)
    }

    fn git_checked(&self, args: &[&str]) -> Result<String> {
        Ok(self.git(args)?.into_result(&args.join(" "))?.stdout)
    }
}

impl Vcs for GitRepo {
    fn is_repo(&self) -> bool {
        !self.repo.is_bare()
    }

    fn root_dir(&self) -> Result<PathBuf> {
        Ok(self.workdir.clone())
    }

    fn current_branch(&self) -> Result<VcsBranch> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(Error::DetachedHead);
        }
        let name = head
            .shorthand()
            .ok_or_else(|| Error::Internal("HEAD ref is not valid UTF-8".to_string()))?
            .to_string();
        let head_sha = head.peel_to_commit()?.id().to_string();
        Ok(VcsBranch { name, head_sha })
    }

    fn list_branches(&self, scope: BranchScope) -> Result<Vec<VcsBranch>> {
        let kind = match scope {
            BranchScope::Local => BranchType::Local,
            BranchScope::Remote => BranchType::Remote,
        };

        let mut branches = Vec::new();
        for entry in self.repo.branches(Some(kind))? {
            let (branch, _) = entry?;
            let Some(name) = branch.name()? else {
                continue;
            };
            if name.ends_with("/HEAD") {
                continue;
            }
            let name = name.to_string();
            let head_sha = branch.get().peel_to_commit()?.id().to_string();
            branches.push(VcsBranch { name, head_sha });
        }
        branches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(branches)
    }

    fn parent_of(&self, name: &str) -> Result<Option<String>> {
        let branch = match self.repo.find_branch(name, BranchType::Local) {
            Ok(branch) => branch,
            Err(e) if e.code() == ErrorCode::NotFound => {
                return Err(Error::BranchNotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        match branch.upstream() {
            Ok(upstream) if upstream.get().is_remote() => Ok(None),
            Ok(upstream) => Ok(upstream.name()?.map(ToString::to_string)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn checkout(&self, name: &str) -> Result<CommandOutput> {
        self.git(&["checkout", name])
    }

    fn new_branch(&self, name: &str, tracking_parent: Option<&str>) -> Result<VcsBranch> {
        let mut args = vec!["checkout", "-b", name];
        if let Some(parent) = tracking_parent {
            args.extend(["--track", parent]);
        }
        self.git_checked(&args)?;
        self.current_branch()
    }

    fn fetch(&self, remote: &str) -> Result<CommandOutput> {
        self.git(&["fetch", remote, "--prune"])
    }

    fn pull(&self, remote: Option<&str>, remote_branch: Option<&str>) -> Result<CommandOutput> {
        let mut args = vec!["pull", "--no-rebase", "--no-edit"];
        args.extend(remote);
        args.extend(remote_branch);
        self.git(&args)
    }

    fn abort_merge(&self) -> Result<CommandOutput> {
        self.git(&["merge", "--abort"])
    }

    fn push(&self, branch: &str, remote: &str, force: bool) -> Result<CommandOutput> {
        if force {
            self.git(&["push", "--force-with-lease", remote, branch])
        } else {
            self.git(&["push", remote, branch])
        }
    }

    fn rebase(&self, branch: &str, onto: &str) -> Result<CommandOutput> {
        self.git(&["rebase", onto, branch])
    }

    fn abort_rebase(&self) -> Result<CommandOutput> {
        self.git(&["rebase", "--abort"])
    }

    fn cherry_pick(&self, sha: &str) -> Result<CommandOutput> {
        self.git(&["cherry-pick", sha])
    }

    fn abort_cherry_pick(&self) -> Result<CommandOutput> {
        self.git(&["cherry-pick", "--abort"])
    }

    fn commit_diff(&self, base: &str, head: &str) -> Result<Vec<CommitSummary>> {
        let range = format!("{base}..{head}");
        let stdout = self.git_checked(&["log", &range, "--format=%H%x00%s"])?;
        Ok(stdout
            .lines()
            .filter_map(|line| line.split_once('\0'))
            .map(|(sha, subject)| CommitSummary {
                sha: sha.to_string(),
                subject: subject.to_string(),
            })
            .collect())
    }

    fn commit_message(&self, sha: &str) -> Result<String> {
        let oid = git2::Oid::from_str(sha)?;
        let commit = self.repo.find_commit(oid)?;
        Ok(commit.message().unwrap_or_default().trim_end().to_string())
    }

    fn diff(&self, base: &str, head: &str) -> Result<String> {
        self.git_checked(&["diff", base, head])
    }

    fn delete_branch(&self, name: &str, force: bool) -> Result<CommandOutput> {
        self.git(&["branch", if force { "-D" } else { "-d" }, name])
    }

    fn set_tracking_parent(&self, branch: &str, parent: &str) -> Result<CommandOutput> {
        let upstream = format!("--set-upstream-to={parent}");
        self.git(&["branch", &upstream, branch])
    }

    fn fast_forward(&self, target: &str) -> Result<CommandOutput> {
        self.git(&["merge", "--ff-only", target])
    }

    fn commit(&self, args: &[String]) -> Result<CommandOutput> {
        let mut full = vec!["commit"];
        full.extend(args.iter().map(String::as_str));
        self.git(&full)
    }

    fn remotes(&self) -> Result<Vec<String>> {
        Ok(self
            .repo
            .remotes()?
            .iter()
            .flatten()
            .map(ToString::to_string)
            .collect())
    }

    fn remote_url(&self, remote: &str) -> Result<String> {
        let found = match self.repo.find_remote(remote) {
            Ok(found) => found,
            Err(e) if e.code() == ErrorCode::NotFound => {
                return Err(Error::RemoteNotFound(remote.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        found
            .url()
            .map(ToString::to_string)
            .ok_or_else(|| Error::InvalidRemoteUrl(format!("remote '{remote}' has no URL")))
    }
}
