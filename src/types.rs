//! Core types for git-ryu

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A branch tracked in the stack graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Branch name
    pub name: String,
    /// Last known head commit (may be stale)
    pub head_sha: String,
    /// Parent branch name (None for the root)
    pub parent: Option<String>,
    /// Child branch names, sorted, recomputed from parent pointers
    pub children: Vec<String>,
}

impl Branch {
    /// Create a branch with no children
    pub fn new(name: impl Into<String>, head_sha: impl Into<String>, parent: Option<String>) -> Self {
        Self {
            name: name.into(),
            head_sha: head_sha.into(),
            parent,
            children: Vec::new(),
        }
    }

    /// Whether this branch has no parent
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A branch as reported by the VCS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcsBranch {
    /// Branch name (`origin/feat` for remote branches)
    pub name: String,
    /// Head commit id (hex)
    pub head_sha: String,
}

/// Which branches to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchScope {
    /// Local branches
    Local,
    /// Remote-tracking branches
    Remote,
}

/// Captured result of a VCS command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the command exited successfully
    pub success: bool,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given stderr
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Combined stdout and stderr, trimmed
    pub fn output(&self) -> String {
        match (self.stdout.trim(), self.stderr.trim()) {
            (out, "") => out.to_string(),
            ("", err) => err.to_string(),
            (out, err) => format!("{out}\n{err}"),
        }
    }

    /// Convert a failed output into `Error::Git`
    pub fn into_result(self, command: &str) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(Error::Git {
                command: command.to_string(),
                output: self.output(),
            })
        }
    }
}

/// What happened to one branch during a cascading operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchOutcome {
    /// The step succeeded
    Succeeded,
    /// The step failed; carries the captured VCS output
    Failed(String),
    /// The step was not attempted; carries the reason
    Skipped(String),
}

/// Per-branch result of a cascading operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchResult {
    /// Branch name
    pub branch: String,
    /// Outcome for that branch
    pub outcome: BranchOutcome,
}

impl BranchResult {
    /// Successful step
    pub fn succeeded(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            outcome: BranchOutcome::Succeeded,
        }
    }

    /// Failed step with captured output
    pub fn failed(branch: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            outcome: BranchOutcome::Failed(output.into()),
        }
    }

    /// Step that was not attempted
    pub fn skipped(branch: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            outcome: BranchOutcome::Skipped(reason.into()),
        }
    }

    /// Whether the step succeeded
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, BranchOutcome::Succeeded)
    }

    /// Whether the step failed
    pub const fn is_failure(&self) -> bool {
        matches!(self.outcome, BranchOutcome::Failed(_))
    }
}

/// A commit unique to a branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    /// Commit id (hex)
    pub sha: String,
    /// First line of the commit message
    pub subject: String,
}

/// Approval state of a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    /// Waiting for reviewers
    Pending,
    /// Approved by reviewers
    Approved,
    /// A reviewer requested changes
    ChangesRequested,
}

impl std::fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::ChangesRequested => write!(f, "changes requested"),
        }
    }
}

/// A review mirrored from the review service, always fetched fresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Review id (PR number for GitHub)
    pub id: u64,
    /// Review title
    pub title: String,
    /// Web URL
    pub url: String,
    /// Approval state
    pub approval: ApprovalState,
    /// Whether the review can be merged
    /// - `Some(true)` = mergeable
    /// - `Some(false)` = has conflicts
    /// - `None` = unknown (still computing)
    pub mergeable: Option<bool>,
    /// Review body
    pub description: String,
    /// Head branch name
    pub branch: String,
    /// Base branch name
    pub base: String,
}

/// State of an in-flight merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeState {
    /// Merge still in progress
    Pending,
    /// Merge completed
    Success,
    /// Merge failed with a provider message
    Failure(String),
}

impl MergeState {
    /// Whether the merge reached a terminal state
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Merge strategy/method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Create a merge commit
    #[default]
    Merge,
    /// Squash all commits into one
    Squash,
    /// Rebase commits onto base branch
    Rebase,
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge => write!(f, "merge"),
            Self::Squash => write!(f, "squash"),
            Self::Rebase => write!(f, "rebase"),
        }
    }
}

impl FromStr for MergeMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "merge" => Ok(Self::Merge),
            "squash" => Ok(Self::Squash),
            "rebase" => Ok(Self::Rebase),
            other => Err(format!(
                "unknown merge method '{other}' (expected merge, squash or rebase)"
            )),
        }
    }
}

/// Review provider selected at init
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewTool {
    /// No review service
    #[default]
    #[serde(rename = "none")]
    None,
    /// GitHub pull requests
    #[serde(rename = "github")]
    GitHub,
}

impl ReviewTool {
    /// All selectable tools, in prompt order
    pub const ALL: [Self; 2] = [Self::None, Self::GitHub];
}

impl std::fmt::Display for ReviewTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::GitHub => write!(f, "github"),
        }
    }
}

impl FromStr for ReviewTool {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "github" => Ok(Self::GitHub),
            _ => Err(Error::UnknownReviewTool(s.to_string())),
        }
    }
}

/// Repository coordinates on the review service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_output_combines_streams() {
        let out = CommandOutput {
            success: false,
            stdout: "CONFLICT (content)\n".to_string(),
            stderr: "error: could not apply abc123\n".to_string(),
        };
        assert_eq!(
            out.output(),
            "CONFLICT (content)\nerror: could not apply abc123"
        );
    }

    #[test]
    fn test_into_result_maps_failure_to_git_error() {
        let err = CommandOutput::failed("rejected").into_result("push origin feat").unwrap_err();
        match err {
            Error::Git { command, output } => {
                assert_eq!(command, "push origin feat");
                assert_eq!(output, "rejected");
            }
            other => panic!("expected Git error, got {other:?}"),
        }
    }

    #[test]
    fn test_review_tool_parse() {
        assert_eq!("GitHub".parse::<ReviewTool>().unwrap(), ReviewTool::GitHub);
        assert_eq!("none".parse::<ReviewTool>().unwrap(), ReviewTool::None);
        assert!(matches!(
            "gitlab".parse::<ReviewTool>(),
            Err(Error::UnknownReviewTool(_))
        ));
    }

    #[test]
    fn test_merge_method_parse() {
        assert_eq!("squash".parse::<MergeMethod>().unwrap(), MergeMethod::Squash);
        assert!("octopus".parse::<MergeMethod>().is_err());
    }
}
