//! Error types for git-ryu

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for git-ryu
#[derive(Error, Debug)]
pub enum Error {
    /// Not inside a git working tree
    #[error("not a git repository (run gryu inside a git working tree)")]
    NotARepo,

    /// No persisted stack state for this repository
    #[error("repository is not initialized for gryu (run 'gryu init')")]
    NotInitialized,

    /// HEAD does not point at a branch
    #[error("HEAD is detached; check out a branch first")]
    DetachedHead,

    /// Branch is not part of the graph
    #[error("branch '{0}' not found")]
    BranchNotFound(String),

    /// Branch already exists in the graph
    #[error("branch '{0}' already exists")]
    DuplicateBranch(String),

    /// Operation is not allowed on the root branch
    #[error("'{0}' is the root branch")]
    RootBranch(String),

    /// Persisted parent reference that no longer resolves
    #[error("branch '{branch}' has parent '{parent}' which no longer exists")]
    DanglingParent {
        /// Branch holding the reference
        branch: String,
        /// Missing parent name
        parent: String,
    },

    /// Reparenting would create a cycle
    #[error("cannot move '{branch}' onto '{onto}': '{onto}' is a descendant of '{branch}'")]
    Cycle {
        /// Branch being moved
        branch: String,
        /// Requested new parent
        onto: String,
    },

    /// Current branch has no children
    #[error("already at the top of the stack")]
    AtTop,

    /// Current branch has no parent
    #[error("already at the bottom of the stack")]
    AtRoot,

    /// User cancelled a required choice
    #[error("cancelled")]
    Cancelled,

    /// Repository has no remotes configured
    #[error("no git remotes configured (add one with 'git remote add')")]
    NoRemotes,

    /// Remote not found
    #[error("remote '{0}' not found")]
    RemoteNotFound(String),

    /// A git command failed
    #[error("git {command} failed: {output}")]
    Git {
        /// Command that was run, without the leading `git`
        command: String,
        /// Captured stdout/stderr
        output: String,
    },

    /// libgit2 error
    #[error("git error: {0}")]
    Git2(#[from] git2::Error),

    /// Review is not approved, merge sequence halted
    #[error("review for '{0}' is not approved")]
    NotApproved(String),

    /// Review service reported a failed merge
    #[error("merge of '{branch}' failed: {message}")]
    MergeFailed {
        /// Branch whose review failed to merge
        branch: String,
        /// Provider message
        message: String,
    },

    /// Merge did not reach a terminal state in time
    #[error("timed out waiting for '{0}' to merge")]
    MergeTimeout(String),

    /// Squash could not be completed
    #[error("squash failed: {0}")]
    Squash(String),

    /// GitHub API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Authentication error
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Configured review tool is not supported
    #[error("unknown code review tool '{0}' (expected 'none' or 'github')")]
    UnknownReviewTool(String),

    /// Failed to parse a remote URL
    #[error("failed to parse remote URL: {0}")]
    InvalidRemoteUrl(String),

    /// Persisted state error
    #[error("state error: {0}")]
    Tracking(String),

    /// Prompt could not be shown or read
    #[error("prompt failed: {0}")]
    Prompt(String),

    /// Interactive input required but not available
    #[error("input required but not running interactively: {0}")]
    NonInteractive(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}
