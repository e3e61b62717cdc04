//! Authentication for the review service
//!
//! Supports an environment variable and the `gh` CLI.

mod github;

pub use github::{GitHubAuthConfig, get_github_auth, get_github_auth_with, test_github_auth};

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from CLI tool (gh)
    Cli,
    /// Token from environment variable
    EnvVar,
}
