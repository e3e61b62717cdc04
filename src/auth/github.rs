//! GitHub token discovery

use crate::auth::AuthSource;
use crate::error::{Error, Result};
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

/// GitHub authentication configuration
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// Authentication token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
}

/// Get GitHub authentication
///
/// Priority:
/// 1. The configured environment variable (default `GITHUB_TOKEN`)
/// 2. `gh auth token`
pub async fn get_github_auth(env_var: &str) -> Result<GitHubAuthConfig> {
    get_github_auth_with(env_var, |name| std::env::var(name).ok()).await
}

/// [`get_github_auth`] with an injectable environment lookup
pub async fn get_github_auth_with<F>(env_var: &str, lookup: F) -> Result<GitHubAuthConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(config) = token_from_env(env_var, &lookup) {
        debug!(env_var, "using GitHub token from environment");
        return Ok(config);
    }

    if let Some(token) = gh_cli_token().await {
        debug!("using GitHub token from gh CLI");
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::Cli,
        });
    }

    Err(Error::Auth(format!(
        "no GitHub token found; set {env_var} or run 'gh auth login'"
    )))
}

fn token_from_env<F>(env_var: &str, lookup: &F) -> Option<GitHubAuthConfig>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(env_var)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .map(|token| GitHubAuthConfig {
            token,
            source: AuthSource::EnvVar,
        })
}

async fn gh_cli_token() -> Option<String> {
    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        debug!(status = %output.status, "gh auth token failed");
        return None;
    }
    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!token.is_empty()).then_some(token)
}

#[derive(Deserialize)]
struct AuthenticatedUser {
    login: String,
}

/// Verify a token by fetching the authenticated user; returns the login
pub async fn test_github_auth(token: &str, host: Option<&str>) -> Result<String> {
    let url = host.map_or_else(
        || "https://api.github.com/user".to_string(),
        |h| format!("https://{h}/api/v3/user"),
    );

    let response = reqwest::Client::new()
        .get(&url)
        .header("Authorization", format!("Bearer {token}"))
        .header("Accept", "application/vnd.github+json")
        .header("X-GitHub-Api-Version", "2022-11-28")
        .header("User-Agent", "git-ryu")
        .send()
        .await
        .map_err(|e| Error::Auth(format!("Failed to reach GitHub: {e}")))?;

    if !response.status().is_success() {
        return Err(Error::Auth(format!(
            "GitHub rejected the token ({})",
            response.status()
        )));
    }

    let user: AuthenticatedUser = response
        .json()
        .await
        .map_err(|e| Error::Auth(format!("Failed to parse user response: {e}")))?;
    Ok(user.login)
}
