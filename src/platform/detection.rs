//! Repository coordinates from remote URLs

use crate::error::{Error, Result};
use crate::types::PlatformConfig;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// `git@host:owner/repo` style remotes
static SCP_LIKE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?:[\w.-]+@)?([\w.-]+):([^/].*)$").ok());

/// Parse owner, repo and host out of a remote URL
///
/// Accepts https, ssh:// and scp-style URLs, with or without `.git`.
/// `host` is `None` for github.com.
pub fn parse_repo_info(url: &str) -> Result<PlatformConfig> {
    let trimmed = url.trim().trim_end_matches('/');
    let (host, path) = split_remote(trimmed).ok_or_else(|| Error::InvalidRemoteUrl(url.to_string()))?;

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let Some((owner, repo)) = path.rsplit_once('/') else {
        return Err(Error::InvalidRemoteUrl(url.to_string()));
    };
    if owner.is_empty() || repo.is_empty() {
        return Err(Error::InvalidRemoteUrl(url.to_string()));
    }

    let host = host.to_ascii_lowercase();
    Ok(PlatformConfig {
        owner: owner.to_string(),
        repo: repo.to_string(),
        host: (host != "github.com" && host != "www.github.com").then_some(host),
    })
}

fn split_remote(url: &str) -> Option<(String, String)> {
    if url.contains("://") {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_string();
        return Some((host, parsed.path().to_string()));
    }

    let captures = SCP_LIKE.as_ref()?.captures(url)?;
    Some((captures[1].to_string(), captures[2].to_string()))
}
