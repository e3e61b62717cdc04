//! Persistence for stack state under the user config directory.

use super::{STATE_VERSION, StackState};
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name for git-ryu metadata within the config directory.
const APP_DIR: &str = "git-ryu";

/// Filename for stack state.
const STATE_FILE: &str = "stack.toml";

/// Overrides the base directory (mainly for tests and sandboxes).
const STATE_DIR_ENV: &str = "GRYU_STATE_DIR";

/// Get path to the state file for a repository below `base`.
///
/// Repositories are keyed by their URL-encoded absolute root path.
pub fn state_path_in(base: &Path, repo_root: &Path) -> PathBuf {
    let canonical = fs::canonicalize(repo_root).unwrap_or_else(|_| repo_root.to_path_buf());
    let key = urlencoding::encode(&canonical.to_string_lossy()).into_owned();
    base.join(APP_DIR).join("repos").join(key).join(STATE_FILE)
}

/// Get path to the state file for a repository.
pub fn state_path(repo_root: &Path) -> Result<PathBuf> {
    let base = match std::env::var_os(STATE_DIR_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => dirs::config_dir()
            .ok_or_else(|| Error::Tracking("could not determine config directory".to_string()))?,
    };
    Ok(state_path_in(&base, repo_root))
}

/// Load stack state from disk.
///
/// Returns `None` if the file doesn't exist.
pub fn load_state(path: &Path) -> Result<Option<StackState>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Tracking(format!("failed to read {}: {e}", path.display())))?;

    let state: StackState = toml::from_str(&content)
        .map_err(|e| Error::Tracking(format!("failed to parse {}: {e}", path.display())))?;

    if state.version > STATE_VERSION {
        return Err(Error::Tracking(format!(
            "{} has version {}, this gryu understands up to {STATE_VERSION}",
            path.display(),
            state.version
        )));
    }

    debug!(path = %path.display(), branches = state.branches.len(), "loaded state");
    Ok(Some(state))
}

/// Save stack state to disk.
///
/// Writes a sibling temp file and renames it over the target so an
/// interrupted save never leaves a truncated file behind.
pub fn save_state(path: &Path, state: &StackState) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.exists()
    {
        fs::create_dir_all(dir)
            .map_err(|e| Error::Tracking(format!("failed to create {}: {e}", dir.display())))?;
    }

    let mut state_to_save = state.clone();
    state_to_save.version = STATE_VERSION;

    let content = toml::to_string_pretty(&state_to_save)
        .map_err(|e| Error::Tracking(format!("failed to serialize stack state: {e}")))?;

    let content_with_header = format!(
        "# gryu stack state\n# Auto-generated - manual edits may be overwritten\n\n{content}"
    );

    let tmp = path.with_extension("toml.tmp");
    fs::write(&tmp, content_with_header)
        .map_err(|e| Error::Tracking(format!("failed to write {}: {e}", tmp.display())))?;
    fs::rename(&tmp, path)
        .map_err(|e| Error::Tracking(format!("failed to replace {}: {e}", path.display())))?;

    debug!(path = %path.display(), branches = state.branches.len(), "saved state");
    Ok(())
}

/// Delete the state file. Returns whether a file was removed.
pub fn delete_state(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path)
        .map_err(|e| Error::Tracking(format!("failed to delete {}: {e}", path.display())))?;
    Ok(true)
}
