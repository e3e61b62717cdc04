//! Real git repositories in temp directories

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A git repository with an initial commit on `main`
pub struct TempGitRepo {
    dir: TempDir,
    state_dir: TempDir,
}

impl TempGitRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let state_dir = TempDir::new().expect("failed to create state dir");
        let repo = Self { dir, state_dir };
        repo.git(&["init", "-q", "-b", "main"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo.commit_file("README.md", "hello\n", "Initial commit");
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Directory to point `GRYU_STATE_DIR` at
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.path().to_path_buf()
    }

    /// Run git and return stdout, panicking on failure
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.dir.path())
            .output()
            .expect("failed to run git");
        assert!(
            output.status.success(),
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Write a file and commit it on the current branch
    pub fn commit_file(&self, name: &str, content: &str, message: &str) {
        fs::write(self.dir.path().join(name), content).expect("failed to write file");
        self.git(&["add", name]);
        self.git(&["commit", "-q", "-m", message]);
    }

    /// Create `name` from `parent`, tracking it, and check it out
    pub fn branch_from(&self, name: &str, parent: &str) {
        self.git(&["checkout", "-q", "-b", name, "--track", parent]);
    }

    pub fn current_branch(&self) -> String {
        self.git(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    pub fn head(&self, rev: &str) -> String {
        self.git(&["rev-parse", rev])
    }

    pub fn branch_exists(&self, name: &str) -> bool {
        Command::new("git")
            .args(["rev-parse", "--verify", "--quiet", &format!("refs/heads/{name}")])
            .current_dir(self.dir.path())
            .output()
            .is_ok_and(|o| o.status.success())
    }
}
