//! Shared command context for CLI commands
//!
//! Opens the repository, loads persisted state and hands out the graph,
//! prompter and review service.

use crate::cli::style::Stylize;
use anstream::println;
use git_ryu::error::{Error, Result};
use git_ryu::graph::{BranchGraph, load_graph};
use git_ryu::platform::{ReviewService, create_review_service};
use git_ryu::prompt::{Prompter, default_prompter};
use git_ryu::repo::{GitRepo, Vcs, select_remote};
use git_ryu::tracking::{StackState, load_state, save_state, state_path};
use git_ryu::types::ReviewTool;
use std::path::{Path, PathBuf};

/// Everything an initialized command needs
pub struct CommandContext {
    /// The git repository
    pub repo: GitRepo,
    /// Where the state file lives
    pub state_path: PathBuf,
    /// Persisted state
    pub state: StackState,
    /// User interaction
    pub prompter: Box<dyn Prompter>,
}

impl CommandContext {
    /// Open the repository at `path` and load its state
    pub fn new(path: &Path) -> Result<Self> {
        let repo = GitRepo::open(path)?;
        let state_path = state_path(&repo.root_dir()?)?;
        let state = load_state(&state_path)?.ok_or(Error::NotInitialized)?;
        Ok(Self {
            repo,
            state_path,
            state,
            prompter: default_prompter(),
        })
    }

    /// Load the branch graph, saving right away if it had to be repaired
    pub fn graph(&mut self) -> Result<BranchGraph> {
        let loaded = load_graph(&self.state, &self.repo, self.prompter.as_ref())?;
        for name in &loaded.dropped {
            println!(
                "{}",
                format!("Stopped tracking '{name}': branch no longer exists").warn()
            );
        }
        if loaded.is_dirty() {
            self.save(&loaded.graph)?;
        }
        Ok(loaded.graph)
    }

    /// Persist the graph
    pub fn save(&mut self, graph: &BranchGraph) -> Result<()> {
        self.state.record_graph(graph);
        save_state(&self.state_path, &self.state)
    }

    /// Save callback that does not borrow the context
    pub fn persister(&self) -> impl FnMut(&BranchGraph) -> Result<()> + use<> {
        let path = self.state_path.clone();
        let mut state = self.state.clone();
        move |graph| {
            state.record_graph(graph);
            save_state(&path, &state)
        }
    }

    /// Name of the checked out branch
    pub fn current_branch(&self) -> Result<String> {
        Ok(self.repo.current_branch()?.name)
    }

    /// Remote to push and sync against
    pub fn remote(&self) -> Result<String> {
        select_remote(
            &self.repo.remotes()?,
            self.state.remote.as_deref(),
            self.prompter.as_ref(),
        )
    }

    /// Review service configured for this repository
    #[allow(clippy::future_not_send)]
    pub async fn review_service(&self) -> Result<Box<dyn ReviewService>> {
        let url = match self.state.code_review_tool {
            ReviewTool::None => None,
            ReviewTool::GitHub => Some(self.repo.remote_url(&self.remote()?)?),
        };
        create_review_service(&self.state, url.as_deref()).await
    }
}
