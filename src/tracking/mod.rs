//! Persisted stack state
//!
//! One TOML file per repository records the root branch, remote, review
//! tool and every tracked branch with its cached head and parent.

mod storage;

pub use storage::{delete_state, load_state, save_state, state_path, state_path_in};

use crate::graph::BranchGraph;
use crate::types::{MergeMethod, ReviewTool};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current state file format version
pub const STATE_VERSION: u32 = 1;

/// Environment variable consulted for the GitHub token when none is configured
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// A tracked branch as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRecord {
    /// Cached head commit
    pub head: String,
    /// Parent branch name, empty for the root
    #[serde(default)]
    pub parent: String,
}

/// Everything persisted for one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackState {
    /// File format version
    pub version: u32,
    /// Root (trunk) branch
    pub root_branch: String,
    /// Remote to sync and submit against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    /// Review provider
    #[serde(default)]
    pub code_review_tool: ReviewTool,
    /// Environment variable holding the review service token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<String>,
    /// How reviews are merged
    #[serde(default)]
    pub merge_method: MergeMethod,
    /// Tracked branches by name
    #[serde(default)]
    pub branches: BTreeMap<String, BranchRecord>,
}

impl StackState {
    /// Fresh state with no branches recorded
    pub fn new(root_branch: impl Into<String>, remote: Option<String>, tool: ReviewTool) -> Self {
        Self {
            version: STATE_VERSION,
            root_branch: root_branch.into(),
            remote,
            code_review_tool: tool,
            credentials: None,
            merge_method: MergeMethod::default(),
            branches: BTreeMap::new(),
        }
    }

    /// Replace the branch table with the graph's current contents
    pub fn record_graph(&mut self, graph: &BranchGraph) {
        graph.root().clone_into(&mut self.root_branch);
        self.branches = graph
            .branches()
            .map(|branch| {
                (
                    branch.name.clone(),
                    BranchRecord {
                        head: branch.head_sha.clone(),
                        parent: branch.parent.clone().unwrap_or_default(),
                    },
                )
            })
            .collect();
    }

    /// Branch table as `(name, head, parent)` records
    pub fn records(&self) -> Vec<(String, String, Option<String>)> {
        self.branches
            .iter()
            .map(|(name, record)| {
                let parent = (!record.parent.is_empty()).then(|| record.parent.clone());
                (name.clone(), record.head.clone(), parent)
            })
            .collect()
    }

    /// Environment variable to read the review token from
    pub fn token_env(&self) -> &str {
        self.credentials.as_deref().unwrap_or(DEFAULT_TOKEN_ENV)
    }
}
