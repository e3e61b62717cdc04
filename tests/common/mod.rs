//! Shared test fixtures

#![allow(dead_code, unused_imports)]

mod fake_vcs;
mod mock_review;
mod prompter;
mod temp_repo;

pub use fake_vcs::FakeVcs;
pub use mock_review::{MergeBehavior, MockReviewService, make_review};
pub use prompter::{Answer, ScriptedPrompter, YesPrompter};
pub use temp_repo::TempGitRepo;

use git_ryu::graph::BranchGraph;

/// Graph with `master` as root and `(name, parent)` branches
pub fn graph_of(branches: &[(&str, &str)]) -> BranchGraph {
    let mut records = vec![("master".to_string(), "master-0".to_string(), None)];
    for (name, parent) in branches {
        records.push((
            (*name).to_string(),
            format!("{name}-0"),
            Some((*parent).to_string()),
        ));
    }
    BranchGraph::from_records("master", records).expect("valid graph")
}

/// FakeVcs and graph with the same `master`-rooted branches
pub fn fixture(branches: &[(&str, &str)]) -> (FakeVcs, BranchGraph) {
    (FakeVcs::with_branches("master", branches), graph_of(branches))
}

/// `{master, b1->master, b2->b1, b3->b1, b4->b3}`
pub const FORK: &[(&str, &str)] = &[("b1", "master"), ("b2", "b1"), ("b3", "b1"), ("b4", "b3")];
