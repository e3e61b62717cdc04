//! Log command - print every stack as a tree

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, depth_colored};
use anstream::println;
use git_ryu::error::Result;
use git_ryu::graph::tree_lines;
use git_ryu::repo::Vcs;
use std::path::Path;

/// Commits listed under each branch
const MAX_COMMITS: usize = 5;

/// Print the branch tree with each branch's unique commits
pub fn run_log(path: &Path) -> Result<()> {
    let mut ctx = CommandContext::new(path)?;
    let graph = ctx.graph()?;
    let current = ctx.repo.current_branch().ok().map(|b| b.name);

    for line in tree_lines(&graph, graph.root(), current.as_deref())? {
        let rendered = format!("{}{}{}", line.prefix, line.connector, line.marker());
        let name = if line.is_current {
            line.branch.emphasis()
        } else {
            line.branch.clone()
        };
        println!("{} {}", depth_colored(&rendered, line.depth), name);

        let Some(parent) = graph.parent_of(&line.branch) else {
            continue;
        };
        let commits = ctx.repo.commit_diff(parent, &line.branch)?;
        for commit in commits.iter().take(MAX_COMMITS) {
            let sha = commit.sha.get(..7).unwrap_or(&commit.sha);
            println!("{}  {} {}", line.gutter, sha.muted(), commit.subject);
        }
        if commits.len() > MAX_COMMITS {
            println!(
                "{}  {}",
                line.gutter,
                format!("... ({} more)", commits.len() - MAX_COMMITS).muted()
            );
        }
    }
    Ok(())
}
