//! Squish command - fold the current branch into its parent

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, arrow, check};
use anstream::println;
use git_ryu::error::Result;
use git_ryu::repo::Vcs;
use git_ryu::squash::{SquashReport, squash, squash_all};
use std::path::Path;

/// Run the squish command
pub fn run_squish(path: &Path, all: bool) -> Result<()> {
    let mut ctx = CommandContext::new(path)?;
    let mut graph = ctx.graph()?;
    let branch = ctx.repo.current_branch()?.name;

    let reports = if all {
        squash_all(&ctx.repo, &mut graph, &branch, ctx.persister())?
    } else {
        vec![squash(&ctx.repo, &mut graph, &branch)?]
    };
    ctx.save(&graph)?;

    if reports.is_empty() {
        println!("{}", "Nothing to squish: already directly above the root".muted());
    }
    for SquashReport {
        branch,
        parent,
        commits,
    } in &reports
    {
        println!(
            "{} Squished {} {} {} ({commits} commit(s))",
            check(),
            branch.accent(),
            arrow(),
            parent.emphasis()
        );
    }
    Ok(())
}
