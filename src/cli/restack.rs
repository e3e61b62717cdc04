//! Restack command - rebase branches onto their parents

use crate::cli::context::CommandContext;
use crate::cli::print_branch_results;
use crate::cli::style::{CHECK, Stylize};
use anstream::println;
use git_ryu::error::Result;
use git_ryu::restack::{RestackOptions, restack};
use std::path::Path;

/// Run the restack command from `branch` (default: the root)
pub fn run_restack(path: &Path, branch: Option<&str>) -> Result<()> {
    let mut ctx = CommandContext::new(path)?;
    let mut graph = ctx.graph()?;

    let options = RestackOptions {
        start: branch.map(ToString::to_string),
        ..RestackOptions::default()
    };
    let report = restack(&ctx.repo, &mut graph, &options)?;
    ctx.save(&graph)?;

    if report.results.is_empty() {
        println!("{}", "Nothing to restack".muted());
        return Ok(());
    }

    print_branch_results(&report.results, "Rebased");
    if report.is_success() {
        println!("{}", format!("{CHECK} Restack complete").success());
    } else {
        println!(
            "{}",
            "Some branches could not be rebased; resolve the conflicts and run 'gryu restack' again"
                .warn()
        );
    }
    Ok(())
}
