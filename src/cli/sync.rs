//! Sync command - reconcile the stack with the remote

use crate::cli::context::CommandContext;
use crate::cli::print_branch_results;
use crate::cli::style::{CHECK, Stylize};
use anstream::println;
use git_ryu::error::Result;
use git_ryu::graph::BranchGraph;
use git_ryu::sync::{SyncReport, sync};
use std::path::Path;

/// Run the sync command
pub fn run_sync(path: &Path) -> Result<()> {
    let mut ctx = CommandContext::new(path)?;
    let mut graph = ctx.graph()?;
    sync_context(&mut ctx, &mut graph)?;
    Ok(())
}

/// Sync an already loaded context; shared with `merge --sync`
pub fn sync_context(ctx: &mut CommandContext, graph: &mut BranchGraph) -> Result<SyncReport> {
    let persist = ctx.persister();
    let report = sync(
        &ctx.repo,
        graph,
        ctx.prompter.as_ref(),
        ctx.state.remote.as_deref(),
        persist,
    )?;
    ctx.save(graph)?;
    print_sync_report(&report);
    Ok(report)
}

fn print_sync_report(report: &SyncReport) {
    println!("{} {}", "Synced with".emphasis(), report.remote.accent());

    if !report.deleted_on_remote.is_empty() {
        println!(
            "{}",
            format!("Deleted on {}: {}", report.remote, report.deleted_on_remote.join(", ")).muted()
        );
    }

    println!("{}:", "Pulled".emphasis());
    print_branch_results(&report.pulls, "Pulled");

    if !report.pruned.is_empty() {
        println!("{} {}", "Deleted:".emphasis(), report.pruned.join(", ").accent());
    }
    if !report.kept.is_empty() {
        println!("{} {}", "Kept:".emphasis(), report.kept.join(", ").muted());
    }

    if !report.restack.results.is_empty() {
        println!("{}:", "Restacked".emphasis());
        print_branch_results(&report.restack.results, "Rebased");
    }

    let pull_failures = report.pulls.iter().filter(|r| r.is_failure()).count();
    let rebase_failures = report.restack.failed().count();
    if pull_failures + rebase_failures == 0 {
        println!("{}", format!("{CHECK} Sync complete").success());
    } else {
        println!(
            "{}",
            format!(
                "Sync finished with {pull_failures} pull and {rebase_failures} rebase failure(s); \
                 their subtrees were left alone"
            )
            .warn()
        );
    }
}
