//! Submit command - push the stack and open or update reviews

use crate::cli::CliProgress;
use crate::cli::context::CommandContext;
use crate::cli::style::{CHECK, Stylize};
use anstream::println;
use git_ryu::error::Result;
use git_ryu::submit::submit;
use std::path::Path;

/// Run the submit command for the stack ending at the current branch
#[allow(clippy::future_not_send)]
pub async fn run_submit(path: &Path) -> Result<()> {
    let mut ctx = CommandContext::new(path)?;
    let graph = ctx.graph()?;
    let current = ctx.current_branch()?;
    let remote = ctx.remote()?;
    let service = ctx.review_service().await?;

    println!(
        "{} {} {}",
        "Submitting".emphasis(),
        current.accent(),
        format!("via {}", service.name()).muted()
    );

    let progress = CliProgress::compact();
    let report = submit(
        &ctx.repo,
        &graph,
        service.as_ref(),
        ctx.prompter.as_ref(),
        &progress,
        &remote,
        &current,
    )
    .await?;

    if let Some(root) = &report.root_rejected {
        println!(
            "{}",
            format!("'{root}' was not pushed: {remote} has changes you don't; run 'gryu sync'")
                .warn()
        );
    }
    if !report.declined.is_empty() {
        println!(
            "{}",
            format!("No review opened for: {}", report.declined.join(", ")).muted()
        );
    }
    println!(
        "{} {} pushed, {} opened, {} updated",
        format!("{CHECK} Submit complete:").success(),
        report.pushed.len().accent(),
        report.created.len().accent(),
        report.updated.len().accent()
    );
    Ok(())
}
