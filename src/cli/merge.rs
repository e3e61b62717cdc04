//! Merge command - merge approved reviews bottom-up

use crate::cli::CliProgress;
use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check, spinner_style};
use crate::cli::sync::sync_context;
use anstream::println;
use git_ryu::error::Result;
use git_ryu::merge::{
    MergeConfidence, MergeExecutionResult, MergeOptions, MergePlan, MergeStep, StackEntry,
    create_merge_plan, execute_merge, merge_stack,
};
use git_ryu::platform::ReviewService;
use git_ryu::types::MergeMethod;
use indicatif::ProgressBar;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Options for the merge command
#[derive(Debug, Clone, Default)]
pub struct MergeCommandOptions {
    /// Show what would be merged without merging
    pub dry_run: bool,
    /// Sync with the remote first
    pub sync: bool,
    /// Override the configured merge method
    pub method: Option<MergeMethod>,
}

/// Run the merge command
#[allow(clippy::future_not_send)]
pub async fn run_merge(path: &Path, options: MergeCommandOptions) -> Result<()> {
    let mut ctx = CommandContext::new(path)?;
    let mut graph = ctx.graph()?;

    if options.sync && !options.dry_run {
        sync_context(&mut ctx, &mut graph)?;
        println!();
    }

    let current = ctx.current_branch()?;
    let stack = merge_stack(&graph.path_from_root(&current)?);
    if stack.is_empty() {
        println!("{}", "Nothing to merge: the root branch has no review".muted());
        return Ok(());
    }

    let service = ctx.review_service().await?;

    if options.dry_run {
        let plan = gather_plan(&stack, service.as_ref()).await?;
        report_merge_dry_run(&plan);
        return Ok(());
    }

    let merge_options = MergeOptions {
        method: options.method.unwrap_or(ctx.state.merge_method),
        ..MergeOptions::default()
    };
    println!(
        "{} {} {}",
        "Merging".emphasis(),
        format!("{} branch(es)", stack.len()).accent(),
        format!("with {}", merge_options.method).muted()
    );

    let progress = CliProgress::verbose();
    let result = execute_merge(
        &stack,
        service.as_ref(),
        ctx.prompter.as_ref(),
        &progress,
        &merge_options,
    )
    .await?;

    print_merge_summary(&result);
    match result.halted {
        Some(halt) => Err(halt.into_error()),
        None => Ok(()),
    }
}

/// Fetch every review in the stack for a preview
async fn gather_plan(stack: &[StackEntry], service: &dyn ReviewService) -> Result<MergePlan> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.enable_steady_tick(Duration::from_millis(80));

    let mut reviews = HashMap::new();
    for StackEntry { branch, parent } in stack {
        spinner.set_message(format!("Checking {branch}..."));
        if let Some(review) = service.find_review(branch, &[parent.as_str()]).await? {
            reviews.insert(branch.clone(), review);
        }
    }
    spinner.finish_and_clear();

    Ok(create_merge_plan(stack, &reviews))
}

/// Print merge summary
fn print_merge_summary(result: &MergeExecutionResult) {
    println!();
    if result.is_success() {
        println!("{} Merge complete!", check());
    } else if result.has_merges() {
        println!("{}", "Merge partially complete".warn());
    }

    if !result.merged.is_empty() {
        println!("   Merged: {}", result.merged.join(", ").accent());
    }
    if !result.skipped.is_empty() {
        println!("   Skipped (no review): {}", result.skipped.join(", ").muted());
    }
    if result.has_merges() {
        println!(
            "{}",
            "Run 'gryu sync' to pull the merged changes and restack".muted()
        );
    }
}

/// Report what would be merged (dry run)
fn report_merge_dry_run(plan: &MergePlan) {
    println!("{}:", "Merge plan".emphasis());
    println!();

    for step in &plan.steps {
        match step {
            MergeStep::Merge {
                branch,
                review_id,
                title,
                confidence,
            } => {
                match confidence {
                    MergeConfidence::Certain => {
                        println!("  {} #{review_id}: {title}", "✓ Would merge".success());
                    }
                    MergeConfidence::Uncertain(reason) => {
                        println!("  {} #{review_id}: {title}", "? Would attempt".warn());
                        println!("    {}", reason.muted());
                    }
                }
                println!("    Branch: {}", branch.accent());
            }
            MergeStep::SkipNoReview { branch } => {
                println!("  {} {branch}: no open review", "- Would skip".muted());
            }
            MergeStep::Blocked {
                branch,
                review_id,
                approval,
            } => {
                println!(
                    "  {} #{review_id} ({branch}): {approval}",
                    "✗ Would stop at".warn()
                );
            }
        }
    }

    println!();
    if plan.is_empty() {
        println!("{}", "No reviews are ready to merge.".muted());
    } else {
        println!("{}", "Run without --dry-run to execute.".muted());
    }
}
