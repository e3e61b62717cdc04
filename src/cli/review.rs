//! Review command - list open reviews

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, arrow, link, spinner_style};
use anstream::println;
use git_ryu::error::Result;
use git_ryu::types::{ApprovalState, Review};
use indicatif::ProgressBar;
use std::path::Path;
use std::time::Duration;

/// List open reviews, optionally filtered by branch and base
#[allow(clippy::future_not_send)]
pub async fn run_review(path: &Path, branch: Option<&str>, base: Option<&str>) -> Result<()> {
    let ctx = CommandContext::new(path)?;
    let service = ctx.review_service().await?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(format!("Fetching reviews from {}...", service.name()));
    spinner.enable_steady_tick(Duration::from_millis(80));
    let reviews = service.find_reviews(branch, base).await;
    spinner.finish_and_clear();
    let reviews = reviews?;

    if reviews.is_empty() {
        println!("{}", "No open reviews".muted());
        return Ok(());
    }
    for review in &reviews {
        print_review(review);
    }
    Ok(())
}

fn print_review(review: &Review) {
    let label = format!("#{}", review.id);
    println!("{} {}", link(&label, &review.url).accent(), review.title.emphasis());

    let approval = match review.approval {
        ApprovalState::Approved => review.approval.success(),
        ApprovalState::Pending => review.approval.muted(),
        ApprovalState::ChangesRequested => review.approval.warn(),
    };
    let mergeable = match review.mergeable {
        Some(true) => "mergeable".success(),
        Some(false) => "has conflicts".warn(),
        None => "mergeability unknown".muted(),
    };
    println!(
        "    {} {} {}  {approval}, {mergeable}",
        review.branch,
        arrow(),
        review.base
    );
}
