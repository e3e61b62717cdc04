//! Submit: push the current stack and open or refresh its reviews
//!
//! Branches are handled root to current so every review's base already
//! exists on the remote when the review is created.

use crate::error::Result;
use crate::graph::BranchGraph;
use crate::platform::ReviewService;
use crate::prompt::Prompter;
use crate::repo::Vcs;
use crate::types::Review;
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Progress callback for long-running review operations
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Free-form status line
    async fn on_message(&self, message: &str);

    /// A branch was pushed
    async fn on_pushed(&self, branch: &str, remote: &str);

    /// A review was created (`created = true`) or refreshed
    async fn on_review(&self, review: &Review, created: bool);
}

/// Progress callback that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_message(&self, _message: &str) {}
    async fn on_pushed(&self, _branch: &str, _remote: &str) {}
    async fn on_review(&self, _review: &Review, _created: bool) {}
}

/// Outcome of a submit run
#[derive(Debug, Clone, Default)]
pub struct SubmitReport {
    /// Branches pushed, root first
    pub pushed: Vec<String>,
    /// Reviews opened by this run
    pub created: Vec<Review>,
    /// Existing reviews refreshed by this run
    pub updated: Vec<Review>,
    /// Branches the user chose not to open a review for
    pub declined: Vec<String>,
    /// Root branch whose push was rejected, usually because the remote is ahead
    pub root_rejected: Option<String>,
}

/// Title and body for a new review, from the branch's oldest unique commit
///
/// Falls back to the branch name when the branch has no commits of its own.
pub fn review_message(vcs: &dyn Vcs, branch: &str, parent: &str) -> Result<(String, String)> {
    let commits = vcs.commit_diff(parent, branch)?;
    let Some(first) = commits.last() else {
        return Ok((branch.to_string(), String::new()));
    };

    let message = vcs.commit_message(&first.sha)?;
    let mut parts = message.trim().splitn(2, '\n');
    let title = parts
        .next()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(branch)
        .to_string();
    let body = parts.next().unwrap_or_default().trim().to_string();
    Ok((title, body))
}

/// Push every branch from the root to `current` and sync its review
///
/// Stack branches are force-pushed with a lease since restacking rewrites
/// them. The root is only ever fast-forwarded on the remote; a rejected root
/// push is reported and the stack is still submitted.
#[allow(clippy::future_not_send)]
pub async fn submit(
    vcs: &dyn Vcs,
    graph: &BranchGraph,
    reviews: &dyn ReviewService,
    prompter: &dyn Prompter,
    progress: &dyn ProgressCallback,
    remote: &str,
    current: &str,
) -> Result<SubmitReport> {
    let mut report = SubmitReport::default();

    for branch in graph.path_from_root(current)? {
        let Some(parent) = graph.parent_of(&branch).map(ToString::to_string) else {
            let output = vcs.push(&branch, remote, false)?;
            if output.success {
                debug!(branch = %branch, remote, "pushed root");
                progress.on_pushed(&branch, remote).await;
                report.pushed.push(branch);
            } else {
                warn!(branch = %branch, remote, output = %output.output(), "root push rejected");
                report.root_rejected = Some(branch);
            }
            continue;
        };

        vcs.push(&branch, remote, true)?
            .into_result(&format!("push --force-with-lease {remote} {branch}"))?;
        debug!(branch = %branch, remote, "pushed");
        progress.on_pushed(&branch, remote).await;
        report.pushed.push(branch.clone());

        if reviews.review_exists(&branch, &parent).await? {
            let review = reviews.update_review(&branch, &parent).await?;
            progress.on_review(&review, false).await;
            report.updated.push(review);
            continue;
        }

        let question = format!("Open a review for '{branch}' into '{parent}'?");
        if !prompter.confirm(&question, true)? {
            report.declined.push(branch);
            continue;
        }

        let (title, body) = review_message(vcs, &branch, &parent)?;
        let body = (!body.is_empty()).then_some(body.as_str());
        let review = reviews
            .create_review(&branch, &parent, Some(&title), body)
            .await?;
        info!(branch = %branch, review = review.id, "opened review");
        progress.on_review(&review, true).await;
        report.created.push(review);
    }

    Ok(report)
}
