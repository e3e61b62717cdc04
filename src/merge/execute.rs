//! Merge execution - effectful operations
//!
//! Walks the stack bottom-up. Each review is fetched right before the
//! decision is made, so approvals that landed while earlier merges were
//! running are seen. Branches merged before a halt stay merged.

use crate::error::{Error, Result};
use crate::merge::plan::{MergeStep, StackEntry, decide_step};
use crate::platform::ReviewService;
use crate::prompt::Prompter;
use crate::submit::ProgressCallback;
use crate::types::{ApprovalState, MergeMethod, MergeState};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Tuning for a merge run
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Merge method passed to the review service
    pub method: MergeMethod,
    /// Delay between merge status polls
    pub poll_interval: Duration,
    /// Give up on a merge that is still pending after this long
    pub timeout: Duration,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            method: MergeMethod::default(),
            poll_interval: Duration::from_millis(250),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Why a merge run stopped early
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HaltReason {
    /// Review was not approved
    NotApproved(ApprovalState),
    /// Review service reported a failed merge
    MergeFailed(String),
    /// Merge stayed pending past the timeout
    TimedOut,
    /// User declined to merge
    Declined,
}

/// Where and why a merge run stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeHalt {
    /// Branch the run stopped at
    pub branch: String,
    /// Reason for stopping
    pub reason: HaltReason,
}

impl MergeHalt {
    /// Error reported to the user for this halt
    pub fn into_error(self) -> Error {
        match self.reason {
            HaltReason::NotApproved(_) => Error::NotApproved(self.branch),
            HaltReason::MergeFailed(message) => Error::MergeFailed {
                branch: self.branch,
                message,
            },
            HaltReason::TimedOut => Error::MergeTimeout(self.branch),
            HaltReason::Declined => Error::Cancelled,
        }
    }
}

/// Result of merge execution
#[derive(Debug, Clone, Default)]
pub struct MergeExecutionResult {
    /// Branches that were merged, bottom-up
    pub merged: Vec<String>,
    /// Branches without an open review
    pub skipped: Vec<String>,
    /// Set when the run stopped before the end of the stack
    pub halted: Option<MergeHalt>,
}

impl MergeExecutionResult {
    /// Check if the whole stack was processed
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.halted.is_none()
    }

    /// Check if at least some merges succeeded
    #[must_use]
    pub const fn has_merges(&self) -> bool {
        !self.merged.is_empty()
    }
}

/// Merge the stack bottom-up (EFFECTFUL)
///
/// `stack` comes from [`merge_stack`](crate::merge::merge_stack). Each
/// review must target the branch's parent; once every branch below it has
/// merged in this run, a review retargeted onto the root also counts. The
/// run stops at the first review that is not approved, fails, times out or
/// is declined. `merge_review` is never called past that point.
#[allow(clippy::future_not_send)]
pub async fn execute_merge(
    stack: &[StackEntry],
    reviews: &dyn ReviewService,
    prompter: &dyn Prompter,
    progress: &dyn ProgressCallback,
    options: &MergeOptions,
) -> Result<MergeExecutionResult> {
    let mut result = MergeExecutionResult::default();

    for (index, StackEntry { branch, parent }) in stack.iter().enumerate() {
        let mut bases = vec![parent.as_str()];
        if index > 0 && result.merged.len() == index {
            bases.push(stack[0].parent.as_str());
        }
        let review = reviews.find_review(branch, &bases).await?;
        let step = decide_step(branch, review.as_ref());
        debug!(branch = %branch, step = %step, "merge decision");

        let review = match (step, review) {
            (MergeStep::SkipNoReview { .. }, _) => {
                progress
                    .on_message(&format!("Skipping {branch}: no open review"))
                    .await;
                result.skipped.push(branch.clone());
                continue;
            }
            (MergeStep::Blocked { approval, .. }, _) => {
                result.halted = Some(MergeHalt {
                    branch: branch.clone(),
                    reason: HaltReason::NotApproved(approval),
                });
                break;
            }
            (MergeStep::Merge { .. }, Some(review)) => review,
            (MergeStep::Merge { .. }, None) => {
                return Err(Error::Internal(format!("merge step for '{branch}' without a review")));
            }
        };

        let title = prompter.input(&format!("Commit title for #{}", review.id), &review.title)?;
        let question = format!("Merge #{} ({branch}) into {}?", review.id, review.base);
        if !prompter.confirm(&question, true)? {
            result.halted = Some(MergeHalt {
                branch: branch.clone(),
                reason: HaltReason::Declined,
            });
            break;
        }

        progress
            .on_message(&format!("Merging #{}: {title}", review.id))
            .await;
        let body = (!review.description.is_empty()).then_some(review.description.as_str());
        let mut request = reviews
            .merge_review(&review, Some(&title), body, options.method)
            .await?;

        let started = Instant::now();
        let halt = loop {
            match request.state() {
                MergeState::Success => break None,
                MergeState::Failure(message) => break Some(HaltReason::MergeFailed(message)),
                MergeState::Pending if started.elapsed() >= options.timeout => {
                    break Some(HaltReason::TimedOut);
                }
                MergeState::Pending => {
                    tokio::time::sleep(options.poll_interval).await;
                    request.refresh().await?;
                }
            }
        };

        if let Some(reason) = halt {
            result.halted = Some(MergeHalt {
                branch: branch.clone(),
                reason,
            });
            break;
        }

        info!(branch = %branch, review = review.id, "merged");
        progress.on_message(&format!("Merged {branch}")).await;
        result.merged.push(branch.clone());
    }

    Ok(result)
}
