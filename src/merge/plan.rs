//! Merge planning - pure functions for deciding merge steps
//!
//! No I/O happens here. Reviews are fetched by the caller and passed in,
//! which keeps the gating rules easy to unit test.

use crate::types::{ApprovalState, Review};
use std::collections::HashMap;
use std::hash::BuildHasher;

/// A branch to merge and the branch its review should target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEntry {
    /// Head branch of the review
    pub branch: String,
    /// Parent branch in the stack
    pub parent: String,
}

/// Pair each branch of a root-first path with its parent, dropping the root
#[must_use]
pub fn merge_stack(path: &[String]) -> Vec<StackEntry> {
    path.windows(2)
        .map(|pair| StackEntry {
            branch: pair[1].clone(),
            parent: pair[0].clone(),
        })
        .collect()
}

/// Confidence level for a merge attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeConfidence {
    /// Service reports the review as mergeable
    Certain,
    /// Mergeability unknown or conflicting; the merge may fail
    Uncertain(String),
}

/// What the sequencer does with one branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeStep {
    /// Approved review, merge it
    Merge {
        /// Branch name
        branch: String,
        /// Review id
        review_id: u64,
        /// Review title (proposed commit title)
        title: String,
        /// Confidence level for this merge
        confidence: MergeConfidence,
    },
    /// No open review for this branch; move on
    SkipNoReview {
        /// Branch name
        branch: String,
    },
    /// Review exists but is not approved; the sequence stops here
    Blocked {
        /// Branch name
        branch: String,
        /// Review id
        review_id: u64,
        /// Current approval state
        approval: ApprovalState,
    },
}

impl MergeStep {
    /// Branch this step applies to
    pub fn branch(&self) -> &str {
        match self {
            Self::Merge { branch, .. }
            | Self::SkipNoReview { branch }
            | Self::Blocked { branch, .. } => branch,
        }
    }
}

impl std::fmt::Display for MergeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge {
                review_id,
                title,
                confidence,
                ..
            } => {
                write!(f, "merge #{review_id}: {title}")?;
                if let MergeConfidence::Uncertain(reason) = confidence {
                    write!(f, " ({reason})")?;
                }
                Ok(())
            }
            Self::SkipNoReview { branch } => write!(f, "skip {branch}: no open review"),
            Self::Blocked {
                branch,
                review_id,
                approval,
            } => write!(f, "stop at #{review_id} ({branch}): {approval}"),
        }
    }
}

/// Decide what to do with one branch given its (fresh) review
pub fn decide_step(branch: &str, review: Option<&Review>) -> MergeStep {
    let Some(review) = review else {
        return MergeStep::SkipNoReview {
            branch: branch.to_string(),
        };
    };

    if review.approval != ApprovalState::Approved {
        return MergeStep::Blocked {
            branch: branch.to_string(),
            review_id: review.id,
            approval: review.approval,
        };
    }

    let confidence = match review.mergeable {
        Some(true) => MergeConfidence::Certain,
        Some(false) => MergeConfidence::Uncertain("has conflicts".to_string()),
        None => MergeConfidence::Uncertain("mergeability unknown".to_string()),
    };
    MergeStep::Merge {
        branch: branch.to_string(),
        review_id: review.id,
        title: review.title.clone(),
        confidence,
    }
}

/// Preview of a merge run
#[derive(Debug, Clone, Default)]
pub struct MergePlan {
    /// Steps in stack order, ending at the first blocked review
    pub steps: Vec<MergeStep>,
}

impl MergePlan {
    /// Check if the plan has any merge steps
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.merge_count() == 0
    }

    /// Count mergeable reviews
    #[must_use]
    pub fn merge_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, MergeStep::Merge { .. }))
            .count()
    }

    /// The step that stops the sequence, if any
    pub fn blocker(&self) -> Option<&MergeStep> {
        self.steps
            .iter()
            .find(|s| matches!(s, MergeStep::Blocked { .. }))
    }
}

/// Create a merge plan (PURE - no I/O, easily testable)
///
/// `stack` comes from [`merge_stack`]. Branches missing from `reviews` have
/// no open review.
#[must_use]
pub fn create_merge_plan<S: BuildHasher>(
    stack: &[StackEntry],
    reviews: &HashMap<String, Review, S>,
) -> MergePlan {
    let mut steps = Vec::new();
    for StackEntry { branch, .. } in stack {
        let step = decide_step(branch, reviews.get(branch));
        let blocked = matches!(step, MergeStep::Blocked { .. });
        steps.push(step);
        if blocked {
            break;
        }
    }
    MergePlan { steps }
}
