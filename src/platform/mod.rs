//! Review services
//!
//! Provides one interface for review create/update/merge, with a null
//! provider for repositories that don't use code review and a GitHub
//! pull-request provider.

mod detection;
mod factory;
mod github;
mod null;

pub use detection::parse_repo_info;
pub use factory::create_review_service;
pub use github::{GitHubMerge, GitHubService};
pub use null::NullReviewService;

use crate::error::Result;
use crate::types::{MergeMethod, MergeState, Review};
use async_trait::async_trait;

/// Review service trait
///
/// Reviews are identified by their (branch, base) pair. Nothing returned
/// here is cached; callers fetch fresh state right before deciding.
#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Whether an open review exists for `branch` into `base`
    async fn review_exists(&self, branch: &str, base: &str) -> Result<bool>;

    /// Open reviews, optionally filtered by head branch and/or base
    async fn find_reviews(&self, branch: Option<&str>, base: Option<&str>) -> Result<Vec<Review>>;

    /// Open a review for `branch` into `base`
    async fn create_review(
        &self,
        branch: &str,
        base: &str,
        title: Option<&str>,
        body: Option<&str>,
    ) -> Result<Review>;

    /// Refresh an existing review after a push, retargeting its base if needed
    async fn update_review(&self, branch: &str, base: &str) -> Result<Review>;

    /// Start merging a review
    async fn merge_review(
        &self,
        review: &Review,
        title: Option<&str>,
        body: Option<&str>,
        method: MergeMethod,
    ) -> Result<Box<dyn MergeRequest>>;

    /// Human-readable provider name
    fn name(&self) -> &'static str;

    /// The open review from `branch` into the first of `bases` that has one
    ///
    /// Reviews from `branch` into any other base are ignored.
    async fn find_review(&self, branch: &str, bases: &[&str]) -> Result<Option<Review>> {
        let reviews = self.find_reviews(Some(branch), None).await?;
        Ok(bases
            .iter()
            .find_map(|base| reviews.iter().find(|r| r.base == *base))
            .cloned())
    }
}

/// Handle to an in-flight merge
#[async_trait]
pub trait MergeRequest: Send + Sync {
    /// Last observed state
    fn state(&self) -> MergeState;

    /// Poll the service and return the new state
    async fn refresh(&mut self) -> Result<MergeState>;
}
