//! Review service for repositories without code review

use crate::error::Result;
use crate::platform::{MergeRequest, ReviewService};
use crate::types::{ApprovalState, MergeMethod, MergeState, Review};
use async_trait::async_trait;

/// Treats every review as already satisfied
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReviewService;

impl NullReviewService {
    fn placeholder(branch: &str, base: &str, title: Option<&str>) -> Review {
        Review {
            id: 0,
            title: title.unwrap_or(branch).to_string(),
            url: String::new(),
            approval: ApprovalState::Approved,
            mergeable: Some(true),
            description: String::new(),
            branch: branch.to_string(),
            base: base.to_string(),
        }
    }
}

#[async_trait]
impl ReviewService for NullReviewService {
    async fn review_exists(&self, _branch: &str, _base: &str) -> Result<bool> {
        Ok(true)
    }

    async fn find_reviews(&self, _branch: Option<&str>, _base: Option<&str>) -> Result<Vec<Review>> {
        Ok(Vec::new())
    }

    async fn create_review(
        &self,
        branch: &str,
        base: &str,
        title: Option<&str>,
        _body: Option<&str>,
    ) -> Result<Review> {
        Ok(Self::placeholder(branch, base, title))
    }

    async fn update_review(&self, branch: &str, base: &str) -> Result<Review> {
        Ok(Self::placeholder(branch, base, None))
    }

    async fn merge_review(
        &self,
        _review: &Review,
        _title: Option<&str>,
        _body: Option<&str>,
        _method: MergeMethod,
    ) -> Result<Box<dyn MergeRequest>> {
        Ok(Box::new(CompletedMerge))
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// A merge that finished before it started
#[derive(Debug, Clone, Copy)]
struct CompletedMerge;

#[async_trait]
impl MergeRequest for CompletedMerge {
    fn state(&self) -> MergeState {
        MergeState::Success
    }

    async fn refresh(&mut self) -> Result<MergeState> {
        Ok(MergeState::Success)
    }
}
