//! Mock review service for testing

#![allow(dead_code)]

use async_trait::async_trait;
use git_ryu::error::{Error, Result};
use git_ryu::platform::{MergeRequest, ReviewService};
use git_ryu::types::{ApprovalState, MergeMethod, MergeState, Review};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `create_review`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReviewCall {
    pub branch: String,
    pub base: String,
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Call record for `merge_review`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReviewCall {
    pub branch: String,
    pub title: Option<String>,
    pub method: MergeMethod,
}

/// How a merge started by the mock plays out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeBehavior {
    /// Succeeds before the first poll
    Immediate,
    /// Pending for this many refreshes, then succeeds
    SucceedAfter(u32),
    /// Reports failure with a message
    Fail(String),
    /// Never leaves pending
    Hang,
}

/// Mock review service
///
/// Features:
/// - Auto-incrementing review ids
/// - Call tracking for verification
/// - Per-branch approval and merge behavior
/// - Approvals that land when another branch merges
pub struct MockReviewService {
    next_id: AtomicU64,
    reviews: Mutex<HashMap<String, Review>>,
    merge_behavior: Mutex<HashMap<String, MergeBehavior>>,
    approve_on_merge: Mutex<HashMap<String, String>>,
    // Call tracking
    find_calls: Mutex<Vec<String>>,
    create_calls: Mutex<Vec<CreateReviewCall>>,
    update_calls: Mutex<Vec<(String, String)>>,
    merge_calls: Mutex<Vec<MergeReviewCall>>,
    // Error injection
    error_on_create: Mutex<Option<String>>,
}

impl Default for MockReviewService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockReviewService {
    /// Mock with no reviews
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            reviews: Mutex::new(HashMap::new()),
            merge_behavior: Mutex::new(HashMap::new()),
            approve_on_merge: Mutex::new(HashMap::new()),
            find_calls: Mutex::new(Vec::new()),
            create_calls: Mutex::new(Vec::new()),
            update_calls: Mutex::new(Vec::new()),
            merge_calls: Mutex::new(Vec::new()),
            error_on_create: Mutex::new(None),
        }
    }

    /// Add an open review for `branch` into `base`
    pub fn add_review(&self, branch: &str, base: &str, approval: ApprovalState) -> u64 {
        let review = make_review(
            self.next_id.fetch_add(1, Ordering::SeqCst),
            branch,
            base,
            approval,
        );
        let id = review.id;
        self.reviews
            .lock()
            .unwrap()
            .insert(branch.to_string(), review);
        id
    }

    /// Change the approval of an existing review
    pub fn set_approval(&self, branch: &str, approval: ApprovalState) {
        if let Some(review) = self.reviews.lock().unwrap().get_mut(branch) {
            review.approval = approval;
        }
    }

    /// Control how merging `branch` plays out
    pub fn set_merge_behavior(&self, branch: &str, behavior: MergeBehavior) {
        self.merge_behavior
            .lock()
            .unwrap()
            .insert(branch.to_string(), behavior);
    }

    /// Approve `other` as soon as `branch` is merged
    pub fn approve_when_merged(&self, branch: &str, other: &str) {
        self.approve_on_merge
            .lock()
            .unwrap()
            .insert(branch.to_string(), other.to_string());
    }

    /// Make `create_review` return an error
    pub fn fail_create(&self, msg: &str) {
        *self.error_on_create.lock().unwrap() = Some(msg.to_string());
    }

    // === Call inspection ===

    pub fn find_calls(&self) -> Vec<String> {
        self.find_calls.lock().unwrap().clone()
    }

    pub fn create_calls(&self) -> Vec<CreateReviewCall> {
        self.create_calls.lock().unwrap().clone()
    }

    pub fn update_calls(&self) -> Vec<(String, String)> {
        self.update_calls.lock().unwrap().clone()
    }

    pub fn merge_calls(&self) -> Vec<MergeReviewCall> {
        self.merge_calls.lock().unwrap().clone()
    }

    pub fn merged_branches(&self) -> Vec<String> {
        self.merge_calls()
            .into_iter()
            .map(|call| call.branch)
            .collect()
    }
}

/// Build a review record
pub fn make_review(id: u64, branch: &str, base: &str, approval: ApprovalState) -> Review {
    Review {
        id,
        title: format!("Add {branch}"),
        url: format!("https://github.com/owner/repo/pull/{id}"),
        approval,
        mergeable: Some(true),
        description: format!("Body for {branch}"),
        branch: branch.to_string(),
        base: base.to_string(),
    }
}

#[async_trait]
impl ReviewService for MockReviewService {
    async fn review_exists(&self, branch: &str, base: &str) -> Result<bool> {
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .get(branch)
            .is_some_and(|r| r.base == base))
    }

    async fn find_reviews(&self, branch: Option<&str>, base: Option<&str>) -> Result<Vec<Review>> {
        self.find_calls
            .lock()
            .unwrap()
            .push(branch.unwrap_or("*").to_string());
        let mut reviews: Vec<Review> = self
            .reviews
            .lock()
            .unwrap()
            .values()
            .filter(|r| branch.is_none_or(|b| r.branch == b))
            .filter(|r| base.is_none_or(|b| r.base == b))
            .cloned()
            .collect();
        reviews.sort_by_key(|r| r.id);
        Ok(reviews)
    }

    async fn create_review(
        &self,
        branch: &str,
        base: &str,
        title: Option<&str>,
        body: Option<&str>,
    ) -> Result<Review> {
        self.create_calls.lock().unwrap().push(CreateReviewCall {
            branch: branch.to_string(),
            base: base.to_string(),
            title: title.map(ToString::to_string),
            body: body.map(ToString::to_string),
        });
        if let Some(msg) = self.error_on_create.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }

        let mut review = make_review(
            self.next_id.fetch_add(1, Ordering::SeqCst),
            branch,
            base,
            ApprovalState::Pending,
        );
        if let Some(title) = title {
            review.title = title.to_string();
        }
        review.description = body.unwrap_or_default().to_string();
        self.reviews
            .lock()
            .unwrap()
            .insert(branch.to_string(), review.clone());
        Ok(review)
    }

    async fn update_review(&self, branch: &str, base: &str) -> Result<Review> {
        self.update_calls
            .lock()
            .unwrap()
            .push((branch.to_string(), base.to_string()));
        let mut reviews = self.reviews.lock().unwrap();
        let review = reviews
            .get_mut(branch)
            .ok_or_else(|| Error::GitHubApi(format!("no open pull request for '{branch}'")))?;
        base.clone_into(&mut review.base);
        Ok(review.clone())
    }

    async fn merge_review(
        &self,
        review: &Review,
        title: Option<&str>,
        _body: Option<&str>,
        method: MergeMethod,
    ) -> Result<Box<dyn MergeRequest>> {
        self.merge_calls.lock().unwrap().push(MergeReviewCall {
            branch: review.branch.clone(),
            title: title.map(ToString::to_string),
            method,
        });

        let behavior = self
            .merge_behavior
            .lock()
            .unwrap()
            .get(&review.branch)
            .cloned()
            .unwrap_or(MergeBehavior::Immediate);

        if matches!(behavior, MergeBehavior::Immediate | MergeBehavior::SucceedAfter(_)) {
            self.reviews.lock().unwrap().remove(&review.branch);
            let approve = self.approve_on_merge.lock().unwrap().get(&review.branch).cloned();
            if let Some(other) = approve {
                self.set_approval(&other, ApprovalState::Approved);
            }
        }

        Ok(Box::new(MockMergeRequest::new(behavior)))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Merge handle driven by a [`MergeBehavior`]
pub struct MockMergeRequest {
    behavior: MergeBehavior,
    remaining: u32,
    state: MergeState,
}

impl MockMergeRequest {
    fn new(behavior: MergeBehavior) -> Self {
        let (remaining, state) = match &behavior {
            MergeBehavior::Immediate => (0, MergeState::Success),
            MergeBehavior::SucceedAfter(n) => (*n, MergeState::Pending),
            MergeBehavior::Fail(msg) => (0, MergeState::Failure(msg.clone())),
            MergeBehavior::Hang => (0, MergeState::Pending),
        };
        Self {
            behavior,
            remaining,
            state,
        }
    }
}

#[async_trait]
impl MergeRequest for MockMergeRequest {
    fn state(&self) -> MergeState {
        self.state.clone()
    }

    async fn refresh(&mut self) -> Result<MergeState> {
        if let MergeBehavior::SucceedAfter(_) = self.behavior {
            if self.remaining > 1 {
                self.remaining -= 1;
            } else {
                self.remaining = 0;
                self.state = MergeState::Success;
            }
        }
        Ok(self.state.clone())
    }
}
