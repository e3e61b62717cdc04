//! GitHub review service implementation (pull requests over REST v3)

use crate::error::{Error, Result};
use crate::platform::{MergeRequest, ReviewService};
use crate::types::{ApprovalState, MergeMethod, MergeState, PlatformConfig, Review};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;
use tracing::debug;

#[derive(Deserialize)]
struct ApiPull {
    number: u64,
    title: String,
    html_url: String,
    #[serde(default)]
    body: Option<String>,
    state: String,
    #[serde(default)]
    merged: bool,
    #[serde(default)]
    mergeable: Option<bool>,
    head: ApiRef,
    base: ApiRef,
}

#[derive(Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    ref_field: String,
}

#[derive(Deserialize)]
struct ApiReview {
    #[serde(default)]
    user: Option<ApiUser>,
    state: String,
}

#[derive(Deserialize)]
struct ApiUser {
    login: String,
}

#[derive(Deserialize)]
struct ApiMergeResponse {
    merged: bool,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Reduce a review history to a single approval state
///
/// Only each reviewer's latest approving, rejecting or dismissed review
/// counts. Any outstanding change request blocks approval.
fn approval_from_reviews(reviews: &[ApiReview]) -> ApprovalState {
    let mut latest: HashMap<&str, &str> = HashMap::new();
    for review in reviews {
        let Some(user) = &review.user else {
            continue;
        };
        match review.state.as_str() {
            "APPROVED" | "CHANGES_REQUESTED" | "DISMISSED" => {
                latest.insert(user.login.as_str(), review.state.as_str());
            }
            _ => {}
        }
    }

    if latest.values().any(|s| *s == "CHANGES_REQUESTED") {
        ApprovalState::ChangesRequested
    } else if latest.values().any(|s| *s == "APPROVED") {
        ApprovalState::Approved
    } else {
        ApprovalState::Pending
    }
}

/// Thin authenticated REST client shared by the service and merge handles
#[derive(Clone)]
struct GitHubClient {
    http: Client,
    token: String,
    api_base: String,
    config: PlatformConfig,
}

impl GitHubClient {
    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}{path}",
            self.api_base, self.config.owner, self.config.repo
        )
    }

    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> Result<reqwest::Response> {
        let mut request = self
            .http
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(body) = body {
            request = request.json(body);
        }
        request
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("request to {url} failed: {e}")))
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        let url = self.repo_url(path);
        let response = self.send(method, &url, body).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(error_for(status, response).await);
        }
        response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("failed to parse response from {url}: {e}")))
    }

    async fn get_pull(&self, number: u64) -> Result<ApiPull> {
        self.request(Method::GET, &format!("/pulls/{number}"), None)
            .await
    }

    async fn list_pulls(&self, branch: Option<&str>, base: Option<&str>) -> Result<Vec<ApiPull>> {
        let mut query = vec!["state=open".to_string(), "per_page=100".to_string()];
        if let Some(branch) = branch {
            let head = format!("{}:{branch}", self.config.owner);
            query.push(format!("head={}", urlencoding::encode(&head)));
        }
        if let Some(base) = base {
            query.push(format!("base={}", urlencoding::encode(base)));
        }
        self.request(Method::GET, &format!("/pulls?{}", query.join("&")), None)
            .await
    }

    async fn approval(&self, number: u64) -> Result<ApprovalState> {
        let reviews: Vec<ApiReview> = self
            .request(
                Method::GET,
                &format!("/pulls/{number}/reviews?per_page=100"),
                None,
            )
            .await?;
        Ok(approval_from_reviews(&reviews))
    }

    /// Full review record: list entries lack `mergeable`, so re-fetch the pull
    async fn review(&self, number: u64) -> Result<Review> {
        let pull = self.get_pull(number).await?;
        let approval = self.approval(number).await?;
        Ok(Review {
            id: pull.number,
            title: pull.title,
            url: pull.html_url,
            approval,
            mergeable: pull.mergeable,
            description: pull.body.unwrap_or_default(),
            branch: pull.head.ref_field,
            base: pull.base.ref_field,
        })
    }
}

async fn error_for(status: StatusCode, response: reqwest::Response) -> Error {
    let message = response
        .json::<ApiErrorBody>()
        .await
        .map_or_else(|_| status.to_string(), |body| body.message);
    match status {
        StatusCode::UNAUTHORIZED => Error::Auth(format!("GitHub rejected the token: {message}")),
        _ => Error::GitHubApi(format!("{status}: {message}")),
    }
}

/// GitHub service using the REST API
pub struct GitHubService {
    client: GitHubClient,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(token: &str, config: PlatformConfig) -> Result<Self> {
        let api_base = config.host.as_ref().map_or_else(
            || "https://api.github.com".to_string(),
            |h| format!("https://{h}/api/v3"),
        );
        Self::with_api_base(token, config, &api_base)
    }

    /// Create a service against an explicit API base URL
    pub fn with_api_base(token: &str, config: PlatformConfig, api_base: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent("git-ryu")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client: GitHubClient {
                http,
                token: token.to_string(),
                api_base: api_base.trim_end_matches('/').to_string(),
                config,
            },
        })
    }

    /// Repository coordinates
    pub const fn config(&self) -> &PlatformConfig {
        &self.client.config
    }
}

#[async_trait]
impl ReviewService for GitHubService {
    async fn review_exists(&self, branch: &str, base: &str) -> Result<bool> {
        let pulls = self.client.list_pulls(Some(branch), Some(base)).await?;
        debug!(branch, base, found = !pulls.is_empty(), "checked for existing PR");
        Ok(!pulls.is_empty())
    }

    async fn find_reviews(&self, branch: Option<&str>, base: Option<&str>) -> Result<Vec<Review>> {
        let pulls = self.client.list_pulls(branch, base).await?;
        let mut reviews = Vec::with_capacity(pulls.len());
        for pull in pulls {
            reviews.push(self.client.review(pull.number).await?);
        }
        debug!(?branch, ?base, count = reviews.len(), "found PRs");
        Ok(reviews)
    }

    async fn create_review(
        &self,
        branch: &str,
        base: &str,
        title: Option<&str>,
        body: Option<&str>,
    ) -> Result<Review> {
        debug!(branch, base, "creating PR");
        let payload = json!({
            "title": title.unwrap_or(branch),
            "head": branch,
            "base": base,
            "body": body.unwrap_or_default(),
        });
        let pull: ApiPull = self
            .client
            .request(Method::POST, "/pulls", Some(&payload))
            .await?;
        debug!(pr_number = pull.number, "created PR");
        self.client.review(pull.number).await
    }

    async fn update_review(&self, branch: &str, base: &str) -> Result<Review> {
        let pull = self
            .client
            .list_pulls(Some(branch), None)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::GitHubApi(format!("no open pull request for '{branch}'")))?;

        if pull.base.ref_field != base {
            debug!(pr_number = pull.number, base, "updating PR base");
            let payload = json!({ "base": base });
            let _: ApiPull = self
                .client
                .request(
                    Method::PATCH,
                    &format!("/pulls/{}", pull.number),
                    Some(&payload),
                )
                .await?;
        }
        self.client.review(pull.number).await
    }

    async fn merge_review(
        &self,
        review: &Review,
        title: Option<&str>,
        body: Option<&str>,
        method: MergeMethod,
    ) -> Result<Box<dyn MergeRequest>> {
        debug!(pr_number = review.id, %method, "merging PR");
        let mut payload = json!({ "merge_method": method.to_string() });
        if let Some(title) = title {
            payload["commit_title"] = json!(title);
        }
        if let Some(body) = body {
            payload["commit_message"] = json!(body);
        }

        let url = self.client.repo_url(&format!("/pulls/{}/merge", review.id));
        let response = self.client.send(Method::PUT, &url, Some(&payload)).await?;
        let status = response.status();

        let state = if status.is_success() {
            let result: ApiMergeResponse = response
                .json()
                .await
                .map_err(|e| Error::GitHubApi(format!("failed to parse merge response: {e}")))?;
            if result.merged {
                MergeState::Success
            } else {
                MergeState::Pending
            }
        } else if status.is_client_error() && status != StatusCode::UNAUTHORIZED {
            // 405 not mergeable, 409 head changed, 422 invalid
            let message = response
                .json::<ApiErrorBody>()
                .await
                .map_or_else(|_| status.to_string(), |body| body.message);
            MergeState::Failure(message)
        } else {
            return Err(error_for(status, response).await);
        };

        debug!(pr_number = review.id, ?state, "merge requested");
        Ok(Box::new(GitHubMerge {
            client: self.client.clone(),
            number: review.id,
            state,
        }))
    }

    fn name(&self) -> &'static str {
        "GitHub"
    }
}

/// In-flight GitHub merge, polled through the pull request's state
pub struct GitHubMerge {
    client: GitHubClient,
    number: u64,
    state: MergeState,
}

#[async_trait]
impl MergeRequest for GitHubMerge {
    fn state(&self) -> MergeState {
        self.state.clone()
    }

    async fn refresh(&mut self) -> Result<MergeState> {
        if self.state.is_terminal() {
            return Ok(self.state.clone());
        }
        let pull = self.client.get_pull(self.number).await?;
        self.state = if pull.merged {
            MergeState::Success
        } else if pull.state == "closed" {
            MergeState::Failure("pull request was closed without merging".to_string())
        } else {
            MergeState::Pending
        };
        debug!(pr_number = self.number, state = ?self.state, "refreshed merge");
        Ok(self.state.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(login: &str, state: &str) -> ApiReview {
        ApiReview {
            user: Some(ApiUser {
                login: login.to_string(),
            }),
            state: state.to_string(),
        }
    }

    #[test]
    fn test_no_reviews_is_pending() {
        assert_eq!(approval_from_reviews(&[]), ApprovalState::Pending);
    }

    #[test]
    fn test_comments_do_not_count() {
        let reviews = [review("alice", "COMMENTED")];
        assert_eq!(approval_from_reviews(&reviews), ApprovalState::Pending);
    }

    #[test]
    fn test_latest_review_per_user_wins() {
        let reviews = [
            review("alice", "CHANGES_REQUESTED"),
            review("alice", "APPROVED"),
        ];
        assert_eq!(approval_from_reviews(&reviews), ApprovalState::Approved);
    }

    #[test]
    fn test_outstanding_change_request_blocks() {
        let reviews = [review("alice", "APPROVED"), review("bob", "CHANGES_REQUESTED")];
        assert_eq!(
            approval_from_reviews(&reviews),
            ApprovalState::ChangesRequested
        );
    }

    #[test]
    fn test_dismissed_approval_is_pending() {
        let reviews = [review("alice", "APPROVED"), review("alice", "DISMISSED")];
        assert_eq!(approval_from_reviews(&reviews), ApprovalState::Pending);
    }
}
