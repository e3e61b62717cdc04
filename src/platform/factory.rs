//! Review service construction from persisted configuration

use crate::auth::get_github_auth;
use crate::error::{Error, Result};
use crate::platform::{GitHubService, NullReviewService, ReviewService, parse_repo_info};
use crate::tracking::StackState;
use crate::types::ReviewTool;
use tracing::debug;

/// Create the review service selected by `code_review_tool`
///
/// GitHub needs the remote's URL to locate the repository and a token,
/// resolved through [`get_github_auth`].
pub async fn create_review_service(
    state: &StackState,
    remote_url: Option<&str>,
) -> Result<Box<dyn ReviewService>> {
    match state.code_review_tool {
        ReviewTool::None => Ok(Box::new(NullReviewService)),
        ReviewTool::GitHub => {
            let url = remote_url.ok_or(Error::NoRemotes)?;
            let config = parse_repo_info(url)?;
            let auth = get_github_auth(state.token_env()).await?;
            debug!(owner = %config.owner, repo = %config.repo, source = ?auth.source, "using GitHub");
            Ok(Box::new(GitHubService::new(&auth.token, config)?))
        }
    }
}
