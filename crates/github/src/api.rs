//! GitHub REST transport for issue comments.
//!
//! The adapter talks to GitHub through [`IssueCommentApi`] so its
//! read-modify-write logic can be tested against an in-memory fake.
//! [`GitHubApi`] is the production implementation over `reqwest`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use preview_comments_core::auth::TokenProvider;
use preview_comments_core::error::AdapterError;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_API_ROOT: &str = "https://api.github.com";

/// One comment record on the target issue/PR.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// The authenticated user, as the API reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub login: String,
    pub avatar_url: String,
}

/// Issue-comment operations the remote adapter needs.
#[async_trait]
pub trait IssueCommentApi: Send + Sync {
    /// All comments on the target issue/PR.
    async fn list_comments(&self) -> Result<Vec<IssueComment>, AdapterError>;

    async fn get_comment(&self, id: u64) -> Result<IssueComment, AdapterError>;

    async fn create_comment(&self, body: &str) -> Result<IssueComment, AdapterError>;

    async fn update_comment(&self, id: u64, body: &str) -> Result<(), AdapterError>;

    async fn delete_comment(&self, id: u64) -> Result<(), AdapterError>;

    async fn current_user(&self) -> Result<ApiUser, AdapterError>;
}

/// [`IssueCommentApi`] over the hosted GitHub REST API.
pub struct GitHubApi {
    http: Client,
    api_root: String,
    repo: String,
    pr: u64,
    token: Arc<dyn TokenProvider>,
}

impl GitHubApi {
    /// Transport for `repo` (`owner/name`) and PR number `pr`.
    pub fn new(repo: impl Into<String>, pr: u64, token: Arc<dyn TokenProvider>) -> Self {
        Self {
            http: Client::new(),
            api_root: DEFAULT_API_ROOT.to_string(),
            repo: repo.into(),
            pr,
            token,
        }
    }

    /// Point at a different API root (GitHub Enterprise, test servers).
    pub fn with_api_root(mut self, root: impl Into<String>) -> Self {
        self.api_root = root.into();
        self
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, AdapterError> {
        let token = self.token.token().ok_or(AdapterError::NotAuthenticated)?;
        let mut request = self
            .http
            .request(method, format!("{}{path}", self.api_root))
            .header("Accept", "application/vnd.github.v3+json")
            .header("Content-Type", "application/json")
            .bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|err| AdapterError::Transport {
            message: err.to_string(),
        })?;
        let status = response.status();
        debug!(status = status.as_u16(), path, "github api response");
        if status != StatusCode::NO_CONTENT && !status.is_success() {
            return Err(AdapterError::RequestFailed {
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, AdapterError> {
        let response = self.send(method, path, body).await?;
        response.json().await.map_err(|err| AdapterError::Transport {
            message: err.to_string(),
        })
    }

    fn comments_path(&self) -> String {
        format!("/repos/{}/issues/{}/comments", self.repo, self.pr)
    }

    fn comment_path(&self, id: u64) -> String {
        format!("/repos/{}/issues/comments/{id}", self.repo)
    }
}

#[async_trait]
impl IssueCommentApi for GitHubApi {
    async fn list_comments(&self) -> Result<Vec<IssueComment>, AdapterError> {
        self.request_json(Method::GET, &self.comments_path(), None)
            .await
    }

    async fn get_comment(&self, id: u64) -> Result<IssueComment, AdapterError> {
        self.request_json(Method::GET, &self.comment_path(id), None)
            .await
    }

    async fn create_comment(&self, body: &str) -> Result<IssueComment, AdapterError> {
        self.request_json(
            Method::POST,
            &self.comments_path(),
            Some(serde_json::json!({ "body": body })),
        )
        .await
    }

    async fn update_comment(&self, id: u64, body: &str) -> Result<(), AdapterError> {
        self.send(
            Method::PATCH,
            &self.comment_path(id),
            Some(serde_json::json!({ "body": body })),
        )
        .await
        .map(|_| ())
    }

    async fn delete_comment(&self, id: u64) -> Result<(), AdapterError> {
        self.send(Method::DELETE, &self.comment_path(id), None)
            .await
            .map(|_| ())
    }

    async fn current_user(&self) -> Result<ApiUser, AdapterError> {
        self.request_json(Method::GET, "/user", None).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_token_fails_before_any_request() {
        let api = GitHubApi::new("owner/repo", 7, Arc::new(|| None::<String>));
        let err = api.current_user().await.unwrap_err();
        assert_eq!(err, AdapterError::NotAuthenticated);
    }

    #[test]
    fn paths_target_the_configured_repo_and_pr() {
        let api = GitHubApi::new("owner/repo", 7, Arc::new(|| None::<String>));
        assert_eq!(api.comments_path(), "/repos/owner/repo/issues/7/comments");
        assert_eq!(api.comment_path(42), "/repos/owner/repo/issues/comments/42");
    }
}
