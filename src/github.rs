//! Read-only client for the GitHub REST API.

use thiserror::Error;

use crate::models::{Issue, RepoInfo};

pub const DEFAULT_API_URL: &str = "https://api.github.com/repos";
const USER_AGENT: &str = concat!("ghkanban/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with status {status}")]
    Status { status: u16 },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Where issue records come from.
pub trait IssueSource {
    fn fetch_issues(&self, repo_path: &str) -> Result<Vec<Issue>, FetchError>;

    fn fetch_repo_info(&self, repo_path: &str) -> Result<RepoInfo, FetchError>;
}

pub struct GithubClient {
    agent: ureq::Agent,
    base_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        GithubClient {
            agent: ureq::AgentBuilder::new().build(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    fn get(&self, path: &str) -> Result<ureq::Response, FetchError> {
        let url = format!("{}/{}", self.base_url, path);
        let mut request = self
            .agent
            .get(&url)
            .set("User-Agent", USER_AGENT)
            .set("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {}", token));
        }

        tracing::debug!(%url, "GET");
        match request.call() {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(status, _)) => Err(FetchError::Status { status }),
            Err(ureq::Error::Transport(e)) => Err(FetchError::Transport(e.to_string())),
        }
    }
}

impl IssueSource for GithubClient {
    fn fetch_issues(&self, repo_path: &str) -> Result<Vec<Issue>, FetchError> {
        let issues: Vec<Issue> = self
            .get(&format!("{}/issues", repo_path))?
            .into_json()
            .map_err(|e| FetchError::Decode(e.to_string()))?;
        tracing::info!(repo = repo_path, count = issues.len(), "fetched issues");
        Ok(issues)
    }

    fn fetch_repo_info(&self, repo_path: &str) -> Result<RepoInfo, FetchError> {
        self.get(repo_path)?
            .into_json()
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}
