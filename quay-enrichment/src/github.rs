//! GitHub GraphQL client.
//!
//! One query per repository: database id, creation date, default branch,
//! and the first page of branch-protection rules.

use crate::error::{EnrichmentError, EnrichmentResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const REPO_DETAILS_QUERY: &str = "
query GetRepoDetails($owner: String!, $repo: String!) {
  repository(owner: $owner, name: $repo) {
    databaseId
    createdAt
    defaultBranchRef { name }
    branchProtectionRules(first: 10) {
      edges {
        node {
          requiredApprovingReviewCount
          requiresCodeOwnerReviews
          pattern
        }
      }
    }
  }
}";

/// Configuration for the GitHub client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Base URL of the GitHub API (e.g. `https://api.github.com`).
    pub api_base_url: String,
    /// Token used as a bearer credential, if any.
    #[serde(default)]
    pub token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

/// One branch-protection rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProtectionRule {
    /// Required approving review count, if the rule sets one.
    #[serde(rename = "requiredApprovingReviewCount", default)]
    pub required_approving_review_count: Option<u32>,
    /// Whether code-owner reviews are required.
    #[serde(rename = "requiresCodeOwnerReviews", default)]
    pub requires_code_owner_reviews: bool,
    /// The branch pattern the rule applies to.
    pub pattern: String,
}

/// What the repository query returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoDetails {
    /// Numeric repository id.
    pub database_id: Option<i64>,
    /// Repository creation timestamp (RFC 3339).
    pub created_at: Option<String>,
    /// Name of the default branch.
    pub default_branch: Option<String>,
    /// First page of branch-protection rules.
    pub protection_rules: Vec<ProtectionRule>,
}

impl RepoDetails {
    /// The protection rule whose pattern matches the default branch.
    #[must_use]
    pub fn default_branch_rule(&self) -> Option<&ProtectionRule> {
        let default_branch = self.default_branch.as_deref()?;
        self.protection_rules
            .iter()
            .find(|rule| rule.pattern == default_branch)
    }
}

/// Fetches repository details.
#[async_trait]
pub trait GithubClient: Send + Sync {
    /// Queries one repository by owner and name.
    async fn repo_details(&self, owner: &str, repo: &str) -> EnrichmentResult<RepoDetails>;
}

// ── GraphQL wire shapes ─────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: RepoVariables<'a>,
}

#[derive(Debug, Serialize)]
struct RepoVariables<'a> {
    owner: &'a str,
    repo: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<RepositoryData>,
    #[serde(default)]
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryData {
    repository: Option<Repository>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    #[serde(rename = "databaseId")]
    database_id: Option<i64>,
    #[serde(rename = "createdAt")]
    created_at: Option<String>,
    #[serde(rename = "defaultBranchRef")]
    default_branch_ref: Option<BranchRef>,
    #[serde(rename = "branchProtectionRules", default)]
    branch_protection_rules: Option<RuleConnection>,
}

#[derive(Debug, Deserialize)]
struct BranchRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RuleConnection {
    edges: Vec<RuleEdge>,
}

#[derive(Debug, Deserialize)]
struct RuleEdge {
    node: ProtectionRule,
}

/// [`GithubClient`] backed by the GraphQL API.
pub struct GraphqlGithubClient {
    config: GithubConfig,
    client: Client,
}

impl GraphqlGithubClient {
    /// Creates a client.
    pub fn new(config: GithubConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to create HTTP client");

        Self { config, client }
    }
}

#[async_trait]
impl GithubClient for GraphqlGithubClient {
    async fn repo_details(&self, owner: &str, repo: &str) -> EnrichmentResult<RepoDetails> {
        let url = format!("{}/graphql", self.config.api_base_url);
        debug!("querying repository details for {owner}/{repo}");

        let mut request = self
            .client
            .post(&url)
            .header("accept", "application/vnd.github.v3+json")
            .json(&GraphqlRequest {
                query: REPO_DETAILS_QUERY,
                variables: RepoVariables { owner, repo },
            });
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Github(format!(
                "unexpected status {status} from {url}"
            )));
        }

        let body: GraphqlResponse = response.json().await?;
        if let Some(errors) = body.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(EnrichmentError::Github(messages.join("; ")));
        }

        let repository = body
            .data
            .and_then(|d| d.repository)
            .ok_or_else(|| EnrichmentError::Github(format!("repository {owner}/{repo} not found")))?;

        Ok(RepoDetails {
            database_id: repository.database_id,
            created_at: repository.created_at,
            default_branch: repository.default_branch_ref.map(|r| r.name),
            protection_rules: repository
                .branch_protection_rules
                .map(|c| c.edges.into_iter().map(|e| e.node).collect())
                .unwrap_or_default(),
        })
    }
}
