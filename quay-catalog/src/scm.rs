//! Source-control host integrations and URL reading.
//!
//! An integration owns a host (e.g. `github.com`) and optionally a token.
//! [`ScmIntegrations`] resolves which integration a location target belongs
//! to; [`UrlReader`] fetches file content by URL, distinguishing missing
//! files from transient failures so callers can short-circuit retries.

use crate::error::{CatalogError, CatalogResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// One configured source-control host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScmIntegration {
    /// Host this integration owns, e.g. `github.com`.
    pub host: String,
    /// Bearer token for authenticated reads, if any.
    #[serde(default)]
    pub token: Option<String>,
}

impl ScmIntegration {
    /// Creates an anonymous integration for a host.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            token: None,
        }
    }

    /// Attaches a bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// The set of configured source-control integrations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScmIntegrations {
    integrations: Vec<ScmIntegration>,
}

impl ScmIntegrations {
    /// Creates an integration set.
    #[must_use]
    pub fn new(integrations: Vec<ScmIntegration>) -> Self {
        Self { integrations }
    }

    /// Finds the integration owning a URL, by host match.
    pub fn by_url(&self, url: &str) -> Option<&ScmIntegration> {
        let host = host_of(url)?;
        self.integrations.iter().find(|i| i.host == host)
    }

    /// Resolves the root of a location target: the target itself with a
    /// trailing slash, the base every relative file path is joined against.
    #[must_use]
    pub fn resolve_root(&self, target: &str) -> String {
        if target.ends_with('/') {
            target.to_string()
        } else {
            format!("{target}/")
        }
    }

    /// Joins a relative path (optionally `./`-prefixed) onto a resolved root.
    #[must_use]
    pub fn join_url(root: &str, path: &str) -> String {
        let rel = path.trim_start_matches("./").trim_start_matches('/');
        format!("{root}{rel}")
    }
}

fn host_of(url: &str) -> Option<&str> {
    let rest = url.split_once("://").map(|(_, r)| r)?;
    let host = rest.split(['/', '?', '#']).next()?;
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Reads file content by URL.
#[async_trait]
pub trait UrlReader: Send + Sync {
    /// Fetches the raw bytes at `url`.
    ///
    /// A missing file surfaces as [`CatalogError::NotFound`]; everything
    /// else is a transport or status error.
    async fn read_url(&self, url: &str) -> CatalogResult<Vec<u8>>;
}

/// [`UrlReader`] backed by plain HTTP, using the integration token for the
/// target host when one is configured.
pub struct HttpUrlReader {
    integrations: ScmIntegrations,
    client: Client,
}

impl HttpUrlReader {
    /// Creates a reader for the given integrations.
    pub fn new(integrations: ScmIntegrations) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to create HTTP client");

        Self {
            integrations,
            client,
        }
    }
}

#[async_trait]
impl UrlReader for HttpUrlReader {
    async fn read_url(&self, url: &str) -> CatalogResult<Vec<u8>> {
        debug!("reading url {url}");
        let mut request = self.client.get(url);
        if let Some(integration) = self.integrations.by_url(url) {
            if let Some(token) = &integration.token {
                request = request.bearer_auth(token);
            }
        }

        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                code: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
