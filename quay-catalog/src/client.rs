//! Catalog API client.
//!
//! Thin typed wrapper over the catalog's HTTP API. Every request carries the
//! `x-application-name` header so the catalog can attribute traffic.

use crate::error::{CatalogError, CatalogResult};
use quay_types::{Entity, EntityRef};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Configuration for the catalog client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the backend, e.g. `http://localhost:7007`.
    pub base_url: String,
    /// Value sent as the `x-application-name` header.
    pub application_name: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:7007".to_string(),
            application_name: "quay".to_string(),
            timeout_secs: 30,
        }
    }
}

/// One refresh-state record as returned by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshStateRecord {
    /// The entity this record belongs to.
    pub entity_ref: String,
    /// When the catalog plans to refresh the entity next.
    pub next_update_at: String,
    /// When the entity was last refreshed, if known.
    #[serde(default)]
    pub last_refreshed_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryEntitiesResponse {
    items: Vec<Entity>,
}

#[derive(Debug, Deserialize)]
struct RefreshStateResponse {
    data: Vec<RefreshStateRecord>,
}

/// Typed client for the catalog HTTP API.
pub struct CatalogClient {
    config: CatalogConfig,
    client: Client,
}

impl CatalogClient {
    /// Creates a new catalog client.
    pub fn new(config: CatalogConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to create HTTP client");

        Self { config, client }
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Queries entities with repeated `filter` terms and a field projection.
    ///
    /// Issues `GET /api/catalog/entities/by-query{?filter*,fields}` and
    /// returns the `items` page. Pagination cursors are not followed.
    pub async fn query_entities(
        &self,
        filters: &[(&str, &str)],
        fields: &[&str],
    ) -> CatalogResult<Vec<Entity>> {
        let mut query: Vec<String> = filters
            .iter()
            .map(|(k, v)| {
                format!(
                    "filter={}%3D{}",
                    urlencoding::encode(k),
                    urlencoding::encode(v)
                )
            })
            .collect();
        if !fields.is_empty() {
            query.push(format!("fields={}", urlencoding::encode(&fields.join(","))));
        }

        let url = format!(
            "{}/api/catalog/entities/by-query?{}",
            self.config.base_url,
            query.join("&")
        );
        debug!("querying catalog entities: {url}");

        let response = self.get(&url).await?;
        let body: QueryEntitiesResponse = serde_json::from_slice(&response)?;
        Ok(body.items)
    }

    /// Lists entities matching a raw filter expression.
    ///
    /// Issues `GET /api/catalog/entities?filter=...` which returns a bare
    /// entity array.
    pub async fn entities_by_filter(&self, filter: &str) -> CatalogResult<Vec<Entity>> {
        let url = format!(
            "{}/api/catalog/entities?filter={}",
            self.config.base_url,
            urlencoding::encode(filter)
        );
        debug!("listing catalog entities: {url}");

        let response = self.get(&url).await?;
        Ok(serde_json::from_slice(&response)?)
    }

    /// Fetches refresh-state records for an entity.
    pub async fn refresh_state(
        &self,
        entity_ref: &EntityRef,
    ) -> CatalogResult<Vec<RefreshStateRecord>> {
        let url = format!(
            "{}/api/catalog/entities/refresh-state?entity_ref={}",
            self.config.base_url,
            urlencoding::encode(&entity_ref.to_string())
        );

        let response = self.get(&url).await?;
        let body: RefreshStateResponse = serde_json::from_slice(&response)?;
        Ok(body.data)
    }

    async fn get(&self, url: &str) -> CatalogResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .header("x-application-name", &self.config.application_name)
            .send()
            .await?;

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
