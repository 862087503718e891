//! Template image bundling.
//!
//! Templates reference their card image as a path relative to the template
//! source. This intermediator inlines the file as a base64 data URI in
//! `spec.imageData` so the frontend never fetches from the source host.

use crate::error::{EnrichmentError, EnrichmentResult};
use crate::intermediator::{Capability, Emitter, Intermediator, ProcessorCache};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use quay_catalog::{ScmIntegrations, UrlReader};
use quay_types::{Entity, LocationSpec};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

const ALLOWED_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".jpeg"];

/// Configuration for the template intermediator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Whether the intermediator runs at all.
    pub enabled: bool,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Inlines template card images as base64 data URIs.
pub struct TemplateIntermediator {
    config: TemplateConfig,
    integrations: ScmIntegrations,
    reader: Arc<dyn UrlReader>,
    url_regex: Regex,
    base64_regex: Regex,
}

impl TemplateIntermediator {
    /// Creates the intermediator.
    pub fn new(
        config: TemplateConfig,
        integrations: ScmIntegrations,
        reader: Arc<dyn UrlReader>,
    ) -> Self {
        Self {
            config,
            integrations,
            reader,
            url_regex: Regex::new(r"(?i)^(https?|ftp)://\S+$").expect("valid url regex"),
            base64_regex: Regex::new(r"^data:image/(?:png|jpeg|jpg|gif);base64,[\w+/=]+$")
                .expect("valid data-uri regex"),
        }
    }
}

#[async_trait]
impl Intermediator for TemplateIntermediator {
    fn name(&self) -> &str {
        "template-intermediator"
    }

    fn capabilities(&self) -> &[Capability] {
        &[Capability::PreHandle]
    }

    async fn pre_handle(
        &self,
        entity: &mut Entity,
        location: &LocationSpec,
        _emit: &Emitter,
        _origin: &LocationSpec,
        _cache: &ProcessorCache,
    ) -> EnrichmentResult<()> {
        if !self.config.enabled || entity.kind != "Template" {
            return Ok(());
        }

        let Some(image) = entity.spec_str("image").map(str::to_string) else {
            return Ok(());
        };
        if self.integrations.by_url(&location.target).is_none() {
            return Ok(());
        }

        if self.url_regex.is_match(&image) {
            return Err(EnrichmentError::Validation(
                "image in spec.image must be a relative path".to_string(),
            ));
        }

        if self.base64_regex.is_match(&image) {
            debug!("spec.image is already a base64 data uri at {}", location.target);
            return Ok(());
        }

        if !ALLOWED_EXTENSIONS.iter().any(|ext| image.ends_with(ext)) {
            return Err(EnrichmentError::Validation(
                "image should end with either .png, .jpg or .jpeg".to_string(),
            ));
        }

        let extension = image
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        debug!("bundling image from {}", location.target);
        let root = self.integrations.resolve_root(&location.target);
        let url = ScmIntegrations::join_url(&root, &image);
        let bytes = match self.reader.read_url(&url).await {
            Ok(bytes) => bytes,
            Err(err) => {
                error!("unable to bundle image from {url}: {err}");
                return Err(err.into());
            }
        };

        let data_uri = format!("data:image/{extension};base64,{}", STANDARD.encode(bytes));
        entity.set_spec_str("imageData", data_uri);

        Ok(())
    }
}
