//! Infrastructure chart definitions.
//!
//! Resources of type `infra` carry their Helm values files next to the
//! entity source. This intermediator fetches the QA and production values,
//! normalizes the YAML, and stores them on the spec so the portal can show
//! both environments without touching the source host.

use crate::error::{EnrichmentError, EnrichmentResult};
use crate::intermediator::{Capability, Emitter, Intermediator, ProcessorCache};
use async_trait::async_trait;
use quay_catalog::{ScmIntegrations, UrlReader};
use quay_types::{Entity, LocationSpec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

const QA_VALUES_PATH: &str = "./chart/values.qa.yaml";
const PROD_VALUES_PATH: &str = "./chart/values.prod.yaml";
const MAX_RETRIES: u32 = 3;

/// Value stored when a definition file does not exist and the spec carries
/// no previous value either.
const NOT_FOUND: &str = "NotFound";

/// Configuration for the infrastructure definition intermediator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfraDefinitionConfig {
    /// Whether the intermediator runs at all.
    pub enabled: bool,
}

impl Default for InfraDefinitionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Bundles chart values onto `infra` resources.
pub struct InfraDefinitionIntermediator {
    config: InfraDefinitionConfig,
    integrations: ScmIntegrations,
    reader: Arc<dyn UrlReader>,
}

impl InfraDefinitionIntermediator {
    /// Creates the intermediator.
    pub fn new(
        config: InfraDefinitionConfig,
        integrations: ScmIntegrations,
        reader: Arc<dyn UrlReader>,
    ) -> Self {
        Self {
            config,
            integrations,
            reader,
        }
    }

    /// Reads one values file, normalizing the YAML formatting.
    ///
    /// A 404 is a definitive answer and short-circuits to `None` with no
    /// retry; any other failure (transport, status, unparseable YAML) is
    /// retried up to [`MAX_RETRIES`] times before giving up with an error.
    async fn read_definition(&self, root: &str, path: &str) -> EnrichmentResult<Option<String>> {
        let url = ScmIntegrations::join_url(root, path);

        for attempt in 1..=MAX_RETRIES {
            match self.reader.read_url(&url).await {
                Ok(bytes) => match normalize_yaml(&bytes) {
                    Ok(text) => return Ok(Some(text)),
                    Err(err) => {
                        error!("attempt {attempt} failed for {path}: {err}");
                    }
                },
                Err(err) if err.is_not_found() => {
                    debug!("file not found: {path}");
                    return Ok(None);
                }
                Err(err) => {
                    error!("attempt {attempt} failed for {path}: {err}");
                }
            }
        }

        error!("unable to bundle yaml definition {path} after {MAX_RETRIES} attempts");
        Err(EnrichmentError::RetriesExhausted {
            path: path.to_string(),
            attempts: MAX_RETRIES,
        })
    }
}

fn normalize_yaml(bytes: &[u8]) -> EnrichmentResult<String> {
    let value: serde_yaml::Value = serde_yaml::from_slice(bytes)?;
    Ok(serde_yaml::to_string(&value)?)
}

fn definition_or_fallback(read: Option<String>, entity: &Entity, spec_key: &str) -> String {
    read.or_else(|| entity.spec_str(spec_key).map(str::to_string))
        .unwrap_or_else(|| NOT_FOUND.to_string())
}

#[async_trait]
impl Intermediator for InfraDefinitionIntermediator {
    fn name(&self) -> &str {
        "infrastructure-definition-intermediator"
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
        if !self.config.enabled
            || entity.kind != "Resource"
            || entity.spec_str("type") != Some("infra")
        {
            return Ok(());
        }
        if self.integrations.by_url(&location.target).is_none() {
            return Ok(());
        }

        debug!("bundling yaml definitions from {}", location.target);
        let root = self.integrations.resolve_root(&location.target);

        let homolog = self.read_definition(&root, QA_VALUES_PATH).await?;
        let production = self.read_definition(&root, PROD_VALUES_PATH).await?;

        let homolog = definition_or_fallback(homolog, entity, "homologDefinition");
        let production = definition_or_fallback(production, entity, "productionDefinition");

        entity.set_spec_str("homologDefinition", homolog);
        entity.set_spec_str("productionDefinition", production);

        Ok(())
    }
}
