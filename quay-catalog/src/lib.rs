//! HTTP clients for the Quay catalog and source-control hosts.
//!
//! Provides the outward-facing plumbing the enrichment pipeline depends on:
//! - [`CatalogClient`] — entity queries and refresh-state lookups against
//!   the catalog API
//! - [`ScmIntegrations`] — resolves which source-control host owns a
//!   location target and how to read files relative to it
//! - [`UrlReader`] — async file fetching with 404 discrimination so callers
//!   can skip retries on missing files
//! - template helpers — source-location branch rewriting and restricted
//!   template visibility

mod client;
mod error;
mod scm;
mod templates;

pub use client::{CatalogClient, CatalogConfig, RefreshStateRecord};
pub use error::{CatalogError, CatalogResult};
pub use scm::{HttpUrlReader, ScmIntegration, ScmIntegrations, UrlReader};
pub use templates::{
    can_view_restricted_template, handle_source_location, SourceLocation, UserGroup,
};
