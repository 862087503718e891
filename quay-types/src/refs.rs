//! Entity references.
//!
//! A reference is the string identity `kind:namespace/name` used by the
//! catalog API and by every cache keyed on entities.

use crate::{Entity, Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Namespace assumed when an entity carries none.
pub const DEFAULT_NAMESPACE: &str = "default";

/// A parsed entity reference.
///
/// The kind is stored lowercased so that refs compare and hash consistently
/// regardless of how the source spelled it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Lowercased entity kind.
    pub kind: String,
    /// Namespace, never empty.
    pub namespace: String,
    /// Entity name.
    pub name: String,
}

impl EntityRef {
    /// Creates a reference from parts, lowercasing the kind and defaulting
    /// an empty namespace.
    #[must_use]
    pub fn new(
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let namespace = namespace.into();
        Self {
            kind: kind.into().to_lowercase(),
            namespace: if namespace.is_empty() {
                DEFAULT_NAMESPACE.to_string()
            } else {
                namespace
            },
            name: name.into(),
        }
    }

    /// Builds the reference identifying an entity.
    #[must_use]
    pub fn of(entity: &Entity) -> Self {
        Self::new(
            entity.kind.clone(),
            entity
                .metadata
                .namespace
                .clone()
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            entity.metadata.name.clone(),
        )
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.kind, self.namespace, self.name)
    }
}

impl FromStr for EntityRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, rest) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidEntityRef(s.to_string()))?;
        let (namespace, name) = match rest.split_once('/') {
            Some((ns, name)) => (ns, name),
            None => (DEFAULT_NAMESPACE, rest),
        };
        if kind.is_empty() || name.is_empty() {
            return Err(Error::InvalidEntityRef(s.to_string()));
        }
        Ok(Self::new(kind, namespace, name))
    }
}
