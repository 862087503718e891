//! Relations and processing results emitted during an entity pass.

use crate::{Entity, EntityRef, LocationSpec};
use serde::{Deserialize, Serialize};

/// Relation type: the source depends on the target.
pub const RELATION_DEPENDS_ON: &str = "dependsOn";

/// Relation type: the source is a dependency of the target.
pub const RELATION_DEPENDENCY_OF: &str = "dependencyOf";

/// A directed relation between two entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRelation {
    /// The entity the relation originates from.
    pub source: EntityRef,

    /// Relation type, e.g. [`RELATION_DEPENDS_ON`].
    #[serde(rename = "type")]
    pub relation_type: String,

    /// The entity the relation points at.
    pub target: EntityRef,
}

impl EntityRelation {
    /// Creates a relation.
    #[must_use]
    pub fn new(source: EntityRef, relation_type: impl Into<String>, target: EntityRef) -> Self {
        Self {
            source,
            relation_type: relation_type.into(),
            target,
        }
    }
}

/// Something an intermediator produced beside the entity it was handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProcessingResult {
    /// A sibling entity discovered at a location.
    Entity {
        /// Where the sibling was found.
        location: LocationSpec,
        /// The sibling itself.
        entity: Entity,
    },

    /// A relation between two catalog entities.
    Relation(EntityRelation),
}
