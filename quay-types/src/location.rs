use serde::{Deserialize, Serialize};

/// Identifies the origin of an entity.
///
/// Read-only input to intermediators; the pipeline never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSpec {
    /// Location type, e.g. `url`.
    #[serde(rename = "type")]
    pub location_type: String,

    /// The location target, e.g. a repository tree URL.
    pub target: String,
}

impl LocationSpec {
    /// Creates a `url`-typed location for a target.
    #[must_use]
    pub fn url(target: impl Into<String>) -> Self {
        Self {
            location_type: "url".to_string(),
            target: target.into(),
        }
    }
}
