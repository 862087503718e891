//! Template visibility and source-location helpers.
//!
//! Shared between the template listing surface and the enrichment pipeline:
//! deciding whether a restricted template is visible to a user, and
//! normalizing a template's source location onto its canonical branch.

use quay_types::Entity;

const SOURCE_LOCATION_ANNOTATION: &str = "backstage.io/source-location";

/// A group the current user belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserGroup {
    /// Group label as shown in the portal.
    pub label: String,
}

/// A resolved entity source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Location type, e.g. `url`.
    pub location_type: String,
    /// The location target URL.
    pub location_target_url: String,
}

/// Returns whether a restricted template is visible to a user.
///
/// An empty allow-list hides the template from everyone, and an unknown
/// user (no groups) sees nothing restricted. Otherwise the template is
/// visible iff any of the user's group labels is in the allow-list.
#[must_use]
pub fn can_view_restricted_template(
    groups_allowed: &[String],
    user_groups: Option<&[UserGroup]>,
) -> bool {
    if groups_allowed.is_empty() {
        return false;
    }

    match user_groups {
        Some(groups) => groups.iter().any(|g| groups_allowed.contains(&g.label)),
        None => false,
    }
}

/// Resolves an entity's source location, rewriting the tree ref onto the
/// canonical branch when the target pins neither `main` nor `qa`.
///
/// Entities whose name ends in `-qa` resolve to the `qa` branch; everything
/// else resolves to `main`. Returns `None` when the entity carries no
/// source-location annotation.
#[must_use]
pub fn handle_source_location(entity: &Entity) -> Option<SourceLocation> {
    let mut location = entity_source_location(entity)?;
    let url = &location.location_target_url;

    if !url.contains("main") && !url.contains("qa") {
        if let Some(idx) = url.find("tree/") {
            let branch = if entity.metadata.name.to_lowercase().ends_with("-qa") {
                "qa"
            } else {
                "main"
            };
            location.location_target_url = format!("{}tree/{}", &url[..idx], branch);
        }
    }

    Some(location)
}

fn entity_source_location(entity: &Entity) -> Option<SourceLocation> {
    let raw = entity.annotation(SOURCE_LOCATION_ANNOTATION)?;
    let (location_type, target) = match raw.strip_prefix("url:") {
        Some(target) => ("url", target),
        None => ("url", raw),
    };

    Some(SourceLocation {
        location_type: location_type.to_string(),
        location_target_url: target.to_string(),
    })
}
