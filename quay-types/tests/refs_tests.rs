use quay_types::{Entity, EntityRef, DEFAULT_NAMESPACE};
use std::collections::HashSet;
use std::str::FromStr;

// ── Construction ──────────────────────────────────────────────────

#[test]
fn new_lowercases_kind() {
    let r = EntityRef::new("Component", "default", "ms-payments");
    assert_eq!(r.kind, "component");
    assert_eq!(r.to_string(), "component:default/ms-payments");
}

#[test]
fn new_defaults_empty_namespace() {
    let r = EntityRef::new("Template", "", "starter");
    assert_eq!(r.namespace, DEFAULT_NAMESPACE);
}

#[test]
fn of_entity_uses_metadata() {
    let mut entity = Entity::new("Component", "ms-payments");
    entity.metadata.namespace = Some("payments".to_string());
    let r = EntityRef::of(&entity);
    assert_eq!(r.to_string(), "component:payments/ms-payments");
}

#[test]
fn of_entity_without_namespace() {
    let entity = Entity::new("API", "payments-api");
    assert_eq!(EntityRef::of(&entity).to_string(), "api:default/payments-api");
}

// ── Parsing ───────────────────────────────────────────────────────

#[test]
fn parse_full_ref() {
    let r = EntityRef::from_str("component:payments/ms-payments").unwrap();
    assert_eq!(r.kind, "component");
    assert_eq!(r.namespace, "payments");
    assert_eq!(r.name, "ms-payments");
}

#[test]
fn parse_without_namespace() {
    let r = EntityRef::from_str("resource:my-bucket").unwrap();
    assert_eq!(r.namespace, DEFAULT_NAMESPACE);
    assert_eq!(r.name, "my-bucket");
}

#[test]
fn parse_roundtrips_display() {
    let r = EntityRef::new("Resource", "infra", "eks-prod");
    let parsed = EntityRef::from_str(&r.to_string()).unwrap();
    assert_eq!(r, parsed);
}

#[test]
fn parse_rejects_missing_kind() {
    assert!(EntityRef::from_str("no-colon-here").is_err());
}

#[test]
fn parse_rejects_empty_name() {
    assert!(EntityRef::from_str("component:default/").is_err());
    assert!(EntityRef::from_str(":default/name").is_err());
}

#[test]
fn refs_hash_consistently() {
    let mut set = HashSet::new();
    set.insert(EntityRef::new("Component", "default", "a"));
    set.insert(EntityRef::new("component", "default", "a"));
    assert_eq!(set.len(), 1);
}
