use async_trait::async_trait;
use quay_catalog::{CatalogClient, CatalogConfig};
use quay_enrichment::intermediators::{
    ApplicationCluster, ClusterIdentifierConfig, ClusterIdentifierIntermediator, ClusterLookup,
};
use quay_enrichment::{Emitter, EnrichmentResult, Intermediator};
use quay_types::{Entity, LocationSpec, ProcessingResult, RELATION_DEPENDS_ON};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct StubLookup {
    clusters: Vec<ApplicationCluster>,
    calls: AtomicU32,
}

impl StubLookup {
    fn with(clusters: Vec<ApplicationCluster>) -> Arc<Self> {
        Arc::new(Self {
            clusters,
            calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl ClusterLookup for StubLookup {
    async fn application_clusters(&self, _repo: &str) -> EnrichmentResult<Vec<ApplicationCluster>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.clusters.clone())
    }
}

async fn catalog_with_clusters(clusters: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/catalog/entities"))
        .and(query_param("filter", "spec.type=eks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(clusters))
        .mount(&server)
        .await;
    server
}

fn intermediator(
    lookup: Arc<StubLookup>,
    server: &MockServer,
) -> ClusterIdentifierIntermediator {
    let catalog = Arc::new(CatalogClient::new(CatalogConfig {
        base_url: server.uri(),
        ..Default::default()
    }));
    ClusterIdentifierIntermediator::new(ClusterIdentifierConfig::default(), lookup, catalog)
}

fn service_component() -> Entity {
    let mut entity = Entity::new("Component", "ms-payments");
    entity.set_spec_str("type", "service");
    entity.set_annotation(
        "backstage.io/source-location",
        "url:https://github.com/acme/ms-payments/tree/main/",
    );
    entity
}

fn location() -> LocationSpec {
    LocationSpec::url("https://github.com/acme/ms-payments/tree/main/")
}

#[tokio::test]
async fn annotates_clusters_and_emits_relations() {
    let server = catalog_with_clusters(serde_json::json!([
        {
            "kind": "Resource",
            "metadata": {
                "name": "eks-prod-payments",
                "annotations": { "backstage.io/kubernetes-id": "eks-prod-1" }
            },
            "spec": { "type": "eks" }
        }
    ]))
    .await;

    let lookup = StubLookup::with(vec![ApplicationCluster {
        environment: "prod".to_string(),
        cluster: "eks-prod-1".to_string(),
    }]);
    let im = intermediator(lookup, &server);

    let (emit, mut rx) = Emitter::channel();
    let mut entity = service_component();
    im.post_handle(&mut entity, &location(), &emit).await.unwrap();

    assert_eq!(entity.annotation("quay.dev/cluster-prod"), Some("eks-prod-1"));

    let first = rx.try_recv().unwrap();
    let ProcessingResult::Relation(relation) = first else {
        panic!("expected a relation");
    };
    assert_eq!(relation.relation_type, RELATION_DEPENDS_ON);
    assert_eq!(relation.source.name, "ms-payments");
    assert_eq!(relation.target.name, "eks-prod-payments");

    let second = rx.try_recv().unwrap();
    let ProcessingResult::Relation(relation) = second else {
        panic!("expected a relation");
    };
    assert_eq!(relation.relation_type, "dependencyOf");
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn unknown_clusters_still_annotate_but_emit_nothing() {
    let server = catalog_with_clusters(serde_json::json!([])).await;
    let lookup = StubLookup::with(vec![ApplicationCluster {
        environment: "qa".to_string(),
        cluster: "eks-qa-9".to_string(),
    }]);
    let im = intermediator(lookup, &server);

    let (emit, mut rx) = Emitter::channel();
    let mut entity = service_component();
    im.post_handle(&mut entity, &location(), &emit).await.unwrap();

    assert_eq!(entity.annotation("quay.dev/cluster-qa"), Some("eks-qa-9"));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn non_service_entities_are_skipped() {
    let server = catalog_with_clusters(serde_json::json!([])).await;
    let lookup = StubLookup::with(Vec::new());
    let im = intermediator(lookup.clone(), &server);

    let mut entity = Entity::new("Component", "ms-site");
    entity.set_spec_str("type", "website");
    let (emit, _rx) = Emitter::channel();
    im.post_handle(&mut entity, &location(), &emit).await.unwrap();

    assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_source_location_is_a_validation_error() {
    let server = catalog_with_clusters(serde_json::json!([])).await;
    let lookup = StubLookup::with(Vec::new());
    let im = intermediator(lookup, &server);

    let mut entity = Entity::new("Component", "ms-orphan");
    entity.set_spec_str("type", "service");
    let (emit, _rx) = Emitter::channel();
    let err = im
        .post_handle(&mut entity, &location(), &emit)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("source-location"));
}

#[tokio::test]
async fn empty_lookup_results_are_a_no_op() {
    let server = catalog_with_clusters(serde_json::json!([])).await;
    let lookup = StubLookup::with(Vec::new());
    let im = intermediator(lookup, &server);

    let (emit, mut rx) = Emitter::channel();
    let mut entity = service_component();
    let before = entity.clone();
    im.post_handle(&mut entity, &location(), &emit).await.unwrap();

    assert_eq!(entity, before);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn catalog_clusters_are_fetched_once() {
    let server = catalog_with_clusters(serde_json::json!([])).await;
    let lookup = StubLookup::with(vec![ApplicationCluster {
        environment: "prod".to_string(),
        cluster: "eks-prod-1".to_string(),
    }]);
    let im = intermediator(lookup, &server);

    let (emit, _rx) = Emitter::channel();
    let mut entity = service_component();
    im.post_handle(&mut entity, &location(), &emit).await.unwrap();
    let mut entity = service_component();
    im.post_handle(&mut entity, &location(), &emit).await.unwrap();

    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
