use quay_enrichment::{GithubClient, GithubConfig, GraphqlGithubClient};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GraphqlGithubClient {
    GraphqlGithubClient::new(GithubConfig {
        api_base_url: server.uri(),
        token: Some("gh-token".to_string()),
        ..Default::default()
    })
}

#[tokio::test]
async fn repo_details_parses_the_graphql_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("authorization", "Bearer gh-token"))
        .and(body_partial_json(serde_json::json!({
            "variables": { "owner": "acme", "repo": "ms-payments" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "repository": {
                    "databaseId": 8675309,
                    "createdAt": "2021-03-01T10:00:00Z",
                    "defaultBranchRef": { "name": "main" },
                    "branchProtectionRules": {
                        "edges": [
                            { "node": {
                                "requiredApprovingReviewCount": 2,
                                "requiresCodeOwnerReviews": true,
                                "pattern": "main"
                            }},
                            { "node": {
                                "requiredApprovingReviewCount": null,
                                "requiresCodeOwnerReviews": false,
                                "pattern": "release/*"
                            }}
                        ]
                    }
                }
            }
        })))
        .mount(&server)
        .await;

    let details = client_for(&server)
        .repo_details("acme", "ms-payments")
        .await
        .unwrap();

    assert_eq!(details.database_id, Some(8675309));
    assert_eq!(details.default_branch.as_deref(), Some("main"));
    assert_eq!(details.protection_rules.len(), 2);

    let rule = details.default_branch_rule().unwrap();
    assert_eq!(rule.required_approving_review_count, Some(2));
    assert!(rule.requires_code_owner_reviews);
}

#[tokio::test]
async fn default_branch_rule_requires_a_pattern_match() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "repository": {
                    "databaseId": 1,
                    "createdAt": "2020-01-01T00:00:00Z",
                    "defaultBranchRef": { "name": "main" },
                    "branchProtectionRules": {
                        "edges": [
                            { "node": {
                                "requiredApprovingReviewCount": 1,
                                "requiresCodeOwnerReviews": false,
                                "pattern": "develop"
                            }}
                        ]
                    }
                }
            }
        })))
        .mount(&server)
        .await;

    let details = client_for(&server)
        .repo_details("acme", "ms-ledger")
        .await
        .unwrap();

    assert!(details.default_branch_rule().is_none());
}

#[tokio::test]
async fn graphql_errors_surface_as_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": null,
            "errors": [{ "message": "API rate limit exceeded" }]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .repo_details("acme", "ms-payments")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("rate limit"));
}

#[tokio::test]
async fn missing_repository_surfaces_as_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "repository": null }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .repo_details("acme", "gone")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn http_failures_surface_as_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .repo_details("acme", "ms-payments")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("502"));
}
