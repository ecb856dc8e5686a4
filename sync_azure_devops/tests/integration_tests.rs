use std::collections::HashMap;

use serde_json::json;
use sync_azure_devops::{
    AzureDevOpsConnector, AzureDevOpsRestClient, AzureDevOpsRestConfig, DevOpsApi, IdentityQuery,
};
use sync_core::config::ConnectorConfig;
use sync_core::connectors::nodes::{Entitlement, MutationOutcome, Resource, ResourceId};
use sync_core::Connector;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// base64(":pat")
const AUTHORIZATION: &str = "Basic OnBhdA==";

fn client(server: &MockServer) -> AzureDevOpsRestClient {
    AzureDevOpsRestClient::new(
        &format!("{}/acme", server.uri()),
        "pat",
        AzureDevOpsRestConfig::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn projects_follow_the_continuation_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/acme/_apis/projects"))
        .and(query_param("continuationToken", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "value": [{"id": "p3", "name": "Northwind"}]
        })))
        .named("second project page")
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/acme/_apis/projects"))
        .and(header("Authorization", AUTHORIZATION))
        .and(query_param("api-version", "7.1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ms-continuationtoken", "2")
                .set_body_json(json!({
                    "count": 2,
                    "value": [
                        {"id": "p1", "name": "Fabrikam"},
                        {"id": "p2", "name": "Contoso"}
                    ]
                })),
        )
        .named("first project page")
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let first = client.list_projects(None).await.unwrap();
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.next_token.as_deref(), Some("2"));

    let second = client.list_projects(first.next_token).await.unwrap();
    assert_eq!(second.items[0].name, "Northwind");
    assert_eq!(second.next_token, None);
}

#[tokio::test]
async fn user_entitlements_read_the_body_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/acme/_apis/userentitlements"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "members": [{
                "id": "u1",
                "user": {
                    "descriptor": "aad.jane",
                    "displayName": "Jane",
                    "principalName": "jane@example.com"
                },
                "accessLevel": {"status": "active"}
            }],
            "continuationToken": ["next-page"]
        })))
        .mount(&server)
        .await;

    let page = client(&server).list_user_entitlements(None).await.unwrap();
    assert_eq!(page.next_token.as_deref(), Some("next-page"));
    assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn missing_membership_is_a_typed_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/acme/_apis/graph/memberships/aad.jane/vssgp.team"))
        .respond_with(ResponseTemplate::new(404).set_body_string("VS860018: not a member"))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_membership("aad.jane", "vssgp.team")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn other_failures_keep_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/acme/_apis/teams"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
        .mount(&server)
        .await;

    let err = client(&server).list_teams().await.unwrap_err();
    assert!(!err.is_not_found());
    let message = err.to_string();
    assert!(message.contains("401"));
    assert!(message.contains("bad token"));
}

#[tokio::test]
async fn unknown_identities_are_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/acme/_apis/identities"))
        .and(query_param("descriptors", "d1,d2"))
        .and(query_param("queryMembership", "expanded"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "value": [null, {"id": "g1", "providerDisplayName": "[Fabrikam]\\Readers"}]
        })))
        .mount(&server)
        .await;

    let identities = client(&server)
        .read_identities(IdentityQuery::ByDescriptors(vec![
            "d1".to_owned(),
            "d2".to_owned(),
        ]))
        .await
        .unwrap();
    assert_eq!(identities.len(), 1);
    assert_eq!(identities[0].id, "g1");
}

#[tokio::test]
async fn granting_an_existing_team_member_sends_no_write() {
    let server = MockServer::start().await;
    let membership = "/acme/_apis/graph/memberships/aad.jane/vssgp.team";
    Mock::given(method("GET"))
        .and(path(membership))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "containerDescriptor": "vssgp.team",
            "memberDescriptor": "aad.jane"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(membership))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let credentials = HashMap::from([
        (
            "organization_url".to_owned(),
            format!("{}/acme", server.uri()),
        ),
        ("personal_access_token".to_owned(), "pat".to_owned()),
    ]);
    let config = ConnectorConfig::new("azure_devops".to_owned(), HashMap::new());
    let connector = AzureDevOpsConnector::new(&config, &credentials).unwrap();

    let team = ResourceId::new("team", "vssgp.team");
    let jane = Resource::new("user", "aad.jane", "Jane");
    let outcome = connector
        .grant(&jane, &Entitlement::new(&team, "member"))
        .await
        .unwrap();
    assert_eq!(outcome, MutationOutcome::AlreadyExists);
}
