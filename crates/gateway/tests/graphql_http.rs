//! Integration tests for the GraphQL HTTP routes.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{net::SocketAddr, sync::Arc};

use {
    remoql_access::{AclRule, Permission},
    remoql_config::{OrganizationEntry, RemoqlConfig},
    remoql_gateway::{DirectoryModel, GatewayState, build_app},
    remoql_model::RemoteModel,
    serde_json::{Value, json},
    tokio::net::TcpListener,
};

fn config() -> RemoqlConfig {
    let mut cfg = RemoqlConfig::default();
    cfg.tenancy.organizations = vec![
        OrganizationEntry {
            id: "42".into(),
            domains: vec!["hq.example.com".into()],
        },
        OrganizationEntry {
            id: "7".into(),
            domains: vec!["acme.example.com".into()],
        },
    ];
    cfg
}

/// Start a test server for `cfg` on an ephemeral port.
async fn start_server(cfg: RemoqlConfig) -> SocketAddr {
    let models: Vec<Arc<dyn RemoteModel>> = vec![Arc::new(DirectoryModel::new(
        cfg.graphql.tenant_model.clone(),
        cfg.tenancy.organizations.clone(),
    ))];
    let state = Arc::new(GatewayState::from_config(&cfg, models).unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_app(state)).await.unwrap();
    });
    addr
}

async fn post(addr: SocketAddr, query: &str, headers: &[(&str, &str)]) -> Value {
    let mut req = reqwest::Client::new()
        .post(format!("http://{addr}/graphql"))
        .json(&json!({ "query": query }));
    for (name, value) in headers {
        req = req.header(*name, *value);
    }
    let resp = req.send().await.unwrap();
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn this_resolves_from_org_header() {
    let addr = start_server(config()).await;
    let body = post(addr, r#"{ organizationFindById(id: "this") }"#, &[("x-org-id", "42")]).await;
    assert_eq!(
        body["data"]["organizationFindById"],
        json!({ "id": 42, "domains": ["hq.example.com"] })
    );
}

#[tokio::test]
async fn forwarded_host_scopes_listing() {
    let addr = start_server(config()).await;
    let body = post(
        addr,
        "{ organizationFind { edges { node } pageInfo { hasNextPage } } }",
        &[("x-forwarded-host", "acme.example.com:443")],
    )
    .await;
    let conn = &body["data"]["organizationFind"];
    assert_eq!(conn["edges"], json!([{ "node": { "id": 7, "domains": ["acme.example.com"] } }]));
    assert_eq!(conn["pageInfo"]["hasNextPage"], false);
}

#[tokio::test]
async fn missing_identity_is_a_graphql_error() {
    let addr = start_server(config()).await;
    let body = post(addr, r#"{ organizationFindById(id: "this") }"#, &[]).await;
    assert_eq!(
        body["errors"][0]["message"],
        "No x-org-id or domain (x-forwarded-host) found for resolution of Organization id."
    );
    assert_eq!(body["errors"][0]["extensions"]["code"], "UNRESOLVED_IDENTITY");
}

#[tokio::test]
async fn configured_acl_denies() {
    let mut cfg = config();
    cfg.access.default_permission = Permission::Deny;
    cfg.access.rules = vec![AclRule::new("Organization", "exists", Permission::Allow)];
    let addr = start_server(cfg).await;

    let body = post(addr, r#"{ organizationExists(id: "7") }"#, &[]).await;
    assert_eq!(body["data"]["organizationExists"], true);

    let body = post(addr, r#"{ organizationFindById(id: "7") }"#, &[]).await;
    assert_eq!(body["errors"][0]["extensions"]["code"], "ACCESS_DENIED");
}

#[tokio::test]
async fn remote_options_reach_the_model() {
    let mut cfg = config();
    cfg.graphql
        .remote_options
        .insert("orgId".into(), json!("42"));
    let addr = start_server(cfg).await;

    let body = post(addr, "{ organizationFind { edges { node } } }", &[]).await;
    assert_eq!(
        body["data"]["organizationFind"]["edges"][0]["node"]["id"],
        42
    );
    assert_eq!(
        body["data"]["organizationFind"]["edges"]
            .as_array()
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn playground_and_health() {
    let addr = start_server(config()).await;

    let resp = reqwest::get(format!("http://{addr}/svc/playground"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let html = resp.text().await.unwrap();
    assert!(html.contains("/graphql"));

    let health: Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
}

#[tokio::test]
async fn custom_routes_and_disabled_playground() {
    let mut cfg = config();
    cfg.graphql.path = "/api/graphql".into();
    cfg.graphql.playground_path = None;
    let addr = start_server(cfg).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/graphql"))
        .json(&json!({ "query": "{ _operations }" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["data"]["_operations"],
        json!(["organizationFind", "organizationFindById", "organizationExists"])
    );

    let resp = reqwest::get(format!("http://{addr}/svc/playground"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
