use std::time::Duration;

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use gridbill_assets::{AssetRecord, GroupMember};
use gridbill_core::GroupId;
use gridbill_infra::{
    AmmpConfig, GroupFilterEngine, HttpMembershipProvider, MembershipError, MembershipProvider,
};

const TOKEN: &str = "test-token";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let app = Router::new().route("/v1/asset-groups/:group_id/assets", get(group_assets));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}/v1", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn provider(&self) -> HttpMembershipProvider {
        let config = AmmpConfig::new(self.base_url.clone())
            .with_token(TOKEN)
            .with_timeout(Duration::from_secs(5));
        HttpMembershipProvider::new(&config).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn group_assets(Path(group_id): Path<String>, headers: HeaderMap) -> Response {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"));
    if !authorized {
        return (StatusCode::UNAUTHORIZED, "missing token").into_response();
    }

    match group_id.as_str() {
        "primary" => Json(json!([
            { "asset_id": "a1", "asset_name": "Site 1" },
            { "asset_id": "a2", "asset_name": "Site 2" },
            { "asset_id": "a3", "asset_name": "Site 3" },
        ]))
        .into_response(),
        "and" => Json(json!({
            "assets": [{ "asset_id": "a2" }, { "asset_id": "a3" }]
        }))
        .into_response(),
        "not" => Json(json!([{ "asset_id": "a3" }])).into_response(),
        "broken" => (StatusCode::OK, "<html>maintenance</html>").into_response(),
        "boom" => (StatusCode::BAD_GATEWAY, "upstream down").into_response(),
        _ => (StatusCode::NOT_FOUND, "no such group").into_response(),
    }
}

#[tokio::test]
async fn fetches_members_from_both_payload_shapes() {
    let server = TestServer::spawn().await;
    let provider = server.provider();

    let primary = provider.group_members(&GroupId::from("primary")).await.unwrap();
    assert_eq!(primary.len(), 3);
    assert_eq!(primary[0], GroupMember::new("a1"));

    let and = provider.group_members(&GroupId::from("and")).await.unwrap();
    assert_eq!(and, vec![GroupMember::new("a2"), GroupMember::new("a3")]);
}

#[tokio::test]
async fn maps_http_failures_to_membership_errors() {
    let server = TestServer::spawn().await;
    let provider = server.provider();

    assert!(matches!(
        provider.group_members(&GroupId::from("unknown")).await,
        Err(MembershipError::UnknownGroup(g)) if g.as_str() == "unknown"
    ));
    assert!(matches!(
        provider.group_members(&GroupId::from("boom")).await,
        Err(MembershipError::Http { status: 502, .. })
    ));
    assert!(matches!(
        provider.group_members(&GroupId::from("broken")).await,
        Err(MembershipError::Malformed(_))
    ));
}

#[tokio::test]
async fn missing_token_is_an_http_error() {
    let server = TestServer::spawn().await;
    let provider = HttpMembershipProvider::new(&AmmpConfig::new(server.base_url.clone())).unwrap();

    assert!(matches!(
        provider.group_members(&GroupId::from("primary")).await,
        Err(MembershipError::Http { status: 401, .. })
    ));
}

#[tokio::test]
async fn unreachable_provider_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = AmmpConfig::new(format!("http://{addr}")).with_timeout(Duration::from_secs(2));
    let provider = HttpMembershipProvider::new(&config).unwrap();

    assert!(matches!(
        provider.group_members(&GroupId::from("primary")).await,
        Err(MembershipError::Network(_))
    ));
}

#[tokio::test]
async fn engine_filters_against_live_http_membership() {
    let server = TestServer::spawn().await;
    let engine = GroupFilterEngine::new(server.provider());
    let inventory = vec![
        AssetRecord::new("a1", "Site 1", 1.0),
        AssetRecord::new("a2", "Site 2", 1.0),
        AssetRecord::new("a3", "Site 3", 1.0),
    ];

    let billable = engine
        .filter_assets_by_groups(&inventory, Some("primary"), Some("and"), Some("not"))
        .await;
    let ids: Vec<&str> = billable.iter().map(|a| a.asset_id.as_str()).collect();
    assert_eq!(ids, vec!["a2"]);

    let failed = engine
        .filter_assets_by_groups(&inventory, Some("primary"), Some("boom"), None)
        .await;
    assert!(failed.is_empty());
}
