//! Resolution when the remote drive cannot obtain an access token.

use climscen_catalog::{Context, Dim, ScenarioCatalog};
use climscen_connection::{connect, Connection, ConnectionConfig, StaticLocator};
use climscen_core::AnyStorage;
use climscen_storage_drive::{DriveConfig, RemoteDrive};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn rejecting_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Token has been expired or revoked."
        })))
        .expect(1..)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": [] })))
        .expect(0)
        .mount(&server)
        .await;
    server
}

fn assert_all_empty(ctx: &Context) {
    for dim in Dim::ALL {
        assert_eq!(ctx.catalog_entries(dim), Some(Vec::new()), "{dim}");
        assert_eq!(ctx.selected_code(dim), None, "{dim}");
    }
}

async fn refresh_with_selections(catalog: &ScenarioCatalog) -> Context {
    let mut ctx = Context::for_project("demo");
    ctx.select(Dim::View, "map").unwrap();
    ctx.select(Dim::VarIdx, "tas").unwrap();
    ctx.select(Dim::Hor, "2021-2050").unwrap();
    catalog.refresh(&mut ctx).await.unwrap();
    ctx
}

#[tokio::test]
async fn rejected_refresh_yields_empty_catalogs() {
    let server = rejecting_server().await;
    let drive = Arc::new(
        RemoteDrive::new(DriveConfig {
            api_base: server.uri(),
            token_url: format!("{}/token", server.uri()),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: "revoked".to_string(),
            ..Default::default()
        })
        .unwrap(),
    );
    let storage: AnyStorage = drive.clone();
    let conn = Connection::new(ConnectionConfig::local("/unused"), storage)
        .with_locator(Arc::new(StaticLocator::new().with_project("demo", "folder-demo")));

    let snapshot = conn.session().project("demo").await.unwrap();
    assert!(snapshot.index().is_empty());
    let catalog = ScenarioCatalog::new(snapshot);

    let ctx = refresh_with_selections(&catalog).await;
    assert_all_empty(&ctx);
    assert!(drive.auth_failures() >= 1);
}

#[tokio::test]
async fn rejected_refresh_through_configured_connection() {
    let server = rejecting_server().await;
    let config = ConnectionConfig::parse(&format!(
        "[storage]\nbackend = drive\n\n\
         [drive]\napi_base = {uri}\ntoken_url = {uri}/token\n\
         client_id = client\nclient_secret = secret\nrefresh_token = revoked\n",
        uri = server.uri()
    ))
    .unwrap();
    let conn = connect(config).unwrap();

    let snapshot = conn.session().project("demo").await.unwrap();
    assert!(!snapshot.is_located());
    assert!(snapshot.index().is_empty());
    assert!(conn.auth_failures() >= 1);

    let ctx = refresh_with_selections(&ScenarioCatalog::new(snapshot)).await;
    assert_all_empty(&ctx);
}
