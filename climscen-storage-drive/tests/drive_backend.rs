//! RemoteDrive against a mock files API.

use climscen_core::{find, GlobPattern, IndexRoot, StorageBackend, VirtualFileIndex};
use climscen_storage_drive::{
    DriveConfig, RefreshTokenAuth, RefreshTokenConfig, RemoteDrive, StaticToken, TokenProvider,
    FOLDER_MIME_TYPE,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIELDS: &str = "nextPageToken,files(id,name,mimeType,size,parents,modifiedTime)";

fn folder(id: &str, name: &str, parent: &str) -> Value {
    json!({"id": id, "name": name, "mimeType": FOLDER_MIME_TYPE, "parents": [parent]})
}

fn csv(id: &str, name: &str, parent: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "mimeType": "text/csv",
        "size": "42",
        "parents": [parent],
        "modifiedTime": "2024-05-01T08:30:00.000Z"
    })
}

fn children_q(parent: &str) -> String {
    format!("'{}' in parents and trashed = false", parent)
}

fn child_q(parent: &str, name: &str) -> String {
    format!("'{}' in parents and name = '{}' and trashed = false", parent, name)
}

fn config(server: &MockServer) -> DriveConfig {
    DriveConfig {
        api_base: server.uri(),
        token_url: format!("{}/token", server.uri()),
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        refresh_token: "refresh".to_string(),
        ..Default::default()
    }
}

fn drive(server: &MockServer) -> RemoteDrive {
    RemoteDrive::with_auth(config(server), Arc::new(StaticToken::new("tok"))).unwrap()
}

async fn mount_children(server: &MockServer, parent: &str, files: Value) {
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", children_q(parent).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": files })))
        .mount(server)
        .await;
}

async fn mount_child(server: &MockServer, parent: &str, name: &str, file: Value) {
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", child_q(parent, name).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": [file] })))
        .mount(server)
        .await;
}

async fn mount_metadata(server: &MockServer, file: Value) {
    let id = file["id"].as_str().unwrap().to_string();
    Mock::given(method("GET"))
        .and(path(format!("/files/{}", id)))
        .and(query_param_is_missing("alt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file))
        .mount(server)
        .await;
}

/// root/{demo/ts/pr/{pr_rcp_False.csv, pr_sim_False.csv}, context/}
async fn mount_tree(server: &MockServer) {
    mount_children(
        server,
        "root",
        json!([folder("d-demo", "demo", "root"), folder("d-ctx", "context", "root")]),
    )
    .await;
    mount_children(server, "d-demo", json!([folder("d-ts", "ts", "d-demo")])).await;
    mount_children(server, "d-ts", json!([folder("d-pr", "pr", "d-ts")])).await;
    mount_children(
        server,
        "d-pr",
        json!([
            csv("f-rcp", "pr_rcp_False.csv", "d-pr"),
            csv("f-sim", "pr_sim_False.csv", "d-pr")
        ]),
    )
    .await;
}

#[tokio::test]
async fn test_list_sends_bearer_and_field_allow_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(header("authorization", "Bearer tok"))
        .and(query_param("q", children_q("root").as_str()))
        .and(query_param("fields", FIELDS))
        .and(query_param("pageSize", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [
                folder("d-demo", "demo", "root"),
                csv("f-readme", "catalog.csv", "root"),
                folder("d-ctx", "context", "root")
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let drive = drive(&server);
    let entries = drive.list("root").await.unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["catalog.csv", "context", "demo"]);
    assert!(!entries[0].is_dir());
    assert_eq!(entries[0].size, Some(42));
    assert!(entries[0].modified.is_some());
    assert!(entries[1].is_dir());
    assert_eq!(entries[2].id, "d-demo");
}

#[tokio::test]
async fn test_list_follows_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", children_q("d-pr").as_str()))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [csv("f-rcp", "pr_rcp_False.csv", "d-pr")],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", children_q("d-pr").as_str()))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [csv("f-sim", "pr_sim_False.csv", "d-pr")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let drive = drive(&server);
    let entries = drive.list("d-pr").await.unwrap();
    let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["f-rcp", "f-sim"]);
}

#[tokio::test]
async fn test_list_with_mime_filters_by_type() {
    let server = MockServer::start().await;
    let q = format!("{} and mimeType = '{}'", children_q("root"), FOLDER_MIME_TYPE);
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", q.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [folder("d-demo", "demo", "root")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let drive = drive(&server);
    let folders = drive
        .list_with_mime("root", Some(FOLDER_MIME_TYPE))
        .await
        .unwrap();
    assert_eq!(folders.len(), 1);
    assert!(folders[0].is_folder());
}

#[tokio::test]
async fn test_refresh_token_exchange_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": [] })))
        .expect(2)
        .mount(&server)
        .await;

    let drive = RemoteDrive::new(config(&server)).unwrap();
    assert!(drive.list("root").await.unwrap().is_empty());
    assert!(drive.list("d-demo").await.unwrap().is_empty());
    assert_eq!(drive.auth_failures(), 0);
}

#[tokio::test]
async fn test_failed_refresh_fails_closed_and_is_counted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Token has been expired or revoked."
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let drive = RemoteDrive::new(config(&server)).unwrap();
    assert!(drive.list("root").await.unwrap().is_empty());
    assert_eq!(drive.resolve_path_to_id("demo").await.unwrap(), None);
    assert!(drive.read_text("f-rcp").await.unwrap_err().is_not_found());

    let pattern = GlobPattern::new("**/*.csv").unwrap();
    assert!(find(&drive, "root", &pattern).await.is_empty());
    assert_eq!(drive.auth_failures(), 4);
}

fn refresh_auth(server: &MockServer) -> RefreshTokenAuth {
    RefreshTokenAuth::new(
        RefreshTokenConfig {
            token_url: format!("{}/token", server.uri()),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: "refresh".to_string(),
        },
        reqwest::Client::new(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_concurrent_callers_share_one_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": "shared", "expires_in": 3600 }))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let auth = refresh_auth(&server);
    let (a, b, c, d) = tokio::join!(
        auth.access_token(),
        auth.access_token(),
        auth.access_token(),
        auth.access_token()
    );
    assert_eq!([a, b, c, d], ["shared", "shared", "shared", "shared"]);
    assert_eq!(auth.failures(), 0);
}

#[tokio::test]
async fn test_concurrent_failed_exchange_counts_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "error": "invalid_grant" }))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let auth = refresh_auth(&server);
    let (a, b, c) = tokio::join!(auth.access_token(), auth.access_token(), auth.access_token());
    assert_eq!([a, b, c], ["", "", ""]);
    assert_eq!(auth.failures(), 1);

    // A later call tries again
    assert_eq!(auth.access_token().await, "");
    assert_eq!(auth.failures(), 2);
}

#[tokio::test]
async fn test_rejected_token_yields_empty_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let drive = drive(&server);
    assert!(drive.list("root").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
        .mount(&server)
        .await;

    let drive = drive(&server);
    let err = drive.list("root").await.unwrap_err();
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_resolve_path_to_id_walks_segments() {
    let server = MockServer::start().await;
    mount_child(&server, "root", "demo", folder("d-demo", "demo", "root")).await;
    mount_child(&server, "d-demo", "ts", folder("d-ts", "ts", "d-demo")).await;
    mount_child(&server, "d-ts", "pr", folder("d-pr", "pr", "d-ts")).await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", child_q("d-ts", "tas").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": [] })))
        .mount(&server)
        .await;

    let drive = drive(&server);
    assert_eq!(
        drive.resolve_path_to_id("demo/ts/pr").await.unwrap(),
        Some("d-pr".to_string())
    );
    assert_eq!(drive.resolve_path_to_id("demo/ts/tas").await.unwrap(), None);
    assert_eq!(drive.resolve_path_to_id("").await.unwrap(), Some("root".to_string()));
}

#[tokio::test]
async fn test_resolve_id_to_path_follows_parents() {
    let server = MockServer::start().await;
    mount_metadata(&server, csv("f-rcp", "pr_rcp_False.csv", "d-pr")).await;
    mount_metadata(&server, folder("d-pr", "pr", "d-ts")).await;
    mount_metadata(&server, folder("d-ts", "ts", "d-demo")).await;
    mount_metadata(&server, folder("d-demo", "demo", "root")).await;
    Mock::given(method("GET"))
        .and(path("/files/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let drive = drive(&server);
    assert_eq!(
        drive.resolve_id_to_path("f-rcp").await.unwrap(),
        Some("demo/ts/pr/pr_rcp_False.csv".to_string())
    );
    assert_eq!(drive.resolve_id_to_path("root").await.unwrap(), Some(String::new()));
    assert_eq!(drive.resolve_id_to_path("gone").await.unwrap(), None);
}

#[tokio::test]
async fn test_parentless_item_is_root_adjacent() {
    let server = MockServer::start().await;
    mount_metadata(
        &server,
        json!({"id": "f-stray", "name": "stray.csv", "mimeType": "text/csv"}),
    )
    .await;

    let drive = drive(&server);
    assert_eq!(
        drive.resolve_id_to_path("f-stray").await.unwrap(),
        Some("stray.csv".to_string())
    );
}

#[tokio::test]
async fn test_listing_feeds_metadata_cache() {
    let server = MockServer::start().await;
    mount_tree(&server).await;
    // Every parent is already known from the listings, no metadata calls needed
    Mock::given(method("GET"))
        .and(path("/files/f-rcp"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let drive = drive(&server);
    let pattern = GlobPattern::new("demo/ts/pr/*.csv").unwrap();
    assert_eq!(find(&drive, "root", &pattern).await.len(), 2);
    assert_eq!(
        drive.resolve_id_to_path("f-rcp").await.unwrap(),
        Some("demo/ts/pr/pr_rcp_False.csv".to_string())
    );
}

#[tokio::test]
async fn test_read_text_downloads_media() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/f-rcp"))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_string("year,ref,rcp45_moy\n"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let drive = drive(&server);
    assert_eq!(drive.read_text("f-rcp").await.unwrap(), "year,ref,rcp45_moy\n");
    assert!(drive.read_bytes("gone").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_find_prunes_on_literal_segments() {
    let server = MockServer::start().await;
    mount_tree(&server).await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", children_q("d-ctx").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let drive = drive(&server);
    let pattern = GlobPattern::new("demo/ts/*/*_rcp_*.csv").unwrap();
    let found: Vec<String> = find(&drive, "root", &pattern)
        .await
        .into_iter()
        .map(|m| m.path)
        .collect();
    assert_eq!(found, vec!["demo/ts/pr/pr_rcp_False.csv"]);
}

#[tokio::test]
async fn test_index_over_drive() {
    let server = MockServer::start().await;
    mount_tree(&server).await;

    let drive = drive(&server);
    let index = VirtualFileIndex::build(&drive, &[IndexRoot::new("", "d-demo")]).await;
    let paths: Vec<_> = index.paths().collect();
    assert_eq!(paths, vec!["ts/pr/pr_rcp_False.csv", "ts/pr/pr_sim_False.csv"]);
    assert_eq!(index.backend_ref("ts/pr/pr_sim_False.csv"), Some("f-sim"));
}
