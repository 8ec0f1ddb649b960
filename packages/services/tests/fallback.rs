// ABOUTME: Integration tests for the sticky remote-to-local fallback.
// ABOUTME: Exercises the demotion on transport failure and the one-way stickiness.

use chrono::Utc;
use managme_client::RemoteClient;
use managme_core::types::Project;
use managme_services::{BackendMode, BackendState, ProjectService, ServiceError};
use managme_storage::LocalStore;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn project(id: &str, name: &str) -> Project {
    Project {
        id: id.to_string(),
        name: name.to_string(),
        description: "desc".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn transport_failure_demotes_and_serves_local_data() {
    let dir = TempDir::new().unwrap();
    let local = LocalStore::new(dir.path());
    local.upsert_project(project("p1", "Offline")).await.unwrap();

    // Nothing listens on this port, so the first remote call fails at the
    // transport level.
    let remote = Arc::new(RemoteClient::new("http://127.0.0.1:1"));
    let service = ProjectService::new(remote, local);

    assert_eq!(service.backend().mode(), BackendMode::Remote);

    let projects = service.list().await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "Offline");
    assert_eq!(service.backend().mode(), BackendMode::Local);
}

#[tokio::test]
async fn server_errors_demote_and_serve_local_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "data": null,
            "error": "boom",
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let local = LocalStore::new(dir.path());
    local.upsert_project(project("p1", "Offline")).await.unwrap();

    let service = ProjectService::new(Arc::new(RemoteClient::new(server.uri())), local);

    // The remote answers, but with a 500: the backend is as good as down.
    let projects = service.list().await.unwrap();
    assert_eq!(projects[0].name, "Offline");
    assert_eq!(service.backend().mode(), BackendMode::Local);
}

#[tokio::test]
async fn client_errors_surface_without_demoting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects/search/term"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "data": null,
            "error": "bad request",
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let service = ProjectService::new(
        Arc::new(RemoteClient::new(server.uri())),
        LocalStore::new(dir.path()),
    );

    // A 4xx means the remote is alive and judging the request: the error
    // surfaces and the backend stays remote.
    let result = service.search("term").await;
    assert!(matches!(result, Err(ServiceError::Remote(_))));
    assert_eq!(service.backend().mode(), BackendMode::Remote);
}

#[tokio::test]
async fn demoted_backend_never_contacts_a_recovered_remote() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [project("server-1", "Remote project")],
        })))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let local = LocalStore::new(dir.path());
    local.upsert_project(project("p1", "Offline")).await.unwrap();

    let backend = Arc::new(BackendState::new());
    backend.demote(&"earlier transport failure");

    let service = ProjectService::with_backend(
        Arc::new(RemoteClient::new(server.uri())),
        local,
        backend,
    );

    // The remote is healthy, but a demoted backend stays local.
    let projects = service.list().await.unwrap();
    assert_eq!(projects[0].id, "p1");
    assert_eq!(service.backend().mode(), BackendMode::Local);
}

#[tokio::test]
async fn healthy_remote_serves_data_and_mints_server_ids() {
    let server = MockServer::start().await;
    let server_id = "64a1f2b3c4d5e6f708192a3b";

    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [project(server_id, "Remote project")],
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/projects"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "data": project(server_id, "Created remotely"),
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let service = ProjectService::new(
        Arc::new(RemoteClient::new(server.uri())),
        LocalStore::new(dir.path()),
    );

    let projects = service.list().await.unwrap();
    assert_eq!(projects[0].id, server_id);

    // A draft (empty id) adopts the id the server minted.
    let saved = service.save(project("", "Created remotely")).await.unwrap();
    assert_eq!(saved.id, server_id);
    assert_eq!(saved.id.len(), 24);

    assert_eq!(service.backend().mode(), BackendMode::Remote);
}
