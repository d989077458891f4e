//! Drives the reqwest transport against an in-process service that speaks the
//! long-running-operation protocol.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use nbsync_client::{ClientError, WorkspaceClient};
use nbsync_core::WorkspaceContext;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const TOKEN: &str = "secret-token";

#[derive(Clone)]
struct Service {
    base_url: Arc<String>,
    polls: Arc<AtomicUsize>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {}", TOKEN))
}

async fn list_items(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "missing token").into_response();
    }
    Json(json!({ "value": [
        { "id": "N1", "displayName": "Utils", "folderId": "F1" },
        { "id": "N2", "displayName": "Scratchpad", "folderId": null }
    ]}))
    .into_response()
}

async fn list_folders(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "missing token").into_response();
    }
    Json(json!({ "value": [{ "id": "F1", "displayName": "lib" }] })).into_response()
}

async fn start_definition(State(service): State<Service>) -> Response {
    let location = format!("{}/v1/operations/op1", service.base_url);
    (StatusCode::ACCEPTED, [(header::LOCATION, location)]).into_response()
}

async fn operation_state(State(service): State<Service>) -> Response {
    let poll = service.polls.fetch_add(1, Ordering::SeqCst);
    if poll == 0 {
        let location = format!("{}/v1/operations/op1", service.base_url);
        (
            StatusCode::ACCEPTED,
            [(header::LOCATION, location)],
            Json(json!({ "status": "Running" })),
        )
            .into_response()
    } else {
        let location = format!("{}/v1/operations/op1/result", service.base_url);
        (
            StatusCode::OK,
            [(header::LOCATION, location)],
            Json(json!({ "status": "Succeeded" })),
        )
            .into_response()
    }
}

async fn operation_result() -> Response {
    Json(json!({ "definition": { "parts": [
        { "path": "notebook-content.py", "payload": "cHJpbnQoMSk=", "payloadType": "InlineBase64" }
    ]}}))
    .into_response()
}

async fn spawn_service() -> anyhow::Result<(String, Service)> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);

    let service = Service {
        base_url: Arc::new(base_url.clone()),
        polls: Arc::new(AtomicUsize::new(0)),
    };

    let app = Router::new()
        .route("/v1/workspaces/W1/items", get(list_items))
        .route("/v1/workspaces/W1/folders", get(list_folders))
        .route(
            "/v1/workspaces/W1/items/N1/getDefinition",
            post(start_definition),
        )
        .route("/v1/operations/op1", get(operation_state))
        .route("/v1/operations/op1/result", get(operation_result))
        .with_state(service.clone());

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok((base_url, service))
}

fn client(base_url: &str, token: Option<&str>) -> WorkspaceClient {
    WorkspaceClient::new(
        base_url,
        token.map(str::to_string),
        WorkspaceContext::new("Sales", "W1"),
    )
    .with_poll_interval(Duration::from_millis(5))
}

#[tokio::test]
async fn test_definition_through_long_running_operation() -> anyhow::Result<()> {
    let (base_url, service) = spawn_service().await?;

    let definition = client(&base_url, Some(TOKEN)).get_definition("N1").await?;

    assert_eq!(
        definition["definition"]["parts"][0]["path"],
        "notebook-content.py"
    );
    assert_eq!(service.polls.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn test_list_module_resources_over_http() -> anyhow::Result<()> {
    let (base_url, _) = spawn_service().await?;

    let resources = client(&base_url, Some(TOKEN))
        .list_module_resources(Some(&["lib".to_string()]))
        .await?;

    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0].display_name, "Utils");
    Ok(())
}

#[tokio::test]
async fn test_missing_token_surfaces_api_error() -> anyhow::Result<()> {
    let (base_url, _) = spawn_service().await?;

    let err = client(&base_url, None).list_notebooks().await.unwrap_err();

    assert!(matches!(err, ClientError::ApiError { status: 401, .. }));
    Ok(())
}
