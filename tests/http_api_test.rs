//! HTTP API integration tests.
//!
//! Drives the router in-process with `oneshot` requests against an in-memory
//! store, checking routing, body filtering and the error → status mapping.

use anyhow::anyhow;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use serde_json::{Value, json};
use std::sync::Arc;
use ticket_lifecycle::{
    http::router,
    patch::TicketPatch,
    service::TicketService,
    store::{MemoryStore, TicketStore},
    ticket::{Ticket, TicketStatus},
};
use tower::ServiceExt;

fn app() -> Router {
    router(Arc::new(TicketService::new(Arc::new(MemoryStore::new()))))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        Value::String(String::from_utf8_lossy(&bytes).into_owned())
    });
    (status, value)
}

async fn create(app: &Router, title: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/tickets",
        Some(json!({ "title": title, "description": "B" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn welcome() {
    let (status, body) = send(&app(), Method::GET, "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Welcome");
}

#[tokio::test]
async fn empty_list_is_not_found() {
    let (status, body) = send(&app(), Method::GET, "/tickets", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn create_ignores_status_and_lists() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/tickets",
        Some(json!({ "title": "A", "description": "B", "status": "COMPLETED" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "successfully created");
    let id = body["id"].as_str().unwrap();

    let (status, body) = send(&app, Method::GET, &format!("/tickets/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["title"], "A");

    let (status, body) = send(&app, Method::GET, "/tickets", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn create_requires_title_and_description() {
    let (status, _) = send(
        &app(),
        Method::POST,
        "/tickets",
        Some(json!({ "title": "A" })),
    )
    .await;

    assert!(status.is_client_error());
}

#[tokio::test]
async fn unknown_ticket_is_not_found() {
    let app = app();

    for (method, uri, body) in [
        (Method::GET, "/tickets/ticket_nope", None),
        (Method::PUT, "/tickets/ticket_nope", Some(json!({ "title": "x" }))),
        (
            Method::PUT,
            "/tickets/status/ticket_nope",
            Some(json!({ "status": "IN_PROGRESS" })),
        ),
        (Method::DELETE, "/tickets/ticket_nope", None),
    ] {
        let (status, _) = send(&app, method, uri, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn status_lifecycle() {
    let app = app();
    let id = create(&app, "A").await;
    let uri = format!("/tickets/status/{id}");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "status": "IN_PROGRESS" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "successfully updated status");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "status": "PENDING" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "INVALID_TRANSITION");

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "status": "COMPLETED" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::DELETE, &format!("/tickets/{id}"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "TERMINAL_STATE");
}

#[tokio::test]
async fn falsy_status_is_missing() {
    let app = app();
    let id = create(&app, "A").await;
    let uri = format!("/tickets/status/{id}");

    for body in [json!({}), json!({ "status": "" }), json!({ "status": null })] {
        let (status, body) = send(&app, Method::PUT, &uri, Some(body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "MISSING_INPUT");
    }
}

#[tokio::test]
async fn non_string_status_is_an_invalid_transition() {
    let app = app();
    let id = create(&app, "A").await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/tickets/status/{id}"),
        Some(json!({ "status": 7 })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn update_drops_empty_fields() {
    let app = app();
    let id = create(&app, "A").await;
    let uri = format!("/tickets/{id}");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "title": "", "description": "new", "status": "COMPLETED" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "successfully updated data");

    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["title"], "A");
    assert_eq!(body["description"], "new");
    assert_eq!(body["status"], "PENDING");
}

#[tokio::test]
async fn update_with_wrong_shape_is_bad_request() {
    let app = app();
    let id = create(&app, "A").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/tickets/{id}"),
        Some(json!({ "priority": 1000 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn delete_open_ticket() {
    let app = app();
    let id = create(&app, "A").await;
    let uri = format!("/tickets/{id}");

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "successfully deleted");

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_status_requests_have_one_winner() {
    let app = app();
    let id = create(&app, "A").await;
    let uri = format!("/tickets/status/{id}");

    let requests = ["IN_PROGRESS", "CANCELLED", "IN_PROGRESS", "CANCELLED"].map(|next| {
        let (app, uri) = (app.clone(), uri.clone());
        tokio::spawn(async move {
            send(&app, Method::PUT, &uri, Some(json!({ "status": next }))).await.0
        })
    });

    let mut ok = 0;
    for request in requests {
        match request.await.unwrap() {
            StatusCode::OK => ok += 1,
            other => assert_eq!(other, StatusCode::FORBIDDEN),
        }
    }
    assert_eq!(ok, 1);

    let (_, body) = send(&app, Method::GET, &format!("/tickets/{id}"), None).await;
    assert_ne!(body["status"], "PENDING");
}

/// A store whose backend is gone
struct BrokenStore;

impl TicketStore for BrokenStore {
    fn list_all(&self) -> anyhow::Result<Vec<Ticket>> {
        Err(anyhow!("backend unavailable"))
    }
    fn find_by_id(&self, _: &str) -> anyhow::Result<Option<Ticket>> {
        Err(anyhow!("backend unavailable"))
    }
    fn insert(&self, _: &Ticket) -> anyhow::Result<()> {
        Err(anyhow!("backend unavailable"))
    }
    fn update_fields(&self, _: &str, _: &TicketPatch) -> anyhow::Result<()> {
        Err(anyhow!("backend unavailable"))
    }
    fn update_status(&self, _: &str, _: TicketStatus) -> anyhow::Result<()> {
        Err(anyhow!("backend unavailable"))
    }
    fn delete(&self, _: &str) -> anyhow::Result<()> {
        Err(anyhow!("backend unavailable"))
    }
}

#[tokio::test]
async fn store_failures_are_internal_errors() {
    let app = router(Arc::new(TicketService::new(Arc::new(BrokenStore))));

    let (status, body) = send(&app, Method::GET, "/tickets", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal Server Error");

    let (status, _) = send(
        &app,
        Method::POST,
        "/tickets",
        Some(json!({ "title": "A", "description": "B" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
