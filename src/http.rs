//! HTTP adapter for the ticket service.
//!
//! - `GET    /`                   - welcome message
//! - `GET    /tickets`            - list every ticket
//! - `GET    /tickets/:id`        - fetch one ticket
//! - `POST   /tickets`            - create a ticket
//! - `PUT    /tickets/status/:id` - move a ticket along the status graph
//! - `PUT    /tickets/:id`        - update descriptive fields
//! - `DELETE /tickets/:id`        - delete a ticket that is not finished
//!
//! Update bodies go through the falsy-field filter before the service sees
//! them. Service errors are mapped onto status codes by [`ApiError`].
use super::error::TicketError;
use super::patch::{TicketPatch, pick_truthy};
use super::service::TicketService;
use super::ticket::{NewTicket, Ticket};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

pub fn router(service: Arc<TicketService>) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/tickets", get(list_tickets).post(create_ticket))
        .route("/tickets/status/:id", put(update_ticket_status))
        .route(
            "/tickets/:id",
            get(get_ticket).put(update_ticket).delete(remove_ticket),
        )
        .with_state(service)
}

/// Resolves once `signal` fires. If the signal handler could not be
/// installed the error is logged and this never resolves, so the server
/// keeps serving instead of stopping straight away.
pub async fn shutdown_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

/// Acknowledgement body for successful writes.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub msg: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Ack {
    fn new(msg: &'static str) -> Json<Self> {
        Json(Self { msg, id: None })
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    source: Option<anyhow::Error>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST",
            message: message.into(),
            source: None,
        }
    }

    pub fn internal(source: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_SERVER_ERROR",
            message: "Internal Server Error".into(),
            source: Some(source),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<TicketError> for ApiError {
    fn from(err: TicketError) -> Self {
        let (status, code) = match &err {
            TicketError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            // a missing status is reported as 404, like a missing ticket
            TicketError::MissingInput(_) => (StatusCode::NOT_FOUND, "MISSING_INPUT"),
            TicketError::InvalidTransition { .. } => {
                (StatusCode::FORBIDDEN, "INVALID_TRANSITION")
            }
            TicketError::TerminalStateViolation(_) => (StatusCode::FORBIDDEN, "TERMINAL_STATE"),
            TicketError::Unexpected(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR")
            }
        };

        match err {
            TicketError::Unexpected(source) => Self::internal(source),
            other => Self {
                status,
                code,
                message: other.to_string(),
                source: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    error = ?source,
                    "request failed"
                ),
                None => tracing::error!(status = %self.status, code = self.code, "request failed"),
            }
        }

        let body = ErrorBody {
            code: self.code,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

async fn welcome() -> &'static str {
    "Welcome"
}

/// Run a service call on the blocking pool. Store I/O and the write gate
/// must not stall the async workers.
async fn run_blocking<T, F>(service: Arc<TicketService>, call: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&TicketService) -> Result<T, TicketError> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || call(&service))
        .await
        .map_err(|e| ApiError::internal(anyhow::anyhow!("ticket task failed: {e}")))?;
    Ok(result?)
}

async fn list_tickets(
    State(service): State<Arc<TicketService>>,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    let tickets = run_blocking(service, |service| service.list_all()).await?;
    Ok(Json(tickets))
}

async fn get_ticket(
    State(service): State<Arc<TicketService>>,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    let ticket = run_blocking(service, move |service| service.get_by_id(&id)).await?;
    Ok(Json(ticket))
}

async fn create_ticket(
    State(service): State<Arc<TicketService>>,
    Json(fields): Json<NewTicket>,
) -> Result<Json<Ack>, ApiError> {
    let ticket = run_blocking(service, move |service| service.create(fields)).await?;
    Ok(Json(Ack {
        msg: "successfully created",
        id: Some(ticket.id),
    }))
}

async fn update_ticket_status(
    State(service): State<Arc<TicketService>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Ack>, ApiError> {
    let body = pick_truthy(body);
    let requested = body.get("status").map(|status| match status {
        Value::String(s) => s.clone(),
        // present but not a name, so the guard rejects it
        other => other.to_string(),
    });

    run_blocking(service, move |service| {
        service.transition_status(&id, requested.as_deref())
    })
    .await?;
    Ok(Ack::new("successfully updated status"))
}

async fn update_ticket(
    State(service): State<Arc<TicketService>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Ack>, ApiError> {
    let patch = TicketPatch::from_json(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid ticket update: {e}")))?;

    run_blocking(service, move |service| service.update_fields(&id, patch)).await?;
    Ok(Ack::new("successfully updated data"))
}

async fn remove_ticket(
    State(service): State<Arc<TicketService>>,
    Path(id): Path<String>,
) -> Result<Json<Ack>, ApiError> {
    run_blocking(service, move |service| service.delete(&id)).await?;
    Ok(Ack::new("successfully deleted"))
}
