//! HTTP surface of the webhook
//!
//! Routes (all JSON, served with the external-dns webhook media type):
//!
//! | Route                   | Handler                      |
//! |-------------------------|------------------------------|
//! | `GET /healthz`          | liveness                     |
//! | `GET /health`           | liveness (legacy path)       |
//! | `GET /`                 | domain filter negotiation    |
//! | `GET /records`          | list endpoints               |
//! | `POST /records`         | apply a change batch         |
//! | `POST /adjustendpoints` | identity adjustment          |
//!
//! Every error becomes `{"error": "<message>"}`: 400 for problems with the
//! request, 500 for everything else. No handler panics.

use crate::error::Error;
use crate::record::Changes;
use crate::service::WebhookService;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::Serialize;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

/// Media type external-dns negotiates for webhook providers
pub const WEBHOOK_MEDIA_TYPE: &str = "application/external.dns.webhook+json;version=1";

type SharedService = Arc<WebhookService>;

/// Build the webhook router
pub fn router(service: SharedService) -> Router {
    Router::new()
        .route("/", get(negotiate))
        .route("/healthz", get(health))
        .route("/health", get(health))
        .route("/records", get(list_records).post(apply_changes))
        .route("/adjustendpoints", post(adjust_endpoints))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Serve the webhook until `shutdown` resolves
pub async fn serve<F>(
    listener: TcpListener,
    service: SharedService,
    shutdown: F,
) -> Result<(), Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// JSON body with the webhook media type
struct WebhookJson<T>(StatusCode, T);

impl<T: Serialize> IntoResponse for WebhookJson<T> {
    fn into_response(self) -> Response {
        let mut response = (self.0, axum::Json(self.1)).into_response();
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(WEBHOOK_MEDIA_TYPE));
        response
    }
}

/// Error rendered as `{"error": ...}`
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        WebhookJson(status, json!({ "error": self.0.to_string() })).into_response()
    }
}

async fn health() -> impl IntoResponse {
    WebhookJson(StatusCode::OK, json!({ "status": "ok" }))
}

async fn negotiate(State(service): State<SharedService>) -> impl IntoResponse {
    let filters: Vec<String> = service
        .domain_filter()
        .map(|filter| vec![filter.to_string()])
        .unwrap_or_default();

    WebhookJson(
        StatusCode::OK,
        json!({ "domainFilter": filters, "include": filters }),
    )
}

async fn list_records(State(service): State<SharedService>) -> Result<Response, ApiError> {
    let endpoints = service.records().await.map_err(|e| {
        error!("Error listing records: {}", e);
        // Listing has no client input; every failure is ours.
        ApiError(Error::Other(e.to_string()))
    })?;
    Ok(WebhookJson(StatusCode::OK, endpoints).into_response())
}

async fn apply_changes(
    State(service): State<SharedService>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let changes: Changes = serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejecting malformed change batch: {}", e);
        Error::from(e)
    })?;

    service.apply_changes(&changes).await.map_err(|e| {
        error!("Error applying changes: {}", e);
        e
    })?;

    Ok(WebhookJson(StatusCode::OK, json!({ "status": "ok" })).into_response())
}

async fn adjust_endpoints(
    State(service): State<SharedService>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let endpoints: Vec<serde_json::Value> = serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejecting malformed adjust request: {}", e);
        Error::from(e)
    })?;
    Ok(WebhookJson(StatusCode::OK, service.adjust_endpoints(endpoints)).into_response())
}
