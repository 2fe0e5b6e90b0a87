//! HTTP handlers for the trigger, callback and health routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Path, RawQuery, State},
    routing::{get, post},
};
use extrelay_engine::Relay;
use extrelay_types::{ExtensionDefinition, FunctionResponse, RelayError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::error::{ErrorResponse, HandlerResult};

pub const TRIGGER_ROUTE: &str = "/extension/transformation/trigger/{extension_id}";
pub const CALLBACK_ROUTE: &str = "/extension/transformation/callback/{token}";
pub const HEALTH_ROUTE: &str = "/public/hc";

/// State shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self { relay: Arc::new(relay) }
    }
}

/// The `{"message": "OK"}` acknowledgement.
#[derive(Debug, Serialize)]
pub struct Acknowledgement {
    message: &'static str,
}

impl Acknowledgement {
    pub fn ok() -> Json<Self> {
        Json(Self { message: "OK" })
    }
}

/// POST /extension/transformation/trigger/{extension_id}
///
/// Success means "accepted and forwarded"; results arrive later on the callback route.
pub async fn trigger(
    State(state): State<AppState>,
    Path(extension_id): Path<String>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> HandlerResult<Json<Acknowledgement>> {
    let extension: ExtensionDefinition = decode_body(&body)?;
    if extension.extension_id != extension_id {
        debug!(path = %extension_id, body = %extension.extension_id, "extension id in path differs from body");
    }
    state.relay.trigger(&extension, query.as_deref()).await?;
    Ok(Acknowledgement::ok())
}

/// POST /extension/transformation/callback/{token}
pub async fn callback(State(state): State<AppState>, Path(token): Path<String>, body: Bytes) -> HandlerResult<Json<Acknowledgement>> {
    let response: FunctionResponse = decode_body(&body)?;
    if !response.token.is_empty() && response.token != token {
        debug!(path = %token, body = %response.token, "callback token in path differs from body");
    }
    state.relay.callback(&token, &response).await?;
    Ok(Acknowledgement::ok())
}

/// GET /public/hc - liveness only; never touches a collaborator.
pub async fn health_check() -> Json<Acknowledgement> {
    Acknowledgement::ok()
}

fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ErrorResponse> {
    serde_json::from_slice(body).map_err(|error| {
        warn!(%error, "rejecting malformed request body");
        ErrorResponse(RelayError::malformed_request_body(error.to_string()))
    })
}

/// Create router with all relay endpoints.
///
/// Request bodies are unbounded: callbacks carry whole computed series.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(TRIGGER_ROUTE, post(trigger))
        .route(CALLBACK_ROUTE, post(callback))
        .route(HEALTH_ROUTE, get(health_check))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
