use axum::extract::{Path, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use super::AppState;
use crate::domain::aggregates::OrderMetadata;
use crate::error::{Result, StorefrontError};

/// Admin routes write through the backend's admin credentials, so callers
/// must present `Authorization: Bearer <ADMIN_API_TOKEN>`.
pub async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Result<Response> {
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let authorized = match (state.config.admin_token.as_deref(), presented) {
        (Some(expected), Some(token)) => bool::from(token.as_bytes().ct_eq(expected.as_bytes())),
        _ => false,
    };
    if !authorized {
        warn!(path = %request.uri().path(), "admin request refused");
        return Err(StorefrontError::Unauthorized);
    }
    Ok(next.run(request).await)
}

#[derive(Debug, Default, Deserialize)]
pub struct TagRequest {
    pub tags: Option<Vec<String>>,
    pub delivery_time: Option<String>,
    pub eta_iso: Option<String>,
    pub eta_label: Option<String>,
}

/// Writes kitchen tags and a promised ETA onto an order.
pub async fn tag_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(request): Json<TagRequest>,
) -> Result<Json<Value>> {
    let metadata = OrderMetadata {
        tags: request.tags,
        delivery_time: request.delivery_time,
        eta_iso: request.eta_iso,
        eta_label: request.eta_label,
        ..Default::default()
    }
    .stamped(state.clock.now());

    let order = state.commerce.update_order_metadata(&order_id, &metadata).await?;
    info!(order_id = %order.id, "order tagged");
    Ok(Json(json!({
        "success": true,
        "order": { "id": order.id, "display_id": order.display_id, "metadata": order.metadata },
    })))
}
