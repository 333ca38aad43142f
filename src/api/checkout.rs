use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::AppState;
use crate::checkout::{CheckoutOutcome, CheckoutRequest};
use crate::error::{Result, StorefrontError};

pub async fn place_order(
    State(state): State<AppState>,
    request: std::result::Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CheckoutOutcome>)> {
    let Json(request) = request.map_err(|rejection| StorefrontError::BadRequest(rejection.body_text()))?;
    let outcome = state.checkout.place_order(request).await?;
    Ok((status_for(&outcome), Json(outcome)))
}

/// Starts a new iDEAL payment for an order whose checkout could not start one.
pub async fn retry_payment(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<(StatusCode, Json<CheckoutOutcome>)> {
    let outcome = state.checkout.retry_payment(&order_id).await?;
    Ok((status_for(&outcome), Json(outcome)))
}

fn status_for(outcome: &CheckoutOutcome) -> StatusCode {
    match outcome {
        CheckoutOutcome::Placed { .. } => StatusCode::OK,
        CheckoutOutcome::Pending { .. } => StatusCode::ACCEPTED,
        CheckoutOutcome::PaymentRetry { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}
