use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, info, warn};

use super::AppState;
use crate::domain::events::{PaymentEvent, PaymentIntent, WebhookEnvelope};
use crate::error::StorefrontError;
use crate::integrations::verify_webhook_signature;
use crate::notifications::send_order_emails;

const SIGNATURE_HEADER: &str = "stripe-signature";

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "error": message }))).into_response()
}

/// Payment provider webhook. Once the signature checks out the event is always
/// acknowledged; processing failures only show up in the logs.
pub async fn stripe(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        return reject(StatusCode::BAD_REQUEST, "Missing signature");
    };
    let Some(secret) = state.config.stripe.webhook_secret.as_deref() else {
        error!("webhook secret not configured");
        return reject(StatusCode::INTERNAL_SERVER_ERROR, "Webhook secret not configured");
    };
    if let Err(err) = verify_webhook_signature(&body, signature, secret, state.clock.now().timestamp()) {
        warn!(error = %err, "webhook signature rejected");
        return StorefrontError::InvalidSignature.into_response();
    }

    let event = match serde_json::from_slice::<WebhookEnvelope>(&body).and_then(PaymentEvent::from_envelope) {
        Ok(event) => event,
        Err(err) => return StorefrontError::Payload(err).into_response(),
    };
    info!(kind = event.kind(), "webhook received");
    handle_event(&state, event).await;

    Json(json!({ "received": true })).into_response()
}

async fn handle_event(state: &AppState, event: PaymentEvent) {
    match event {
        PaymentEvent::Succeeded(intent) => payment_succeeded(state, &intent).await,
        PaymentEvent::Failed(intent) => {
            warn!(order_id = intent.order_id(), payment_intent = %intent.id, "payment failed");
        }
        PaymentEvent::RequiresAction(intent) => {
            info!(order_id = intent.order_id(), payment_intent = %intent.id, "payment requires action");
        }
        PaymentEvent::Other { kind } => info!(%kind, "unhandled webhook event"),
    }
}

async fn payment_succeeded(state: &AppState, intent: &PaymentIntent) {
    let Some(order_id) = intent.order_id() else {
        warn!(payment_intent = %intent.id, "succeeded payment without order id");
        return;
    };

    let order = match state.commerce.get_order(order_id).await {
        Ok(Some(order)) => order,
        Ok(None) => {
            warn!(order_id, "order for payment not found");
            return;
        }
        Err(err) => {
            error!(order_id, error = %err, "order lookup failed");
            return;
        }
    };

    match state.commerce.capture_payment(order_id).await {
        Ok(()) => info!(order_id, payment_intent = %intent.id, amount = intent.amount, "payment captured"),
        Err(err) => error!(order_id, error = %err, "payment capture failed"),
    }
    if let Err(err) = send_order_emails(state.mailer.as_ref(), &state.shop, &order).await {
        error!(order_id, error = %err, "failed to send order emails");
    }
}
