use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::AppState;
use crate::domain::events::PaymentState;
use crate::error::{Result, StorefrontError};

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub payment_intent: Option<String>,
    pub order_id: Option<String>,
}

/// Status page lookup after the customer returns from the bank.
pub async fn status(State(state): State<AppState>, Query(query): Query<StatusQuery>) -> Result<Json<Value>> {
    let (Some(intent_id), Some(order_id)) = (
        query.payment_intent.filter(|v| !v.is_empty()),
        query.order_id.filter(|v| !v.is_empty()),
    ) else {
        return Err(StorefrontError::BadRequest("Missing payment_intent or order_id".into()));
    };
    let gateway = state.payments.as_ref().ok_or(StorefrontError::NotConfigured("Payment provider"))?;

    let intent = gateway.retrieve_payment_intent(&intent_id).await?;
    let (status, message) = PaymentState::from_provider(&intent.status);
    tracing::info!(order_id = %order_id, payment_intent = %intent.id, provider_status = %intent.status, "payment status checked");

    Ok(Json(json!({
        "success": true,
        "status": status,
        "message": message,
        "orderId": order_id,
        "paymentIntentId": intent.id,
        "stripeStatus": intent.status,
        "amount": intent.amount,
        "currency": intent.currency,
    })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::api::test_support::{json_body, TestApp};
    use crate::testing::{FakeCommerce, FakePayments};

    fn app() -> TestApp {
        let mut app = TestApp::new(FakeCommerce::default());
        app.payments = std::sync::Arc::new(
            FakePayments::default()
                .with_intent("pi_paid", "succeeded", "order_1")
                .with_intent("pi_open", "requires_action", "order_2")
                .with_intent("pi_gone", "canceled", "order_3"),
        );
        app
    }

    #[tokio::test]
    async fn maps_provider_status() {
        let app = app();
        let body = json_body(app.get("/api/payment-status?payment_intent=pi_paid&order_id=order_1").await).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Payment completed successfully");
        assert_eq!(body["stripeStatus"], "succeeded");
        assert_eq!(body["amount"], 2850);
        assert_eq!(body["orderId"], "order_1");

        let body = json_body(app.get("/api/payment-status?payment_intent=pi_open&order_id=order_2").await).await;
        assert_eq!(body["status"], "pending");

        let body = json_body(app.get("/api/payment-status?payment_intent=pi_gone&order_id=order_3").await).await;
        assert_eq!(body["status"], "cancelled");
    }

    #[tokio::test]
    async fn missing_parameters_are_400() {
        let app = app();
        assert_eq!(app.get("/api/payment-status?order_id=order_1").await.status(), StatusCode::BAD_REQUEST);
        assert_eq!(app.get("/api/payment-status?payment_intent=pi_paid").await.status(), StatusCode::BAD_REQUEST);
        assert_eq!(app.get("/api/payment-status?payment_intent=pi_x&order_id=o").await.status(), StatusCode::NOT_FOUND);
    }
}
