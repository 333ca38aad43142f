//! Payment events delivered by the payment provider's webhook
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl PaymentIntent {
    pub fn order_id(&self) -> Option<&str> {
        self.metadata.get("orderId").map(String::as_str).filter(|id| !id.is_empty())
    }
}

/// Raw webhook envelope
#[derive(Clone, Debug, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: EnvelopeData,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EnvelopeData {
    pub object: serde_json::Value,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PaymentEvent {
    Succeeded(PaymentIntent),
    Failed(PaymentIntent),
    RequiresAction(PaymentIntent),
    Other { kind: String },
}

impl PaymentEvent {
    pub fn from_envelope(envelope: WebhookEnvelope) -> Result<Self, serde_json::Error> {
        let intent = |object| serde_json::from_value::<PaymentIntent>(object);
        Ok(match envelope.kind.as_str() {
            "payment_intent.succeeded" => Self::Succeeded(intent(envelope.data.object)?),
            "payment_intent.payment_failed" => Self::Failed(intent(envelope.data.object)?),
            "payment_intent.requires_action" => Self::RequiresAction(intent(envelope.data.object)?),
            _ => Self::Other { kind: envelope.kind },
        })
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::Succeeded(_) => "payment_intent.succeeded",
            Self::Failed(_) => "payment_intent.payment_failed",
            Self::RequiresAction(_) => "payment_intent.requires_action",
            Self::Other { kind } => kind,
        }
    }
}

/// Storefront view of a provider payment status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Success,
    Pending,
    Cancelled,
}

impl PaymentState {
    pub fn from_provider(status: &str) -> (Self, &'static str) {
        match status {
            "succeeded" => (Self::Success, "Payment completed successfully"),
            "processing" => (Self::Pending, "Payment is being processed"),
            "requires_payment_method" | "requires_confirmation" | "requires_action" => {
                (Self::Pending, "Payment requires additional action")
            }
            "canceled" => (Self::Cancelled, "Payment was cancelled"),
            _ => (Self::Pending, "Payment status unknown"),
        }
    }
}
