//! Payment provider (Stripe): iDEAL payment intents and webhook signatures.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::instrument;

use super::ensure_success;
use crate::config::StripeConfig;
use crate::domain::events::PaymentIntent;
use crate::error::{Result, StorefrontError};

const SERVICE: &str = "Stripe";
const PAYMENT_SOURCE: &str = "lekker-purmerend";
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Clone, Debug, PartialEq)]
pub struct CreatePaymentIntent {
    /// In cents.
    pub amount: i64,
    pub currency: String,
    pub order_id: String,
    pub customer_email: Option<String>,
    pub return_url: String,
    pub metadata: Vec<(String, String)>,
}

impl CreatePaymentIntent {
    fn form(&self) -> Vec<(String, String)> {
        let mut form = vec![
            ("amount".to_string(), self.amount.to_string()),
            ("currency".to_string(), self.currency.to_lowercase()),
            ("payment_method_types[]".to_string(), "ideal".to_string()),
            ("confirmation_method".to_string(), "automatic".to_string()),
            ("metadata[orderId]".to_string(), self.order_id.clone()),
            ("metadata[source]".to_string(), PAYMENT_SOURCE.to_string()),
            ("metadata[returnUrl]".to_string(), self.return_url.clone()),
        ];
        form.extend(self.metadata.iter().map(|(k, v)| (format!("metadata[{k}]"), v.clone())));
        if let Some(email) = &self.customer_email {
            form.push(("receipt_email".to_string(), email.clone()));
        }
        form
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_ideal_payment_intent(&self, params: &CreatePaymentIntent) -> Result<PaymentIntent>;
    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent>;
}

pub struct StripeClient {
    http: Client,
    api_url: String,
    secret_key: String,
}

impl StripeClient {
    /// `None` when no secret key is configured; iDEAL is then unavailable.
    pub fn from_config(http: Client, config: &StripeConfig) -> Option<Self> {
        let secret_key = config.secret_key.clone()?;
        Some(Self { http, api_url: config.api_url.clone(), secret_key })
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    #[instrument(skip(self, params), fields(order_id = %params.order_id, amount = params.amount))]
    async fn create_ideal_payment_intent(&self, params: &CreatePaymentIntent) -> Result<PaymentIntent> {
        let response = self.http
            .post(format!("{}/v1/payment_intents", self.api_url))
            .bearer_auth(&self.secret_key)
            .header("Idempotency-Key", format!("ideal-{}", params.order_id))
            .form(&params.form())
            .send()
            .await?;
        Ok(ensure_success(SERVICE, response).await?.json().await?)
    }

    #[instrument(skip(self))]
    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent> {
        let response = self.http
            .get(format!("{}/v1/payment_intents/{id}", self.api_url))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StorefrontError::NotFound(format!("Payment intent {id}")));
        }
        Ok(ensure_success(SERVICE, response).await?.json().await?)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature header has no timestamp")]
    MissingTimestamp,
    #[error("signature header has no v1 signature")]
    MissingSignature,
    #[error("signature timestamp outside tolerance")]
    Expired,
    #[error("no signature matches the payload")]
    Mismatch,
}

/// Checks a `Stripe-Signature` header (`t=<unix>,v1=<hex>,...`) against the raw body.
pub fn verify_webhook_signature(payload: &[u8], header: &str, secret: &str, now_unix: i64) -> std::result::Result<(), SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signatures.extend(hex::decode(value).ok()),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;
    if signatures.is_empty() {
        return Err(SignatureError::MissingSignature);
    }
    if (now_unix - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(SignatureError::Expired);
    }

    let expected = signature_for(payload, timestamp, secret).ok_or(SignatureError::Mismatch)?;
    if signatures.iter().any(|candidate| bool::from(candidate.as_slice().ct_eq(expected.as_slice()))) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

fn signature_for(payload: &[u8], timestamp: i64, secret: &str) -> Option<Vec<u8>> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    Some(mac.finalize().into_bytes().to_vec())
}

/// Builds a valid signature header, for tests that post signed webhooks.
#[cfg(test)]
pub(crate) fn sign_for_tests(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let signature = signature_for(payload, timestamp, secret).map(hex::encode).unwrap_or_default();
    format!("t={timestamp},v1={signature}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const NOW: i64 = 1_700_000_000;

    #[test]
    fn accepts_valid_signature() {
        let body = br#"{"type":"payment_intent.succeeded"}"#;
        let header = sign_for_tests(body, SECRET, NOW);
        assert_eq!(verify_webhook_signature(body, &header, SECRET, NOW + 10), Ok(()));
        let with_extra = format!("{header},v0=deadbeef,v1=00ff");
        assert_eq!(verify_webhook_signature(body, &with_extra, SECRET, NOW), Ok(()));
    }

    #[test]
    fn rejects_tampered_or_stale_payloads() {
        let body = b"{}";
        let header = sign_for_tests(body, SECRET, NOW);
        assert_eq!(verify_webhook_signature(b"{ }", &header, SECRET, NOW), Err(SignatureError::Mismatch));
        assert_eq!(verify_webhook_signature(body, &header, "other", NOW), Err(SignatureError::Mismatch));
        assert_eq!(verify_webhook_signature(body, &header, SECRET, NOW + 301), Err(SignatureError::Expired));
        assert_eq!(verify_webhook_signature(body, "v1=abcd", SECRET, NOW), Err(SignatureError::MissingTimestamp));
        assert_eq!(verify_webhook_signature(body, &format!("t={NOW}"), SECRET, NOW), Err(SignatureError::MissingSignature));
    }

    #[test]
    fn payment_intent_form_carries_order_metadata() {
        let params = CreatePaymentIntent {
            amount: 2850,
            currency: "EUR".into(),
            order_id: "order_1".into(),
            customer_email: Some("anna@example.com".into()),
            return_url: "https://lekker.test/bestelling-geplaatst".into(),
            metadata: vec![("cartId".into(), "cart_1".into())],
        };
        let form = params.form();
        assert!(form.contains(&("currency".into(), "eur".into())));
        assert!(form.contains(&("metadata[orderId]".into(), "order_1".into())));
        assert!(form.contains(&("metadata[cartId]".into(), "cart_1".into())));
        assert!(form.contains(&("receipt_email".into(), "anna@example.com".into())));
    }
}
