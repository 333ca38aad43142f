//! Clients for the hosted platforms the storefront composes.
//!
//! Each platform sits behind a trait so the HTTP layer and checkout flow can be
//! exercised against in-memory fakes.

pub mod medusa;
pub mod strapi;
pub mod stripe;

pub use medusa::{BackendCart, BackendShippingOption, CartUpdate, CommerceBackend, MedusaClient};
pub use strapi::{BlogPost, BlogQuery, ContentBackend, StrapiClient, StrapiPost};
pub use stripe::{verify_webhook_signature, CreatePaymentIntent, PaymentGateway, SignatureError, StripeClient};

use crate::error::{Result, StorefrontError};

/// Turns a non-success response into an upstream error carrying the body for logs.
pub(crate) async fn ensure_success(service: &'static str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(service, status = status.as_u16(), %body, "upstream request failed");
    Err(StorefrontError::Upstream { service, status: status.as_u16(), body })
}
