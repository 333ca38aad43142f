//! HTTP surface of the storefront.
//!
//! `router` returns the full application; every route reads its collaborators
//! from `AppState`, so tests mount the same router over in-memory platforms.

mod admin;
mod blog;
mod catalog;
mod checkout;
mod delivery;
mod health;
mod payments;
mod webhooks;

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::checkout::CheckoutService;
use crate::clock::Clock;
use crate::config::Config;
use crate::domain::services::DeliveryEstimationService;
use crate::integrations::{CommerceBackend, ContentBackend, PaymentGateway};
use crate::notifications::{Mailer, ShopDetails};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub commerce: Arc<dyn CommerceBackend>,
    pub content: Arc<dyn ContentBackend>,
    pub payments: Option<Arc<dyn PaymentGateway>>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
    pub delivery: DeliveryEstimationService,
    pub shop: ShopDetails,
    pub checkout: Arc<CheckoutService>,
}

impl AppState {
    pub fn new(
        config: Config,
        commerce: Arc<dyn CommerceBackend>,
        content: Arc<dyn ContentBackend>,
        payments: Option<Arc<dyn PaymentGateway>>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let delivery = DeliveryEstimationService::new(clock.clone());
        let shop = ShopDetails::from_config(&config);
        let checkout = CheckoutService::new(
            commerce.clone(),
            payments.clone(),
            mailer.clone(),
            delivery.clone(),
            shop.clone(),
            config.medusa.region_id.clone(),
        );
        Self {
            config: Arc::new(config),
            commerce,
            content,
            payments,
            mailer,
            clock,
            delivery,
            shop,
            checkout: Arc::new(checkout),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/api/admin/orders/:id/tags", post(admin::tag_order))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin::require_token));

    // Path params use `:param` syntax (axum 0.7); sibling routes share the param name.
    Router::new()
        .route("/health", get(health::check))
        .route("/api/products", get(catalog::list))
        .route("/api/products/:id", get(catalog::by_handle))
        .route("/api/products/:id/delivery-estimate", get(catalog::delivery_estimate))
        .route("/api/delivery/options", get(delivery::options))
        .route("/api/blog", get(blog::list))
        .route("/api/blog/:slug", get(blog::by_slug))
        .route("/api/checkout", post(checkout::place_order))
        .route("/api/checkout/:id/payment", post(checkout::retry_payment))
        .route("/api/payment-status", get(payments::status))
        .route("/api/webhooks/stripe", post(webhooks::stripe))
        .merge(admin)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    id = %Uuid::now_v7(),
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
