//! Lekker Storefront - storefront API for Lekker Purmerend

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lekker_storefront::clock::SystemClock;
use lekker_storefront::integrations::{MedusaClient, PaymentGateway, StrapiClient, StripeClient};
use lekker_storefront::notifications::LogMailer;
use lekker_storefront::{router, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let http = reqwest::Client::builder().timeout(config.http_timeout).build()?;

    let commerce = Arc::new(MedusaClient::new(http.clone(), config.medusa.clone()));
    let content = Arc::new(StrapiClient::new(http.clone(), config.strapi.clone()));
    let payments = StripeClient::from_config(http, &config.stripe).map(|c| Arc::new(c) as Arc<dyn PaymentGateway>);
    if payments.is_none() {
        tracing::warn!("STRIPE_SECRET_KEY not set, iDEAL checkout disabled");
    }
    if config.stripe.webhook_secret.is_none() {
        tracing::warn!("STRIPE_WEBHOOK_SECRET not set, payment webhooks will be refused");
    }
    if config.admin_token.is_none() {
        tracing::warn!("ADMIN_API_TOKEN not set, admin routes will be refused");
    }

    let port = config.port;
    let state = AppState::new(config, commerce, content, payments, Arc::new(LogMailer), Arc::new(SystemClock));
    let app = router(state);

    tracing::info!("🍰 Lekker Storefront listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}
