//! Lekker Storefront
//!
//! Storefront service for a home bakery in Purmerend, composed over hosted
//! platforms: Medusa for catalog, carts and orders, Strapi for the blog and
//! Stripe for iDEAL payments.
//!
//! ## Features
//! - Product catalog with same-day cutoff and delivery estimates
//! - Locality gate: delivery and cash payment only inside Purmerend
//! - Checkout orchestration (cash on delivery, iDEAL)
//! - Signed payment webhooks with capture and order e-mails
//! - Order tagging for the kitchen

pub mod api;
pub mod checkout;
pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod integrations;
pub mod notifications;

#[cfg(test)]
mod testing;

pub use api::{router, AppState};
pub use config::Config;
pub use error::{Result, StorefrontError};
