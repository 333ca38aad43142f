use axum::extract::Query;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::aggregates::Address;
use crate::domain::services::{
    available_payment_methods, detect_purmerend, shipping_options, storefront_payment_methods, DeliveryMethod,
};

#[derive(Debug, Default, Deserialize)]
pub struct OptionsQuery {
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub delivery_method: Option<DeliveryMethod>,
    /// Comma separated payment method ids the page wants to offer.
    pub allowed: Option<String>,
}

/// Delivery and payment choices for the address entered so far.
pub async fn options(Query(query): Query<OptionsQuery>) -> Json<Value> {
    let detection = detect_purmerend(query.city.as_deref(), query.postal_code.as_deref());
    let method = query.delivery_method.unwrap_or(DeliveryMethod::Pickup);
    let address = Address { city: query.city, postal_code: query.postal_code, ..Default::default() };
    let allowed: Option<Vec<String>> = query
        .allowed
        .map(|ids| ids.split(',').map(str::trim).filter(|id| !id.is_empty()).map(String::from).collect());

    Json(json!({
        "detection": detection,
        "shippingOptions": shipping_options(&address),
        "paymentMethods": storefront_payment_methods(detection.is_purmerend, method, allowed.as_deref()),
        "providerMethods": available_payment_methods(detection.is_purmerend, method.is_delivery()),
    }))
}
