use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use super::AppState;
use crate::error::{Result, StorefrontError};

pub async fn list(State(state): State<AppState>) -> Result<Json<Value>> {
    let products: Vec<_> = state.commerce.list_products().await?.iter().map(|p| p.to_storefront()).collect();
    Ok(Json(json!({ "success": true, "count": products.len(), "products": products })))
}

pub async fn by_handle(State(state): State<AppState>, Path(handle): Path<String>) -> Result<Json<Value>> {
    let product = state
        .commerce
        .find_product_by_handle(&handle)
        .await?
        .ok_or_else(|| StorefrontError::NotFound("Product".into()))?;
    Ok(Json(json!({ "success": true, "product": product.to_storefront() })))
}

/// ETA for a single product ordered now.
pub async fn delivery_estimate(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>> {
    let product = state
        .commerce
        .get_product(&id)
        .await?
        .ok_or_else(|| StorefrontError::NotFound("Product".into()))?;
    let estimate = state.delivery.calculate_delivery_eta(product.prep_time_hours(), product.cutoff());
    Ok(Json(json!({ "success": true, "product_id": product.id, "estimate": estimate })))
}
