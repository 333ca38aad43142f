use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use super::AppState;

pub async fn check(State(state): State<AppState>) -> Json<Value> {
    let (medusa, strapi) = tokio::join!(state.commerce.health(), state.content.health());
    Json(json!({ "status": "healthy", "service": "lekker-storefront", "medusa": medusa, "strapi": strapi }))
}
