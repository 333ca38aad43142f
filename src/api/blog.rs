use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::Value;

use super::AppState;
use crate::error::{Result, StorefrontError};
use crate::integrations::{BlogPost, BlogQuery};

/// Listing is passed through as the content backend returns it.
pub async fn list(State(state): State<AppState>, Query(query): Query<BlogQuery>) -> Result<Json<Value>> {
    Ok(Json(state.content.list_posts(&query).await?))
}

pub async fn by_slug(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<BlogPost>> {
    let post = state
        .content
        .find_post(&slug)
        .await?
        .ok_or_else(|| StorefrontError::NotFound("Post".into()))?;
    Ok(Json(post.to_blog_post(state.content.media_url())))
}
