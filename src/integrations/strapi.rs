//! Content backend (Strapi) for blog posts.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use super::ensure_success;
use crate::config::StrapiConfig;
use crate::error::Result;

const SERVICE: &str = "Strapi";
const POPULATE: &str = "coverImage,seo,seo.ogImage";
const COVER_PLACEHOLDER: &str = "📝";
const DEFAULT_READING_TIME: u32 = 5;

/// Listing filters accepted by the blog endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BlogQuery {
    pub limit: Option<u32>,
    pub start: Option<u32>,
    pub featured: Option<bool>,
    pub category: Option<String>,
}

impl BlogQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(limit) = self.limit { params.push(("pagination[limit]", limit.to_string())); }
        if let Some(start) = self.start { params.push(("pagination[start]", start.to_string())); }
        if let Some(featured) = self.featured { params.push(("filters[featured][$eq]", featured.to_string())); }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            params.push(("filters[category][$eq]", category.to_string()));
        }
        params.push(("sort", "createdAt:desc".to_string()));
        params.push(("populate", POPULATE.to_string()));
        params
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StrapiPost {
    pub id: u64,
    pub attributes: PostAttributes,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAttributes {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub reading_time: Option<u32>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub cover_image: Option<Value>,
}

/// Post in the shape the blog pages render.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub published_at: Option<String>,
    pub reading_time: u32,
    pub category: Option<String>,
    pub featured: bool,
    pub cover_image: String,
    pub content: String,
}

impl StrapiPost {
    pub fn to_blog_post(&self, media_url: &str) -> BlogPost {
        let a = &self.attributes;
        BlogPost {
            id: self.id,
            title: a.title.clone(),
            slug: a.slug.clone(),
            excerpt: a.excerpt.clone().unwrap_or_default(),
            published_at: a.published_at.clone(),
            reading_time: a.reading_time.unwrap_or(DEFAULT_READING_TIME),
            category: a.category.clone(),
            featured: a.featured.unwrap_or(false),
            cover_image: a.cover_image.as_ref()
                .and_then(|media| image_url(media, media_url))
                .unwrap_or_else(|| COVER_PLACEHOLDER.to_string()),
            content: a.content.clone(),
        }
    }
}

/// Absolute URL of a media relation; uploads are served relative to the content host.
pub fn image_url(media: &Value, media_url: &str) -> Option<String> {
    let url = media.pointer("/data/attributes/url")?.as_str()?;
    if url.starts_with("http") {
        Some(url.to_string())
    } else {
        Some(format!("{media_url}{url}"))
    }
}

#[async_trait]
pub trait ContentBackend: Send + Sync {
    /// Raw listing payload, passed through to the storefront unchanged.
    async fn list_posts(&self, query: &BlogQuery) -> Result<Value>;
    async fn find_post(&self, slug: &str) -> Result<Option<StrapiPost>>;
    fn media_url(&self) -> &str;
    async fn health(&self) -> bool;
}

pub struct StrapiClient {
    http: Client,
    config: StrapiConfig,
}

impl StrapiClient {
    pub fn new(http: Client, config: StrapiConfig) -> Self { Self { http, config } }
}

#[derive(Deserialize)] struct PostsEnvelope { #[serde(default)] data: Vec<StrapiPost> }

#[async_trait]
impl ContentBackend for StrapiClient {
    #[instrument(skip(self))]
    async fn list_posts(&self, query: &BlogQuery) -> Result<Value> {
        let response = self.http.get(format!("{}/posts", self.config.api_url)).query(&query.to_params()).send().await?;
        Ok(ensure_success(SERVICE, response).await?.json().await?)
    }

    #[instrument(skip(self))]
    async fn find_post(&self, slug: &str) -> Result<Option<StrapiPost>> {
        let response = self.http
            .get(format!("{}/posts", self.config.api_url))
            .query(&[("filters[slug][$eq]", slug), ("populate", POPULATE)])
            .send()
            .await?;
        let envelope: PostsEnvelope = ensure_success(SERVICE, response).await?.json().await?;
        Ok(envelope.data.into_iter().next())
    }

    fn media_url(&self) -> &str { &self.config.media_url }

    async fn health(&self) -> bool {
        let request = self.http.get(format!("{}/posts", self.config.api_url)).query(&[("pagination[limit]", "1")]);
        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
