//! Commerce backend (Medusa store and admin API).

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;

use super::ensure_success;
use crate::config::MedusaConfig;
use crate::domain::aggregates::{Address, MedusaProduct, Order, OrderError, OrderMetadata};
use crate::error::{Result, StorefrontError};

const SERVICE: &str = "Medusa";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BackendCart {
    pub id: String,
    #[serde(default)]
    pub region_id: Option<String>,
    #[serde(default)]
    pub total: Option<i64>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BackendShippingOption {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub amount: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CartUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<Address>,
}

#[async_trait]
pub trait CommerceBackend: Send + Sync {
    async fn list_products(&self) -> Result<Vec<MedusaProduct>>;
    async fn get_product(&self, id: &str) -> Result<Option<MedusaProduct>>;
    async fn find_product_by_handle(&self, handle: &str) -> Result<Option<MedusaProduct>>;
    async fn create_cart(&self) -> Result<BackendCart>;
    async fn add_line_item(&self, cart_id: &str, variant_id: &str, quantity: u32) -> Result<()>;
    async fn update_cart(&self, cart_id: &str, update: &CartUpdate) -> Result<()>;
    async fn shipping_options(&self, region_id: &str) -> Result<Vec<BackendShippingOption>>;
    async fn add_shipping_method(&self, cart_id: &str, option_id: &str) -> Result<()>;
    async fn init_payment_sessions(&self, cart_id: &str) -> Result<()>;
    async fn select_payment_session(&self, cart_id: &str, provider_id: &str) -> Result<()>;
    async fn complete_cart(&self, cart_id: &str) -> Result<Order>;
    async fn get_order(&self, order_id: &str) -> Result<Option<Order>>;
    async fn capture_payment(&self, order_id: &str) -> Result<()>;
    async fn update_order_metadata(&self, order_id: &str, metadata: &OrderMetadata) -> Result<Order>;
    async fn health(&self) -> bool;
}

pub struct MedusaClient {
    http: Client,
    config: MedusaConfig,
}

impl MedusaClient {
    pub fn new(http: Client, config: MedusaConfig) -> Self { Self { http, config } }

    fn url(&self, path: &str) -> String { format!("{}{path}", self.config.base_url) }

    fn admin(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.admin_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Ok(ensure_success(SERVICE, response).await?.json().await?)
    }
}

/// Completion returns either the order or, when it could not complete, the cart again.
fn completed_order(body: Value) -> Result<Order> {
    if body.get("type").and_then(Value::as_str).is_some_and(|t| t != "order") {
        return Err(OrderError::NotCompleted.into());
    }
    let order = body.get("order").or_else(|| body.get("data")).cloned().ok_or(OrderError::NotCompleted)?;
    Ok(serde_json::from_value(order)?)
}

#[derive(Deserialize)] struct ProductsEnvelope { products: Vec<MedusaProduct> }
#[derive(Deserialize)] struct ProductEnvelope { product: MedusaProduct }
#[derive(Deserialize)] struct CartEnvelope { cart: BackendCart }
#[derive(Deserialize)] struct OrderEnvelope { order: Order }
#[derive(Deserialize)] struct ShippingOptionsEnvelope { #[serde(default)] shipping_options: Vec<BackendShippingOption> }

#[async_trait]
impl CommerceBackend for MedusaClient {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<MedusaProduct>> {
        let response = self.http.get(self.url("/store/products")).send().await?;
        let envelope: ProductsEnvelope = ensure_success(SERVICE, response).await?.json().await?;
        Ok(envelope.products)
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: &str) -> Result<Option<MedusaProduct>> {
        let response = self.http.get(self.url(&format!("/store/products/{id}"))).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let envelope: ProductEnvelope = ensure_success(SERVICE, response).await?.json().await?;
        Ok(Some(envelope.product))
    }

    #[instrument(skip(self))]
    async fn find_product_by_handle(&self, handle: &str) -> Result<Option<MedusaProduct>> {
        let response = self.http.get(self.url("/store/products")).query(&[("handle", handle)]).send().await?;
        let envelope: ProductsEnvelope = ensure_success(SERVICE, response).await?.json().await?;
        Ok(envelope.products.into_iter().find(|p| p.handle == handle))
    }

    #[instrument(skip(self))]
    async fn create_cart(&self) -> Result<BackendCart> {
        let mut body = json!({ "region_id": self.config.region_id });
        if let Some(channel) = &self.config.sales_channel_id {
            body["sales_channel_id"] = json!(channel);
        }
        let envelope: CartEnvelope = serde_json::from_value(self.post("/store/carts", &body).await?)?;
        Ok(envelope.cart)
    }

    #[instrument(skip(self))]
    async fn add_line_item(&self, cart_id: &str, variant_id: &str, quantity: u32) -> Result<()> {
        let body = json!({ "variant_id": variant_id, "quantity": quantity });
        self.post(&format!("/store/carts/{cart_id}/line-items"), &body).await.map(drop)
    }

    #[instrument(skip(self, update))]
    async fn update_cart(&self, cart_id: &str, update: &CartUpdate) -> Result<()> {
        self.post(&format!("/store/carts/{cart_id}"), &serde_json::to_value(update)?).await.map(drop)
    }

    #[instrument(skip(self))]
    async fn shipping_options(&self, region_id: &str) -> Result<Vec<BackendShippingOption>> {
        let response = self.http.get(self.url(&format!("/store/shipping-options/{region_id}"))).send().await?;
        let envelope: ShippingOptionsEnvelope = ensure_success(SERVICE, response).await?.json().await?;
        Ok(envelope.shipping_options)
    }

    #[instrument(skip(self))]
    async fn add_shipping_method(&self, cart_id: &str, option_id: &str) -> Result<()> {
        let body = json!({ "option_id": option_id });
        self.post(&format!("/store/carts/{cart_id}/shipping-methods"), &body).await.map(drop)
    }

    #[instrument(skip(self))]
    async fn init_payment_sessions(&self, cart_id: &str) -> Result<()> {
        self.post(&format!("/store/carts/{cart_id}/payment-sessions"), &json!({})).await.map(drop)
    }

    #[instrument(skip(self))]
    async fn select_payment_session(&self, cart_id: &str, provider_id: &str) -> Result<()> {
        let body = json!({ "provider_id": provider_id });
        self.post(&format!("/store/carts/{cart_id}/payment-session"), &body).await.map(drop)
    }

    #[instrument(skip(self))]
    async fn complete_cart(&self, cart_id: &str) -> Result<Order> {
        completed_order(self.post(&format!("/store/carts/{cart_id}/complete"), &json!({})).await?)
    }

    #[instrument(skip(self))]
    async fn get_order(&self, order_id: &str) -> Result<Option<Order>> {
        let response = self.http.get(self.url(&format!("/store/orders/{order_id}"))).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let envelope: OrderEnvelope = ensure_success(SERVICE, response).await?.json().await?;
        Ok(Some(envelope.order))
    }

    #[instrument(skip(self))]
    async fn capture_payment(&self, order_id: &str) -> Result<()> {
        let request = self.admin(self.http.post(self.url(&format!("/admin/orders/{order_id}/capture"))));
        ensure_success(SERVICE, request.send().await?).await.map(drop)
    }

    #[instrument(skip(self, metadata))]
    async fn update_order_metadata(&self, order_id: &str, metadata: &OrderMetadata) -> Result<Order> {
        let request = self
            .admin(self.http.post(self.url(&format!("/admin/orders/{order_id}"))))
            .json(&json!({ "metadata": metadata }));
        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StorefrontError::NotFound(format!("Order {order_id}")));
        }
        let envelope: OrderEnvelope = ensure_success(SERVICE, response).await?.json().await?;
        Ok(envelope.order)
    }

    async fn health(&self) -> bool {
        match self.http.get(self.url("/health")).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
