//! In-memory platform fakes shared by the checkout and router tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::domain::aggregates::{Address, MedusaProduct, Order, OrderMetadata};
use crate::domain::events::PaymentIntent;
use crate::error::{Result, StorefrontError};
use crate::integrations::{
    BackendCart, BackendShippingOption, BlogQuery, CartUpdate, CommerceBackend, ContentBackend, CreatePaymentIntent,
    PaymentGateway, StrapiPost,
};
use crate::notifications::{EmailTemplate, Mailer};

pub fn product(id: &str, handle: &str, amount: i64, prep_hours: u32, cutoff: &str) -> MedusaProduct {
    serde_json::from_value(json!({
        "id": id,
        "title": handle.to_uppercase(),
        "handle": handle,
        "metadata": {"prep_time_hours": prep_hours, "same_day_cutoff": cutoff},
        "variants": [{"id": format!("variant_{id}"), "prices": [{"amount": amount, "currency_code": "eur"}]}]
    }))
    .unwrap()
}

pub fn shipping_option(id: &str, name: &str) -> BackendShippingOption {
    BackendShippingOption { id: id.into(), name: name.into(), amount: Some(0) }
}

#[derive(Default)]
struct OpenCart {
    lines: Vec<(String, u32)>,
    email: Option<String>,
    address: Option<Address>,
    shipping: Option<String>,
    provider: Option<String>,
}

#[derive(Default)]
pub struct FakeCommerce {
    pub products: Vec<MedusaProduct>,
    pub shipping: Vec<BackendShippingOption>,
    pub orders: Mutex<HashMap<String, Order>>,
    pub calls: Mutex<Vec<String>>,
    pub down: bool,
    cart: Mutex<OpenCart>,
}

impl FakeCommerce {
    pub fn new(products: Vec<MedusaProduct>) -> Self {
        Self {
            products,
            shipping: vec![shipping_option("so_pickup", "Ophalen"), shipping_option("so_delivery", "Bezorgen")],
            ..Default::default()
        }
    }

    pub fn with_order(self, order: Value) -> Self {
        let order: Order = serde_json::from_value(order).unwrap();
        self.orders.lock().unwrap().insert(order.id.clone(), order);
        self
    }

    pub fn calls(&self) -> Vec<String> { self.calls.lock().unwrap().clone() }

    pub fn order(&self, id: &str) -> Option<Order> { self.orders.lock().unwrap().get(id).cloned() }

    fn record(&self, call: String) { self.calls.lock().unwrap().push(call); }

    fn by_variant(&self, variant_id: &str) -> Option<&MedusaProduct> {
        self.products.iter().find(|p| p.first_variant_id() == Some(variant_id))
    }

    fn unavailable(&self) -> Result<()> {
        if self.down {
            return Err(StorefrontError::Upstream { service: "Medusa", status: 503, body: String::new() });
        }
        Ok(())
    }
}

#[async_trait]
impl CommerceBackend for FakeCommerce {
    async fn list_products(&self) -> Result<Vec<MedusaProduct>> {
        self.unavailable()?;
        Ok(self.products.clone())
    }

    async fn get_product(&self, id: &str) -> Result<Option<MedusaProduct>> {
        Ok(self.products.iter().find(|p| p.id == id).cloned())
    }

    async fn find_product_by_handle(&self, handle: &str) -> Result<Option<MedusaProduct>> {
        Ok(self.products.iter().find(|p| p.handle == handle).cloned())
    }

    async fn create_cart(&self) -> Result<BackendCart> {
        self.unavailable()?;
        self.record("create_cart".into());
        Ok(BackendCart { id: "cart_1".into(), region_id: Some("reg_nl".into()), total: None })
    }

    async fn add_line_item(&self, _cart_id: &str, variant_id: &str, quantity: u32) -> Result<()> {
        self.record(format!("line_item:{variant_id}:{quantity}"));
        self.cart.lock().unwrap().lines.push((variant_id.to_string(), quantity));
        Ok(())
    }

    async fn update_cart(&self, _cart_id: &str, update: &CartUpdate) -> Result<()> {
        let mut cart = self.cart.lock().unwrap();
        if let Some(email) = &update.email {
            self.record(format!("email:{email}"));
            cart.email = Some(email.clone());
        }
        if let Some(address) = &update.shipping_address {
            self.record("shipping_address".into());
            cart.address = Some(address.clone());
        }
        Ok(())
    }

    async fn shipping_options(&self, _region_id: &str) -> Result<Vec<BackendShippingOption>> {
        Ok(self.shipping.clone())
    }

    async fn add_shipping_method(&self, _cart_id: &str, option_id: &str) -> Result<()> {
        self.record(format!("shipping_method:{option_id}"));
        let name = self.shipping.iter().find(|o| o.id == option_id).map(|o| o.name.clone());
        self.cart.lock().unwrap().shipping = name;
        Ok(())
    }

    async fn init_payment_sessions(&self, _cart_id: &str) -> Result<()> {
        self.record("payment_sessions".into());
        Ok(())
    }

    async fn select_payment_session(&self, _cart_id: &str, provider_id: &str) -> Result<()> {
        self.record(format!("payment_session:{provider_id}"));
        self.cart.lock().unwrap().provider = Some(provider_id.to_string());
        Ok(())
    }

    async fn complete_cart(&self, cart_id: &str) -> Result<Order> {
        self.record("complete".into());
        let cart = std::mem::take(&mut *self.cart.lock().unwrap());
        let items: Vec<Value> = cart.lines.iter().enumerate().map(|(i, (variant, quantity))| {
            let product = self.by_variant(variant);
            json!({
                "id": format!("li_{i}"),
                "title": product.map(|p| p.title.clone()).unwrap_or_default(),
                "quantity": quantity,
                "unit_price": product.map(MedusaProduct::unit_price).unwrap_or_default(),
            })
        }).collect();
        let total: i64 = cart.lines.iter()
            .map(|(variant, quantity)| self.by_variant(variant).map(MedusaProduct::unit_price).unwrap_or_default() * i64::from(*quantity))
            .sum();
        let order: Order = serde_json::from_value(json!({
            "id": "order_1",
            "display_id": 1001,
            "email": cart.email.unwrap_or_default(),
            "currency_code": "eur",
            "total": total,
            "items": items,
            "shipping_address": cart.address,
            "shipping_methods": cart.shipping.map(|name| vec![json!({"shipping_option": {"name": name}})]).unwrap_or_default(),
            "metadata": {"cart_id": cart_id, "provider": cart.provider},
        }))?;
        self.orders.lock().unwrap().insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn get_order(&self, order_id: &str) -> Result<Option<Order>> {
        Ok(self.order(order_id))
    }

    async fn capture_payment(&self, order_id: &str) -> Result<()> {
        self.record(format!("capture:{order_id}"));
        Ok(())
    }

    async fn update_order_metadata(&self, order_id: &str, metadata: &OrderMetadata) -> Result<Order> {
        self.record(format!("metadata:{order_id}"));
        let mut orders = self.orders.lock().unwrap();
        let order = orders.get_mut(order_id).ok_or_else(|| StorefrontError::NotFound(format!("Order {order_id}")))?;
        let mut merged = order.metadata.clone().unwrap_or_default();
        if let Value::Object(update) = serde_json::to_value(metadata)? {
            merged.extend(update);
        }
        order.metadata = Some(merged);
        Ok(order.clone())
    }

    async fn health(&self) -> bool { !self.down }
}

#[derive(Default)]
pub struct FakePayments {
    pub created: Mutex<Vec<CreatePaymentIntent>>,
    pub intents: HashMap<String, PaymentIntent>,
    pub down: bool,
}

impl FakePayments {
    pub fn with_intent(mut self, id: &str, status: &str, order_id: &str) -> Self {
        let intent = serde_json::from_value(json!({
            "id": id, "amount": 2850, "currency": "eur", "status": status, "metadata": {"orderId": order_id}
        }))
        .unwrap();
        self.intents.insert(id.to_string(), intent);
        self
    }
}

#[async_trait]
impl PaymentGateway for FakePayments {
    async fn create_ideal_payment_intent(&self, params: &CreatePaymentIntent) -> Result<PaymentIntent> {
        self.created.lock().unwrap().push(params.clone());
        if self.down {
            return Err(StorefrontError::Upstream { service: "Stripe", status: 500, body: String::new() });
        }
        Ok(PaymentIntent {
            id: "pi_1".into(),
            amount: params.amount,
            currency: params.currency.clone(),
            status: "requires_payment_method".into(),
            client_secret: Some("pi_1_secret".into()),
            metadata: HashMap::from([("orderId".to_string(), params.order_id.clone())]),
        })
    }

    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent> {
        self.intents.get(id).cloned().ok_or_else(|| StorefrontError::NotFound(format!("Payment intent {id}")))
    }
}

#[derive(Default)]
pub struct FakeContent {
    pub listing: Value,
    pub posts: Vec<StrapiPost>,
    pub queries: Mutex<Vec<Vec<(&'static str, String)>>>,
}

#[async_trait]
impl ContentBackend for FakeContent {
    async fn list_posts(&self, query: &BlogQuery) -> Result<Value> {
        self.queries.lock().unwrap().push(query.to_params());
        Ok(self.listing.clone())
    }

    async fn find_post(&self, slug: &str) -> Result<Option<StrapiPost>> {
        Ok(self.posts.iter().find(|p| p.attributes.slug == slug).cloned())
    }

    fn media_url(&self) -> &str { "http://strapi.test" }

    async fn health(&self) -> bool { true }
}

#[derive(Default)]
pub struct Outbox(pub Mutex<Vec<EmailTemplate>>);

impl Outbox {
    pub fn sent(&self) -> Vec<EmailTemplate> { self.0.lock().unwrap().clone() }
}

#[async_trait]
impl Mailer for Outbox {
    async fn send(&self, _from: &str, template: &EmailTemplate) -> Result<()> {
        self.0.lock().unwrap().push(template.clone());
        Ok(())
    }
}
