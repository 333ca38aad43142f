//! Checkout orchestration against the commerce backend and payment provider.
//!
//! The steps run strictly in order: cart, line items, customer details,
//! shipping, payment sessions, completion, then payment or confirmation.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{error, info, instrument, warn};
use validator::Validate;

use crate::domain::aggregates::{Address, CheckoutCart, Order, OrderMetadata};
use crate::domain::events::PaymentIntent;
use crate::domain::services::{
    detect_purmerend, payment_allowed, DeliveryEstimate, DeliveryEstimationService, DeliveryMethod,
    PurmerendDetection, StorefrontPaymentMethod,
};
use crate::error::{Result, StorefrontError};
use crate::integrations::{BackendShippingOption, CartUpdate, CommerceBackend, CreatePaymentIntent, PaymentGateway};
use crate::notifications::{send_order_emails, Mailer, ShopDetails};

const CASH_MESSAGE: &str = "Bestelling geplaatst! Je betaalt bij de bezorging.";
const IDEAL_MESSAGE: &str = "iDEAL betaling wordt voorbereid...";
const PAYMENT_RETRY_MESSAGE: &str = "Bestelling geplaatst, maar de betaling kon niet worden gestart. Probeer het opnieuw.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub payment_method: String,
    #[serde(default = "default_delivery_method")]
    pub delivery_method: DeliveryMethod,
    #[serde(default)]
    pub customer: Option<CustomerDetails>,
    #[serde(default)]
    pub address: Option<AddressDetails>,
    #[serde(default)]
    pub cart_items: Vec<CartItemRequest>,
}

fn default_delivery_method() -> DeliveryMethod { DeliveryMethod::Pickup }

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(email)]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDetails {
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CartItemRequest {
    pub id: String,
    pub quantity: Option<u32>,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CheckoutOutcome {
    #[serde(rename = "ok", rename_all = "camelCase")]
    Placed { order_id: String, message: String, estimate: DeliveryEstimate },
    #[serde(rename_all = "camelCase")]
    Pending {
        order_id: String,
        payment_intent_id: String,
        client_secret: Option<String>,
        message: String,
        estimate: DeliveryEstimate,
    },
    /// The order exists but no payment intent could be created for it.
    #[serde(rename = "payment_retry", rename_all = "camelCase")]
    PaymentRetry { order_id: String, message: String, estimate: DeliveryEstimate },
}

impl CheckoutRequest {
    fn payment(&self) -> Result<StorefrontPaymentMethod> {
        match self.payment_method.as_str() {
            "ideal" => Ok(StorefrontPaymentMethod::Ideal),
            "cash" => Ok(StorefrontPaymentMethod::Cash),
            _ => Err(StorefrontError::BadRequest("Unsupported paymentMethod".into())),
        }
    }

    fn email(&self) -> Option<&str> {
        self.customer.as_ref().and_then(|c| c.email.as_deref()).filter(|e| !e.trim().is_empty())
    }

    /// Gate input is what the customer typed; the city default below only fills the backend address.
    fn locality(&self) -> PurmerendDetection {
        let address = self.address.as_ref();
        detect_purmerend(
            address.and_then(|a| a.city.as_deref()),
            address.and_then(|a| a.postal_code.as_deref()),
        )
    }

    fn shipping_address(&self) -> Option<Address> {
        let address = self.address.as_ref()?;
        let customer = self.customer.as_ref();
        let text = |value: Option<&String>| value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Some(Address {
            first_name: Some(text(customer.and_then(|c| c.first_name.as_ref())).unwrap_or_else(|| "Klant".into())),
            last_name: Some(text(customer.and_then(|c| c.last_name.as_ref())).unwrap_or_else(|| "Lekker".into())),
            address_1: Some(text(address.street.as_ref()).unwrap_or_default()),
            address_2: Some(text(address.house_number.as_ref()).unwrap_or_default()),
            city: Some(text(address.city.as_ref()).unwrap_or_else(|| "Purmerend".into())),
            postal_code: Some(text(address.postal_code.as_ref()).unwrap_or_default()),
            country_code: Some("nl".into()),
            phone: text(customer.and_then(|c| c.phone.as_ref())),
        })
    }
}

/// Picks the option whose name matches the delivery choice, else the first one.
pub fn select_shipping_option(options: &[BackendShippingOption], method: DeliveryMethod) -> Option<&BackendShippingOption> {
    let keywords: &[&str] = match method {
        DeliveryMethod::Pickup => &["pickup", "ophalen"],
        DeliveryMethod::Delivery => &["delivery", "bezorg"],
    };
    options
        .iter()
        .find(|o| {
            let name = o.name.to_lowercase();
            keywords.iter().any(|k| name.contains(k))
        })
        .or_else(|| options.first())
}

pub struct CheckoutService {
    commerce: Arc<dyn CommerceBackend>,
    payments: Option<Arc<dyn PaymentGateway>>,
    mailer: Arc<dyn Mailer>,
    delivery: DeliveryEstimationService,
    shop: ShopDetails,
    region_id: String,
}

impl CheckoutService {
    pub fn new(
        commerce: Arc<dyn CommerceBackend>,
        payments: Option<Arc<dyn PaymentGateway>>,
        mailer: Arc<dyn Mailer>,
        delivery: DeliveryEstimationService,
        shop: ShopDetails,
        region_id: String,
    ) -> Self {
        Self { commerce, payments, mailer, delivery, shop, region_id }
    }

    #[instrument(skip(self, request), fields(payment = %request.payment_method, delivery = ?request.delivery_method))]
    pub async fn place_order(&self, request: CheckoutRequest) -> Result<CheckoutOutcome> {
        let payment = request.payment()?;
        if let Some(customer) = &request.customer {
            customer.validate()?;
        }
        let cart = CheckoutCart::from_requested(request.cart_items.iter().map(|i| (i.id.clone(), i.quantity)))?;
        if cart.is_empty() {
            return Err(StorefrontError::BadRequest("Cart is empty".into()));
        }

        let detection = request.locality();
        if request.delivery_method.is_delivery() && !detection.is_purmerend {
            return Err(StorefrontError::BadRequest("Bezorging is alleen mogelijk binnen Purmerend".into()));
        }
        if !payment_allowed(payment, detection.is_purmerend, request.delivery_method) {
            return Err(StorefrontError::BadRequest("Contant betalen kan alleen bij bezorging in Purmerend".into()));
        }
        let gateway = match payment {
            StorefrontPaymentMethod::Ideal => {
                Some(self.payments.clone().ok_or(StorefrontError::NotConfigured("Payment provider"))?)
            }
            StorefrontPaymentMethod::Cash => None,
        };

        let backend_cart = self.commerce.create_cart().await?;
        let cart_id = backend_cart.id.as_str();
        info!(cart_id, items = cart.item_count(), quantity = cart.total_quantity(), "cart created");

        let mut timings = Vec::new();
        for line in cart.items() {
            let product = match self.commerce.get_product(&line.product_id).await {
                Ok(Some(product)) => product,
                Ok(None) => {
                    warn!(product_id = %line.product_id, "product not found, skipping");
                    continue;
                }
                Err(err) => {
                    warn!(product_id = %line.product_id, error = %err, "product lookup failed, skipping");
                    continue;
                }
            };
            let Some(variant_id) = product.first_variant_id() else {
                warn!(product_id = %line.product_id, "product has no variants, skipping");
                continue;
            };
            match self.commerce.add_line_item(cart_id, variant_id, line.quantity).await {
                Ok(()) => timings.push((product.prep_time_hours(), product.cutoff())),
                Err(err) => warn!(product_id = %line.product_id, error = %err, "failed to add item"),
            }
        }
        if timings.is_empty() {
            return Err(StorefrontError::BadRequest("None of the cart items are available".into()));
        }

        if let Some(email) = request.email() {
            let update = CartUpdate { email: Some(email.to_string()), ..Default::default() };
            if let Err(err) = self.commerce.update_cart(cart_id, &update).await {
                warn!(cart_id, error = %err, "failed to set customer email");
            }
        }

        if request.delivery_method.is_delivery() {
            let update = CartUpdate { shipping_address: request.shipping_address(), ..Default::default() };
            self.commerce.update_cart(cart_id, &update).await?;
        }

        let region_id = backend_cart.region_id.as_deref().unwrap_or(&self.region_id);
        self.select_shipping(cart_id, region_id, request.delivery_method).await;

        if let Err(err) = self.commerce.init_payment_sessions(cart_id).await {
            warn!(cart_id, error = %err, "failed to create payment sessions");
        }
        self.commerce.select_payment_session(cart_id, payment.provider_id()).await?;

        let order = self.commerce.complete_cart(cart_id).await?;
        let estimate = self.delivery.order_eta(timings);
        info!(order_id = %order.id, eta = %estimate.eta_iso, "order placed");
        let order = self.tag_order(order, &estimate, request.delivery_method, payment).await;

        match gateway {
            None => {
                if let Err(err) = send_order_emails(self.mailer.as_ref(), &self.shop, &order).await {
                    warn!(order_id = %order.id, error = %err, "failed to send order emails");
                }
                Ok(CheckoutOutcome::Placed { order_id: order.id, message: CASH_MESSAGE.into(), estimate })
            }
            Some(gateway) => {
                let started = self.start_payment(gateway.as_ref(), &order, Some(cart_id)).await;
                match started {
                    Ok(intent) => Ok(CheckoutOutcome::Pending {
                        order_id: order.id,
                        payment_intent_id: intent.id,
                        client_secret: intent.client_secret,
                        message: IDEAL_MESSAGE.into(),
                        estimate,
                    }),
                    Err(err) => {
                        error!(order_id = %order.id, error = %err, "payment intent failed after order completion");
                        Ok(CheckoutOutcome::PaymentRetry { order_id: order.id, message: PAYMENT_RETRY_MESSAGE.into(), estimate })
                    }
                }
            }
        }
    }

    /// Creates a fresh iDEAL intent for an order whose first attempt failed.
    #[instrument(skip(self))]
    pub async fn retry_payment(&self, order_id: &str) -> Result<CheckoutOutcome> {
        let gateway = self.payments.clone().ok_or(StorefrontError::NotConfigured("Payment provider"))?;
        let order = self
            .commerce
            .get_order(order_id)
            .await?
            .ok_or_else(|| StorefrontError::NotFound(format!("Order {order_id}")))?;
        let intent = self.start_payment(gateway.as_ref(), &order, None).await?;
        let estimate = DeliveryEstimate {
            eta_iso: order.metadata_str("eta_iso").unwrap_or_default().to_string(),
            eta_label: order.metadata_str("eta_label").unwrap_or_default().to_string(),
            eta_range: order.metadata_str("eta_range").unwrap_or_default().to_string(),
        };
        info!(order_id, payment_intent = %intent.id, "payment restarted");
        Ok(CheckoutOutcome::Pending {
            order_id: order.id,
            payment_intent_id: intent.id,
            client_secret: intent.client_secret,
            message: IDEAL_MESSAGE.into(),
            estimate,
        })
    }

    async fn start_payment(&self, gateway: &dyn PaymentGateway, order: &Order, cart_id: Option<&str>) -> Result<PaymentIntent> {
        let params = CreatePaymentIntent {
            amount: order.total,
            currency: order.currency().to_string(),
            order_id: order.id.clone(),
            customer_email: Some(order.recipient().to_string()).filter(|e| !e.is_empty()),
            return_url: format!("{}/bestelling-geplaatst?order_id={}", self.shop.site_url, order.id),
            metadata: cart_id.map(|id| ("cartId".to_string(), id.to_string())).into_iter().collect(),
        };
        gateway.create_ideal_payment_intent(&params).await
    }

    async fn select_shipping(&self, cart_id: &str, region_id: &str, method: DeliveryMethod) {
        let options = match self.commerce.shipping_options(region_id).await {
            Ok(options) => options,
            Err(err) => {
                warn!(cart_id, error = %err, "shipping options unavailable");
                return;
            }
        };
        let Some(option) = select_shipping_option(&options, method) else {
            warn!(cart_id, region_id, "region has no shipping options");
            return;
        };
        if let Err(err) = self.commerce.add_shipping_method(cart_id, &option.id).await {
            warn!(cart_id, option_id = %option.id, error = %err, "shipping method error");
        }
    }

    /// Stores the ETA on the order; the untagged order is kept when that fails.
    async fn tag_order(
        &self,
        order: Order,
        estimate: &DeliveryEstimate,
        delivery: DeliveryMethod,
        payment: StorefrontPaymentMethod,
    ) -> Order {
        let delivery_tag = if delivery.is_delivery() { "delivery" } else { "pickup" };
        let metadata = OrderMetadata {
            tags: Some(vec![delivery_tag.to_string(), payment.id().to_string()]),
            delivery_time: Some(estimate.eta_range.clone()),
            eta_iso: Some(estimate.eta_iso.clone()),
            eta_label: Some(estimate.eta_label.clone()),
            eta_range: Some(estimate.eta_range.clone()),
            tagged_at: None,
        }
        .stamped(self.delivery.now());

        match self.commerce.update_order_metadata(&order.id, &metadata).await {
            Ok(tagged) => merge_tagged(order, tagged),
            Err(err) => {
                warn!(order_id = %order.id, error = %err, "failed to tag order");
                order
            }
        }
    }
}

/// The admin update may return a slimmer order; keep completed details, take its metadata.
fn merge_tagged(mut order: Order, tagged: Order) -> Order {
    if tagged.metadata.is_some() {
        order.metadata = tagged.metadata;
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::testing::{product, FakeCommerce, FakePayments, Outbox};
    use chrono::{DateTime, Utc};
    use serde_json::{json, Value};

    fn option(id: &str, name: &str) -> BackendShippingOption {
        BackendShippingOption { id: id.into(), name: name.into(), amount: Some(0) }
    }

    #[test]
    fn picks_shipping_option_by_name() {
        let options = vec![option("so_std", "Standaard"), option("so_pick", "Ophalen in de winkel"), option("so_del", "Bezorgen")];
        assert_eq!(select_shipping_option(&options, DeliveryMethod::Pickup).unwrap().id, "so_pick");
        assert_eq!(select_shipping_option(&options, DeliveryMethod::Delivery).unwrap().id, "so_del");
        let plain = vec![option("so_std", "Standaard")];
        assert_eq!(select_shipping_option(&plain, DeliveryMethod::Delivery).unwrap().id, "so_std");
        assert!(select_shipping_option(&[], DeliveryMethod::Pickup).is_none());
    }

    #[test]
    fn shipping_address_uses_defaults() {
        let request: CheckoutRequest = serde_json::from_value(serde_json::json!({
            "paymentMethod": "cash",
            "deliveryMethod": "delivery",
            "address": {"street": "Kerkstraat", "postalCode": "1441AB"}
        })).unwrap();
        let address = request.shipping_address().unwrap();
        assert_eq!(address.first_name.as_deref(), Some("Klant"));
        assert_eq!(address.last_name.as_deref(), Some("Lekker"));
        assert_eq!(address.city.as_deref(), Some("Purmerend"));
        assert_eq!(address.country_code.as_deref(), Some("nl"));
        assert_eq!(address.phone, None);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let estimate = DeliveryEstimate { eta_iso: "x".into(), eta_label: "Vandaag".into(), eta_range: "10:00–13:00".into() };
        let placed = CheckoutOutcome::Placed { order_id: "order_1".into(), message: CASH_MESSAGE.into(), estimate };
        let json = serde_json::to_value(placed).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["orderId"], "order_1");
    }

    struct Harness {
        commerce: Arc<FakeCommerce>,
        payments: Arc<FakePayments>,
        outbox: Arc<Outbox>,
        service: CheckoutService,
    }

    fn harness(with_payments: bool) -> Harness { harness_with(with_payments, FakePayments::default()) }

    fn harness_with(with_payments: bool, payments: FakePayments) -> Harness {
        let commerce = Arc::new(FakeCommerce::new(vec![
            product("prod_1", "appeltaart", 1850, 2, "12:00"),
            product("prod_2", "brownies", 1250, 4, "15:00"),
        ]));
        let payments = Arc::new(payments);
        let outbox = Arc::new(Outbox::default());
        let now: DateTime<Utc> = "2024-10-16T08:00:00Z".parse().unwrap();
        let service = CheckoutService::new(
            commerce.clone(),
            with_payments.then(|| payments.clone() as Arc<dyn PaymentGateway>),
            outbox.clone(),
            DeliveryEstimationService::new(Arc::new(FixedClock(now))),
            ShopDetails::for_tests(),
            "reg_nl".into(),
        );
        Harness { commerce, payments, outbox, service }
    }

    fn request(body: Value) -> CheckoutRequest { serde_json::from_value(body).unwrap() }

    fn delivery_body(payment: &str) -> Value {
        json!({
            "paymentMethod": payment,
            "deliveryMethod": "delivery",
            "customer": {"email": "anna@example.com", "firstName": "Anna", "phone": "0612345678"},
            "address": {"street": "Kerkstraat", "houseNumber": "12", "city": "Purmerend", "postalCode": "1441 AB"},
            "cartItems": [{"id": "prod_1", "quantity": 2}, {"id": "prod_2"}]
        })
    }

    #[tokio::test]
    async fn cash_delivery_places_order_and_mails() {
        let h = harness(false);
        let outcome = h.service.place_order(request(delivery_body("cash"))).await.unwrap();

        let CheckoutOutcome::Placed { order_id, message, estimate } = outcome else { panic!("expected placed order") };
        assert_eq!(order_id, "order_1");
        assert_eq!(message, CASH_MESSAGE);
        assert_eq!(estimate.eta_label, "Vandaag");
        assert_eq!(estimate.eta_range, "14:00–17:00");

        let calls = h.commerce.calls();
        assert!(calls.contains(&"line_item:variant_prod_1:2".to_string()));
        assert!(calls.contains(&"line_item:variant_prod_2:1".to_string()));
        assert!(calls.contains(&"email:anna@example.com".to_string()));
        assert!(calls.contains(&"shipping_address".to_string()));
        assert!(calls.contains(&"shipping_method:so_delivery".to_string()));
        assert!(calls.contains(&"payment_session:manual".to_string()));
        assert!(calls.contains(&"metadata:order_1".to_string()));

        let order = h.commerce.order("order_1").unwrap();
        assert_eq!(order.total, 4950);
        assert_eq!(order.metadata_str("eta_label"), Some("Vandaag"));
        assert_eq!(order.shipping_address.as_ref().and_then(|a| a.last_name.as_deref()), Some("Lekker"));

        let sent = h.outbox.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].html.contains("Vandaag 14:00–17:00"));
    }

    #[tokio::test]
    async fn ideal_pickup_creates_payment_intent() {
        let h = harness(true);
        let body = json!({
            "paymentMethod": "ideal",
            "deliveryMethod": "pickup",
            "customer": {"email": "anna@example.com"},
            "cartItems": [{"id": "prod_1", "quantity": 2}]
        });
        let outcome = h.service.place_order(request(body)).await.unwrap();

        let CheckoutOutcome::Pending { order_id, payment_intent_id, client_secret, .. } = outcome else {
            panic!("expected pending payment")
        };
        assert_eq!(order_id, "order_1");
        assert_eq!(payment_intent_id, "pi_1");
        assert_eq!(client_secret.as_deref(), Some("pi_1_secret"));

        let calls = h.commerce.calls();
        assert!(calls.contains(&"shipping_method:so_pickup".to_string()));
        assert!(calls.contains(&"payment_session:stripe".to_string()));
        assert!(!calls.contains(&"shipping_address".to_string()));

        let created = h.payments.created.lock().unwrap();
        assert_eq!(created[0].amount, 3700);
        assert_eq!(created[0].customer_email.as_deref(), Some("anna@example.com"));
        assert_eq!(created[0].return_url, "https://lekker.test/bestelling-geplaatst?order_id=order_1");
        assert!(h.outbox.sent().is_empty());
    }

    #[tokio::test]
    async fn locality_gate_rejects_before_creating_cart() {
        let h = harness(true);
        let mut pickup_cash = delivery_body("cash");
        pickup_cash["deliveryMethod"] = json!("pickup");
        let err = h.service.place_order(request(pickup_cash)).await.unwrap_err();
        assert!(matches!(err, StorefrontError::BadRequest(_)));

        let mut elsewhere = delivery_body("ideal");
        elsewhere["address"] = json!({"street": "Damrak", "city": "Amsterdam", "postalCode": "1012 LG"});
        let err = h.service.place_order(request(elsewhere)).await.unwrap_err();
        assert!(matches!(err, StorefrontError::BadRequest(_)));

        assert!(h.commerce.calls().is_empty());
    }

    #[tokio::test]
    async fn rejects_invalid_requests() {
        let h = harness(false);
        let err = h.service.place_order(request(delivery_body("paypal"))).await.unwrap_err();
        assert_eq!(err.to_string(), "Unsupported paymentMethod");

        let err = h.service.place_order(request(delivery_body("ideal"))).await.unwrap_err();
        assert!(matches!(err, StorefrontError::NotConfigured(_)));

        let mut bad_email = delivery_body("cash");
        bad_email["customer"]["email"] = json!("not-an-email");
        assert!(matches!(h.service.place_order(request(bad_email)).await, Err(StorefrontError::BadRequest(_))));

        let mut empty = delivery_body("cash");
        empty["cartItems"] = json!([]);
        assert!(matches!(h.service.place_order(request(empty)).await, Err(StorefrontError::BadRequest(_))));
    }

    #[tokio::test]
    async fn unknown_products_are_skipped() {
        let h = harness(false);
        let mut body = delivery_body("cash");
        body["cartItems"] = json!([{"id": "prod_missing"}, {"id": "prod_2", "quantity": 3}]);
        h.service.place_order(request(body)).await.unwrap();
        let lines: Vec<_> = h.commerce.calls().into_iter().filter(|c| c.starts_with("line_item")).collect();
        assert_eq!(lines, vec!["line_item:variant_prod_2:3".to_string()]);

        let h = harness(false);
        let mut body = delivery_body("cash");
        body["cartItems"] = json!([{"id": "prod_missing"}]);
        assert!(matches!(h.service.place_order(request(body)).await, Err(StorefrontError::BadRequest(_))));
    }

    #[tokio::test]
    async fn missing_city_does_not_pass_the_gate() {
        let h = harness(false);
        let mut body = delivery_body("cash");
        body["address"] = json!({"street": "Damrak", "postalCode": "1012 LG"});
        let err = h.service.place_order(request(body)).await.unwrap_err();
        assert!(matches!(err, StorefrontError::BadRequest(_)));
        assert!(h.commerce.calls().is_empty());

        let mut body = delivery_body("cash");
        body["address"] = json!({"street": "Kerkstraat", "postalCode": "1441 AB"});
        h.service.place_order(request(body)).await.unwrap();
        let order = h.commerce.order("order_1").unwrap();
        assert_eq!(order.shipping_address.and_then(|a| a.city).as_deref(), Some("Purmerend"));
    }

    #[tokio::test]
    async fn blank_email_is_treated_as_absent() {
        let h = harness(false);
        let mut body = delivery_body("cash");
        body["customer"]["email"] = json!("");
        h.service.place_order(request(body)).await.unwrap();
        assert!(!h.commerce.calls().iter().any(|c| c.starts_with("email:")));
    }

    #[tokio::test]
    async fn failed_payment_intent_keeps_order_for_retry() {
        let h = harness_with(true, FakePayments { down: true, ..Default::default() });
        let body = json!({"paymentMethod": "ideal", "cartItems": [{"id": "prod_1"}]});
        let outcome = h.service.place_order(request(body)).await.unwrap();

        let CheckoutOutcome::PaymentRetry { order_id, estimate, .. } = &outcome else { panic!("expected payment retry") };
        assert_eq!(order_id, "order_1");
        assert_eq!(estimate.eta_label, "Vandaag");
        assert_eq!(serde_json::to_value(&outcome).unwrap()["status"], "payment_retry");
        assert!(h.commerce.order("order_1").is_some());
        assert_eq!(h.payments.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn payment_can_be_restarted_for_existing_order() {
        let h = harness(true);
        let body = json!({"paymentMethod": "ideal", "cartItems": [{"id": "prod_1", "quantity": 2}]});
        h.service.place_order(request(body)).await.unwrap();

        let outcome = h.service.retry_payment("order_1").await.unwrap();
        let CheckoutOutcome::Pending { order_id, payment_intent_id, estimate, .. } = outcome else {
            panic!("expected pending payment")
        };
        assert_eq!(order_id, "order_1");
        assert_eq!(payment_intent_id, "pi_1");
        assert_eq!(estimate.eta_label, "Vandaag");

        let created = h.payments.created.lock().unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(created[1].amount, 3700);
        assert!(created[1].metadata.is_empty());
        drop(created);

        assert!(matches!(h.service.retry_payment("order_x").await, Err(StorefrontError::NotFound(_))));
    }
}
