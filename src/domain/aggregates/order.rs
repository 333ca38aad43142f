//! Order Aggregate, as returned by the commerce backend

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::value_objects::Money;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub display_id: Option<u64>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub shipping_methods: Vec<ShippingMethod>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Clone, Debug, Deserialize, Serialize)] pub struct LineItem { pub id: String, pub title: String, pub quantity: u32, pub unit_price: i64, #[serde(default)] pub metadata: Option<Map<String, Value>> }
#[derive(Clone, Debug, Default, Deserialize, Serialize)] pub struct Customer { pub email: Option<String>, pub first_name: Option<String>, pub last_name: Option<String>, pub phone: Option<String> }
#[derive(Clone, Debug, Deserialize, Serialize)] pub struct ShippingMethod { pub shipping_option: Option<ShippingOptionRef> }
#[derive(Clone, Debug, Deserialize, Serialize)] pub struct ShippingOptionRef { pub id: Option<String>, pub name: Option<String> }

/// Address in the commerce backend's shape
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")] pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")] pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")] pub address_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")] pub address_2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")] pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")] pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")] pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")] pub phone: Option<String>,
}

impl LineItem {
    pub fn note(&self) -> Option<&str> {
        self.metadata.as_ref()?.get("notes")?.as_str().filter(|n| !n.is_empty())
    }
}

impl Order {
    pub fn display_ref(&self) -> String {
        self.display_id.map(|d| d.to_string()).unwrap_or_else(|| self.id.clone())
    }

    pub fn currency(&self) -> &str { self.currency_code.as_deref().unwrap_or("eur") }
    pub fn total_money(&self) -> Money { Money::new(self.total, self.currency()) }

    pub fn line_total(&self, item: &LineItem) -> Money { Money::new(item.unit_price, self.currency()).multiply(item.quantity) }

    pub fn recipient(&self) -> &str {
        self.customer.as_ref().and_then(|c| c.email.as_deref()).filter(|e| !e.is_empty()).unwrap_or(self.email.as_str())
    }

    pub fn customer_name(&self) -> String {
        let Some(c) = &self.customer else { return String::new() };
        format!("{} {}", c.first_name.as_deref().unwrap_or(""), c.last_name.as_deref().unwrap_or("")).trim().to_string()
    }

    /// Name of the first shipping method, or pickup when none was chosen.
    pub fn delivery_method(&self) -> &str {
        self.shipping_methods.first()
            .and_then(|m| m.shipping_option.as_ref())
            .and_then(|o| o.name.as_deref())
            .unwrap_or("Ophalen")
    }

    pub fn is_delivery(&self) -> bool { self.delivery_method().to_lowercase().contains("bezorg") }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(key)?.as_str()
    }
}

/// Tags and ETA written onto an order by the admin tag endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderMetadata {
    #[serde(skip_serializing_if = "Option::is_none")] pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")] pub delivery_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")] pub eta_iso: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")] pub eta_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")] pub eta_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")] pub tagged_at: Option<String>,
}

impl OrderMetadata {
    pub fn stamped(mut self, at: DateTime<Utc>) -> Self {
        self.tagged_at = Some(at.to_rfc3339_opts(SecondsFormat::Millis, true));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum OrderError { NotFound(String), NotCompleted }
impl std::error::Error for OrderError {}
impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { Self::NotFound(id) => write!(f, "Order {id} not found"), Self::NotCompleted => write!(f, "Cart did not complete into an order") }
    }
}
