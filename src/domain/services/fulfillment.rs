//! Delivery and payment options derived from the locality gate.

use serde::{Deserialize, Serialize};

use super::locality::detect_purmerend;
use crate::domain::aggregates::Address;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Delivery,
    Pickup,
}

impl DeliveryMethod {
    pub fn is_delivery(self) -> bool { self == Self::Delivery }
}

/// Payment choice as offered to the customer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorefrontPaymentMethod {
    Ideal,
    Cash,
}

impl StorefrontPaymentMethod {
    pub fn id(self) -> &'static str {
        match self { Self::Ideal => "ideal", Self::Cash => "cash" }
    }

    /// Commerce backend payment provider that settles this choice.
    pub fn provider_id(self) -> &'static str {
        match self { Self::Ideal => "stripe", Self::Cash => "manual" }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PaymentMethodOption {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub available: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShippingOption {
    pub id: &'static str,
    pub name: &'static str,
    pub amount: i64,
}

/// Provider ids the commerce backend may open payment sessions for.
pub fn available_payment_methods(is_purmerend: bool, is_delivery: bool) -> Vec<&'static str> {
    let mut methods = vec!["stripe", "manual"];
    if is_purmerend && is_delivery {
        methods.push("cash_on_delivery");
    }
    methods
}

pub fn shipping_options(address: &Address) -> Vec<ShippingOption> {
    let detection = detect_purmerend(address.city.as_deref(), address.postal_code.as_deref());
    let mut options = vec![ShippingOption { id: "pickup", name: "Ophalen", amount: 0 }];
    if detection.is_purmerend {
        options.push(ShippingOption { id: "delivery", name: "Bezorgen (gratis in Purmerend)", amount: 0 });
    }
    options
}

pub fn storefront_payment_methods(
    is_purmerend: bool,
    delivery_method: DeliveryMethod,
    allowed: Option<&[String]>,
) -> Vec<PaymentMethodOption> {
    let all = [
        PaymentMethodOption {
            id: "ideal",
            label: "iDEAL",
            description: "Betaal veilig met je eigen bank",
            available: true,
        },
        PaymentMethodOption {
            id: "cash",
            label: "Contant bij levering",
            description: "Alleen mogelijk bij bezorging in Purmerend",
            available: is_purmerend && delivery_method.is_delivery(),
        },
    ];

    all.into_iter()
        .filter(|m| m.available)
        .filter(|m| match allowed {
            Some(ids) if !ids.is_empty() => ids.iter().any(|id| id == m.id),
            _ => true,
        })
        .collect()
}

/// Whether the customer may use `method` with the given delivery choice.
pub fn payment_allowed(method: StorefrontPaymentMethod, is_purmerend: bool, delivery_method: DeliveryMethod) -> bool {
    storefront_payment_methods(is_purmerend, delivery_method, None)
        .iter()
        .any(|m| m.id == method.id())
}
