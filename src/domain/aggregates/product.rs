//! Product Aggregate: commerce backend payload and the storefront projection

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::value_objects::CutoffTime;

const DEFAULT_PREP_HOURS: u32 = 2;
const DEFAULT_CUTOFF: &str = "14:00";
const DEFAULT_CATEGORY: &str = "general";
const IMAGE_PLACEHOLDER: &str = "🎂";
const FALLBACK_PRICE: i64 = 1000;

/// Prices used while the backend has no price set for a known product.
const FALLBACK_PRICES: [(&str, i64); 3] = [("chocoladetaart", 2850), ("appeltaart", 1850), ("brownies", 1250)];

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MedusaProduct {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

#[derive(Clone, Debug, Deserialize, Serialize)] pub struct Variant { pub id: String, #[serde(default)] pub title: Option<String>, #[serde(default)] pub prices: Vec<Price>, #[serde(default)] pub inventory_quantity: Option<i64> }
#[derive(Clone, Debug, Deserialize, Serialize)] pub struct Price { pub amount: i64, pub currency_code: String }
#[derive(Clone, Debug, Deserialize, Serialize)] pub struct ProductImage { #[serde(default)] pub id: Option<String>, pub url: String }

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Nutrition { pub calories: f64, pub fat: f64, pub carbs: f64, pub protein: f64 }

/// Product as the storefront renders it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub description: String,
    pub price: i64,
    pub image: String,
    pub prep_time_hours: u32,
    pub same_day_cutoff: String,
    pub category: String,
    pub gallery: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergens: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Nutrition>,
}

impl MedusaProduct {
    pub fn first_variant_id(&self) -> Option<&str> { self.variants.first().map(|v| v.id.as_str()) }

    /// Metadata value as text; numbers are accepted as well since admins enter both.
    pub fn metadata_text(&self, key: &str) -> Option<String> {
        match self.metadata.as_ref()?.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn prep_time_hours(&self) -> u32 {
        self.metadata_text("prep_time_hours").and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_PREP_HOURS)
    }

    pub fn cutoff(&self) -> CutoffTime {
        self.metadata_text("same_day_cutoff").and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    /// Unit price in cents: EUR price of the first variant, else its first price.
    pub fn unit_price(&self) -> i64 {
        let prices = self.variants.first().map(|v| v.prices.as_slice()).unwrap_or_default();
        let price = prices.iter().find(|p| p.currency_code.eq_ignore_ascii_case("eur"))
            .or_else(|| prices.first())
            .map(|p| p.amount)
            .unwrap_or(0);
        if price != 0 { return price; }
        FALLBACK_PRICES.iter().find(|(handle, _)| *handle == self.handle).map(|(_, p)| *p).unwrap_or(FALLBACK_PRICE)
    }

    pub fn to_storefront(&self) -> Product {
        let image = self.thumbnail.clone()
            .filter(|t| !t.is_empty())
            .or_else(|| self.images.first().map(|i| i.url.clone()))
            .unwrap_or_else(|| IMAGE_PLACEHOLDER.to_string());
        let gallery = if self.images.is_empty() { vec![image.clone()] } else { self.images.iter().map(|i| i.url.clone()).collect() };

        Product {
            id: self.id.clone(),
            title: self.title.clone(),
            handle: self.handle.clone(),
            description: self.description.clone().unwrap_or_default(),
            price: self.unit_price(),
            image,
            prep_time_hours: self.prep_time_hours(),
            same_day_cutoff: self.metadata_text("same_day_cutoff").unwrap_or_else(|| DEFAULT_CUTOFF.to_string()),
            category: self.metadata_text("category").unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            gallery,
            ingredients: self.metadata_text("ingredients").map(|v| split_list(&v)),
            allergens: self.metadata_text("allergens").map(|v| split_list(&v)),
            nutrition: self.metadata_text("nutrition").and_then(|v| serde_json::from_str(&v).ok()),
        }
    }
}

impl Product {
    /// Cutoff as a time value; unparsable input falls back to noon.
    pub fn cutoff(&self) -> CutoffTime { self.same_day_cutoff.parse().unwrap_or_default() }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
}
