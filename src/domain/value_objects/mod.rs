//! Value Objects for the storefront

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Money value object, amounts in minor units (cents)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: i64, currency: String }

impl Money {
    pub fn new(amount: i64, currency: &str) -> Self { Self { amount, currency: currency.to_lowercase() } }
    pub fn eur(amount: i64) -> Self { Self::new(amount, "eur") }
    pub fn amount(&self) -> i64 { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn multiply(&self, qty: u32) -> Money { Money::new(self.amount * i64::from(qty), &self.currency) }
    pub fn format_nl(&self) -> String { format_price(self.amount, &self.currency) }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.format_nl()) }
}

/// Formats an amount in minor units the way Dutch shops print prices: `€ 1.234,50`.
pub fn format_price(amount: i64, currency: &str) -> String {
    let symbol = match currency.to_ascii_lowercase().as_str() {
        "eur" => "€".to_string(),
        other => other.to_ascii_uppercase(),
    };
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{symbol}\u{a0}{sign}{},{:02}", group_thousands(abs / 100), abs % 100)
}

/// Plain two-decimal rendering used in e-mails (`28.50`).
pub fn format_decimal(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 { out.push('.'); }
        out.push(ch);
    }
    out
}

/// Same-day order cutoff, a wall-clock time in the shop's timezone
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CutoffTime(NaiveTime);

impl CutoffTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, CutoffError> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self).ok_or(CutoffError::OutOfRange)
    }
    pub fn time(&self) -> NaiveTime { self.0 }
}

impl Default for CutoffTime {
    fn default() -> Self { Self(NaiveTime::MIN + chrono::Duration::hours(12)) }
}

impl FromStr for CutoffTime {
    type Err = CutoffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() { return Err(CutoffError::Empty); }
        NaiveTime::parse_from_str(s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .map(Self)
            .map_err(|_| CutoffError::Malformed(s.to_string()))
    }
}

impl fmt::Display for CutoffTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0.format("%H:%M")) }
}

impl Serialize for CutoffTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CutoffTime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CutoffError { Empty, OutOfRange, Malformed(String) }
impl std::error::Error for CutoffError {}
impl fmt::Display for CutoffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "cutoff time empty"),
            Self::OutOfRange => write!(f, "cutoff time out of range"),
            Self::Malformed(raw) => write!(f, "cutoff time '{raw}' is not HH:mm"),
        }
    }
}
