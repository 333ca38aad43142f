//! Purmerend locality gate: free delivery and cash payment are only offered
//! inside the city.

use serde::{Deserialize, Serialize};

const CITY: &str = "purmerend";
const POSTAL_PREFIXES: [&str; 8] = ["1441", "1442", "1443", "1444", "1445", "1446", "1447", "1448"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionReason {
    City,
    PostalCode,
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurmerendDetection {
    pub is_purmerend: bool,
    pub reason: DetectionReason,
}

impl PurmerendDetection {
    const fn outside() -> Self { Self { is_purmerend: false, reason: DetectionReason::None } }
}

pub fn detect_purmerend(city: Option<&str>, postal_code: Option<&str>) -> PurmerendDetection {
    if city.is_some_and(|c| c.trim().eq_ignore_ascii_case(CITY)) {
        return PurmerendDetection { is_purmerend: true, reason: DetectionReason::City };
    }

    let prefix = postal_code.map(str::trim).and_then(|code| code.get(..4));
    if prefix.is_some_and(|p| POSTAL_PREFIXES.contains(&p)) {
        return PurmerendDetection { is_purmerend: true, reason: DetectionReason::PostalCode };
    }

    PurmerendDetection::outside()
}
