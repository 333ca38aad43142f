//! Delivery ETA and same-day cutoff calculation.
//!
//! All date arithmetic happens on Amsterdam wall-clock time: an order placed
//! after the product's cutoff is prepared from the same time tomorrow.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::domain::value_objects::CutoffTime;

pub const SHOP_TIMEZONE: Tz = chrono_tz::Europe::Amsterdam;

/// Last hour a delivery or pickup window may end at.
const LAST_SLOT_HOUR: u32 = 21;
const SLOT_HOURS: u32 = 3;

const WEEKDAYS_NL: [&str; 7] = ["maandag", "dinsdag", "woensdag", "donderdag", "vrijdag", "zaterdag", "zondag"];
const MONTHS_NL: [&str; 12] = [
    "januari", "februari", "maart", "april", "mei", "juni",
    "juli", "augustus", "september", "oktober", "november", "december",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryEstimate {
    pub eta_iso: String,
    pub eta_label: String,
    pub eta_range: String,
}

pub fn calculate_eta(prep_time_hours: u32, cutoff: CutoffTime, now: DateTime<Utc>) -> DeliveryEstimate {
    let local_now = now.with_timezone(&SHOP_TIMEZONE).naive_local();
    let cutoff_at = local_now.date().and_time(cutoff.time());

    let base = if local_now > cutoff_at { local_now + Duration::days(1) } else { local_now };
    let eta = base + Duration::hours(i64::from(prep_time_hours));

    DeliveryEstimate {
        eta_iso: to_utc(eta).to_rfc3339_opts(SecondsFormat::Millis, true),
        eta_label: label(eta.date(), local_now.date()),
        eta_range: time_range(eta.hour()),
    }
}

/// Combined estimate for several products: the slowest preparation and the
/// earliest cutoff decide.
pub fn order_estimate<I>(products: I, now: DateTime<Utc>) -> DeliveryEstimate
where
    I: IntoIterator<Item = (u32, CutoffTime)>,
{
    let (prep, cutoff) = products.into_iter().fold((0, None::<CutoffTime>), |(prep, cutoff), (p, c)| {
        let earliest = match cutoff {
            Some(existing) if existing.time() <= c.time() => existing,
            _ => c,
        };
        (prep.max(p), Some(earliest))
    });
    calculate_eta(prep, cutoff.unwrap_or_default(), now)
}

fn to_utc(local: NaiveDateTime) -> DateTime<Utc> {
    SHOP_TIMEZONE
        .from_local_datetime(&local)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
        // Inside the spring-forward gap: read the wall clock with the pre-transition offset.
        .unwrap_or_else(|| Utc.from_utc_datetime(&(local - Duration::hours(1))))
}

fn label(eta: NaiveDate, today: NaiveDate) -> String {
    if eta == today {
        return "Vandaag".to_string();
    }
    if Some(eta) == today.succ_opt() {
        return "Morgen".to_string();
    }
    format!(
        "{} {} {}",
        WEEKDAYS_NL[eta.weekday().num_days_from_monday() as usize],
        eta.day(),
        MONTHS_NL[eta.month0() as usize]
    )
}

fn time_range(start_hour: u32) -> String {
    let end_hour = (start_hour + SLOT_HOURS).min(LAST_SLOT_HOUR).max(start_hour);
    format!("{start_hour:02}:00\u{2013}{end_hour:02}:00")
}

/// Clock-backed facade used by the HTTP layer.
#[derive(Clone)]
pub struct DeliveryEstimationService {
    clock: Arc<dyn Clock>,
}

impl DeliveryEstimationService {
    pub fn new(clock: Arc<dyn Clock>) -> Self { Self { clock } }

    pub fn calculate_delivery_eta(&self, prep_time_hours: u32, cutoff: CutoffTime) -> DeliveryEstimate {
        calculate_eta(prep_time_hours, cutoff, self.clock.now())
    }

    pub fn order_eta<I>(&self, products: I) -> DeliveryEstimate
    where
        I: IntoIterator<Item = (u32, CutoffTime)>,
    {
        order_estimate(products, self.clock.now())
    }

    pub fn now(&self) -> DateTime<Utc> { self.clock.now() }
}
