use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

pub const EXPIRING_SOON_DAYS: i64 = 30;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpiryState {
    pub expired: bool,
    pub expiring_soon: bool,
    pub days_until_expiry: Option<i64>,
}

/// Expiry flags relative to `now`. Never stored; recompute on every read.
pub fn product_expiry_state(expiry_date: Option<NaiveDate>, now: DateTime<Utc>) -> ExpiryState {
    let Some(expiry_date) = expiry_date else {
        return ExpiryState {
            expired: false,
            expiring_soon: false,
            days_until_expiry: None,
        };
    };

    let expires_at = expiry_date.and_time(NaiveTime::MIN).and_utc();
    let remaining_ms = (expires_at - now).num_milliseconds();
    // Partial days count as a whole day left.
    let days = -((-remaining_ms).div_euclid(MILLIS_PER_DAY));

    ExpiryState {
        expired: expires_at < now,
        expiring_soon: days > 0 && days <= EXPIRING_SOON_DAYS,
        days_until_expiry: Some(days),
    }
}
