//! Partial-update fields that can also be cleared.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::error::FieldErrors;
use crate::validation::check_date;

/// `None` leaves the stored value alone, `Some(None)` clears it, `Some(Some(v))` sets it.
pub type Nullable<T> = Option<Option<T>>;

/// Keeps an explicit `null` apart from an absent field.
///
/// Pair with `#[serde(default)]` so a missing field stays `None`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Nullable<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub fn check_nullable_date(
    errors: &mut FieldErrors,
    field: &str,
    value: &Nullable<String>,
) -> Nullable<NaiveDate> {
    value
        .as_ref()
        .map(|raw| raw.as_deref().and_then(|raw| check_date(errors, field, raw)))
}
