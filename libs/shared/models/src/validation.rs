//! Format rules enforced on every payload before it reaches storage.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::FieldErrors;

/// Characters used for invite codes. `I`, `O`, `0` and `1` are left out so
/// codes survive being read aloud or copied by hand.
pub const INVITE_CODE_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const INVITE_CODE_LENGTH: usize = 8;

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("time pattern"));
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern"));
static INVITE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z2-9]{8}$").expect("invite code pattern"));
static BLOOD_PRESSURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2,3})/(\d{2,3})$").expect("blood pressure pattern"));
static NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("numeric pattern"));

/// `HH:MM`, 00-23 hours and 00-59 minutes.
pub fn is_valid_time(value: &str) -> bool {
    TIME_RE.is_match(value)
}

/// `YYYY-MM-DD` that also names a real calendar day.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if !DATE_RE.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

pub fn is_valid_date(value: &str) -> bool {
    parse_date(value).is_some()
}

pub fn is_valid_invite_code(value: &str) -> bool {
    INVITE_CODE_RE.is_match(value)
}

pub fn is_valid_blood_pressure(value: &str) -> bool {
    BLOOD_PRESSURE_RE.is_match(value)
}

/// Split a `systolic/diastolic` reading.
pub fn parse_blood_pressure(value: &str) -> Option<(u32, u32)> {
    let caps = BLOOD_PRESSURE_RE.captures(value)?;
    let systolic = caps.get(1)?.as_str().parse().ok()?;
    let diastolic = caps.get(2)?.as_str().parse().ok()?;
    Some((systolic, diastolic))
}

/// Unsigned integer or decimal reading such as `98` or `72.5`.
pub fn is_valid_numeric_reading(value: &str) -> bool {
    NUMERIC_RE.is_match(value)
}

pub fn require_text(errors: &mut FieldErrors, field: &str, value: &str, max_len: usize) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, "is required");
    } else if trimmed.chars().count() > max_len {
        errors.add(field, format!("must be at most {} characters", max_len));
    }
}

pub fn check_date(errors: &mut FieldErrors, field: &str, value: &str) -> Option<NaiveDate> {
    let parsed = parse_date(value);
    if parsed.is_none() {
        errors.add(field, "must be a date in YYYY-MM-DD format");
    }
    parsed
}
