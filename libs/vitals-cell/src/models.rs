use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::{AppError, FieldErrors};
use shared_models::validation::{is_valid_blood_pressure, is_valid_numeric_reading};
use shared_models::vital::{Vital, VitalType};
use shared_summary::is_vital_in_normal_range;

pub const DEFAULT_WINDOW_DAYS: u32 = 30;
pub const MAX_WINDOW_DAYS: u32 = 365;
pub const DEFAULT_CHART_POINTS: usize = 14;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVitalRequest {
    pub member_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub vital_type: VitalType,
    pub value: String,
    pub measured_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl CreateVitalRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        let value = self.value.trim();

        match self.vital_type {
            VitalType::BloodPressure if !is_valid_blood_pressure(value) => {
                errors.add("value", "blood pressure must look like 120/80");
            }
            VitalType::BloodPressure => {}
            _ if !is_valid_numeric_reading(value) => {
                errors.add("value", "must be a number");
            }
            _ => {}
        }

        if self.notes.as_ref().is_some_and(|notes| notes.chars().count() > 500) {
            errors.add("notes", "must be at most 500 characters");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VitalListQuery {
    #[serde(rename = "type")]
    pub vital_type: Option<VitalType>,
    pub days: Option<u32>,
    pub member_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartQuery {
    pub days: Option<u32>,
    pub limit: Option<usize>,
}

pub fn window_days(days: Option<u32>) -> Result<u32, AppError> {
    let days = days.unwrap_or(DEFAULT_WINDOW_DAYS);
    if days == 0 || days > MAX_WINDOW_DAYS {
        let mut errors = FieldErrors::new();
        errors.add("days", format!("must be between 1 and {}", MAX_WINDOW_DAYS));
        return Err(AppError::ValidationError(errors));
    }
    Ok(days)
}

/// A measurement plus whether it falls inside the reference range.
#[derive(Debug, Clone, Serialize)]
pub struct VitalView {
    #[serde(flatten)]
    pub vital: Vital,
    pub in_normal_range: bool,
}

impl From<Vital> for VitalView {
    fn from(vital: Vital) -> Self {
        let in_normal_range = is_vital_in_normal_range(&vital);
        Self {
            vital,
            in_normal_range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn request(vital_type: VitalType, value: &str) -> CreateVitalRequest {
        CreateVitalRequest {
            member_id: None,
            vital_type,
            value: value.to_string(),
            measured_at: None,
            notes: None,
        }
    }

    #[test]
    fn test_blood_pressure_format() {
        assert!(request(VitalType::BloodPressure, "120/80").validate().is_ok());
        assert_matches!(
            request(VitalType::BloodPressure, "120-80").validate(),
            Err(AppError::ValidationError(fields)) if fields.contains("value")
        );
        assert!(request(VitalType::BloodPressure, "1200/80").validate().is_err());
    }

    #[test]
    fn test_numeric_readings() {
        assert!(request(VitalType::Weight, "72.5").validate().is_ok());
        assert!(request(VitalType::HeartRate, "72").validate().is_ok());
        assert!(request(VitalType::BloodSugar, "high").validate().is_err());
        assert!(request(VitalType::Weight, "-3").validate().is_err());
    }

    #[test]
    fn test_window_days() {
        assert_eq!(window_days(None).unwrap(), 30);
        assert!(window_days(Some(0)).is_err());
        assert_eq!(window_days(Some(7)).unwrap(), 7);
    }
}
