use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::{AppError, FieldErrors};
use shared_models::medication::MedicationLogStatus;
use shared_models::patch::{check_nullable_date, nullable, Nullable};
use shared_models::validation::{check_date, is_valid_time, require_text};

pub const DEFAULT_ADHERENCE_DAYS: u32 = 30;
pub const MAX_ADHERENCE_DAYS: u32 = 365;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMedicationRequest {
    /// Family member the medication is for; the caller when absent.
    pub member_id: Option<Uuid>,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub schedule_times: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub notes: Option<String>,
}

/// Validated course dates of a medication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseDates {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl CreateMedicationRequest {
    /// Check the payload; `today` is the start date when none is given.
    pub fn validate(&self, today: NaiveDate) -> Result<CourseDates, AppError> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "name", &self.name, 100);
        require_text(&mut errors, "dosage", &self.dosage, 50);
        require_text(&mut errors, "frequency", &self.frequency, 50);
        check_schedule_times(&mut errors, &self.schedule_times);

        let start = match &self.start_date {
            Some(raw) => check_date(&mut errors, "start_date", raw),
            None => Some(today),
        };
        let end = self
            .end_date
            .as_deref()
            .and_then(|raw| check_date(&mut errors, "end_date", raw));
        check_course(&mut errors, start, end);

        errors.into_result()?;
        Ok(CourseDates {
            start: start.unwrap_or(today),
            end,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMedicationRequest {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub schedule_times: Option<Vec<String>>,
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub end_date: Nullable<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub notes: Nullable<String>,
    pub is_active: Option<bool>,
}

impl UpdateMedicationRequest {
    /// Check the fields present and return the parsed `(start_date, end_date)`.
    /// `end_date` keeps the absent/cleared distinction.
    pub fn validate(&self) -> Result<(Option<NaiveDate>, Nullable<NaiveDate>), AppError> {
        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            require_text(&mut errors, "name", name, 100);
        }
        if let Some(dosage) = &self.dosage {
            require_text(&mut errors, "dosage", dosage, 50);
        }
        if let Some(frequency) = &self.frequency {
            require_text(&mut errors, "frequency", frequency, 50);
        }
        if let Some(times) = &self.schedule_times {
            check_schedule_times(&mut errors, times);
        }
        let start = self
            .start_date
            .as_deref()
            .and_then(|raw| check_date(&mut errors, "start_date", raw));
        let end = check_nullable_date(&mut errors, "end_date", &self.end_date);

        errors.into_result()?;
        Ok((start, end))
    }
}

pub(crate) fn check_course(
    errors: &mut FieldErrors,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            errors.add("end_date", "must not be before start_date");
        }
    }
}

fn check_schedule_times(errors: &mut FieldErrors, times: &[String]) {
    if times.is_empty() {
        errors.add("schedule_times", "at least one time is required");
        return;
    }
    if let Some(bad) = times.iter().find(|time| !is_valid_time(time)) {
        errors.add("schedule_times", format!("'{}' is not a valid HH:MM time", bad));
        return;
    }
    let mut seen = Vec::with_capacity(times.len());
    for time in times {
        if seen.contains(&time) {
            errors.add("schedule_times", format!("'{}' is listed twice", time));
            return;
        }
        seen.push(time);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedicationListQuery {
    pub member_id: Option<Uuid>,
    pub active_only: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogListQuery {
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateLogRequest {
    pub status: MedicationLogStatus,
    pub taken_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdherenceQuery {
    pub days: Option<u32>,
}

impl AdherenceQuery {
    pub fn window_days(&self) -> Result<u32, AppError> {
        let days = self.days.unwrap_or(DEFAULT_ADHERENCE_DAYS);
        if days == 0 || days > MAX_ADHERENCE_DAYS {
            let mut errors = FieldErrors::new();
            errors.add("days", format!("must be between 1 and {}", MAX_ADHERENCE_DAYS));
            return Err(AppError::ValidationError(errors));
        }
        Ok(days)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MedicationAdherence {
    pub medication_id: Uuid,
    pub days: u32,
    pub adherence_rate: u8,
    pub decided_doses: usize,
    pub taken_doses: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn request(times: &[&str]) -> CreateMedicationRequest {
        CreateMedicationRequest {
            member_id: None,
            name: "Metformin".to_string(),
            dosage: "500mg".to_string(),
            frequency: "twice daily".to_string(),
            schedule_times: times.iter().map(|t| t.to_string()).collect(),
            start_date: None,
            end_date: None,
            notes: None,
        }
    }

    #[test]
    fn test_start_date_defaults_to_today() {
        let dates = request(&["08:00", "20:00"]).validate(today()).unwrap();
        assert_eq!(dates.start, today());
        assert_eq!(dates.end, None);
    }

    #[test]
    fn test_schedule_times_rules() {
        assert_matches!(
            request(&[]).validate(today()),
            Err(AppError::ValidationError(fields)) if fields.contains("schedule_times")
        );
        assert_matches!(
            request(&["8:00"]).validate(today()),
            Err(AppError::ValidationError(fields)) if fields.contains("schedule_times")
        );
        assert_matches!(
            request(&["08:00", "08:00"]).validate(today()),
            Err(AppError::ValidationError(fields)) if fields.contains("schedule_times")
        );
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut req = request(&["08:00"]);
        req.start_date = Some("2025-03-10".to_string());
        req.end_date = Some("2025-03-01".to_string());
        assert_matches!(
            req.validate(today()),
            Err(AppError::ValidationError(fields)) if fields.contains("end_date")
        );
    }

    #[test]
    fn test_update_tells_cleared_end_date_from_absent() {
        let cleared: UpdateMedicationRequest =
            serde_json::from_value(serde_json::json!({ "end_date": null, "notes": null })).unwrap();
        assert_eq!(cleared.validate().unwrap(), (None, Some(None)));
        assert_eq!(cleared.notes, Some(None));

        let untouched: UpdateMedicationRequest =
            serde_json::from_value(serde_json::json!({ "name": "Metformin XR" })).unwrap();
        assert_eq!(untouched.validate().unwrap(), (None, None));
        assert_eq!(untouched.notes, None);
    }

    #[test]
    fn test_adherence_window_bounds() {
        assert_eq!(AdherenceQuery::default().window_days().unwrap(), 30);
        assert!(AdherenceQuery { days: Some(0) }.window_days().is_err());
        assert!(AdherenceQuery { days: Some(400) }.window_days().is_err());
    }
}
