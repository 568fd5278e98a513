use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    pub family_id: Uuid,
    pub member_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub schedule_times: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Medication {
    /// Whether doses are expected on `date`.
    pub fn is_scheduled_on(&self, date: NaiveDate) -> bool {
        self.is_active
            && self.start_date <= date
            && self.end_date.map_or(true, |end| date <= end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedicationLogStatus {
    Pending,
    Taken,
    Skipped,
}

impl MedicationLogStatus {
    /// Taken and skipped doses count towards adherence; pending ones do not yet.
    pub fn is_decided(&self) -> bool {
        !matches!(self, MedicationLogStatus::Pending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationBrief {
    pub id: Option<Uuid>,
    pub name: String,
    pub dosage: String,
    pub frequency: Option<String>,
    pub notes: Option<String>,
}

/// One expected dose of a medication on a given date and time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationLog {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub family_id: Uuid,
    pub member_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: String,
    pub status: MedicationLogStatus,
    pub taken_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication: Option<MedicationBrief>,
}
