use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalType {
    BloodPressure,
    BloodSugar,
    Weight,
    HeartRate,
}

impl VitalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VitalType::BloodPressure => "blood_pressure",
            VitalType::BloodSugar => "blood_sugar",
            VitalType::Weight => "weight",
            VitalType::HeartRate => "heart_rate",
        }
    }

    /// Unit stored alongside every measurement of this type.
    pub fn unit(&self) -> &'static str {
        match self {
            VitalType::BloodPressure => "mmHg",
            VitalType::BloodSugar => "mg/dL",
            VitalType::Weight => "kg",
            VitalType::HeartRate => "bpm",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vital {
    pub id: Uuid,
    pub family_id: Uuid,
    pub member_id: Uuid,
    #[serde(rename = "type")]
    pub vital_type: VitalType,
    pub value: String,
    pub unit: String,
    pub measured_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
