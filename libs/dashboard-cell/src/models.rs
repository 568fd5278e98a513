use serde::Serialize;

use family_cell::FamilyMemberView;
use shared_models::medication::MedicationLog;
use vitals_cell::VitalView;

pub const TODAYS_LOG_LIMIT: usize = 10;
pub const RECENT_VITALS_DAYS: i64 = 7;
pub const RECENT_VITALS_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSummary {
    pub avg_health_score: i32,
    pub medication_adherence: u8,
    pub vitals_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub todays_medications: Vec<MedicationLog>,
    pub family_members: Vec<FamilyMemberView>,
    pub recent_vitals: Vec<VitalView>,
    pub health_summary: HealthSummary,
}

impl DashboardSummary {
    /// What a user who has not created or joined a family sees.
    pub fn empty() -> Self {
        Self {
            todays_medications: Vec::new(),
            family_members: Vec::new(),
            recent_vitals: Vec::new(),
            health_summary: HealthSummary {
                avg_health_score: 0,
                medication_adherence: 0,
                vitals_count: 0,
            },
        }
    }
}
