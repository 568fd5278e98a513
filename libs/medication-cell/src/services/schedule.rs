use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use shared_models::medication::{Medication, MedicationLogStatus};

/// A pending log row that should exist for a scheduled dose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedDose {
    pub medication_id: Uuid,
    pub family_id: Uuid,
    pub member_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: String,
    pub status: MedicationLogStatus,
}

/// Every dose expected on `date` across `medications`, ordered by time.
///
/// Medications that are inactive or outside their course on `date` contribute
/// nothing. A time listed twice on one medication yields a single dose.
pub fn planned_doses(medications: &[Medication], date: NaiveDate) -> Vec<PlannedDose> {
    let mut doses: Vec<PlannedDose> = Vec::new();

    for medication in medications.iter().filter(|m| m.is_scheduled_on(date)) {
        for time in &medication.schedule_times {
            let duplicate = doses
                .iter()
                .any(|d| d.medication_id == medication.id && &d.scheduled_time == time);
            if duplicate {
                continue;
            }
            doses.push(PlannedDose {
                medication_id: medication.id,
                family_id: medication.family_id,
                member_id: medication.member_id,
                scheduled_date: date,
                scheduled_time: time.clone(),
                status: MedicationLogStatus::Pending,
            });
        }
    }

    doses.sort_by(|a, b| a.scheduled_time.cmp(&b.scheduled_time));
    doses
}
