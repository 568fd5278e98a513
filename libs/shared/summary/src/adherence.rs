use serde::Serialize;

use shared_models::medication::{MedicationLog, MedicationLogStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdherenceSummary {
    pub decided_doses: usize,
    pub taken_doses: usize,
}

impl AdherenceSummary {
    pub fn from_logs(logs: &[MedicationLog]) -> Self {
        let decided = logs.iter().filter(|log| log.status.is_decided());
        let (decided_doses, taken_doses) = decided.fold((0, 0), |(decided, taken), log| {
            let taken_inc = usize::from(log.status == MedicationLogStatus::Taken);
            (decided + 1, taken + taken_inc)
        });
        Self { decided_doses, taken_doses }
    }

    /// Percentage of decided doses that were taken; `None` when nothing is decided yet.
    pub fn rate(&self) -> Option<u8> {
        if self.decided_doses == 0 {
            return None;
        }
        let pct = 100.0 * self.taken_doses as f64 / self.decided_doses as f64;
        Some(pct.round() as u8)
    }
}

pub fn adherence_rate_checked(logs: &[MedicationLog]) -> Option<u8> {
    AdherenceSummary::from_logs(logs).rate()
}

/// Adherence in percent, 0 when no dose has been taken or skipped yet.
pub fn adherence_rate(logs: &[MedicationLog]) -> u8 {
    adherence_rate_checked(logs).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn log(status: MedicationLogStatus) -> MedicationLog {
        MedicationLog {
            id: Uuid::new_v4(),
            medication_id: Uuid::nil(),
            family_id: Uuid::nil(),
            member_id: Uuid::nil(),
            scheduled_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            scheduled_time: "08:00".to_string(),
            status,
            taken_at: None,
            notes: None,
            created_at: None,
            medication: None,
        }
    }

    use MedicationLogStatus::{Pending, Skipped, Taken};

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(adherence_rate(&[]), 0);
        assert_eq!(adherence_rate_checked(&[]), None);
    }

    #[test]
    fn test_all_taken() {
        assert_eq!(adherence_rate(&[log(Taken), log(Taken)]), 100);
    }

    #[test]
    fn test_half_taken() {
        assert_eq!(adherence_rate(&[log(Taken), log(Skipped)]), 50);
    }

    #[test]
    fn test_pending_is_ignored() {
        assert_eq!(adherence_rate(&[log(Pending), log(Pending)]), 0);
        assert_eq!(adherence_rate_checked(&[log(Pending)]), None);
        assert_eq!(adherence_rate(&[log(Taken), log(Pending), log(Pending)]), 100);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(adherence_rate(&[log(Taken), log(Skipped), log(Skipped)]), 33);
        assert_eq!(adherence_rate(&[log(Taken), log(Taken), log(Skipped)]), 67);
    }

    #[test]
    fn test_summary_counts() {
        let summary = AdherenceSummary::from_logs(&[log(Taken), log(Skipped), log(Pending)]);
        assert_eq!(summary, AdherenceSummary { decided_doses: 2, taken_doses: 1 });
    }
}
