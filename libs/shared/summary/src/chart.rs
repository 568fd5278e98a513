use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate};
use serde::Serialize;

use shared_models::validation::parse_blood_pressure;
use shared_models::vital::{Vital, VitalType};

/// One calendar day of readings, shaped for a line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub systolic: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diastolic: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_sugar: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
}

impl ChartPoint {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            systolic: None,
            diastolic: None,
            blood_sugar: None,
            weight: None,
            heart_rate: None,
        }
    }
}

/// Group readings by the date users see them on, oldest day first.
///
/// When a day has several readings of one type the latest one wins. Readings
/// whose value cannot be parsed are left out.
pub fn group_vitals_by_date(vitals: &[Vital], offset: FixedOffset) -> Vec<ChartPoint> {
    let mut ordered: Vec<&Vital> = vitals.iter().collect();
    ordered.sort_by_key(|vital| vital.measured_at);

    let mut days: BTreeMap<NaiveDate, ChartPoint> = BTreeMap::new();

    for vital in ordered {
        let date = vital.measured_at.with_timezone(&offset).date_naive();

        match vital.vital_type {
            VitalType::BloodPressure => {
                if let Some((systolic, diastolic)) = parse_blood_pressure(&vital.value) {
                    let point = days.entry(date).or_insert_with(|| ChartPoint::empty(date));
                    point.systolic = Some(f64::from(systolic));
                    point.diastolic = Some(f64::from(diastolic));
                }
            }
            other => {
                let Some(reading) = vital.value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
                else {
                    continue;
                };
                let point = days.entry(date).or_insert_with(|| ChartPoint::empty(date));
                match other {
                    VitalType::BloodSugar => point.blood_sugar = Some(reading),
                    VitalType::Weight => point.weight = Some(reading),
                    VitalType::HeartRate => point.heart_rate = Some(reading),
                    VitalType::BloodPressure => {}
                }
            }
        }
    }

    days.into_values().collect()
}

/// Keep the last `n` points of an oldest-first series.
pub fn most_recent(mut points: Vec<ChartPoint>, n: usize) -> Vec<ChartPoint> {
    let skip = points.len().saturating_sub(n);
    points.drain(..skip);
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    fn vital(vital_type: VitalType, value: &str, measured_at: &str) -> Vital {
        Vital {
            id: Uuid::new_v4(),
            family_id: Uuid::nil(),
            member_id: Uuid::nil(),
            vital_type,
            value: value.to_string(),
            unit: vital_type.unit().to_string(),
            measured_at: measured_at.parse::<DateTime<Utc>>().unwrap(),
            notes: None,
            created_at: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_groups_by_day_oldest_first() {
        // Input arrives newest first, as the list endpoint returns it.
        let vitals = vec![
            vital(VitalType::HeartRate, "72", "2025-03-02T09:00:00Z"),
            vital(VitalType::BloodPressure, "118/76", "2025-03-02T08:00:00Z"),
            vital(VitalType::Weight, "70.5", "2025-03-01T07:00:00Z"),
        ];

        let points = group_vitals_by_date(&vitals, utc());

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, date(2025, 3, 1));
        assert_eq!(points[0].weight, Some(70.5));
        assert_eq!(points[1].date, date(2025, 3, 2));
        assert_eq!(points[1].systolic, Some(118.0));
        assert_eq!(points[1].diastolic, Some(76.0));
        assert_eq!(points[1].heart_rate, Some(72.0));
    }

    #[test]
    fn test_uses_display_offset_for_the_day() {
        let vitals = vec![vital(VitalType::BloodSugar, "101", "2025-03-01T20:00:00Z")];

        let seoul = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(group_vitals_by_date(&vitals, seoul)[0].date, date(2025, 3, 2));
        assert_eq!(group_vitals_by_date(&vitals, utc())[0].date, date(2025, 3, 1));
    }

    #[test]
    fn test_latest_reading_of_day_wins() {
        let vitals = vec![
            vital(VitalType::BloodSugar, "140", "2025-03-01T20:00:00Z"),
            vital(VitalType::BloodSugar, "95", "2025-03-01T07:00:00Z"),
        ];
        assert_eq!(group_vitals_by_date(&vitals, utc())[0].blood_sugar, Some(140.0));
    }

    #[test]
    fn test_malformed_values_are_skipped() {
        let vitals = vec![
            vital(VitalType::BloodPressure, "high", "2025-03-01T08:00:00Z"),
            vital(VitalType::HeartRate, "", "2025-03-02T08:00:00Z"),
        ];
        assert!(group_vitals_by_date(&vitals, utc()).is_empty());
    }

    #[test]
    fn test_most_recent_keeps_tail_in_order() {
        let points: Vec<ChartPoint> = (1..=20).map(|d| ChartPoint::empty(date(2025, 3, d))).collect();

        let trimmed = most_recent(points, 14);

        assert_eq!(trimmed.len(), 14);
        assert_eq!(trimmed.first().unwrap().date, date(2025, 3, 7));
        assert_eq!(trimmed.last().unwrap().date, date(2025, 3, 20));
        assert_eq!(most_recent(trimmed, 100).len(), 14);
    }
}
