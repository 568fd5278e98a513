use shared_models::validation::parse_blood_pressure;
use shared_models::vital::{Vital, VitalType};

const SYSTOLIC: (f64, f64) = (90.0, 140.0);
const DIASTOLIC: (f64, f64) = (60.0, 90.0);
const BLOOD_SUGAR_FASTING: (f64, f64) = (70.0, 126.0);
const HEART_RATE_RESTING: (f64, f64) = (60.0, 100.0);

fn within((min, max): (f64, f64), value: f64) -> bool {
    value >= min && value <= max
}

fn parse_reading(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Whether a reading sits in the normal adult range for its type.
///
/// Unparseable values are reported as out of range. Weight has no population
/// range and is always considered normal.
pub fn is_vital_in_normal_range(vital: &Vital) -> bool {
    match vital.vital_type {
        VitalType::BloodPressure => match parse_blood_pressure(&vital.value) {
            Some((systolic, diastolic)) => {
                within(SYSTOLIC, f64::from(systolic)) && within(DIASTOLIC, f64::from(diastolic))
            }
            None => false,
        },
        VitalType::BloodSugar => {
            parse_reading(&vital.value).map_or(false, |v| within(BLOOD_SUGAR_FASTING, v))
        }
        VitalType::HeartRate => {
            parse_reading(&vital.value).map_or(false, |v| within(HEART_RATE_RESTING, v))
        }
        VitalType::Weight => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn vital(vital_type: VitalType, value: &str) -> Vital {
        Vital {
            id: Uuid::new_v4(),
            family_id: Uuid::nil(),
            member_id: Uuid::nil(),
            vital_type,
            value: value.to_string(),
            unit: vital_type.unit().to_string(),
            measured_at: Utc::now(),
            notes: None,
            created_at: None,
        }
    }

    #[test]
    fn test_blood_pressure() {
        assert!(is_vital_in_normal_range(&vital(VitalType::BloodPressure, "120/80")));
        assert!(is_vital_in_normal_range(&vital(VitalType::BloodPressure, "90/60")));
        assert!(is_vital_in_normal_range(&vital(VitalType::BloodPressure, "140/90")));
        assert!(!is_vital_in_normal_range(&vital(VitalType::BloodPressure, "200/80")));
        assert!(!is_vital_in_normal_range(&vital(VitalType::BloodPressure, "120/95")));
    }

    #[test]
    fn test_weight_has_no_range() {
        assert!(is_vital_in_normal_range(&vital(VitalType::Weight, "999")));
        assert!(is_vital_in_normal_range(&vital(VitalType::Weight, "not a number")));
    }

    #[test]
    fn test_blood_sugar_and_heart_rate() {
        assert!(is_vital_in_normal_range(&vital(VitalType::BloodSugar, "98")));
        assert!(!is_vital_in_normal_range(&vital(VitalType::BloodSugar, "180")));
        assert!(is_vital_in_normal_range(&vital(VitalType::HeartRate, "72")));
        assert!(!is_vital_in_normal_range(&vital(VitalType::HeartRate, "45")));
        assert!(is_vital_in_normal_range(&vital(VitalType::HeartRate, "99.5")));
    }

    #[test]
    fn test_malformed_values_fail_closed() {
        assert!(!is_vital_in_normal_range(&vital(VitalType::BloodPressure, "120")));
        assert!(!is_vital_in_normal_range(&vital(VitalType::BloodPressure, "abc/def")));
        assert!(!is_vital_in_normal_range(&vital(VitalType::BloodSugar, "")));
        assert!(!is_vital_in_normal_range(&vital(VitalType::HeartRate, "NaN")));
        assert!(!is_vital_in_normal_range(&vital(VitalType::HeartRate, "inf")));
    }
}
