use shared_models::family::{FamilyMember, HealthStatus};

pub const GOOD_THRESHOLD: i32 = 80;
pub const FAIR_THRESHOLD: i32 = 60;

/// Score assumed for a member nobody has scored yet.
pub const BASELINE_SCORE: i32 = 100;

/// Average shown for a family with no scored members.
pub const DEFAULT_AVERAGE_SCORE: i32 = 85;

pub fn health_status_from_score(score: i32) -> HealthStatus {
    if score >= GOOD_THRESHOLD {
        HealthStatus::Good
    } else if score >= FAIR_THRESHOLD {
        HealthStatus::Fair
    } else {
        HealthStatus::NeedsReview
    }
}

pub fn member_status(member: &FamilyMember) -> HealthStatus {
    health_status_from_score(member.health_score.unwrap_or(BASELINE_SCORE))
}

/// Mean of the members' non-null scores, rounded half away from zero.
pub fn average_health_score(members: &[FamilyMember]) -> i32 {
    let scores: Vec<i32> = members.iter().filter_map(|m| m.health_score).collect();
    if scores.is_empty() {
        return DEFAULT_AVERAGE_SCORE;
    }
    let total: i64 = scores.iter().map(|&s| i64::from(s)).sum();
    (total as f64 / scores.len() as f64).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::family::Relationship;
    use uuid::Uuid;

    fn member(score: Option<i32>) -> FamilyMember {
        FamilyMember {
            id: Uuid::new_v4(),
            family_id: Uuid::nil(),
            user_id: Uuid::new_v4().to_string(),
            nickname: String::new(),
            relationship: Relationship::Other,
            health_score: score,
            joined_at: None,
            created_at: None,
            updated_at: None,
            user: None,
        }
    }

    #[test]
    fn test_status_bands() {
        for score in 80..=100 {
            assert_eq!(health_status_from_score(score), HealthStatus::Good);
        }
        for score in 60..=79 {
            assert_eq!(health_status_from_score(score), HealthStatus::Fair);
        }
        for score in 0..=59 {
            assert_eq!(health_status_from_score(score), HealthStatus::NeedsReview);
        }
    }

    #[test]
    fn test_status_boundaries() {
        assert_eq!(health_status_from_score(79), HealthStatus::Fair);
        assert_eq!(health_status_from_score(80), HealthStatus::Good);
        assert_eq!(health_status_from_score(59), HealthStatus::NeedsReview);
        assert_eq!(health_status_from_score(60), HealthStatus::Fair);
    }

    #[test]
    fn test_unscored_member_is_good() {
        assert_eq!(member_status(&member(None)), HealthStatus::Good);
        assert_eq!(member_status(&member(Some(42))), HealthStatus::NeedsReview);
    }

    #[test]
    fn test_average_excludes_null_scores() {
        let members = vec![member(Some(90)), member(Some(70)), member(None)];
        assert_eq!(average_health_score(&members), 80);
    }

    #[test]
    fn test_average_rounds() {
        assert_eq!(average_health_score(&[member(Some(70)), member(Some(71))]), 71);
        assert_eq!(average_health_score(&[member(Some(70)), member(Some(70)), member(Some(71))]), 70);
    }

    #[test]
    fn test_average_defaults_without_scores() {
        assert_eq!(average_health_score(&[]), DEFAULT_AVERAGE_SCORE);
        assert_eq!(average_health_score(&[member(None)]), DEFAULT_AVERAGE_SCORE);
    }
}
