use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-validation-must-be-long-enough";

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Point storage at a mock server.
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            server_port: 3000,
            display_utc_offset_minutes: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "caregiver".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn caregiver(email: &str) -> Self {
        Self::new(email, "caregiver")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let claims = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "aud": "authenticated",
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("HS256 encoding accepts any key")
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Canned storage rows shaped like the tables the cells read.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn family_row(family_id: Uuid, created_by: &str, invite_code: &str) -> Value {
        json!({
            "id": family_id,
            "name": "Kim Family",
            "created_by": created_by,
            "invite_code": invite_code,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        })
    }

    pub fn member_row(
        member_id: Uuid,
        family_id: Uuid,
        user_id: &str,
        relationship: &str,
        health_score: Option<i32>,
    ) -> Value {
        json!({
            "id": member_id,
            "family_id": family_id,
            "user_id": user_id,
            "nickname": "member",
            "relationship": relationship,
            "health_score": health_score,
            "joined_at": "2025-01-01T00:00:00Z",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        })
    }

    pub fn medication_row(
        medication_id: Uuid,
        family_id: Uuid,
        member_id: Uuid,
        schedule_times: &[&str],
    ) -> Value {
        json!({
            "id": medication_id,
            "family_id": family_id,
            "member_id": member_id,
            "name": "Amlodipine",
            "dosage": "5mg",
            "frequency": "twice daily",
            "schedule_times": schedule_times,
            "start_date": "2025-01-01",
            "end_date": null,
            "notes": null,
            "is_active": true,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        })
    }

    pub fn medication_log_row(
        log_id: Uuid,
        medication_id: Uuid,
        family_id: Uuid,
        member_id: Uuid,
        scheduled_date: &str,
        scheduled_time: &str,
        status: &str,
    ) -> Value {
        json!({
            "id": log_id,
            "medication_id": medication_id,
            "family_id": family_id,
            "member_id": member_id,
            "scheduled_date": scheduled_date,
            "scheduled_time": scheduled_time,
            "status": status,
            "taken_at": if status == "taken" { json!("2025-01-01T08:05:00Z") } else { Value::Null },
            "notes": null,
            "created_at": "2025-01-01T00:00:00Z"
        })
    }

    pub fn vital_row(
        vital_id: Uuid,
        family_id: Uuid,
        member_id: Uuid,
        vital_type: &str,
        value: &str,
        measured_at: &str,
    ) -> Value {
        let unit = match vital_type {
            "blood_pressure" => "mmHg",
            "blood_sugar" => "mg/dL",
            "weight" => "kg",
            _ => "bpm",
        };
        json!({
            "id": vital_id,
            "family_id": family_id,
            "member_id": member_id,
            "type": vital_type,
            "value": value,
            "unit": unit,
            "measured_at": measured_at,
            "notes": null,
            "created_at": measured_at
        })
    }

    pub fn task_row(task_id: Uuid, family_id: Uuid, member_id: Uuid, status: &str) -> Value {
        json!({
            "id": task_id,
            "family_id": family_id,
            "member_id": member_id,
            "title": "Book eye exam",
            "description": null,
            "due_date": "2025-02-01",
            "priority": "medium",
            "status": status,
            "category": "general",
            "completed_at": null,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        })
    }

    pub fn product_row(product_id: Uuid, family_id: Uuid, expiry_date: Option<&str>) -> Value {
        json!({
            "id": product_id,
            "family_id": family_id,
            "member_id": null,
            "name": "Omega-3",
            "category": "supplement",
            "stock_quantity": 60,
            "unit": "capsules",
            "expiry_date": expiry_date,
            "purchase_date": "2025-01-01",
            "notes": null,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "code": code,
            "message": message,
            "details": null,
            "hint": null
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert!(!app_config.supabase_jwt_secret.is_empty());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::patient("grandpa@example.com");
        assert_eq!(user.role, "patient");

        let user_model = user.to_user();
        assert_eq!(user_model.email, Some(user.email.clone()));
        assert_eq!(user_model.id, user.id);
    }

    #[test]
    fn test_jwt_token_creation() {
        let token = JwtTestUtils::create_test_token(&TestUser::default(), "test-secret", Some(1));
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_fixture_rows_deserialize() {
        let family_id = Uuid::new_v4();
        let member: shared_models::family::FamilyMember = serde_json::from_value(
            MockSupabaseResponses::member_row(Uuid::new_v4(), family_id, "u1", "self", Some(90)),
        )
        .unwrap();
        assert_eq!(member.family_id, family_id);

        let vital: shared_models::vital::Vital = serde_json::from_value(MockSupabaseResponses::vital_row(
            Uuid::new_v4(),
            family_id,
            member.id,
            "blood_pressure",
            "120/80",
            "2025-01-02T07:30:00Z",
        ))
        .unwrap();
        assert_eq!(vital.unit, "mmHg");
    }
}
