use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::auth::{User, UserProfile};
use shared_models::error::AppError;

use crate::models::UpdateProfileRequest;

pub struct ProfileService {
    supabase: SupabaseClient,
}

impl ProfileService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_profile(&self, user: &User, auth_token: &str) -> Result<UserProfile, AppError> {
        debug!("Fetching profile for user {}", user.id);

        let path = format!("/rest/v1/users?id=eq.{}", user.id);
        let profiles: Vec<UserProfile> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        profiles
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }

    pub async fn update_profile(
        &self,
        user: &User,
        request: UpdateProfileRequest,
        auth_token: &str,
    ) -> Result<UserProfile, AppError> {
        request.validate()?;
        if request.is_empty() {
            return self.get_profile(user, auth_token).await;
        }

        let mut update_data = Map::new();
        if let Some(full_name) = request.full_name {
            update_data.insert("full_name".to_string(), json!(full_name.trim()));
        }
        if let Some(avatar_url) = request.avatar_url {
            update_data.insert("avatar_url".to_string(), json!(avatar_url));
        }
        if let Some(role) = request.role {
            update_data.insert("role".to_string(), json!(role));
        }
        if let Some(preferences) = request.preferences {
            update_data.insert("preferences".to_string(), preferences);
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/users?id=eq.{}", user.id);
        let updated: Vec<UserProfile> = self
            .supabase
            .write_returning(Method::PATCH, &path, auth_token, Some(Value::Object(update_data)))
            .await?;

        let profile = updated
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

        info!("Profile updated for user {}", user.id);
        Ok(profile)
    }
}
