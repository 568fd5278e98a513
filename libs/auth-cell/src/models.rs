use serde::{Deserialize, Serialize};

use shared_models::auth::UserRole;
use shared_models::error::{AppError, FieldErrors};
use shared_models::validation::require_text;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<UserRole>,
    pub preferences: Option<serde_json::Value>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        if let Some(full_name) = &self.full_name {
            require_text(&mut errors, "full_name", full_name, 100);
        }
        if let Some(url) = &self.avatar_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                errors.add("avatar_url", "must be an http(s) URL");
            }
        }
        if let Some(preferences) = &self.preferences {
            if !preferences.is_object() {
                errors.add("preferences", "must be a JSON object");
            }
        }
        errors.into_result()
    }

    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.avatar_url.is_none()
            && self.role.is_none()
            && self.preferences.is_none()
    }
}
