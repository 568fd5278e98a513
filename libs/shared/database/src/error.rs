use serde::Deserialize;
use thiserror::Error;

use shared_models::error::AppError;

/// PostgreSQL error code for a violated unique constraint.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
}

impl DbError {
    /// Classify a non-success response from the storage API.
    pub fn from_response(status: u16, body: String) -> Self {
        let code = serde_json::from_str::<PostgrestErrorBody>(&body)
            .ok()
            .and_then(|parsed| parsed.code);

        if code.as_deref() == Some(UNIQUE_VIOLATION) {
            return DbError::Conflict(body);
        }

        match status {
            401 => DbError::Auth(body),
            403 => DbError::Forbidden(body),
            404 => DbError::NotFound(body),
            409 => DbError::Conflict(body),
            _ => DbError::Api { status, message: body },
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, DbError::Conflict(_))
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Auth(_) => AppError::Auth("Invalid or expired session".to_string()),
            DbError::Forbidden(_) => AppError::Forbidden("Access denied".to_string()),
            DbError::NotFound(_) => AppError::NotFound("Resource not found".to_string()),
            DbError::Conflict(_) => AppError::Conflict("Record already exists".to_string()),
            other => AppError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_unique_violation_is_conflict_regardless_of_status() {
        let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#;
        assert_matches!(DbError::from_response(400, body.to_string()), DbError::Conflict(_));
        assert_matches!(DbError::from_response(409, String::new()), DbError::Conflict(_));
    }

    #[test]
    fn test_status_classification() {
        assert_matches!(DbError::from_response(401, "jwt expired".into()), DbError::Auth(_));
        assert_matches!(DbError::from_response(403, "rls".into()), DbError::Forbidden(_));
        assert_matches!(DbError::from_response(404, "missing".into()), DbError::NotFound(_));
        assert_matches!(
            DbError::from_response(500, "boom".into()),
            DbError::Api { status: 500, .. }
        );
    }

    #[test]
    fn test_storage_details_do_not_reach_app_error_message() {
        let err: AppError = DbError::from_response(403, "policy families_select".into()).into();
        assert_matches!(err, AppError::Forbidden(msg) if msg == "Access denied");
    }
}
