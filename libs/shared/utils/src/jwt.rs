use chrono::{TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::debug;

use shared_models::auth::{JwtClaims, User};
use shared_models::error::AppError;

/// Verify an HS256 access token issued by the identity provider.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<User, AppError> {
    if jwt_secret.is_empty() {
        return Err(AppError::Internal("JWT secret is not set".to_string()));
    }

    let mut validation = Validation::new(Algorithm::HS256);
    // Provider tokens carry `aud: authenticated`; the signature is what we trust.
    validation.validate_aud = false;

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        debug!("Token rejected: {}", e);
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::Auth("Token expired".to_string())
            }
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                AppError::Auth("Invalid token signature".to_string())
            }
            _ => AppError::Auth("Invalid token".to_string()),
        }
    })?;

    let claims = data.claims;
    if claims.sub.is_empty() {
        return Err(AppError::Auth("Token has no subject".to_string()));
    }

    let created_at = claims
        .iat
        .and_then(|timestamp| Utc.timestamp_opt(timestamp as i64, 0).single());

    let user = User {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
        metadata: claims.user_metadata,
        created_at,
    };

    debug!("Token validated successfully for user: {}", user.id);
    Ok(user)
}
