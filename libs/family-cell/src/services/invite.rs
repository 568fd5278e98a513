use rand::Rng;
use serde_json::json;
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::{DbError, SupabaseClient};
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::validation::{INVITE_CODE_ALPHABET, INVITE_CODE_LENGTH};

use crate::models::{FamilyError, FamilyWithMember, JoinFamilyRequest, MembershipResponse};

pub const MAX_INVITE_CODE_ATTEMPTS: usize = 10;

const DEFAULT_JOIN_NICKNAME: &str = "User";

pub fn generate_invite_code() -> String {
    generate_invite_code_with(&mut rand::thread_rng())
}

pub fn generate_invite_code_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..INVITE_CODE_LENGTH)
        .map(|_| INVITE_CODE_ALPHABET[rng.gen_range(0..INVITE_CODE_ALPHABET.len())] as char)
        .collect()
}

pub struct InviteCodeService {
    supabase: SupabaseClient,
}

impl InviteCodeService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Generate codes until one is not used by any family.
    ///
    /// Other families are invisible to the caller, so the check goes through
    /// the `invite_code_in_use` function rather than a table read.
    pub async fn unused_code(&self, auth_token: &str) -> Result<String, AppError> {
        for attempt in 1..=MAX_INVITE_CODE_ATTEMPTS {
            let code = generate_invite_code();
            let in_use: bool = self
                .supabase
                .rpc("invite_code_in_use", auth_token, json!({ "p_invite_code": code }))
                .await?;

            if !in_use {
                return Ok(code);
            }
            warn!("Invite code collision on attempt {}", attempt);
        }

        Err(FamilyError::InviteCodesExhausted {
            attempts: MAX_INVITE_CODE_ATTEMPTS,
        }
        .into())
    }

    /// Join the family behind `invite_code`.
    ///
    /// Lookup and insert run in the `join_family` storage function. An unknown
    /// code answers 404; the `(family_id, user_id)` unique constraint turns a
    /// second join by the same user, concurrent or not, into `AlreadyMember`.
    pub async fn join_family(
        &self,
        user: &User,
        request: JoinFamilyRequest,
        auth_token: &str,
    ) -> Result<MembershipResponse, AppError> {
        request.validate()?;
        let code = request.normalized_code();
        debug!("User {} joining family with invite code", user.id);

        let nickname = request
            .nickname
            .as_deref()
            .map(str::trim)
            .filter(|nickname| !nickname.is_empty())
            .or_else(|| user.email_handle())
            .unwrap_or(DEFAULT_JOIN_NICKNAME)
            .to_string();

        let args = json!({
            "p_invite_code": code,
            "p_relationship": request.relationship.unwrap_or_default(),
            "p_nickname": nickname,
        });

        let joined: FamilyWithMember = match self
            .supabase
            .rpc("join_family", auth_token, args)
            .await
        {
            Ok(joined) => joined,
            Err(DbError::NotFound(_)) => return Err(FamilyError::UnknownInviteCode.into()),
            Err(err) if err.is_conflict() => return Err(FamilyError::AlreadyMember.into()),
            Err(err) => return Err(err.into()),
        };

        info!("User {} joined family {}", user.id, joined.family.id);
        Ok(joined.into())
    }
}
