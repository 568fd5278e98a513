use chrono::Utc;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::family::{Family, FamilyMember};

use crate::models::{
    CreateFamilyRequest, FamilyError, FamilyMemberView, FamilyOverview, FamilyWithMember,
    UpdateMemberRequest,
};
use crate::services::invite::InviteCodeService;
use crate::services::scope::{FamilyScope, ScopeService};

/// Attempts at the create RPC when a freshly checked invite code is taken in between.
const CREATE_FAMILY_ATTEMPTS: usize = 3;

const DEFAULT_OWNER_NICKNAME: &str = "Me";

const MEMBER_SELECT: &str = "*,user:users(full_name,email)";

#[derive(Debug, Deserialize)]
struct MemberOwnerRow {
    family_id: Uuid,
    user_id: String,
}

pub struct FamilyService {
    supabase: SupabaseClient,
    config: AppConfig,
}

impl FamilyService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            config: config.clone(),
        }
    }

    /// Members of every family the caller belongs to, oldest first.
    pub async fn list_members(
        &self,
        user: &User,
        auth_token: &str,
    ) -> Result<Vec<FamilyMemberView>, AppError> {
        match ScopeService::new(&self.config).resolve(user, auth_token).await? {
            Some(scope) => self.members_in(&scope, "created_at.asc", auth_token).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn members_in(
        &self,
        scope: &FamilyScope,
        order: &str,
        auth_token: &str,
    ) -> Result<Vec<FamilyMemberView>, AppError> {
        let path = format!(
            "/rest/v1/family_members?select={}&family_id={}&order={}",
            MEMBER_SELECT,
            scope.family_filter(),
            order
        );
        let members: Vec<FamilyMember> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(members.into_iter().map(FamilyMemberView::from).collect())
    }

    /// The caller's primary family with its members, if they have one.
    pub async fn overview(&self, user: &User, auth_token: &str) -> Result<FamilyOverview, AppError> {
        let Some(scope) = ScopeService::new(&self.config).resolve(user, auth_token).await? else {
            return Ok(FamilyOverview {
                family: None,
                members: Vec::new(),
            });
        };

        let path = format!("/rest/v1/families?id=eq.{}", scope.family_id);
        let families: Vec<Family> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let members = self.members_in(&scope, "created_at.asc", auth_token).await?;

        Ok(FamilyOverview {
            family: families.into_iter().next(),
            members,
        })
    }

    /// Create a family and its owner membership in one storage transaction.
    pub async fn create_family(
        &self,
        user: &User,
        request: CreateFamilyRequest,
        auth_token: &str,
    ) -> Result<FamilyWithMember, AppError> {
        request.validate()?;
        debug!("Creating family '{}' for user {}", request.name.trim(), user.id);

        let nickname = user.email_handle().unwrap_or(DEFAULT_OWNER_NICKNAME);
        let invites = InviteCodeService::new(&self.config);

        for attempt in 1..=CREATE_FAMILY_ATTEMPTS {
            let invite_code = invites.unused_code(auth_token).await?;
            let args = json!({
                "p_name": request.name.trim(),
                "p_invite_code": invite_code,
                "p_nickname": nickname,
            });

            match self
                .supabase
                .rpc::<FamilyWithMember>("create_family_with_owner", auth_token, args)
                .await
            {
                Ok(created) => {
                    info!("Family {} created by user {}", created.family.id, user.id);
                    return Ok(created);
                }
                Err(err) if err.is_conflict() => {
                    warn!("Invite code taken during family creation (attempt {})", attempt);
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(FamilyError::InviteCodesExhausted {
            attempts: CREATE_FAMILY_ATTEMPTS,
        }
        .into())
    }

    pub async fn update_member(
        &self,
        user: &User,
        member_id: Uuid,
        request: UpdateMemberRequest,
        auth_token: &str,
    ) -> Result<FamilyMemberView, AppError> {
        request.validate()?;

        let scopes = ScopeService::new(&self.config);
        let scope = scopes.require(user, auth_token).await?;
        let existing: FamilyMember = scopes
            .fetch_in_scope("family_members", member_id, &scope, auth_token, "Family member")
            .await?;

        let mut update_data = Map::new();
        if let Some(nickname) = request.nickname {
            update_data.insert("nickname".to_string(), json!(nickname.trim()));
        }
        if let Some(relationship) = request.relationship {
            update_data.insert("relationship".to_string(), json!(relationship));
        }
        if let Some(score) = request.health_score {
            update_data.insert("health_score".to_string(), json!(score));
        }

        if update_data.is_empty() {
            return Ok(existing.into());
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!(
            "/rest/v1/family_members?id=eq.{}&family_id={}",
            member_id,
            scope.family_filter()
        );
        let updated: Vec<FamilyMember> = self
            .supabase
            .write_returning(Method::PATCH, &path, auth_token, Some(Value::Object(update_data)))
            .await?;

        updated
            .into_iter()
            .next()
            .map(FamilyMemberView::from)
            .ok_or_else(|| FamilyError::MemberNotFound.into())
    }

    /// Remove a member from one of the caller's families.
    ///
    /// The self-removal and scope rules are predicates of the delete itself;
    /// the follow-up reads only explain why nothing was deleted.
    pub async fn remove_member(
        &self,
        user: &User,
        member_id: Uuid,
        auth_token: &str,
    ) -> Result<(), AppError> {
        let scope = ScopeService::new(&self.config)
            .require(user, auth_token)
            .await?;

        let path = format!(
            "/rest/v1/family_members?id=eq.{}&user_id=neq.{}&family_id={}",
            member_id,
            user.id,
            scope.family_filter()
        );
        let removed: Vec<Value> = self
            .supabase
            .write_returning(Method::DELETE, &path, auth_token, None)
            .await?;

        if !removed.is_empty() {
            info!("User {} removed family member {}", user.id, member_id);
            return Ok(());
        }

        let lookup = format!(
            "/rest/v1/family_members?select=family_id,user_id&id=eq.{}",
            member_id
        );
        let rows: Vec<MemberOwnerRow> = self
            .supabase
            .request(Method::GET, &lookup, Some(auth_token), None)
            .await?;

        let owner = match rows.first() {
            Some(row) if row.user_id == user.id => return Err(FamilyError::SelfRemoval.into()),
            Some(row) => Some(row.family_id),
            None => {
                ScopeService::new(&self.config)
                    .record_family_id("family_members", member_id, auth_token)
                    .await?
            }
        };

        let err = match owner {
            Some(family_id) if !scope.contains(family_id) => FamilyError::OtherFamily,
            _ => FamilyError::MemberNotFound,
        };
        Err(err.into())
    }
}
