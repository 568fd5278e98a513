use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::{AppError, FieldErrors};
use shared_models::family::{Family, FamilyMember, HealthStatus, Relationship};
use shared_models::validation::{is_valid_invite_code, require_text};
use shared_summary::member_status;

pub const PERSONAL_FAMILY_NAME: &str = "My Family";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFamilyRequest {
    pub name: String,
}

impl CreateFamilyRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "name", &self.name, 100);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinFamilyRequest {
    pub invite_code: String,
    pub relationship: Option<Relationship>,
    pub nickname: Option<String>,
}

impl JoinFamilyRequest {
    /// Codes are case-insensitive on input and stored upper case.
    pub fn normalized_code(&self) -> String {
        self.invite_code.trim().to_ascii_uppercase()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        if !is_valid_invite_code(&self.normalized_code()) {
            errors.add("invite_code", "must be 8 characters from A-Z and 2-9");
        }
        if let Some(nickname) = &self.nickname {
            require_text(&mut errors, "nickname", nickname, 50);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMemberRequest {
    pub nickname: Option<String>,
    pub relationship: Option<Relationship>,
    pub health_score: Option<i32>,
}

impl UpdateMemberRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        if let Some(nickname) = &self.nickname {
            require_text(&mut errors, "nickname", nickname, 50);
        }
        if let Some(score) = self.health_score {
            if !(0..=100).contains(&score) {
                errors.add("health_score", "must be between 0 and 100");
            }
        }
        errors.into_result()
    }
}

/// A member row plus the status derived from its score at read time.
#[derive(Debug, Clone, Serialize)]
pub struct FamilyMemberView {
    #[serde(flatten)]
    pub member: FamilyMember,
    pub status: HealthStatus,
}

impl From<FamilyMember> for FamilyMemberView {
    fn from(member: FamilyMember) -> Self {
        let status = member_status(&member);
        Self { member, status }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FamilyWithMember {
    pub family: Family,
    pub member: FamilyMember,
}

#[derive(Debug, Clone, Serialize)]
pub struct MembershipResponse {
    pub family: Family,
    pub member: FamilyMemberView,
}

impl From<FamilyWithMember> for MembershipResponse {
    fn from(created: FamilyWithMember) -> Self {
        Self {
            family: created.family,
            member: created.member.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FamilyOverview {
    pub family: Option<Family>,
    pub members: Vec<FamilyMemberView>,
}

#[derive(Debug, Clone, Error)]
pub enum FamilyError {
    #[error("Invalid invite code")]
    UnknownInviteCode,

    #[error("Already a member")]
    AlreadyMember,

    #[error("Family member not found")]
    MemberNotFound,

    #[error("You cannot remove yourself from the family")]
    SelfRemoval,

    #[error("Family member belongs to another family")]
    OtherFamily,

    #[error("Could not allocate a unique invite code after {attempts} attempts")]
    InviteCodesExhausted { attempts: usize },
}

impl From<FamilyError> for AppError {
    fn from(err: FamilyError) -> Self {
        let message = err.to_string();
        match err {
            FamilyError::UnknownInviteCode | FamilyError::MemberNotFound => {
                AppError::NotFound(message)
            }
            FamilyError::AlreadyMember | FamilyError::SelfRemoval => AppError::BadRequest(message),
            FamilyError::OtherFamily => AppError::Forbidden(message),
            FamilyError::InviteCodesExhausted { .. } => AppError::Internal(message),
        }
    }
}
