use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{in_filter, SupabaseClient};
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{CreateFamilyRequest, PERSONAL_FAMILY_NAME};
use crate::services::family::FamilyService;

/// The families a caller may read and write, resolved from their memberships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyScope {
    pub user_id: String,
    /// The caller's own member row in their primary family.
    pub member_id: Uuid,
    /// Earliest-joined family; new records land here unless told otherwise.
    pub family_id: Uuid,
    pub family_ids: Vec<Uuid>,
}

impl FamilyScope {
    /// PostgREST filter value restricting a `family_id` column to this scope.
    pub fn family_filter(&self) -> String {
        in_filter(&self.family_ids)
    }

    pub fn contains(&self, family_id: Uuid) -> bool {
        self.family_ids.contains(&family_id)
    }
}

#[derive(Debug, Deserialize)]
struct MembershipRow {
    id: Uuid,
    family_id: Uuid,
}

pub struct ScopeService {
    supabase: SupabaseClient,
    config: AppConfig,
}

impl ScopeService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            config: config.clone(),
        }
    }

    /// `None` when the caller has not created or joined any family yet.
    pub async fn resolve(
        &self,
        user: &User,
        auth_token: &str,
    ) -> Result<Option<FamilyScope>, AppError> {
        debug!("Resolving family scope for user {}", user.id);

        let path = format!(
            "/rest/v1/family_members?select=id,family_id&user_id=eq.{}&order=joined_at.asc",
            user.id
        );
        let rows: Vec<MembershipRow> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(scope_from_rows(&user.id, rows))
    }

    /// Like [`resolve`](Self::resolve), but a caller with no family is an error.
    pub async fn require(&self, user: &User, auth_token: &str) -> Result<FamilyScope, AppError> {
        self.resolve(user, auth_token)
            .await?
            .ok_or_else(|| AppError::NotFound("You are not a member of any family".to_string()))
    }

    /// Resolve the scope, provisioning a personal family of one on first write.
    pub async fn ensure(&self, user: &User, auth_token: &str) -> Result<FamilyScope, AppError> {
        if let Some(scope) = self.resolve(user, auth_token).await? {
            return Ok(scope);
        }

        info!("Provisioning personal family for user {}", user.id);
        let request = CreateFamilyRequest {
            name: PERSONAL_FAMILY_NAME.to_string(),
        };
        let created = FamilyService::new(&self.config)
            .create_family(user, request, auth_token)
            .await?;

        Ok(FamilyScope {
            user_id: user.id.clone(),
            member_id: created.member.id,
            family_id: created.family.id,
            family_ids: vec![created.family.id],
        })
    }

    /// Resolve the member a record is written for, returning `(member_id, family_id)`.
    ///
    /// `None` targets the caller themselves.
    pub async fn target_member(
        &self,
        scope: &FamilyScope,
        member_id: Option<Uuid>,
        auth_token: &str,
    ) -> Result<(Uuid, Uuid), AppError> {
        match member_id {
            None => Ok((scope.member_id, scope.family_id)),
            Some(id) if id == scope.member_id => Ok((scope.member_id, scope.family_id)),
            Some(id) => {
                let row: MembershipRow = self
                    .fetch_in_scope("family_members", id, scope, auth_token, "Family member")
                    .await?;
                Ok((row.id, row.family_id))
            }
        }
    }

    /// Load a row by id and check that it belongs to one of the caller's families.
    ///
    /// Row policies hide other families' rows, so a miss is resolved through
    /// `record_family_id` to tell "not yours" (403) from "no such row" (404).
    pub async fn fetch_in_scope<T>(
        &self,
        table: &str,
        id: Uuid,
        scope: &FamilyScope,
        auth_token: &str,
        label: &str,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/{}?id=eq.{}", table, id);
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let Some(row) = rows.into_iter().next() else {
            let owner = self.record_family_id(table, id, auth_token).await?;
            return Err(scope_error(owner, scope, label));
        };

        let family_id = row
            .get("family_id")
            .and_then(Value::as_str)
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or_else(|| AppError::Internal(format!("{} row has no family_id", label)))?;

        if !scope.contains(family_id) {
            return Err(scope_error(Some(family_id), scope, label));
        }

        serde_json::from_value(row).map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Owning family of any row, bypassing row policies. `None` if the row does not exist.
    pub async fn record_family_id(
        &self,
        table: &str,
        id: Uuid,
        auth_token: &str,
    ) -> Result<Option<Uuid>, AppError> {
        let args = json!({ "p_table": table, "p_id": id });
        Ok(self
            .supabase
            .rpc::<Option<Uuid>>("record_family_id", auth_token, args)
            .await?)
    }
}

/// Error for a row the caller could not load in scope.
pub(crate) fn scope_error(owner: Option<Uuid>, scope: &FamilyScope, label: &str) -> AppError {
    match owner {
        Some(family_id) if !scope.contains(family_id) => {
            AppError::Forbidden(format!("{} belongs to another family", label))
        }
        _ => AppError::NotFound(format!("{} not found", label)),
    }
}

fn scope_from_rows(user_id: &str, rows: Vec<MembershipRow>) -> Option<FamilyScope> {
    let primary = rows.first()?;
    let (member_id, family_id) = (primary.id, primary.family_id);

    let mut family_ids = Vec::with_capacity(rows.len());
    for row in &rows {
        if !family_ids.contains(&row.family_id) {
            family_ids.push(row.family_id);
        }
    }

    Some(FamilyScope {
        user_id: user_id.to_string(),
        member_id,
        family_id,
        family_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_from_rows_uses_earliest_membership() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let rows = vec![
            MembershipRow { id: Uuid::new_v4(), family_id: first },
            MembershipRow { id: Uuid::new_v4(), family_id: second },
        ];
        let primary_member = rows[0].id;

        let scope = scope_from_rows("user-1", rows).unwrap();
        assert_eq!(scope.family_id, first);
        assert_eq!(scope.member_id, primary_member);
        assert_eq!(scope.family_ids, vec![first, second]);
        assert!(scope.contains(second));
        assert_eq!(scope.family_filter(), format!("in.({},{})", first, second));
    }

    #[test]
    fn test_scope_error_distinguishes_foreign_from_missing() {
        let family = Uuid::new_v4();
        let rows = vec![MembershipRow { id: Uuid::new_v4(), family_id: family }];
        let scope = scope_from_rows("user-1", rows).unwrap();

        assert!(matches!(
            scope_error(Some(Uuid::new_v4()), &scope, "Task"),
            AppError::Forbidden(_)
        ));
        assert!(matches!(scope_error(None, &scope, "Task"), AppError::NotFound(_)));
        assert!(matches!(scope_error(Some(family), &scope, "Task"), AppError::NotFound(_)));
    }

    #[test]
    fn test_scope_from_no_rows_is_none() {
        assert!(scope_from_rows("user-1", Vec::new()).is_none());
    }
}
