use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use family_cell::{FamilyScope, ScopeService};
use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::vital::Vital;
use shared_summary::{group_vitals_by_date, most_recent, ChartPoint};

use crate::models::{
    window_days, ChartQuery, CreateVitalRequest, VitalListQuery, VitalView, DEFAULT_CHART_POINTS,
};

pub struct VitalService {
    supabase: SupabaseClient,
    config: AppConfig,
}

impl VitalService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            config: config.clone(),
        }
    }

    /// Vitals measured since `since` across the scope, newest first.
    pub async fn recent_vitals(
        &self,
        scope: &FamilyScope,
        since: DateTime<Utc>,
        limit: Option<usize>,
        auth_token: &str,
    ) -> Result<Vec<Vital>, AppError> {
        let mut path = format!(
            "/rest/v1/vitals?family_id={}&measured_at=gte.{}&order=measured_at.desc",
            scope.family_filter(),
            since.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        if let Some(limit) = limit {
            path.push_str(&format!("&limit={}", limit));
        }

        let vitals: Vec<Vital> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;
        Ok(vitals)
    }

    pub async fn list_vitals(
        &self,
        user: &User,
        query: VitalListQuery,
        auth_token: &str,
    ) -> Result<Vec<VitalView>, AppError> {
        let days = window_days(query.days)?;
        let scopes = ScopeService::new(&self.config);
        let Some(scope) = scopes.resolve(user, auth_token).await? else {
            return Ok(Vec::new());
        };

        let since = Utc::now() - Duration::days(i64::from(days));
        let mut path = format!(
            "/rest/v1/vitals?family_id={}&measured_at=gte.{}&order=measured_at.desc",
            scope.family_filter(),
            since.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        if let Some(vital_type) = query.vital_type {
            path.push_str(&format!("&type=eq.{}", vital_type.as_str()));
        }
        if let Some(member_id) = query.member_id {
            let (member_id, _) = scopes
                .target_member(&scope, Some(member_id), auth_token)
                .await?;
            path.push_str(&format!("&member_id=eq.{}", member_id));
        }

        let vitals: Vec<Vital> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(vitals.into_iter().map(VitalView::from).collect())
    }

    pub async fn create_vital(
        &self,
        user: &User,
        request: CreateVitalRequest,
        auth_token: &str,
    ) -> Result<VitalView, AppError> {
        request.validate()?;
        debug!("Recording {} for user {}", request.vital_type.as_str(), user.id);

        let scopes = ScopeService::new(&self.config);
        let scope = scopes.ensure(user, auth_token).await?;
        let (member_id, family_id) = scopes
            .target_member(&scope, request.member_id, auth_token)
            .await?;

        let measured_at = request.measured_at.unwrap_or_else(Utc::now);
        let vital_data = json!({
            "family_id": family_id,
            "member_id": member_id,
            "type": request.vital_type,
            "value": request.value.trim(),
            "unit": request.vital_type.unit(),
            "measured_at": measured_at.to_rfc3339(),
            "notes": request.notes,
        });

        let created: Vec<Vital> = self
            .supabase
            .write_returning(Method::POST, "/rest/v1/vitals", auth_token, Some(vital_data))
            .await?;

        let vital = created
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("Vital insert returned no row".to_string()))?;

        info!("Vital {} recorded for member {}", vital.id, member_id);
        Ok(vital.into())
    }

    pub async fn delete_vital(
        &self,
        user: &User,
        vital_id: Uuid,
        auth_token: &str,
    ) -> Result<(), AppError> {
        let scopes = ScopeService::new(&self.config);
        let scope = scopes.require(user, auth_token).await?;
        let _: Vital = scopes
            .fetch_in_scope("vitals", vital_id, &scope, auth_token, "Vital")
            .await?;

        let path = format!(
            "/rest/v1/vitals?id=eq.{}&family_id={}",
            vital_id,
            scope.family_filter()
        );
        let removed: Vec<Value> = self
            .supabase
            .write_returning(Method::DELETE, &path, auth_token, None)
            .await?;

        if removed.is_empty() {
            return Err(AppError::NotFound("Vital not found".to_string()));
        }
        info!("Vital {} deleted by user {}", vital_id, user.id);
        Ok(())
    }

    /// Chart series for the window, one point per local display date.
    pub async fn chart(
        &self,
        user: &User,
        query: ChartQuery,
        auth_token: &str,
    ) -> Result<Vec<ChartPoint>, AppError> {
        let days = window_days(query.days)?;
        let Some(scope) = ScopeService::new(&self.config).resolve(user, auth_token).await? else {
            return Ok(Vec::new());
        };

        let since = Utc::now() - Duration::days(i64::from(days));
        let vitals = self.recent_vitals(&scope, since, None, auth_token).await?;

        let points = group_vitals_by_date(&vitals, self.config.display_offset());
        Ok(most_recent(points, query.limit.unwrap_or(DEFAULT_CHART_POINTS)))
    }
}
