use chrono::{NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use family_cell::{FamilyScope, ScopeService};
use shared_config::AppConfig;
use shared_database::supabase::{prefer, PREFER_IGNORE_DUPLICATES};
use shared_database::SupabaseClient;
use shared_models::auth::User;
use shared_models::error::{AppError, FieldErrors};
use shared_models::medication::{Medication, MedicationLog, MedicationLogStatus};
use shared_models::validation::check_date;

use crate::models::UpdateLogRequest;
use crate::services::schedule::planned_doses;

const LOG_SELECT: &str = "*,medication:medications(id,name,dosage,frequency,notes)";
const LOG_CONFLICT_KEY: &str = "medication_id,scheduled_date,scheduled_time";

pub struct LogService {
    supabase: SupabaseClient,
    config: AppConfig,
}

impl LogService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            config: config.clone(),
        }
    }

    /// Make sure every dose scheduled on `date` has a log row.
    ///
    /// One bulk insert that skips rows already present, so concurrent callers
    /// converge on the same set of logs.
    pub async fn ensure_logs(
        &self,
        scope: &FamilyScope,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<usize, AppError> {
        let path = format!(
            "/rest/v1/medications?family_id={}&is_active=eq.true&start_date=lte.{}",
            scope.family_filter(),
            date
        );
        let medications: Vec<Medication> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let doses = planned_doses(&medications, date);
        if doses.is_empty() {
            return Ok(0);
        }

        debug!("Ensuring {} medication logs for {}", doses.len(), date);
        let path = format!("/rest/v1/medication_logs?on_conflict={}", LOG_CONFLICT_KEY);
        let body = serde_json::to_value(&doses).map_err(|e| AppError::Internal(e.to_string()))?;

        let () = self
            .supabase
            .request_with_headers(
                Method::POST,
                &path,
                Some(auth_token),
                Some(body),
                Some(prefer(PREFER_IGNORE_DUPLICATES)),
            )
            .await?;

        Ok(doses.len())
    }

    /// Logs for `date` across the scope, with the medication embedded, by time.
    pub async fn logs_for_date(
        &self,
        scope: &FamilyScope,
        date: NaiveDate,
        limit: Option<usize>,
        auth_token: &str,
    ) -> Result<Vec<MedicationLog>, AppError> {
        self.ensure_logs(scope, date, auth_token).await?;

        let mut path = format!(
            "/rest/v1/medication_logs?select={}&family_id={}&scheduled_date=eq.{}&order=scheduled_time.asc",
            LOG_SELECT,
            scope.family_filter(),
            date
        );
        if let Some(limit) = limit {
            path.push_str(&format!("&limit={}", limit));
        }

        let logs: Vec<MedicationLog> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;
        Ok(logs)
    }

    pub async fn list_logs(
        &self,
        user: &User,
        date: Option<&str>,
        auth_token: &str,
    ) -> Result<Vec<MedicationLog>, AppError> {
        let date = match date {
            Some(raw) => {
                let mut errors = FieldErrors::new();
                let parsed = check_date(&mut errors, "date", raw);
                errors.into_result()?;
                parsed.unwrap_or_else(|| self.config.local_today())
            }
            None => self.config.local_today(),
        };

        let Some(scope) = ScopeService::new(&self.config).resolve(user, auth_token).await? else {
            return Ok(Vec::new());
        };

        self.logs_for_date(&scope, date, None, auth_token).await
    }

    /// Record the outcome of a dose.
    pub async fn update_log(
        &self,
        user: &User,
        log_id: Uuid,
        request: UpdateLogRequest,
        auth_token: &str,
    ) -> Result<MedicationLog, AppError> {
        let scopes = ScopeService::new(&self.config);
        let scope = scopes.require(user, auth_token).await?;
        let _: MedicationLog = scopes
            .fetch_in_scope("medication_logs", log_id, &scope, auth_token, "Medication log")
            .await?;

        let mut update_data = Map::new();
        update_data.insert("status".to_string(), json!(request.status));
        let taken_at = match request.status {
            MedicationLogStatus::Taken => Some(request.taken_at.unwrap_or_else(Utc::now)),
            _ => None,
        };
        update_data.insert("taken_at".to_string(), json!(taken_at));
        if let Some(notes) = request.notes {
            update_data.insert("notes".to_string(), json!(notes));
        }

        let path = format!(
            "/rest/v1/medication_logs?id=eq.{}&family_id={}",
            log_id,
            scope.family_filter()
        );
        let updated: Vec<MedicationLog> = self
            .supabase
            .write_returning(Method::PATCH, &path, auth_token, Some(Value::Object(update_data)))
            .await?;

        let log = updated
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Medication log not found".to_string()))?;

        info!("Medication log {} marked {:?}", log.id, log.status);
        Ok(log)
    }
}
